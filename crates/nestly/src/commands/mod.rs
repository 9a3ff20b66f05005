//! Command dispatch: builds the account from config + flags, makes sure
//! there is a session, then hands off to the topic handlers.

pub mod config_cmd;
pub mod list;
pub mod session;
pub mod set;

use std::path::PathBuf;
use std::time::Duration;

use nestly_config::Config;
use nestly_core::{Account, LoginFlow, LoginOutcome, Nest};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::prompt::TerminalPrompter;

/// Everything a handler needs besides the account.
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub format: OutputFormat,
    global_timeout: Option<u64>,
    global_cache_dir: Option<PathBuf>,
}

impl Context {
    pub fn new(config: Config, config_path: PathBuf, global: &GlobalOpts) -> Result<Self, CliError> {
        let format = match global.output {
            Some(format) => format,
            None => <OutputFormat as clap::ValueEnum>::from_str(&config.output, true).map_err(
                |reason| CliError::Validation {
                    field: "output".into(),
                    reason,
                },
            )?,
        };
        Ok(Self {
            config,
            config_path,
            format,
            global_timeout: global.timeout,
            global_cache_dir: global.cache_dir.clone(),
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.global_cache_dir
            .clone()
            .unwrap_or_else(|| self.config.resolved_cache_dir())
    }

    /// An account wired to the configured transport. No network I/O yet.
    pub fn open_account(&self) -> Result<Account, CliError> {
        let mut transport = self.config.transport_config()?;
        if let Some(secs) = self.global_timeout {
            transport = transport.with_timeout(Duration::from_secs(secs));
        }
        let cache_dir = self.cache_dir();
        tracing::debug!(cache_dir = %cache_dir.display(), "opening account");
        Ok(Account::from_transport(&transport, cache_dir)?)
    }

    pub fn prompter(&self) -> TerminalPrompter {
        let email = nestly_config::resolve_email(&self.config);
        let password = email.as_deref().and_then(nestly_config::resolve_password);
        TerminalPrompter::new(email, password)
    }
}

pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => list::handle(args, ctx).await,
        Command::Set(args) => set::handle(args, ctx).await,
        Command::Login => session::login(ctx).await,
        Command::Logout => session::logout(ctx),
        Command::Config(args) => config_cmd::handle(&args, ctx),
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}

// ── Shared helpers ───────────────────────────────────────────────────

/// Reuse the saved session or walk the user through logging in.
pub async fn ensure_logged_in(account: &mut Account, ctx: &Context) -> Result<(), CliError> {
    let mut prompter = ctx.prompter();
    match LoginFlow::new(&mut prompter).ensure_session(account).await? {
        LoginOutcome::Authenticated | LoginOutcome::AlreadyAuthenticated => Ok(()),
        LoginOutcome::Cancelled => Err(CliError::LoginCancelled),
    }
}

/// The thermostat commands act on: the remembered one if it still exists,
/// otherwise the first on the account.
pub async fn selected_nest<'a>(account: &'a Account, ctx: &Context) -> Result<Nest<'a>, CliError> {
    let nests = account.nests().await?;
    let remembered = ctx.config.last_device.as_deref();

    if let Some(nest) = remembered.and_then(|id| nests.iter().find(|n| n.id() == id)) {
        return Ok(*nest);
    }
    if let Some(id) = remembered {
        tracing::warn!(device = id, "remembered thermostat is gone, using the first one");
    }
    nests.first().copied().ok_or(CliError::NoThermostats)
}

/// Temperature with one decimal and the unit, e.g. `21.5°C`.
pub fn degrees(value: f64, unit: impl std::fmt::Display) -> String {
    format!("{value:.1}°{unit}")
}
