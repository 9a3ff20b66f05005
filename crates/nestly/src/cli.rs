//! Clap derive structures for the `nestly` CLI.
//!
//! `list` renders launcher items, `set` performs one write and prints a
//! confirmation line. Everything else manages the session and config.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nestly -- drive a Nest thermostat from a launcher or the shell
#[derive(Debug, Parser)]
#[command(
    name = "nestly",
    version,
    about = "Control a Nest thermostat from the command line",
    long_about = "Read and change a Nest thermostat's target temperature, mode,\n\
        fan and away state. `list` output doubles as a launcher script filter.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format (defaults to the `output` config key)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory holding the session file
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Alfred script-filter JSON
    Alfred,
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one title per line
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show thermostat state as launcher items
    #[command(alias = "tell", alias = "ls")]
    List(ListArgs),

    /// Change thermostat state
    #[command(alias = "do")]
    Set(SetArgs),

    /// Log in and save a session
    Login,

    /// Forget the saved session
    Logout,

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub topic: ListTopic,

    /// Partial user input, as typed into the launcher
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub query: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListTopic {
    /// Temperature, target, humidity, fan and away at a glance
    Status,
    /// Current target temperature (query previews a new one)
    Target,
    /// Fan mode
    Fan,
    /// Away state
    Away,
    /// Current conditions and a two-day forecast
    Weather,
    /// Temperature modes, fuzzy-filtered by the query
    Mode,
    /// Every thermostat on the account
    Devices,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    pub topic: SetTopic,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
    pub value: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SetTopic {
    /// One temperature, or "low high" in heat/cool mode
    Target,
    /// auto | on
    Fan,
    /// on/yes/true/1 | off/no/false/0
    Away,
    /// heat | cool | range
    Mode,
    /// Select the thermostat later commands act on
    Device,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}
