//! `nestly login` / `nestly logout`.

use nestly_core::{LoginFlow, LoginOutcome};

use super::Context;
use crate::error::CliError;
use crate::output;

/// Always prompts, replacing any saved session.
pub async fn login(ctx: &Context) -> Result<(), CliError> {
    let mut account = ctx.open_account()?;
    let mut prompter = ctx.prompter();

    match LoginFlow::new(&mut prompter).run(&mut account).await? {
        LoginOutcome::Cancelled => Err(CliError::LoginCancelled),
        LoginOutcome::Authenticated | LoginOutcome::AlreadyAuthenticated => {
            let session = account.session_store().path().display().to_string();
            output::print_output(&output::render_message(
                ctx.format,
                &format!("Session saved to {session}"),
            ));
            Ok(())
        }
    }
}

pub fn logout(ctx: &Context) -> Result<(), CliError> {
    let mut account = ctx.open_account()?;
    account.logout()?;
    output::print_output(&output::render_message(ctx.format, "Logged out"));
    Ok(())
}
