// ── Interactive login ──
//
// An explicit state machine over the credential prompt:
//
//   AwaitingCredentials → Authenticating → Authenticated
//                                        ↘ RetryPrompt → AwaitingCredentials
//
// Cancelling either prompt ends the flow. Rejected credentials and an
// unreachable service both land in RetryPrompt; anything else (e.g. the
// session file can't be written) aborts with the error.

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::account::Account;
use crate::error::CoreError;

const INTRO_TITLE: &str = "First things first...";
const INTRO_BODY: &str = "Before you can use nestly you need to supply your Nest account \
    email and password. Only the session token is saved, so you'll periodically have to \
    login again.";
const RETRY_BODY: &str = "Either the Nest service is temporarily down or your email and \
    password were incorrect. Click OK to try again.";

/// Front-end hooks the login flow drives.
pub trait Prompter {
    /// Ask for a value. `None` means the user cancelled.
    fn request_credentials(&mut self, title: &str, prompt: &str, hidden: bool) -> Option<String>;

    fn show_message(&mut self, title: &str, body: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A valid session was already on disk; nothing was asked.
    AlreadyAuthenticated,
    Authenticated,
    Cancelled,
}

enum LoginState {
    AwaitingCredentials,
    Authenticating {
        email: String,
        password: SecretString,
    },
    RetryPrompt,
    Authenticated,
}

/// Drives a [`Prompter`] until the account holds a session or the user gives up.
pub struct LoginFlow<'p, P: Prompter> {
    prompter: &'p mut P,
}

impl<'p, P: Prompter> LoginFlow<'p, P> {
    pub fn new(prompter: &'p mut P) -> Self {
        Self { prompter }
    }

    /// Reuse a persisted session if there is one, otherwise introduce the
    /// workflow and run the credential loop.
    pub async fn ensure_session(self, account: &mut Account) -> Result<LoginOutcome, CoreError> {
        if account.has_session() {
            return Ok(LoginOutcome::AlreadyAuthenticated);
        }
        self.prompter.show_message(INTRO_TITLE, INTRO_BODY);
        self.run(account).await
    }

    /// Run the credential loop unconditionally.
    pub async fn run(self, account: &mut Account) -> Result<LoginOutcome, CoreError> {
        let mut state = LoginState::AwaitingCredentials;
        loop {
            state = match state {
                LoginState::AwaitingCredentials => {
                    let Some(email) =
                        self.prompter
                            .request_credentials("Email", "Nest account email address", false)
                    else {
                        return Ok(LoginOutcome::Cancelled);
                    };
                    let Some(password) =
                        self.prompter
                            .request_credentials("Password", "Nest account password", true)
                    else {
                        return Ok(LoginOutcome::Cancelled);
                    };
                    LoginState::Authenticating {
                        email,
                        password: SecretString::from(password),
                    }
                }
                LoginState::Authenticating { email, password } => {
                    match account.login(&email, &password).await {
                        Ok(()) => LoginState::Authenticated,
                        Err(CoreError::LoginFailure { message }) => {
                            warn!(%message, "login attempt failed");
                            LoginState::RetryPrompt
                        }
                        Err(e) => return Err(e),
                    }
                }
                LoginState::RetryPrompt => {
                    self.prompter.show_message("Login failed", RETRY_BODY);
                    LoginState::AwaitingCredentials
                }
                LoginState::Authenticated => {
                    debug!("login flow complete");
                    self.prompter
                        .show_message("Success!", "You're logged in and ready to go!");
                    return Ok(LoginOutcome::Authenticated);
                }
            };
        }
    }
}
