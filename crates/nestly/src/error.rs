//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use nestly_config::ConfigError;
use nestly_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Session ──────────────────────────────────────────────────────

    #[error("Not logged in")]
    #[diagnostic(
        code(nestly::login_required),
        help("Run: nestly login\nSessions expire; you'll periodically have to log in again.")
    )]
    LoginRequired,

    #[error("Login failed: {message}")]
    #[diagnostic(
        code(nestly::login_failed),
        help("Either the Nest service is down or the email and password were incorrect.")
    )]
    LoginFailed { message: String },

    #[error("Login cancelled")]
    #[diagnostic(code(nestly::login_cancelled))]
    LoginCancelled,

    // ── Requests ─────────────────────────────────────────────────────

    #[error("Request failed: {body}")]
    #[diagnostic(code(nestly::request_failed), help("The Nest service answered HTTP {status}."))]
    RequestFailed { status: u16, body: String },

    #[error("Cannot reach the Nest service: {reason}")]
    #[diagnostic(
        code(nestly::connection_failed),
        help("Check your network connection, or pin a TLS version with the `tls_version` config key.")
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(code(nestly::timeout), help("Increase the timeout with --timeout."))]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{kind} '{id}' not found")]
    #[diagnostic(code(nestly::not_found), help("Run: nestly list devices"))]
    NotFound { kind: String, id: String },

    #[error("No thermostats on this account")]
    #[diagnostic(code(nestly::no_thermostats))]
    NoThermostats,

    #[error("Unexpected thermostat data: {message}")]
    #[diagnostic(code(nestly::data))]
    Data { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nestly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(nestly::config), help("Check the file at: nestly config path"))]
    Config(#[from] ConfigError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LoginRequired | Self::LoginFailed { .. } | Self::LoginCancelled => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::NoThermostats => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// One line for launcher output, where there is no room for a report.
    pub fn launcher_message(&self) -> String {
        match self {
            Self::RequestFailed { body, .. } => format!("Request failed: {body}"),
            other => format!("Error: {other}"),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated | CoreError::FailedRequest { status: 401, .. } => {
                Self::LoginRequired
            }
            CoreError::LoginFailure { message } => Self::LoginFailed { message },
            CoreError::FailedRequest { status, body } => Self::RequestFailed { status, body },
            CoreError::ConnectionFailed { reason } => Self::ConnectionFailed { reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::InvalidInput { field, reason } => Self::Validation { field, reason },
            CoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            CoreError::MissingField { path } => Self::Data {
                message: format!("missing {path}"),
            },
            CoreError::Session { message } | CoreError::Internal(message) => Self::Data { message },
        }
    }
}
