// ── Core error types ──
//
// The taxonomy front ends recover from. Transport-layer detail (HTTP
// status, raw body) survives only where callers display it.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    /// No valid session when an authenticated call was attempted.
    #[error("Not logged in -- login first")]
    NotAuthenticated,

    /// Login was rejected or the login endpoint was unreachable.
    #[error("Login failed: {message}")]
    LoginFailure { message: String },

    #[error("Session storage error: {message}")]
    Session { message: String },

    // ── Requests ─────────────────────────────────────────────────────
    /// An authenticated call answered with something other than HTTP 200.
    #[error("Request failed (HTTP {status}): {body}")]
    FailedRequest { status: u16, body: String },

    #[error("Cannot reach the Nest service: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Input ────────────────────────────────────────────────────────
    /// Caller-supplied value failed local validation; nothing was sent.
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Status snapshot has no {path}")]
    MissingField { path: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the user has to log in (again) to proceed.
    pub fn is_login_required(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::LoginFailure { .. })
            || matches!(self, Self::FailedRequest { status: 401, .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nestly_api::Error> for CoreError {
    fn from(err: nestly_api::Error) -> Self {
        match err {
            nestly_api::Error::NotAuthenticated => Self::NotAuthenticated,
            nestly_api::Error::Authentication { message } => Self::LoginFailure { message },
            nestly_api::Error::FailedRequest { status, body } => {
                Self::FailedRequest { status, body }
            }
            nestly_api::Error::Transport(ref e) if e.is_timeout() => Self::Timeout,
            nestly_api::Error::Transport(e) => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            nestly_api::Error::Tls(reason) => Self::ConnectionFailed {
                reason: format!("TLS error: {reason}"),
            },
            nestly_api::Error::InvalidUrl(e) => Self::Internal(format!("Invalid URL: {e}")),
            nestly_api::Error::UnsupportedMethod(m) => {
                Self::Internal(format!("Unsupported HTTP method: {m}"))
            }
            nestly_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
            e @ (nestly_api::Error::SessionIo { .. } | nestly_api::Error::SessionFormat(_)) => {
                Self::Session {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rejection_maps_to_login_failure() {
        let err = CoreError::from(nestly_api::Error::Authentication {
            message: "login failed (HTTP 400)".into(),
        });
        assert!(matches!(err, CoreError::LoginFailure { .. }));
        assert!(err.is_login_required());
    }

    #[test]
    fn failed_request_keeps_raw_body() {
        let err = CoreError::from(nestly_api::Error::FailedRequest {
            status: 500,
            body: "oops".into(),
        });
        match err {
            CoreError::FailedRequest { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
