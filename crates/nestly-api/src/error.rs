use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `nestly-api` crate.
///
/// Covers session persistence, login, and authenticated transport.
/// `nestly-core` maps these into the domain taxonomy its callers see.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No session is loaded, or the loaded one has expired.
    #[error("No session available -- login first")]
    NotAuthenticated,

    /// The login endpoint answered with something other than HTTP 200.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Requests ────────────────────────────────────────────────────
    /// An authenticated call answered with something other than HTTP 200.
    /// Carries the raw response for diagnostics.
    #[error("Request failed (HTTP {status}): {body}")]
    FailedRequest { status: u16, body: String },

    /// The caller asked for a verb the mobile API doesn't use.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Session file ────────────────────────────────────────────────
    #[error("Session file {}: {source}", path.display())]
    SessionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session encoding failed: {0}")]
    SessionFormat(#[from] serde_json::Error),
}
