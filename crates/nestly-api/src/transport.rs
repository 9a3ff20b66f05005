// Transport configuration for building the reqwest::Client.
//
// Timeout, user agent, login endpoint, and optional TLS version pinning
// live here so the client itself only deals with request mechanics.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::{DEFAULT_LOGIN_URL, USER_AGENT};

/// A TLS protocol version the connection pool can be pinned to.
///
/// Older Nest backends only negotiated TLS 1.0. Pinning is opt-in; with
/// no pin the platform default negotiation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    Tls1_0,
    Tls1_1,
    Tls1_2,
    Tls1_3,
}

impl TlsVersion {
    fn as_reqwest(self) -> reqwest::tls::Version {
        match self {
            Self::Tls1_0 => reqwest::tls::Version::TLS_1_0,
            Self::Tls1_1 => reqwest::tls::Version::TLS_1_1,
            Self::Tls1_2 => reqwest::tls::Version::TLS_1_2,
            Self::Tls1_3 => reqwest::tls::Version::TLS_1_3,
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tls1_0 => "1.0",
            Self::Tls1_1 => "1.1",
            Self::Tls1_2 => "1.2",
            Self::Tls1_3 => "1.3",
        };
        f.write_str(s)
    }
}

impl FromStr for TlsVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches("TLS").trim_start_matches("tls").trim() {
            "1.0" | "1" => Ok(Self::Tls1_0),
            "1.1" => Ok(Self::Tls1_1),
            "1.2" => Ok(Self::Tls1_2),
            "1.3" => Ok(Self::Tls1_3),
            other => Err(Error::Tls(format!("unknown TLS version '{other}'"))),
        }
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on every request, including the unauthenticated weather lookup.
    pub timeout: Duration,
    /// Pin both the minimum and maximum negotiated TLS version.
    pub tls_version: Option<TlsVersion>,
    pub login_url: Url,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            tls_version: None,
            login_url: Url::parse(DEFAULT_LOGIN_URL).expect("static login URL is valid"),
            user_agent: USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone());

        if let Some(version) = self.tls_version {
            builder = builder
                .min_tls_version(version.as_reqwest())
                .max_tls_version(version.as_reqwest());
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tls_version(mut self, version: Option<TlsVersion>) -> Self {
        self.tls_version = version;
        self
    }

    pub fn with_login_url(mut self, login_url: Url) -> Self {
        self.login_url = login_url;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_tls_versions() {
        assert_eq!("1.0".parse::<TlsVersion>().unwrap(), TlsVersion::Tls1_0);
        assert_eq!("TLS1.2".parse::<TlsVersion>().unwrap(), TlsVersion::Tls1_2);
        assert_eq!(" 1.3 ".parse::<TlsVersion>().unwrap(), TlsVersion::Tls1_3);
        assert!("2.0".parse::<TlsVersion>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for v in [
            TlsVersion::Tls1_0,
            TlsVersion::Tls1_1,
            TlsVersion::Tls1_2,
            TlsVersion::Tls1_3,
        ] {
            assert_eq!(v.to_string().parse::<TlsVersion>().unwrap(), v);
        }
    }

    #[test]
    fn default_config_is_unpinned_with_bounded_timeout() {
        let cfg = TransportConfig::default();
        assert!(cfg.tls_version.is_none());
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.login_url.as_str(), DEFAULT_LOGIN_URL);
        assert!(cfg.build_client().is_ok());
    }
}
