// Session persistence
//
// The login endpoint returns a JSON document carrying the access token,
// user id, expiry, and the per-account service URLs. It is written to
// `<cache_dir>/session.json` verbatim (unknown fields included) and read
// back on the next invocation. Loading fails soft: a missing, corrupt, or
// expired file simply means "no session".

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;

const SESSION_FILE: &str = "session.json";

/// `expires_in` wire format, e.g. `Sat, 03-Nov-2012 20:31:40 GMT`.
pub const EXPIRY_FORMAT: &str = "%a, %d-%b-%Y %H:%M:%S GMT";

/// `EXPIRY_FORMAT` without the weekday, which is not checked on read.
const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y %H:%M:%S GMT";

/// An authenticated session as returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(serialize_with = "expose_token", deserialize_with = "secret_token")]
    pub access_token: SecretString,
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(with = "gmt_expiry")]
    pub expires_in: DateTime<Utc>,
    pub urls: SessionUrls,
    /// Remaining login-response fields, preserved so the file round-trips.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-account service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUrls {
    pub transport_url: Url,
    pub weather_url: Url,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Session {
    /// A session is usable while `now <= expires_in`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_in
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Build `<transport_url>/v2/<path>`.
    pub fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.urls.transport_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/v2/{path}"))?)
    }

    /// Build `<weather_url><postal_code>`.
    pub fn weather_url(&self, postal_code: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!(
            "{}{postal_code}",
            self.urls.weather_url.as_str()
        ))?)
    }
}

fn expose_token<S: Serializer>(token: &SecretString, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(token.expose_secret())
}

fn secret_token<'de, D: Deserializer<'de>>(de: D) -> Result<SecretString, D::Error> {
    String::deserialize(de).map(SecretString::from)
}

mod gmt_expiry {
    use super::{
        DateTime, Deserialize, Deserializer, EXPIRY_DATE_FORMAT, EXPIRY_FORMAT, NaiveDateTime,
        Serializer, Utc,
    };

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&at.format(EXPIRY_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(de)?;
        let date = raw.split_once(", ").map_or(raw.as_str(), |(_, rest)| rest);
        NaiveDateTime::parse_from_str(date, EXPIRY_DATE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

// ── SessionStore ────────────────────────────────────────────────────

/// File-backed session persistence. The only component that touches the
/// session file.
///
/// Concurrent processes writing the file at the same time are not
/// coordinated; the last writer wins.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store rooted at a caller-supplied cache directory.
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            path: cache_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a non-expired session, or `None`.
    pub fn load(&self) -> Option<Session> {
        self.load_at(Utc::now())
    }

    /// Load a session that is still valid at `now`.
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<Session> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session file");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable session file");
                return None;
            }
        };

        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt session file");
                return None;
            }
        };

        if !session.is_valid_at(now) {
            debug!(expired_at = %session.expires_in, "session expired");
            return None;
        }

        Some(session)
    }

    /// Persist a session, creating the cache directory if needed.
    pub fn save(&self, session: &Session) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::SessionIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json).map_err(|source| Error::SessionIo {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Delete the persisted session. Missing files are not an error.
    pub fn clear(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::SessionIo {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn session_json(expires_in: &str) -> serde_json::Value {
        json!({
            "access_token": "token-abc",
            "userid": "12345",
            "expires_in": expires_in,
            "email": "someone@example.com",
            "urls": {
                "transport_url": "https://frontdoor.nest.com",
                "weather_url": "https://home.nest.com/api/0.1/weather/forecast/",
                "rubyapi_url": "https://home.nest.com/"
            }
        })
    }

    fn write_session(dir: &Path, body: &str) -> SessionStore {
        let store = SessionStore::new(dir);
        std::fs::write(store.path(), body).unwrap();
        store
    }

    fn noon_2020() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SessionStore::new(dir.path()).load().is_none());
    }

    #[test]
    fn load_corrupt_json_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = write_session(dir.path(), "{ not json");
        assert!(store.load_at(noon_2020()).is_none());
    }

    #[test]
    fn load_bad_expiry_format_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let body = session_json("2099-01-01T00:00:00Z").to_string();
        let store = write_session(dir.path(), &body);
        assert!(store.load_at(noon_2020()).is_none());
    }

    #[test]
    fn load_expired_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let body = session_json("Mon, 01-Jun-2020 11:59:59 GMT").to_string();
        let store = write_session(dir.path(), &body);
        assert!(store.load_at(noon_2020()).is_none());
    }

    #[test]
    fn load_valid_session() {
        let dir = tempfile::tempdir().unwrap();
        let body = session_json("Mon, 01-Jun-2020 12:00:00 GMT").to_string();
        let store = write_session(dir.path(), &body);

        let session = store.load_at(noon_2020()).unwrap();
        assert_eq!(session.user_id, "12345");
        assert_eq!(session.access_token.expose_secret(), "token-abc");
        assert_eq!(session.urls.transport_url.as_str(), "https://frontdoor.nest.com/");
    }

    #[test]
    fn load_ignores_mismatched_weekday() {
        let dir = tempfile::tempdir().unwrap();
        let body = session_json("Tue, 01-Jun-2020 12:00:00 GMT").to_string();
        let store = write_session(dir.path(), &body);

        let session = store.load_at(noon_2020()).unwrap();
        assert_eq!(session.expires_in, noon_2020());
    }

    #[test]
    fn save_creates_directory_and_preserves_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cache").join("nestly");
        let store = SessionStore::new(&nested);

        let session: Session =
            serde_json::from_value(session_json("Fri, 01-Jan-2100 00:00:00 GMT")).unwrap();
        store.save(&session).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["email"], "someone@example.com");
        assert_eq!(raw["expires_in"], "Fri, 01-Jan-2100 00:00:00 GMT");
        assert_eq!(raw["urls"]["rubyapi_url"], "https://home.nest.com/");
        assert_eq!(raw["access_token"], "token-abc");

        assert!(store.load().is_some());
    }

    #[test]
    fn clear_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let body = session_json("Fri, 01-Jan-2100 00:00:00 GMT").to_string();
        let store = write_session(dir.path(), &body);

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn api_and_weather_urls() {
        let session: Session =
            serde_json::from_value(session_json("Fri, 01-Jan-2100 00:00:00 GMT")).unwrap();
        assert_eq!(
            session.api_url("mobile/user.12345").unwrap().as_str(),
            "https://frontdoor.nest.com/v2/mobile/user.12345"
        );
        assert_eq!(
            session.weather_url("94043").unwrap().as_str(),
            "https://home.nest.com/api/0.1/weather/forecast/94043"
        );
    }
}
