// Nest mobile API HTTP client
//
// Wraps `reqwest::Client` with the mobile API's header set, session-scoped
// URL construction, and the pass/fail classification callers rely on:
// anything other than HTTP 200 is a `FailedRequest` carrying the raw body.

use std::collections::HashMap;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::Forecast;
use crate::session::Session;
use crate::transport::TransportConfig;

const PROTOCOL_VERSION: &str = "1";

/// Body of a POST. Strings are sent as-is, anything else JSON-encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Json(Value),
}

impl RequestBody {
    fn encode(self) -> Result<String, Error> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Json(value) => Ok(serde_json::to_string(&value)?),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A successful (HTTP 200) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| {
            let preview: String = self.body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: self.body.clone(),
            }
        })
    }
}

/// Raw HTTP client for the Nest mobile API.
///
/// Holds at most one session. Every authenticated call checks that the
/// session is present and unexpired before touching the network.
pub struct NestClient {
    http: reqwest::Client,
    login_url: Url,
    session: Option<Session>,
}

impl NestClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            login_url: transport.login_url.clone(),
            session: None,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, login_url: Url) -> Self {
        Self {
            http,
            login_url,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// The loaded session, if it is still valid.
    pub fn active_session(&self) -> Result<&Session, Error> {
        match self.session.as_ref() {
            Some(session) if session.is_valid() => Ok(session),
            _ => Err(Error::NotAuthenticated),
        }
    }

    // ── Login ────────────────────────────────────────────────────────

    /// POST credentials to the login endpoint and decode the session.
    ///
    /// Does not retain the session; the caller decides whether to persist
    /// and install it.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, Error> {
        debug!("logging in at {}", self.login_url);

        let resp = self
            .http
            .post(self.login_url.clone())
            .form(&[("username", email), ("password", password.expose_secret())])
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let session = ApiResponse { status, body }.json::<Session>()?;
        debug!(user_id = %session.user_id, "login successful");
        Ok(session)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Perform a request against `<transport_url>/v2/<path>`.
    ///
    /// GETs of paths ending in `.json` are sent without the session
    /// headers.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<ApiResponse, Error> {
        let session = self.active_session()?;
        let url = session.api_url(path)?;

        let builder = if method == Method::GET {
            if path.ends_with(".json") {
                debug!("GET {} (unauthenticated)", url);
                self.http.get(url)
            } else {
                debug!("GET {}", url);
                authorize(self.http.get(url), session)
            }
        } else if method == Method::POST || method == Method::DELETE {
            debug!("{} {}", method, url);
            authorize(self.http.request(method, url), session)
        } else {
            return Err(Error::UnsupportedMethod(method.to_string()));
        };

        let builder = match body {
            Some(body) => builder.body(body.encode()?),
            None => builder,
        };

        let resp = builder.send().await.map_err(Error::Transport)?;
        classify(resp).await
    }

    /// GET a path and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, path, None).await?.json()
    }

    /// POST a body to a path. Only pass/fail matters to callers.
    pub async fn post(&self, path: &str, body: impl Into<RequestBody>) -> Result<ApiResponse, Error> {
        self.request(Method::POST, path, Some(body.into())).await
    }

    /// Fetch the forecast for a postal code. No session headers are sent,
    /// but the session supplies the weather endpoint.
    pub async fn weather(&self, postal_code: &str) -> Result<Forecast, Error> {
        let session = self.active_session()?;
        let url = session.weather_url(postal_code)?;
        debug!("GET {} (weather)", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let mut by_postal_code: HashMap<String, Forecast> = classify(resp).await?.json()?;

        match by_postal_code.remove(postal_code) {
            Some(forecast) => Ok(forecast),
            None => by_postal_code
                .into_values()
                .next()
                .ok_or_else(|| Error::Deserialization {
                    message: format!("no forecast for postal code {postal_code}"),
                    body: String::new(),
                }),
        }
    }
}

/// Attach the mobile API session headers.
fn authorize(builder: reqwest::RequestBuilder, session: &Session) -> reqwest::RequestBuilder {
    builder
        .header(
            reqwest::header::AUTHORIZATION,
            format!("Basic {}", session.access_token.expose_secret()),
        )
        .header("X-nl-user-id", session.user_id.as_str())
        .header("X-nl-protocol-version", PROTOCOL_VERSION)
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-us")
        .header(reqwest::header::CONNECTION, "keep-alive")
        .header(reqwest::header::ACCEPT, "*/*")
}

/// Anything but HTTP 200 is a failure carrying the raw body.
async fn classify(resp: reqwest::Response) -> Result<ApiResponse, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if status != StatusCode::OK {
        debug!(%status, "request failed");
        return Err(Error::FailedRequest {
            status: status.as_u16(),
            body,
        });
    }

    Ok(ApiResponse { status, body })
}
