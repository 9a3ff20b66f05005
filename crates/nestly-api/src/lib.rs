// nestly-api: Async Rust client for the Nest mobile API
//
// Session persistence, authenticated transport, and the wire models the
// core crate builds its resource graph from.

pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{ApiResponse, NestClient, RequestBody};
pub use error::Error;
pub use models::{CurrentConditions, DailyForecast, Forecast, ForecastDays};
pub use session::{Session, SessionStore, SessionUrls};
pub use transport::{TlsVersion, TransportConfig};

/// Fixed login endpoint of the Nest web service.
pub const DEFAULT_LOGIN_URL: &str = "https://home.nest.com/user/login";

/// User agent the mobile API expects.
pub const USER_AGENT: &str = "Nest/1.1.0.10 CFNetwork/548.0.4";
