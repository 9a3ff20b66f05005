//! Resource model between `nestly-api` and the CLI.
//!
//! - **[`Account`]**: Owns the session and the status snapshot. The
//!   snapshot is fetched once per process on first access; writes patch it
//!   in place after the server confirms them.
//!
//! - **[`Structure`]** / **[`Nest`]**: Borrowed views over the account's
//!   snapshot. They hold ids and back-references only; every attribute is
//!   read from the snapshot.
//!
//! - **[`LoginFlow`]**: Interactive credential loop driven by a
//!   [`Prompter`] implementation supplied by the front end.
//!
//! - **[`units`]**: Celsius/Fahrenheit conversion applied at every
//!   wire/display boundary.

pub mod account;
pub mod error;
pub mod login;
pub mod model;
pub mod nest;
pub mod status;
pub mod structure;
pub mod units;

// ── Primary re-exports ──────────────────────────────────────────────
pub use account::Account;
pub use error::CoreError;
pub use login::{LoginFlow, LoginOutcome, Prompter};
pub use model::{FanMode, MIN_RANGE_SPREAD, TargetTemperature, ThermostatMode, parse_composite_id};
pub use nest::Nest;
pub use status::{Category, StatusPatch, StatusSnapshot};
pub use structure::Structure;
pub use units::Scale;

pub use nestly_api::{DEFAULT_LOGIN_URL, Forecast, TlsVersion, TransportConfig};
