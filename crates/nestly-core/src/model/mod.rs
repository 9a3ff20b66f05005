// ── Domain model ──
//
// Closed enums and value types parsed at the wire/user boundary.

pub mod ids;
pub mod thermostat;

pub use ids::parse_composite_id;
pub use thermostat::{FanMode, MIN_RANGE_SPREAD, TargetTemperature, ThermostatMode};
