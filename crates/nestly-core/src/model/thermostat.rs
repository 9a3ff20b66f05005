// ── Thermostat value types ──

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

use crate::error::CoreError;
use crate::units::Scale;

/// Smallest `high - low` the hardware accepts for a heat/cool range.
pub const MIN_RANGE_SPREAD: f64 = 3.0;

// ── ThermostatMode ──────────────────────────────────────────────────

/// Temperature mode. Freely settable; the device's own transitions are
/// only observed by re-reading the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThermostatMode {
    Heat,
    Cool,
    Range,
}

impl ThermostatMode {
    /// Lowercase form, as read from the snapshot.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Uppercase form the write endpoint expects.
    pub fn wire_value(self) -> String {
        self.as_str().to_uppercase()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Heat => "Heat",
            Self::Cool => "Cool",
            Self::Range => "Heat/cool",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Heat => "Heat to a certain temperature",
            Self::Cool => "Cool to a certain temperature",
            Self::Range => "Heat to a minimum temperature and cool to a maximum temperature",
        }
    }
}

impl fmt::Display for ThermostatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThermostatMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            "range" => Ok(Self::Range),
            other => Err(CoreError::invalid(
                "mode",
                format!("expected heat, cool, or range, got '{other}'"),
            )),
        }
    }
}

// ── FanMode ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FanMode {
    Auto,
    On,
}

impl FanMode {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// The other mode; what a toggle switches to.
    pub fn toggled(self) -> Self {
        match self {
            Self::Auto => Self::On,
            Self::On => Self::Auto,
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "on" => Ok(Self::On),
            other => Err(CoreError::invalid(
                "fan mode",
                format!("expected 'auto' or 'on', got '{other}'"),
            )),
        }
    }
}

// ── TargetTemperature ───────────────────────────────────────────────

/// A target setpoint: one value, or a heat/cool range in `Range` mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TargetTemperature {
    Single(f64),
    Range { low: f64, high: f64 },
}

impl TargetTemperature {
    /// Build a range, rejecting spreads narrower than [`MIN_RANGE_SPREAD`].
    pub fn range(low: f64, high: f64) -> Result<Self, CoreError> {
        let target = Self::Range { low, high };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match *self {
            Self::Single(value) if !value.is_finite() => {
                Err(CoreError::invalid("target temperature", "not a number"))
            }
            Self::Range { low, high } if !low.is_finite() || !high.is_finite() => {
                Err(CoreError::invalid("target temperature", "not a number"))
            }
            Self::Range { low, high } if high - low < MIN_RANGE_SPREAD => {
                Err(CoreError::invalid(
                    "target temperature",
                    format!(
                        "high ({high}) must be at least {MIN_RANGE_SPREAD} above low ({low})"
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Apply `f` to every value.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Single(value) => Self::Single(f(value)),
            Self::Range { low, high } => Self::Range {
                low: f(low),
                high: f(high),
            },
        }
    }

    /// Wire (Celsius) to the device's display scale.
    pub fn to_display(self, scale: Scale) -> Self {
        self.map(|c| scale.to_display(c))
    }

    /// Display scale to wire (Celsius).
    pub fn to_wire(self, scale: Scale) -> Self {
        self.map(|v| scale.to_wire(v))
    }
}

impl FromStr for TargetTemperature {
    type Err = CoreError;

    /// `"70"` is a single value, `"65 75"` a range. Quotes around the
    /// input are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches(|c| c == '"' || c == '\'');
        let parts: Vec<&str> = trimmed.split_whitespace().collect();

        match parts.as_slice() {
            [single] => Ok(Self::Single(parse_degrees(single)?)),
            [low, high] => Ok(Self::Range {
                low: parse_degrees(low)?,
                high: parse_degrees(high)?,
            }),
            _ => Err(CoreError::invalid(
                "target temperature",
                "expected a temperature or a \"low high\" pair",
            )),
        }
    }
}

fn parse_degrees(raw: &str) -> Result<f64, CoreError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::invalid("target temperature", format!("'{raw}' is not a number")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn mode_parses_case_insensitively_and_uppercases_on_wire() {
        assert_eq!("HEAT".parse::<ThermostatMode>().unwrap(), ThermostatMode::Heat);
        assert_eq!("range".parse::<ThermostatMode>().unwrap(), ThermostatMode::Range);
        assert_eq!(ThermostatMode::Cool.wire_value(), "COOL");
        assert!(matches!(
            "off".parse::<ThermostatMode>(),
            Err(CoreError::InvalidInput { .. })
        ));
    }

    #[test]
    fn modes_iterate_in_declaration_order() {
        let all: Vec<_> = ThermostatMode::iter().map(ThermostatMode::as_str).collect();
        assert_eq!(all, ["heat", "cool", "range"]);
    }

    #[test]
    fn fan_accepts_only_auto_and_on() {
        assert_eq!("auto".parse::<FanMode>().unwrap(), FanMode::Auto);
        assert_eq!("on".parse::<FanMode>().unwrap(), FanMode::On);
        for bad in ["off", "high", "", "AUTO"] {
            assert!(
                matches!(bad.parse::<FanMode>(), Err(CoreError::InvalidInput { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(FanMode::Auto.toggled(), FanMode::On);
    }

    #[test]
    fn target_parses_single_and_pair() {
        assert_eq!(
            "70".parse::<TargetTemperature>().unwrap(),
            TargetTemperature::Single(70.0)
        );
        assert_eq!(
            " \"65 75\" ".parse::<TargetTemperature>().unwrap(),
            TargetTemperature::Range {
                low: 65.0,
                high: 75.0
            }
        );
    }

    #[test]
    fn target_rejects_malformed_input() {
        for bad in ["", "warm", "60 70 80", "60 x", "NaN", "inf"] {
            assert!(
                matches!(
                    bad.parse::<TargetTemperature>(),
                    Err(CoreError::InvalidInput { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn range_spread_boundary() {
        assert!(TargetTemperature::range(18.0, 21.0).is_ok());
        assert!(TargetTemperature::range(18.0, 20.9).is_err());
        assert!(TargetTemperature::range(21.0, 18.0).is_err());
        assert!(TargetTemperature::Single(-5.0).validate().is_ok());
    }

    #[test]
    fn conversion_applies_to_both_ends() {
        let range = TargetTemperature::Range {
            low: 20.0,
            high: 25.0,
        };
        match range.to_display(Scale::Fahrenheit) {
            TargetTemperature::Range { low, high } => {
                assert!((low - 68.0).abs() < 1e-9);
                assert!((high - 77.0).abs() < 1e-9);
            }
            TargetTemperature::Single(_) => panic!("range collapsed"),
        }
    }
}
