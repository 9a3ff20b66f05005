//! Celsius/Fahrenheit conversion.
//!
//! The wire format is always Celsius. A device's reported scale decides
//! what callers see. No rounding happens here.

use std::str::FromStr;

use crate::error::CoreError;

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) / 1.8
}

/// Temperature unit a device displays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Scale {
    #[strum(serialize = "C")]
    Celsius,
    #[strum(serialize = "F")]
    Fahrenheit,
}

impl Scale {
    /// Wire (Celsius) to display.
    pub fn to_display(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => to_fahrenheit(celsius),
        }
    }

    /// Display to wire (Celsius).
    pub fn to_wire(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => to_celsius(value),
        }
    }
}

impl FromStr for Scale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" | "c" => Ok(Self::Celsius),
            "F" | "f" => Ok(Self::Fahrenheit),
            other => Err(CoreError::invalid(
                "temperature scale",
                format!("expected 'C' or 'F', got '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn known_points() {
        assert!((to_fahrenheit(0.0) - 32.0).abs() < EPS);
        assert!((to_fahrenheit(100.0) - 212.0).abs() < EPS);
        assert!((to_fahrenheit(20.0) - 68.0).abs() < EPS);
        assert!((to_celsius(-40.0) + 40.0).abs() < EPS);
    }

    #[test]
    fn celsius_survives_round_trip() {
        let mut c = -50.0;
        while c <= 60.0 {
            assert!((to_celsius(to_fahrenheit(c)) - c).abs() < EPS, "{c}");
            c += 0.25;
        }
    }

    #[test]
    fn scale_conversion_is_identity_for_celsius() {
        assert!((Scale::Celsius.to_display(21.5) - 21.5).abs() < EPS);
        assert!((Scale::Celsius.to_wire(21.5) - 21.5).abs() < EPS);
        assert!((Scale::Fahrenheit.to_wire(70.0) - 21.111_111_111).abs() < 1e-6);
    }

    #[test]
    fn parse_scale() {
        assert_eq!("F".parse::<Scale>().unwrap(), Scale::Fahrenheit);
        assert_eq!("c".parse::<Scale>().unwrap(), Scale::Celsius);
        assert!(matches!("K".parse::<Scale>(), Err(CoreError::InvalidInput { .. })));
        assert_eq!(Scale::Fahrenheit.to_string(), "F");
    }
}
