//! Length units and page-size presets
//!
//! Geometry is stored in the document's current unit. Switching units goes
//! through millimeters and rounds to the target unit's precision, so repeated
//! round trips settle instead of drifting.

use crate::error::UpdateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Mm,
    Cm,
    In,
}

impl Unit {
    pub const ALL: [Unit; 3] = [Unit::Mm, Unit::Cm, Unit::In];

    pub fn mm_per_unit(self) -> f64 {
        match self {
            Unit::Mm => 1.0,
            Unit::Cm => 10.0,
            Unit::In => 25.4,
        }
    }

    /// Decimal places kept after a conversion into this unit
    pub fn precision(self) -> u32 {
        match self {
            Unit::Mm | Unit::Cm => 2,
            Unit::In => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(Unit::Mm),
            "cm" => Ok(Unit::Cm),
            "in" | "inch" | "\"" => Ok(Unit::In),
            other => Err(UpdateError::UnknownUnit(other.to_string())),
        }
    }
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Convert a length between units via millimeters
pub fn convert(value: f64, from: Unit, to: Unit) -> f64 {
    if from == to {
        return value;
    }
    round_to(value * from.mm_per_unit() / to.mm_per_unit(), to.precision())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    F4,
    Letter,
    Legal,
    Custom,
}

impl PageSize {
    /// Width and height in millimeters; `None` for custom sizes
    pub fn dimensions_mm(self) -> Option<(f64, f64)> {
        match self {
            PageSize::A4 => Some((210.0, 297.0)),
            PageSize::F4 => Some((215.0, 330.0)),
            PageSize::Letter => Some((215.9, 279.4)),
            PageSize::Legal => Some((215.9, 355.6)),
            PageSize::Custom => None,
        }
    }

    pub fn dimensions_in(self, unit: Unit) -> Option<(f64, f64)> {
        self.dimensions_mm()
            .map(|(w, h)| (convert(w, Unit::Mm, unit), convert(h, Unit::Mm, unit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_basic() {
        assert_eq!(convert(210.0, Unit::Mm, Unit::Cm), 21.0);
        assert_eq!(convert(25.4, Unit::Mm, Unit::In), 1.0);
        assert_eq!(convert(2.0, Unit::In, Unit::Cm), 5.08);
        assert_eq!(convert(12.5, Unit::Cm, Unit::Cm), 12.5);
    }

    #[test]
    fn test_convert_rounds_to_target_precision() {
        assert_eq!(convert(210.0, Unit::Mm, Unit::In), 8.268);
        assert_eq!(convert(1.0, Unit::Mm, Unit::Cm), 0.1);
        assert_eq!(convert(1.0, Unit::In, Unit::Mm), 25.4);
    }

    #[test]
    fn test_round_trip_settles_without_drift() {
        for unit in Unit::ALL {
            for start in [210.0, 297.0, 20.0, 215.9, 355.6, 3.3] {
                let once = convert(convert(start, Unit::Mm, unit), unit, Unit::Mm);
                assert!((once - start).abs() <= 0.02, "{} via {}", start, unit);

                let twice = convert(convert(once, Unit::Mm, unit), unit, Unit::Mm);
                assert_eq!(once, twice, "{} via {} drifted", start, unit);
            }
        }
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("MM".parse::<Unit>().unwrap(), Unit::Mm);
        assert_eq!(" in ".parse::<Unit>().unwrap(), Unit::In);
        assert!(matches!("pt".parse::<Unit>(), Err(UpdateError::UnknownUnit(_))));
    }

    #[test]
    fn test_page_presets() {
        assert_eq!(PageSize::F4.dimensions_mm(), Some((215.0, 330.0)));
        assert_eq!(PageSize::A4.dimensions_in(Unit::Cm), Some((21.0, 29.7)));
        assert_eq!(PageSize::Custom.dimensions_mm(), None);
    }
}
