//! SensorId - fixed radar positions on the vehicle
//!
//! The constellation has a fixed cardinality, so the id doubles as an index
//! into per-sensor state arrays.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Radar position identifier.
///
/// `Undefined` is a real slot: decoders emit it for ids they cannot map, and
/// per-sensor state arrays reserve an entry for it.
///
/// # Examples
/// ```
/// use contracts::SensorId;
///
/// assert_eq!(SensorId::from_raw(1), SensorId::Front);
/// assert_eq!(SensorId::from_raw(42), SensorId::Undefined);
/// assert_eq!(SensorId::Rear.index(), 3);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SensorId {
    #[default]
    Undefined = 0,
    Front = 1,
    Right = 2,
    Rear = 3,
    Left = 4,
}

impl SensorId {
    /// Number of ids, `Undefined` included.
    pub const COUNT: usize = 5;

    /// Every id in index order.
    pub const ALL: [SensorId; 5] = [
        SensorId::Undefined,
        SensorId::Front,
        SensorId::Right,
        SensorId::Rear,
        SensorId::Left,
    ];

    /// Physically mounted radars.
    pub const REAL: [SensorId; 4] = [
        SensorId::Front,
        SensorId::Right,
        SensorId::Rear,
        SensorId::Left,
    ];

    /// Index into fixed-size per-sensor arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Map a decoder-native id. Unknown values collapse to `Undefined`.
    #[inline]
    pub fn from_raw(raw: u8) -> Self {
        Self::from_index(raw as usize).unwrap_or(SensorId::Undefined)
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Decoder-native id, inverse of [`SensorId::from_raw`].
    #[inline]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_real(self) -> bool {
        self != SensorId::Undefined
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SensorId::Undefined => "undefined",
            SensorId::Front => "front",
            SensorId::Right => "right",
            SensorId::Rear => "rear",
            SensorId::Left => "left",
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sensor id '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_position() {
        for (i, id) in SensorId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(SensorId::from_index(i), Some(*id));
        }
        assert_eq!(SensorId::from_index(SensorId::COUNT), None);
    }

    #[test]
    fn test_raw_round_trip() {
        for id in SensorId::ALL {
            assert_eq!(SensorId::from_raw(id.raw()), id);
        }
        assert_eq!(SensorId::from_raw(200), SensorId::Undefined);
    }

    #[test]
    fn test_real_excludes_undefined() {
        assert!(!SensorId::REAL.contains(&SensorId::Undefined));
        assert!(SensorId::REAL.iter().all(|id| id.is_real()));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Rear".parse::<SensorId>(), Ok(SensorId::Rear));
        assert!("roof".parse::<SensorId>().is_err());
        assert_eq!(SensorId::Left.to_string(), "left");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&SensorId::Front).unwrap();
        assert_eq!(json, "\"front\"");

        let parsed: SensorId = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(parsed, SensorId::Right);
    }
}
