//! Room Coordinates
//!
//! Site identifiers encode a position on the world grid as a room name made of
//! a horizontal half (`E`/`W` plus a number) and a vertical half (`N`/`S` plus
//! a number). `E0` and `W0` are adjacent columns, as are `S0` and `N0`.
//!
//! # Example
//!
//! ```
//! use colony_state::RoomCoord;
//!
//! let a: RoomCoord = "W1N1".parse().unwrap();
//! let b: RoomCoord = "E0S0".parse().unwrap();
//! assert_eq!(a.distance(b), 2);
//! assert_eq!(b.to_string(), "E0S0");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::SiteId;

/// Errors produced when a room name cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// The name does not follow the `[EW]<n>[NS]<n>` shape
    #[error("invalid room name: {0:?}")]
    InvalidRoomName(String),
}

/// Largest number accepted in either half of a room name.
pub const MAX_ROOM_INDEX: i32 = 10_000;

/// Grid position of a room.
///
/// `x` grows eastwards and `y` grows southwards. West and north rooms map to
/// negative values, so `W0` is `x = -1` and `N0` is `y = -1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCoord {
    pub x: i32,
    pub y: i32,
}

impl RoomCoord {
    /// Creates a coordinate from raw grid values.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Decodes the coordinate embedded in a site identifier.
    pub fn from_site(site: &SiteId) -> Result<Self, CoordError> {
        site.as_str().parse()
    }

    /// Encodes this coordinate as a site identifier.
    pub fn to_site_id(self) -> SiteId {
        SiteId::new(self.to_string())
    }

    /// Linear range between two rooms (diagonal steps count as one).
    pub fn distance(self, other: RoomCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// All rooms within `range` of this one, including itself.
    ///
    /// Yields coordinates row by row, north to south, west to east. The
    /// square is clipped at the edges of the `i32` grid.
    pub fn within_range(self, range: u32) -> impl Iterator<Item = RoomCoord> {
        let r = i32::try_from(range).unwrap_or(i32::MAX);
        (self.y.saturating_sub(r)..=self.y.saturating_add(r)).flat_map(move |y| {
            (self.x.saturating_sub(r)..=self.x.saturating_add(r)).map(move |x| RoomCoord::new(x, y))
        })
    }
}

impl fmt::Display for RoomCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.x >= 0 {
            write!(f, "E{}", self.x)?;
        } else {
            write!(f, "W{}", -(self.x + 1))?;
        }
        if self.y >= 0 {
            write!(f, "S{}", self.y)
        } else {
            write!(f, "N{}", -(self.y + 1))
        }
    }
}

impl FromStr for RoomCoord {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordError::InvalidRoomName(s.to_string());

        let mut chars = s.chars();
        let horizontal = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();
        let split = rest.find(|c| c == 'N' || c == 'S').ok_or_else(invalid)?;
        let (h_digits, v_part) = rest.split_at(split);
        let vertical = v_part.chars().next().ok_or_else(invalid)?;
        let v_digits = &v_part[vertical.len_utf8()..];

        let h = parse_axis(h_digits).ok_or_else(invalid)?;
        let v = parse_axis(v_digits).ok_or_else(invalid)?;

        let x = match horizontal {
            'E' => h,
            'W' => -h - 1,
            _ => return Err(invalid()),
        };
        let y = match vertical {
            'S' => v,
            _ => -v - 1,
        };
        Ok(Self { x, y })
    }
}

/// Parses one half of a room name. Only the canonical spelling is accepted,
/// so every site has exactly one name.
fn parse_axis(digits: &str) -> Option<i32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok().filter(|value| *value <= MAX_ROOM_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quadrants() {
        assert_eq!("E0S0".parse::<RoomCoord>().unwrap(), RoomCoord::new(0, 0));
        assert_eq!("W0N0".parse::<RoomCoord>().unwrap(), RoomCoord::new(-1, -1));
        assert_eq!("E12N3".parse::<RoomCoord>().unwrap(), RoomCoord::new(12, -4));
        assert_eq!("W5S7".parse::<RoomCoord>().unwrap(), RoomCoord::new(-6, 7));
    }

    #[test]
    fn test_display_matches_parse() {
        for name in ["E0S0", "W0N0", "W10N25", "E3S14"] {
            let coord: RoomCoord = name.parse().unwrap();
            assert_eq!(coord.to_string(), name);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for name in ["", "W", "WN1", "W1N", "X1N1", "W1X1", "W-1N1", "w1n1", "W1N1a"] {
            assert!(name.parse::<RoomCoord>().is_err(), "{name:?} should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_leading_zeros() {
        for name in ["E00S0", "W01N1", "E1S007"] {
            assert!(name.parse::<RoomCoord>().is_err(), "{name:?} should not parse");
        }
        assert_eq!("E10S0".parse::<RoomCoord>().unwrap(), RoomCoord::new(10, 0));
    }

    #[test]
    fn test_parse_rejects_out_of_world_indices() {
        assert!("E2147483647S0".parse::<RoomCoord>().is_err());
        assert!("W2147483647N0".parse::<RoomCoord>().is_err());
        assert!("E10001S0".parse::<RoomCoord>().is_err());

        let edge: RoomCoord = "W10000N10000".parse().unwrap();
        assert_eq!(edge.to_string(), "W10000N10000");
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let corner = RoomCoord::new(i32::MAX, i32::MIN);
        assert_eq!(corner.within_range(1).count(), 4);
        assert_eq!(RoomCoord::new(i32::MIN, 0).to_string(), "W2147483647S0");
        assert_eq!(RoomCoord::new(0, 0).within_range(u32::MAX).take(3).count(), 3);
    }

    #[test]
    fn test_distance_is_chebyshev_across_origin() {
        let w0 = RoomCoord::new(-1, 0);
        let e0 = RoomCoord::new(0, 0);
        assert_eq!(w0.distance(e0), 1);

        let a: RoomCoord = "W2N2".parse().unwrap();
        let b: RoomCoord = "E1S0".parse().unwrap();
        assert_eq!(a.distance(b), 4);
    }

    #[test]
    fn test_within_range_counts() {
        let center = RoomCoord::new(3, -2);
        assert_eq!(center.within_range(0).collect::<Vec<_>>(), vec![center]);
        assert_eq!(center.within_range(1).count(), 9);
        assert_eq!(center.within_range(2).count(), 25);
        assert!(center.within_range(2).all(|c| c.distance(center) <= 2));
    }

    #[test]
    fn test_site_id_conversion() {
        let site = SiteId::new("W7N4");
        let coord = RoomCoord::from_site(&site).unwrap();
        assert_eq!(coord.to_site_id(), site);
    }
}
