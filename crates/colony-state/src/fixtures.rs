//! Sample data fixtures for testing.
//!
//! This module provides ready-made worlds for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // colony-state = { path = "../colony-state", features = ["test-fixtures"] }
//!
//! use colony_state::fixtures;
//!
//! let world = fixtures::sample_world();
//! ```

use crate::{Colony, RoomCoord, SiteId, WorldSnapshot};

/// Raw JSON of the sample world.
pub const SAMPLE_WORLD_JSON: &str = include_str!("../tests/fixtures/sample_world.json");

/// Returns the sample world.
///
/// Contains three colonies:
/// - `E1S1` (tier 5, owns H), the only eligible sponsor; its best candidate
///   is `E4S1` at 60 (raw 60, ring penalty, unowned oxygen bonus)
/// - `E8S8` (tier 2), below the sponsor tier; candidate `E5S8` at 500 raw
/// - `E12S1` (tier 6), already sponsoring an expansion into `E12S4`
///
/// `E1S5` sits next to the hostile `E2S6`, `E3S1` is inside the exclusion
/// zone of `E1S1`, and `E6S2` (catalyst) is not available for claiming.
pub fn sample_world() -> WorldSnapshot {
    WorldSnapshot::from_json(SAMPLE_WORLD_JSON).expect("Failed to parse sample_world.json")
}

/// Returns the sample colony by home site.
pub fn sample_colony(home_site: &str) -> Option<Colony> {
    sample_world().colony(&SiteId::new(home_site)).cloned()
}

/// A fully surveyed square world with a single colony at its centre.
///
/// Every site in the square is known, none hostile, all available. The
/// colony's cache is empty; callers add the candidates they need.
pub fn open_square(radius: i32, tier: u8) -> WorldSnapshot {
    let center = RoomCoord::new(0, 0);
    WorldSnapshot::new("shard0", 10)
        .fill_grid(
            RoomCoord::new(-radius, -radius),
            RoomCoord::new(radius, radius),
        )
        .with_colony(Colony::new(center.to_site_id(), tier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheEntry;

    #[test]
    fn test_sample_world_loads() {
        let world = sample_world();

        assert_eq!(world.colonies.len(), 3);
        assert_eq!(world.sites.len(), 14);
        assert_eq!(world.capacity_limit, 5);
        assert_eq!(world.tick % 1000, 17);
    }

    #[test]
    fn test_sample_colony_cache() {
        let colony = sample_colony("E1S1").unwrap();

        assert_eq!(colony.tier, 5);
        assert_eq!(colony.expansion_cache.len(), 7);
        assert_eq!(
            colony.expansion_cache[&SiteId::new("E5S5")],
            CacheEntry::Pending
        );
        assert_eq!(colony.scored_candidates().count(), 5);
        assert!(sample_colony("E12S1").unwrap().has_active_expansion());
        assert!(sample_colony("W1N1").is_none());
    }

    #[test]
    fn test_open_square() {
        let world = open_square(3, 4);
        assert_eq!(world.sites.len(), 49);
        assert_eq!(world.colonies[0].home_site.as_str(), "E0S0");
    }
}
