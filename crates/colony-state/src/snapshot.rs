//! World Snapshot
//!
//! An in-memory picture of the world: scouted sites, owned colonies and the
//! network counters. Loaded from JSON and exposed through the collaborator
//! traits so the strategist can run against recorded or generated worlds.
//!
//! The site graph is bounded by the snapshot: range queries only return sites
//! the snapshot knows about.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

use crate::coord::{CoordError, RoomCoord};
use crate::services::{AutonomyLevel, ColonyRegistry, LookupError, PathPlanner, SiteGraph, WorldState};
use crate::{Colony, Position, ResourceType, SiteId, SiteMetadata};

/// Tile used as the anchor position inside a site.
pub const SITE_CENTER: u8 = 25;

/// Errors raised when loading or validating a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid site name: {0}")]
    Coord(#[from] CoordError),
    #[error("colony home site {0} is not a known site")]
    UnknownHomeSite(SiteId),
    #[error("site {0} is home to more than one colony")]
    DuplicateColony(SiteId),
}

/// Everything recorded about one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default)]
    pub hostile: bool,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Default for SiteRecord {
    fn default() -> Self {
        Self {
            resource_type: None,
            hostile: false,
            available: true,
        }
    }
}

impl SiteRecord {
    pub fn with_resource(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    pub fn mark_hostile(mut self) -> Self {
        self.hostile = true;
        self
    }

    pub fn mark_unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn metadata(&self) -> SiteMetadata {
        SiteMetadata {
            resource_type: self.resource_type,
            hostile: self.hostile,
        }
    }
}

/// Complete world state at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken at
    #[serde(default)]
    pub tick: u64,
    /// Platform (shard) name
    pub platform_id: String,
    /// Autonomy mode chosen by the operator
    #[serde(default)]
    pub autonomy: AutonomyLevel,
    /// Maximum number of owned sites
    pub capacity_limit: usize,
    /// Known sites keyed by name
    #[serde(default)]
    pub sites: BTreeMap<SiteId, SiteRecord>,
    /// Owned colonies in registry order
    #[serde(default)]
    pub colonies: Vec<Colony>,
}

impl WorldSnapshot {
    /// Creates an empty snapshot.
    pub fn new(platform_id: impl Into<String>, capacity_limit: usize) -> Self {
        Self {
            tick: 0,
            platform_id: platform_id.into(),
            autonomy: AutonomyLevel::Automatic,
            capacity_limit,
            sites: BTreeMap::new(),
            colonies: Vec::new(),
        }
    }

    /// Loads and validates a snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses and validates a snapshot from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Serializes the snapshot as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the snapshot to a JSON file.
    pub fn write_to(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Checks that site names decode and every colony sits on a known site.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for site in self.sites.keys() {
            RoomCoord::from_site(site)?;
        }
        let mut homes = BTreeSet::new();
        for colony in &self.colonies {
            if !self.sites.contains_key(&colony.home_site) {
                return Err(SnapshotError::UnknownHomeSite(colony.home_site.clone()));
            }
            if !homes.insert(&colony.home_site) {
                return Err(SnapshotError::DuplicateColony(colony.home_site.clone()));
            }
        }
        Ok(())
    }

    /// Adds or replaces a site record, builder style.
    pub fn with_site(mut self, site: impl Into<SiteId>, record: SiteRecord) -> Self {
        self.sites.insert(site.into(), record);
        self
    }

    /// Adds a colony, builder style.
    pub fn with_colony(mut self, colony: Colony) -> Self {
        self.colonies.push(colony);
        self
    }

    /// Sets the autonomy mode, builder style.
    pub fn with_autonomy(mut self, autonomy: AutonomyLevel) -> Self {
        self.autonomy = autonomy;
        self
    }

    /// Fills every cell of the rectangle between two corners with default sites.
    pub fn fill_grid(mut self, corner_a: RoomCoord, corner_b: RoomCoord) -> Self {
        for y in corner_a.y.min(corner_b.y)..=corner_a.y.max(corner_b.y) {
            for x in corner_a.x.min(corner_b.x)..=corner_a.x.max(corner_b.x) {
                self.sites
                    .entry(RoomCoord::new(x, y).to_site_id())
                    .or_default();
            }
        }
        self
    }

    /// Looks up a site record.
    pub fn site(&self, site: &SiteId) -> Option<&SiteRecord> {
        self.sites.get(site)
    }

    /// Mutable access to a site record.
    pub fn site_mut(&mut self, site: &SiteId) -> Option<&mut SiteRecord> {
        self.sites.get_mut(site)
    }

    /// Finds the colony living in a site.
    pub fn colony(&self, home_site: &SiteId) -> Option<&Colony> {
        self.colonies.iter().find(|c| &c.home_site == home_site)
    }

    /// Mutable access to the colony living in a site.
    pub fn colony_mut(&mut self, home_site: &SiteId) -> Option<&mut Colony> {
        self.colonies.iter_mut().find(|c| &c.home_site == home_site)
    }

    /// Returns true if some colony lives in the site.
    pub fn is_owned(&self, site: &SiteId) -> bool {
        self.colony(site).is_some()
    }

    fn record(&self, site: &SiteId) -> Result<&SiteRecord, LookupError> {
        self.sites
            .get(site)
            .ok_or_else(|| LookupError::UnknownSite(site.clone()))
    }
}

impl SiteGraph for WorldSnapshot {
    fn sites_in_range(&self, site: &SiteId, range: u32) -> Result<BTreeSet<SiteId>, LookupError> {
        self.record(site)?;
        let center =
            RoomCoord::from_site(site).map_err(|_| LookupError::UnknownSite(site.clone()))?;
        Ok(center
            .within_range(range)
            .map(RoomCoord::to_site_id)
            .filter(|id| self.sites.contains_key(id))
            .collect())
    }
}

impl WorldState for WorldSnapshot {
    fn site_metadata(&self, site: &SiteId) -> Result<SiteMetadata, LookupError> {
        self.record(site).map(SiteRecord::metadata)
    }

    fn is_site_available(&self, site: &SiteId) -> Result<bool, LookupError> {
        self.record(site).map(|record| record.available)
    }

    fn owned_site_count(&self) -> usize {
        self.colonies.len()
    }

    fn expansion_capacity_limit(&self) -> usize {
        self.capacity_limit
    }

    fn platform_id(&self) -> &str {
        &self.platform_id
    }

    fn autonomy_level(&self) -> AutonomyLevel {
        self.autonomy
    }
}

impl ColonyRegistry for WorldSnapshot {
    fn all_colonies(&self) -> &[Colony] {
        &self.colonies
    }
}

impl PathPlanner for WorldSnapshot {
    fn resolve_anchor_position(&self, site: &SiteId) -> Result<Position, LookupError> {
        self.record(site)?;
        Ok(Position::new(site.clone(), SITE_CENTER, SITE_CENTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_world() -> WorldSnapshot {
        WorldSnapshot::new("shard0", 4)
            .fill_grid(RoomCoord::new(0, 0), RoomCoord::new(4, 4))
            .with_colony(Colony::new("E0S0", 4))
    }

    #[test]
    fn test_fill_grid_covers_rectangle() {
        let world = small_world();
        assert_eq!(world.sites.len(), 25);
        assert!(world.site(&SiteId::new("E4S4")).is_some());
        assert!(world.site(&SiteId::new("E5S4")).is_none());
    }

    #[test]
    fn test_range_query_is_bounded_by_known_sites() {
        let world = small_world();

        let corner = world.sites_in_range(&SiteId::new("E0S0"), 1).unwrap();
        let names: Vec<_> = corner.iter().map(SiteId::as_str).collect();
        assert_eq!(names, vec!["E0S0", "E0S1", "E1S0", "E1S1"]);

        let middle = world.sites_in_range(&SiteId::new("E2S2"), 2).unwrap();
        assert_eq!(middle.len(), 25);

        let itself = world.sites_in_range(&SiteId::new("E2S2"), 0).unwrap();
        assert_eq!(itself.len(), 1);
        assert!(itself.contains(&SiteId::new("E2S2")));
    }

    #[test]
    fn test_unknown_site_lookups_fail() {
        let world = small_world();
        let unknown = SiteId::new("W9N9");

        assert_eq!(
            world.sites_in_range(&unknown, 1),
            Err(LookupError::UnknownSite(unknown.clone()))
        );
        assert!(world.site_metadata(&unknown).is_err());
        assert!(world.is_site_available(&unknown).is_err());
        assert!(world.resolve_anchor_position(&unknown).is_err());
    }

    #[test]
    fn test_counters_and_metadata() {
        let mut world = small_world();
        if let Some(record) = world.site_mut(&SiteId::new("E3S3")) {
            *record = SiteRecord::default()
                .with_resource(ResourceType::Catalyst)
                .mark_hostile();
        }

        assert_eq!(world.owned_site_count(), 1);
        assert_eq!(world.expansion_capacity_limit(), 4);
        assert_eq!(world.platform_id(), "shard0");
        assert_eq!(world.autonomy_level(), AutonomyLevel::Automatic);

        let meta = world.site_metadata(&SiteId::new("E3S3")).unwrap();
        assert_eq!(meta.resource_type, Some(ResourceType::Catalyst));
        assert!(meta.hostile);
    }

    #[test]
    fn test_anchor_is_site_center() {
        let world = small_world();
        let pos = world.resolve_anchor_position(&SiteId::new("E2S1")).unwrap();
        assert_eq!(pos, Position::new(SiteId::new("E2S1"), 25, 25));
    }

    #[test]
    fn test_from_json_validates_home_sites() {
        let json = r#"{
            "platform_id": "shard0",
            "capacity_limit": 2,
            "sites": {"W1N1": {}},
            "colonies": [{"home_site": "W5N5", "tier": 3}]
        }"#;
        assert!(matches!(
            WorldSnapshot::from_json(json),
            Err(SnapshotError::UnknownHomeSite(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_bad_site_names() {
        let json = r#"{"platform_id": "shard0", "capacity_limit": 2, "sites": {"nowhere": {}}}"#;
        assert!(matches!(
            WorldSnapshot::from_json(json),
            Err(SnapshotError::Coord(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_non_canonical_and_oversized_names() {
        for name in ["E00S0", "E2147483647S0", "W2147483647N0"] {
            let json = format!(
                r#"{{"platform_id": "shard0", "capacity_limit": 2, "sites": {{"{name}": {{}}}}}}"#
            );
            assert!(
                matches!(WorldSnapshot::from_json(&json), Err(SnapshotError::Coord(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_json_rejects_duplicate_colonies() {
        let json = r#"{
            "platform_id": "shard0",
            "capacity_limit": 2,
            "sites": {"W1N1": {}},
            "colonies": [{"home_site": "W1N1", "tier": 3}, {"home_site": "W1N1", "tier": 1}]
        }"#;
        assert!(matches!(
            WorldSnapshot::from_json(json),
            Err(SnapshotError::DuplicateColony(_))
        ));
    }

    #[test]
    fn test_site_record_defaults_to_available() {
        let record: SiteRecord = serde_json::from_str("{}").unwrap();
        assert!(record.available);
        assert!(!record.hostile);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world.json");

        let world = small_world().with_site("E1S1", SiteRecord::default().mark_unavailable());
        world.write_to(&path).unwrap();

        let loaded = WorldSnapshot::from_file(&path).unwrap();
        assert_eq!(loaded, world);
        assert!(!loaded.is_site_available(&SiteId::new("E1S1")).unwrap());
    }
}
