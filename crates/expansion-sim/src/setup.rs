//! World Setup
//!
//! Generates a seeded square map and plays the part of the surveying process
//! that fills each colony's suitability cache.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use colony_state::{
    AutonomyLevel, CacheEntry, Colony, ResourceType, RoomCoord, SiteGraph, SiteId, SiteRecord,
    WorldSnapshot,
};

/// Sites further than this from a colony are not surveyed.
pub const SURVEY_RANGE: u32 = 5;

/// Chance a site has a mineral deposit
const MINERAL_CHANCE: f64 = 0.7;
/// Chance a site is flagged hostile
const HOSTILE_CHANCE: f64 = 0.06;
/// Chance a site cannot be claimed
const UNAVAILABLE_CHANCE: f64 = 0.04;
/// Chance a surveyed site is still awaiting evaluation
const PENDING_CHANCE: f64 = 0.1;
/// Upper bound of raw suitability scores
const MAX_RAW_SCORE: f64 = 250.0;

/// Parameters for a generated world.
#[derive(Debug, Clone)]
pub struct WorldParams {
    /// Map spans `-radius..=radius` on both axes
    pub radius: i32,
    pub platform_id: String,
    pub capacity_limit: usize,
    pub autonomy: AutonomyLevel,
    /// Tier of the starting colony
    pub starting_tier: u8,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            radius: 8,
            platform_id: "shard0".to_string(),
            capacity_limit: 5,
            autonomy: AutonomyLevel::Automatic,
            starting_tier: 3,
        }
    }
}

/// Creates a map with one colony at the origin and surveys it.
pub fn create_world(params: &WorldParams, rng: &mut SmallRng) -> WorldSnapshot {
    let r = params.radius;
    let mut world = WorldSnapshot::new(params.platform_id.clone(), params.capacity_limit)
        .with_autonomy(params.autonomy)
        .fill_grid(RoomCoord::new(-r, -r), RoomCoord::new(r, r));

    let home = RoomCoord::new(0, 0).to_site_id();
    for (site, record) in world.sites.iter_mut() {
        *record = random_site(rng);
        // The starting site is always safe to live in
        if site == &home {
            record.hostile = false;
            record.available = true;
        }
    }

    world.colonies.push(Colony::new(home.clone(), params.starting_tier));
    survey_colony(&mut world, &home, rng);
    world
}

fn random_site(rng: &mut SmallRng) -> SiteRecord {
    let mut record = SiteRecord::default();
    if rng.gen_bool(MINERAL_CHANCE) {
        record.resource_type = ResourceType::ALL.choose(rng).copied();
    }
    record.hostile = rng.gen_bool(HOSTILE_CHANCE);
    record.available = !rng.gen_bool(UNAVAILABLE_CHANCE);
    record
}

/// Fills a colony's suitability cache with every unowned site in survey range.
///
/// Hostile sites are rejected outright; a few others are left pending.
pub fn survey_colony(world: &mut WorldSnapshot, home: &SiteId, rng: &mut SmallRng) {
    let nearby = match world.sites_in_range(home, SURVEY_RANGE) {
        Ok(nearby) => nearby,
        Err(e) => {
            tracing::warn!("Cannot survey around {}: {}", home, e);
            return;
        }
    };

    let mut cache = Vec::new();
    for site in nearby {
        if world.is_owned(&site) {
            continue;
        }
        let hostile = world.site(&site).is_some_and(|record| record.hostile);
        let entry = if hostile {
            CacheEntry::Rejected
        } else if rng.gen_bool(PENDING_CHANCE) {
            CacheEntry::Pending
        } else {
            CacheEntry::Scored(raw_score(rng))
        };
        cache.push((site, entry));
    }

    if let Some(colony) = world.colony_mut(home) {
        tracing::debug!("Surveyed {} sites around {}", cache.len(), home);
        colony.expansion_cache.extend(cache);
    }
}

/// Scores every pending entry of every colony.
pub fn resolve_pending(world: &mut WorldSnapshot, rng: &mut SmallRng) -> usize {
    let mut resolved = 0;
    for colony in &mut world.colonies {
        for entry in colony.expansion_cache.values_mut() {
            if *entry == CacheEntry::Pending {
                *entry = CacheEntry::Scored(raw_score(rng));
                resolved += 1;
            }
        }
    }
    resolved
}

fn raw_score(rng: &mut SmallRng) -> f64 {
    (rng.gen_range(0.0..MAX_RAW_SCORE) * 10.0).round() / 10.0
}
