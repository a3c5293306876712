//! Colony Records
//!
//! A colony is an owned site that may sponsor expansion into nearby sites.
//! Each colony carries the suitability cache written by the surveying process.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::SiteId;

/// Per-colony suitability cache, iterated in ascending site order.
pub type ExpansionCache = BTreeMap<SiteId, CacheEntry>;

/// One entry of a colony's suitability cache.
///
/// Persisted in the surveyor's compact form: a number is a score, `true`
/// marks a site awaiting evaluation and `false` a rejected site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCacheEntry", into = "RawCacheEntry")]
pub enum CacheEntry {
    /// Raw suitability score
    Scored(f64),
    /// Not yet evaluated
    Pending,
    /// Evaluated and rejected
    Rejected,
}

impl CacheEntry {
    /// Returns the raw score, if this entry holds one.
    pub fn score(self) -> Option<f64> {
        match self {
            CacheEntry::Scored(score) => Some(score),
            CacheEntry::Pending | CacheEntry::Rejected => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCacheEntry {
    Score(f64),
    Flag(bool),
}

impl From<RawCacheEntry> for CacheEntry {
    fn from(raw: RawCacheEntry) -> Self {
        match raw {
            RawCacheEntry::Score(score) => CacheEntry::Scored(score),
            RawCacheEntry::Flag(true) => CacheEntry::Pending,
            RawCacheEntry::Flag(false) => CacheEntry::Rejected,
        }
    }
}

impl From<CacheEntry> for RawCacheEntry {
    fn from(entry: CacheEntry) -> Self {
        match entry {
            CacheEntry::Scored(score) => RawCacheEntry::Score(score),
            CacheEntry::Pending => RawCacheEntry::Flag(true),
            CacheEntry::Rejected => RawCacheEntry::Flag(false),
        }
    }
}

/// An owned site acting as a potential expansion sponsor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colony {
    /// The site this colony occupies
    pub home_site: SiteId,
    /// Capability level; gates expansion sponsorship
    pub tier: u8,
    /// Candidate sites scored by the surveyor
    #[serde(default)]
    pub expansion_cache: ExpansionCache,
    /// Sites targeted by expansion operations this colony already sponsors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_expansion_operations: Vec<SiteId>,
}

impl Colony {
    /// Creates a colony with an empty cache.
    pub fn new(home_site: impl Into<SiteId>, tier: u8) -> Self {
        Self {
            home_site: home_site.into(),
            tier,
            expansion_cache: ExpansionCache::new(),
            active_expansion_operations: Vec::new(),
        }
    }

    /// Adds a cache entry, builder style.
    pub fn with_entry(mut self, site: impl Into<SiteId>, entry: CacheEntry) -> Self {
        self.expansion_cache.insert(site.into(), entry);
        self
    }

    /// Adds a scored candidate, builder style.
    pub fn with_candidate(self, site: impl Into<SiteId>, score: f64) -> Self {
        self.with_entry(site, CacheEntry::Scored(score))
    }

    /// Returns true if an expansion operation sponsored by this colony is underway.
    pub fn has_active_expansion(&self) -> bool {
        !self.active_expansion_operations.is_empty()
    }

    /// Returns true if this colony may sponsor a new expansion.
    pub fn can_sponsor_expansion(&self, required_tier: u8) -> bool {
        self.tier >= required_tier && !self.has_active_expansion()
    }

    /// Iterates scored cache entries in site order, skipping sentinels.
    pub fn scored_candidates(&self) -> impl Iterator<Item = (&SiteId, f64)> {
        self.expansion_cache
            .iter()
            .filter_map(|(site, entry)| entry.score().map(|score| (site, score)))
    }
}
