//! Candidate scoring for expansion sites.
//!
//! Takes a colony's cached raw suitability scores and turns them into
//! adjusted scores: sites too close to an existing colony or next to hostile
//! territory are thrown out, sites just outside the exclusion zone are
//! penalised, and new minerals earn a bonus.

use serde::Serialize;
use std::collections::BTreeSet;

use colony_state::{Colony, LookupError, ResourceType, SiteId};

use crate::config::{ScoringWeights, StrategistConfig, MAX_EXPANSION_DISTANCE};
use crate::context::WorldView;

/// Best viable candidate for one colony.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionCandidate {
    pub site: SiteId,
    pub adjusted_score: f64,
}

/// Why a candidate was thrown out.
#[derive(Debug, Clone, PartialEq)]
pub enum Exclusion {
    /// A colony home site lies inside the exclusion zone
    TooClose { colony: SiteId },
    /// A site within range 1 is flagged hostile
    HostileNeighbor { site: SiteId },
    /// A collaborator did not recognise a site
    Lookup(LookupError),
}

impl From<LookupError> for Exclusion {
    fn from(e: LookupError) -> Self {
        Exclusion::Lookup(e)
    }
}

/// Network-wide facts shared by every colony's scoring pass.
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    /// Home sites of all colonies
    pub home_sites: BTreeSet<SiteId>,
    /// Minerals already owned by some colony
    pub owned_resources: BTreeSet<ResourceType>,
}

impl ScoringContext {
    /// Collects home sites and owned minerals from the colony registry.
    pub fn gather(view: WorldView<'_>) -> Self {
        let mut context = Self::default();
        for colony in view.all_colonies() {
            context.home_sites.insert(colony.home_site.clone());
            match view.world.site_metadata(&colony.home_site) {
                Ok(meta) => context.owned_resources.extend(meta.resource_type),
                Err(e) => tracing::warn!("No metadata for colony {}: {}", colony.home_site, e),
            }
        }
        context
    }

    /// First colony home site among `sites`.
    fn first_home_in<'s>(&self, sites: &'s BTreeSet<SiteId>) -> Option<&'s SiteId> {
        sites.iter().find(|site| self.home_sites.contains(*site))
    }
}

/// Scores expansion candidates.
#[derive(Debug, Clone)]
pub struct ExpansionScorer {
    /// Score adjustments
    weights: ScoringWeights,
    /// Radius of the exclusion zone around each colony
    min_expansion_distance: u32,
}

impl ExpansionScorer {
    /// Creates a new scorer.
    ///
    /// Weights are taken as given; negative values are allowed and widen the
    /// pruning bound accordingly. Distances above [`MAX_EXPANSION_DISTANCE`]
    /// are clamped.
    pub fn new(weights: ScoringWeights, min_expansion_distance: u32) -> Self {
        if min_expansion_distance > MAX_EXPANSION_DISTANCE {
            tracing::warn!(
                "Clamping min_expansion_distance {} to {}",
                min_expansion_distance,
                MAX_EXPANSION_DISTANCE
            );
        }
        Self {
            weights,
            min_expansion_distance: min_expansion_distance.min(MAX_EXPANSION_DISTANCE),
        }
    }

    /// Creates a scorer from the strategist configuration.
    pub fn from_config(config: &StrategistConfig) -> Self {
        Self::new(
            config.scoring.clone(),
            config.expansion.min_expansion_distance,
        )
    }

    /// Returns a reference to the weights.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Returns the exclusion radius.
    pub fn min_expansion_distance(&self) -> u32 {
        self.min_expansion_distance
    }

    /// Applies exclusions, penalties and bonuses to one raw score.
    ///
    /// Does not consult site availability.
    pub fn adjusted_score(
        &self,
        site: &SiteId,
        raw_score: f64,
        context: &ScoringContext,
        view: WorldView<'_>,
    ) -> Result<f64, Exclusion> {
        let mut score = raw_score;

        let exclusion_zone = view.graph.sites_in_range(site, self.min_expansion_distance)?;
        if let Some(home) = context.first_home_in(&exclusion_zone) {
            return Err(Exclusion::TooClose {
                colony: home.clone(),
            });
        }

        let buffer_ring = view
            .graph
            .sites_in_range(site, self.min_expansion_distance.saturating_add(1))?;
        if context.first_home_in(&buffer_ring).is_some() {
            score -= self.weights.too_close_penalty;
        }

        for neighbor in view.graph.sites_in_range(site, 1)? {
            if view.world.site_metadata(&neighbor)?.hostile {
                return Err(Exclusion::HostileNeighbor { site: neighbor });
            }
        }

        if let Some(resource) = view.world.site_metadata(site)?.resource_type {
            if !context.owned_resources.contains(&resource) {
                score += self.weights.unowned_mineral_bonus;
            }
            if resource.is_catalyst() {
                score += self.weights.catalyst_bonus;
            }
        }

        Ok(score)
    }

    /// Finds the best claimable site in a colony's cache.
    ///
    /// Entries are visited in site order and a later candidate must score
    /// strictly higher to displace an earlier one.
    pub fn best_candidate_for(
        &self,
        colony: &Colony,
        context: &ScoringContext,
        view: WorldView<'_>,
    ) -> Option<ExpansionCandidate> {
        let max_bonus = self.weights.max_possible_bonus();
        let mut best: Option<ExpansionCandidate> = None;
        let mut best_score = f64::NEG_INFINITY;

        for (site, raw_score) in colony.scored_candidates() {
            // Skip candidates that cannot beat the current best even with every bonus
            if raw_score + max_bonus <= best_score {
                continue;
            }

            let score = match self.adjusted_score(site, raw_score, context, view) {
                Ok(score) => score,
                Err(Exclusion::Lookup(e)) => {
                    tracing::warn!("Skipping {} for {}: {}", site, colony.home_site, e);
                    continue;
                }
                Err(reason) => {
                    tracing::debug!("Excluded {} for {}: {:?}", site, colony.home_site, reason);
                    continue;
                }
            };

            if score > best_score && self.is_available(site, view) {
                best_score = score;
                best = Some(ExpansionCandidate {
                    site: site.clone(),
                    adjusted_score: score,
                });
            }
        }

        best
    }

    fn is_available(&self, site: &SiteId, view: WorldView<'_>) -> bool {
        match view.world.is_site_available(site) {
            Ok(available) => available,
            Err(e) => {
                tracing::warn!("Availability unknown for {}: {}", site, e);
                false
            }
        }
    }
}

impl Default for ExpansionScorer {
    fn default() -> Self {
        Self::from_config(&StrategistConfig::default())
    }
}
