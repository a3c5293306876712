//! Cross-colony expansion site selection.
//!
//! Asks every colony able to sponsor an expansion for its best candidate and
//! keeps the single highest-scoring one.

use serde::{Deserialize, Serialize};

use colony_state::{Colony, Notifier, NotifyLevel, SiteId};

use crate::config::StrategistConfig;
use crate::context::WorldView;
use crate::scorer::{ExpansionCandidate, ExpansionScorer, ScoringContext};

/// The site chosen for the next expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionDecision {
    /// Site to claim
    pub site: SiteId,
    /// Adjusted score it won with
    pub score: f64,
    /// Colony whose cache produced the candidate
    pub sponsor: SiteId,
}

#[derive(Serialize)]
struct SponsoredCandidate<'a> {
    sponsor: &'a SiteId,
    #[serde(flatten)]
    candidate: ExpansionCandidate,
}

/// Picks the next expansion site across all colonies.
#[derive(Debug, Clone)]
pub struct ExpansionSelector {
    scorer: ExpansionScorer,
    required_tier: u8,
}

impl ExpansionSelector {
    /// Creates a new selector.
    pub fn new(scorer: ExpansionScorer, required_tier: u8) -> Self {
        Self {
            scorer,
            required_tier,
        }
    }

    /// Creates a selector from the strategist configuration.
    pub fn from_config(config: &StrategistConfig) -> Self {
        Self::new(
            ExpansionScorer::from_config(config),
            config.expansion.required_tier,
        )
    }

    /// Returns the scorer used for each colony.
    pub fn scorer(&self) -> &ExpansionScorer {
        &self.scorer
    }

    /// Colonies allowed to sponsor an expansion, in registry order.
    pub fn eligible_colonies<'a>(&self, view: WorldView<'a>) -> Vec<&'a Colony> {
        view.all_colonies()
            .iter()
            .filter(|colony| colony.can_sponsor_expansion(self.required_tier))
            .collect()
    }

    /// Chooses the next site to expand into, or `None` if nothing is viable.
    ///
    /// The highest adjusted score wins; on a tie the colony earlier in the
    /// registry keeps the pick.
    pub fn choose_next_site(
        &self,
        view: WorldView<'_>,
        notifier: &mut dyn Notifier,
    ) -> Option<ExpansionDecision> {
        let context = ScoringContext::gather(view);

        let candidates: Vec<SponsoredCandidate<'_>> = self
            .eligible_colonies(view)
            .into_iter()
            .filter_map(|colony| {
                self.scorer
                    .best_candidate_for(colony, &context, view)
                    .map(|candidate| SponsoredCandidate {
                        sponsor: &colony.home_site,
                        candidate,
                    })
            })
            .collect();

        match serde_json::to_string(&candidates) {
            Ok(json) => tracing::debug!("Expansion candidates: {}", json),
            Err(e) => tracing::debug!("Could not serialize expansion candidates: {}", e),
        }

        let mut best: Option<&SponsoredCandidate<'_>> = None;
        for entry in &candidates {
            let better = best.map_or(true, |b| {
                entry.candidate.adjusted_score > b.candidate.adjusted_score
            });
            if better {
                best = Some(entry);
            }
        }

        match best {
            Some(entry) => {
                let decision = ExpansionDecision {
                    site: entry.candidate.site.clone(),
                    score: entry.candidate.adjusted_score,
                    sponsor: entry.sponsor.clone(),
                };
                notifier.notify(
                    NotifyLevel::Info,
                    &format!(
                        "Next expansion chosen: {} with score {}",
                        decision.site, decision.score
                    ),
                );
                Some(decision)
            }
            None => {
                notifier.notify(NotifyLevel::Info, "No viable expansion sites found!");
                None
            }
        }
    }
}

impl Default for ExpansionSelector {
    fn default() -> Self {
        Self::from_config(&StrategistConfig::default())
    }
}
