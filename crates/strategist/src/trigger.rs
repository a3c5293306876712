//! Expansion cadence and capacity gating.
//!
//! Runs once per tick. On evaluation ticks, when the network is allowed to
//! act on its own and has room for another site, it picks a site and requests
//! an expansion operation for it.

use serde::{Deserialize, Serialize};

use colony_state::{AutonomyLevel, NotifyLevel, Position, PresenceScope, WorldState};

use crate::config::{CadenceConfig, CapacityConfig, StrategistConfig};
use crate::context::TickContext;
use crate::selector::{ExpansionDecision, ExpansionSelector};

/// Why an evaluation tick did not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Autonomy is not fully automatic
    NotAutomatic { autonomy: AutonomyLevel },
    /// Owned sites equal the capacity limit
    AtCapacity { owned: usize, limit: usize },
    /// The platform's own cap is reached
    PlatformCap {
        platform: String,
        owned: usize,
        cap: usize,
    },
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Not an evaluation tick
    Idle,
    /// Evaluation tick, but a gate blocked it
    Skipped(SkipReason),
    /// Evaluated, nothing viable
    NoCandidate,
    /// A site was chosen but no anchor position could be found in it
    AnchorUnresolved { decision: ExpansionDecision },
    /// A site was chosen and an operation requested
    Expanded {
        decision: ExpansionDecision,
        position: Position,
        /// False if an equivalent operation already existed
        created: bool,
    },
}

impl TickOutcome {
    /// Returns the chosen site, if any.
    pub fn decision(&self) -> Option<&ExpansionDecision> {
        match self {
            TickOutcome::AnchorUnresolved { decision } | TickOutcome::Expanded { decision, .. } => {
                Some(decision)
            }
            _ => None,
        }
    }

    /// Returns true if this tick created a new operation.
    pub fn created_operation(&self) -> bool {
        matches!(self, TickOutcome::Expanded { created: true, .. })
    }
}

/// Decides when to look for the next expansion.
#[derive(Debug, Clone)]
pub struct ExpansionTrigger {
    cadence: CadenceConfig,
    capacity: CapacityConfig,
    selector: ExpansionSelector,
}

impl ExpansionTrigger {
    /// Creates a new trigger.
    pub fn new(cadence: CadenceConfig, capacity: CapacityConfig, selector: ExpansionSelector) -> Self {
        Self {
            cadence,
            capacity,
            selector,
        }
    }

    /// Creates a trigger from the strategist configuration.
    pub fn from_config(config: &StrategistConfig) -> Self {
        Self::new(
            config.cadence.clone(),
            config.capacity.clone(),
            ExpansionSelector::from_config(config),
        )
    }

    /// Returns the selector invoked on evaluation ticks.
    pub fn selector(&self) -> &ExpansionSelector {
        &self.selector
    }

    /// Returns the gate that blocks expansion right now, if any.
    ///
    /// The primary limit is matched exactly: a network holding more sites than
    /// its limit is not blocked by it.
    pub fn capacity_block(&self, world: &dyn WorldState) -> Option<SkipReason> {
        let owned = world.owned_site_count();
        let limit = world.expansion_capacity_limit();
        if owned == limit {
            return Some(SkipReason::AtCapacity { owned, limit });
        }
        // TODO: replace the platform cap with a CPU-based limit once CPU usage is exposed
        if world.platform_id() == self.capacity.capped_platform
            && owned >= self.capacity.capped_platform_max_sites
        {
            return Some(SkipReason::PlatformCap {
                platform: self.capacity.capped_platform.clone(),
                owned,
                cap: self.capacity.capped_platform_max_sites,
            });
        }
        None
    }

    /// Runs the expansion check for one tick.
    pub fn on_tick(&self, tick: u64, ctx: &mut TickContext<'_>) -> TickOutcome {
        if !self.cadence.is_due(tick) {
            return TickOutcome::Idle;
        }

        let autonomy = ctx.view.world.autonomy_level();
        if autonomy != AutonomyLevel::Automatic {
            tracing::debug!("Tick {}: autonomy is {:?}, not expanding", tick, autonomy);
            return TickOutcome::Skipped(SkipReason::NotAutomatic { autonomy });
        }

        if let Some(reason) = self.capacity_block(ctx.view.world) {
            tracing::info!("Tick {}: expansion blocked: {:?}", tick, reason);
            return TickOutcome::Skipped(reason);
        }

        let decision = match self.selector.choose_next_site(ctx.view, &mut *ctx.notifier) {
            Some(decision) => decision,
            None => return TickOutcome::NoCandidate,
        };

        let position = match ctx.planner.resolve_anchor_position(&decision.site) {
            Ok(position) => position,
            Err(e) => {
                ctx.notifier.notify(
                    NotifyLevel::Alert,
                    &format!("Could not find a position in {}: {}", decision.site, e),
                );
                return TickOutcome::AnchorUnresolved { decision };
            }
        };

        let created = ctx
            .operations
            .create_expansion_operation_if_absent(position.clone(), PresenceScope::Site);
        ctx.notifier.notify(
            NotifyLevel::Alert,
            &format!(
                "Site {} selected as next colony! Creating expansion operation.",
                decision.site
            ),
        );

        TickOutcome::Expanded {
            decision,
            position,
            created,
        }
    }
}

impl Default for ExpansionTrigger {
    fn default() -> Self {
        Self::from_config(&StrategistConfig::default())
    }
}
