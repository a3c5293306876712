//! Simulation Loop
//!
//! Drives the strategist tick by tick and plays the rest of the world: open
//! expansion operations settle into new colonies after a delay, colonies grow
//! in tier and pending survey results come in.

use rand::rngs::SmallRng;
use serde::Serialize;
use uuid::Uuid;

use colony_state::{Colony, NotificationLog, OperationLedger, SiteId, WorldSnapshot, WorldState};
use strategist::{Strategist, TickContext, TickOutcome, WorldView};

use crate::setup::{resolve_pending, survey_colony};

/// Highest tier a colony can reach
pub const MAX_TIER: u8 = 8;

/// World pacing knobs.
#[derive(Debug, Clone)]
pub struct SimParams {
    /// Ticks between an operation being opened and the site being settled
    pub settle_delay: u64,
    /// Ticks between tier increases
    pub growth_interval: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            settle_delay: 1500,
            growth_interval: 2000,
        }
    }
}

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    OperationOpened {
        tick: u64,
        site: SiteId,
        sponsor: SiteId,
        score: f64,
    },
    Settled {
        tick: u64,
        site: SiteId,
        sponsor: SiteId,
    },
    Abandoned {
        tick: u64,
        site: SiteId,
        sponsor: SiteId,
    },
}

/// An operation waiting to turn into a colony.
#[derive(Debug, Clone)]
struct PendingSettlement {
    operation: Uuid,
    site: SiteId,
    sponsor: SiteId,
    due: u64,
}

/// Totals printed at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimSummary {
    pub ticks: u64,
    pub checks: u64,
    pub operations_opened: u32,
    pub settled: u32,
    pub abandoned: u32,
    pub colonies: usize,
    pub notifications: usize,
}

/// Owns the world and everything the strategist talks to.
pub struct Simulation {
    pub world: WorldSnapshot,
    pub ledger: OperationLedger,
    pub notifications: NotificationLog,
    pub strategist: Strategist,
    params: SimParams,
    rng: SmallRng,
    pending: Vec<PendingSettlement>,
    events: Vec<SimEvent>,
    summary: SimSummary,
}

impl Simulation {
    pub fn new(
        world: WorldSnapshot,
        strategist: Strategist,
        params: SimParams,
        rng: SmallRng,
    ) -> Self {
        Self {
            world,
            ledger: OperationLedger::new(),
            notifications: NotificationLog::new(),
            strategist,
            params,
            rng,
            pending: Vec::new(),
            events: Vec::new(),
            summary: SimSummary::default(),
        }
    }

    /// Advances the world by one tick.
    pub fn step(&mut self) {
        let tick = self.world.tick;

        self.settle_due(tick);
        if self.params.growth_interval > 0 && tick > 0 && tick % self.params.growth_interval == 0
        {
            self.grow();
        }

        let outcome = {
            let mut ctx = TickContext::new(
                WorldView::of(&self.world),
                &self.world,
                &mut self.ledger,
                &mut self.notifications,
            );
            self.strategist.on_tick(tick, &mut ctx)
        };
        self.handle_outcome(tick, outcome);

        self.world.tick += 1;
        self.summary.ticks += 1;
    }

    /// Runs `ticks` steps and returns the totals.
    pub fn run(&mut self, ticks: u64) -> SimSummary {
        for _ in 0..ticks {
            self.step();
        }
        self.summary()
    }

    pub fn summary(&self) -> SimSummary {
        SimSummary {
            colonies: self.world.colonies.len(),
            notifications: self.notifications.len(),
            ..self.summary.clone()
        }
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    fn handle_outcome(&mut self, tick: u64, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Expanded {
                decision,
                created: true,
                ..
            } => {
                self.summary.checks += 1;
                let Some(operation) = self.ledger.for_site(&decision.site) else {
                    tracing::warn!("No ledger entry for new operation at {}", decision.site);
                    return;
                };
                if let Some(sponsor) = self.world.colony_mut(&decision.sponsor) {
                    sponsor
                        .active_expansion_operations
                        .push(decision.site.clone());
                }
                self.pending.push(PendingSettlement {
                    operation: operation.id,
                    site: decision.site.clone(),
                    sponsor: decision.sponsor.clone(),
                    due: tick + self.params.settle_delay,
                });
                self.summary.operations_opened += 1;
                self.events.push(SimEvent::OperationOpened {
                    tick,
                    site: decision.site,
                    sponsor: decision.sponsor,
                    score: decision.score,
                });
            }
            other => {
                self.summary.checks += 1;
                tracing::debug!(tick, ?other, "Strategist check produced no new operation");
            }
        }
    }

    fn settle_due(&mut self, tick: u64) {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= tick);
        self.pending = waiting;

        for settlement in due {
            self.ledger.remove(settlement.operation);
            if let Some(sponsor) = self.world.colony_mut(&settlement.sponsor) {
                sponsor
                    .active_expansion_operations
                    .retain(|site| site != &settlement.site);
            }

            let at_limit = self.world.owned_site_count() >= self.world.expansion_capacity_limit();
            if at_limit || self.world.is_owned(&settlement.site) {
                tracing::info!("Abandoning expansion to {}", settlement.site);
                self.summary.abandoned += 1;
                self.events.push(SimEvent::Abandoned {
                    tick,
                    site: settlement.site,
                    sponsor: settlement.sponsor,
                });
                continue;
            }

            tracing::info!(
                "{} settled {} after {} ticks",
                settlement.sponsor,
                settlement.site,
                self.params.settle_delay
            );
            self.world.colonies.push(Colony::new(settlement.site.clone(), 1));
            survey_colony(&mut self.world, &settlement.site, &mut self.rng);
            self.summary.settled += 1;
            self.events.push(SimEvent::Settled {
                tick,
                site: settlement.site,
                sponsor: settlement.sponsor,
            });
        }
    }

    fn grow(&mut self) {
        for colony in &mut self.world.colonies {
            colony.tier = (colony.tier + 1).min(MAX_TIER);
        }
        let resolved = resolve_pending(&mut self.world, &mut self.rng);
        tracing::debug!("Colonies grew; {} survey results arrived", resolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{create_world, WorldParams};
    use colony_state::fixtures::sample_world;
    use rand::SeedableRng;

    fn sim(world: WorldSnapshot, params: SimParams) -> Simulation {
        Simulation::new(
            world,
            Strategist::with_defaults(),
            params,
            SmallRng::seed_from_u64(1),
        )
    }

    #[test]
    fn test_first_check_opens_operation_and_marks_sponsor() {
        let mut sim = sim(sample_world(), SimParams::default());
        sim.world.tick = 0;
        sim.run(18);

        assert_eq!(sim.ledger.len(), 1);
        assert_eq!(sim.summary().operations_opened, 1);
        let sponsor = sim.world.colony(&SiteId::new("E1S1")).unwrap();
        assert_eq!(sponsor.active_expansion_operations, vec![SiteId::new("E4S1")]);
        assert!(matches!(
            sim.events()[0],
            SimEvent::OperationOpened { tick: 17, .. }
        ));
    }

    #[test]
    fn test_operation_settles_into_new_colony() {
        let params = SimParams {
            settle_delay: 100,
            growth_interval: 0,
        };
        let mut sim = sim(sample_world(), params);
        sim.world.tick = 0;
        sim.run(200);

        assert!(sim.ledger.is_empty());
        let settled = sim.world.colony(&SiteId::new("E4S1")).unwrap();
        assert_eq!(settled.tier, 1);
        assert!(!settled.expansion_cache.is_empty());
        let sponsor = sim.world.colony(&SiteId::new("E1S1")).unwrap();
        assert!(!sponsor.has_active_expansion());
        assert_eq!(sim.summary().settled, 1);
    }

    #[test]
    fn test_settlement_abandoned_at_capacity() {
        let params = SimParams {
            settle_delay: 10,
            growth_interval: 0,
        };
        let mut world = sample_world();
        world.tick = 0;
        let mut sim = sim(world, params);
        sim.run(20);
        assert_eq!(sim.summary().operations_opened, 1);

        // The limit drops below the current colony count before settling
        sim.world.capacity_limit = 3;
        sim.run(20);

        assert_eq!(sim.summary().abandoned, 1);
        assert!(sim.world.colony(&SiteId::new("E4S1")).is_none());
    }

    #[test]
    fn test_growth_caps_at_max_tier() {
        let params = SimParams {
            settle_delay: 100,
            growth_interval: 1,
        };
        let mut sim = sim(sample_world(), params);
        sim.world.tick = 1;
        sim.run(10);

        assert!(sim.world.colonies.iter().all(|c| c.tier == MAX_TIER));
    }

    #[test]
    fn test_generated_run_is_reproducible() {
        let run = |seed: u64| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let world = create_world(&WorldParams::default(), &mut rng);
            let mut sim = Simulation::new(world, Strategist::with_defaults(), SimParams::default(), rng);
            sim.run(10_000);
            (sim.summary(), sim.events().to_vec())
        };

        let (summary, events) = run(99);
        assert_eq!(summary.ticks, 10_000);
        assert_eq!(summary.checks, 10);
        assert_eq!(run(99), (summary, events));
    }
}
