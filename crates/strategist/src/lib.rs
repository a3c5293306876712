//! Strategist: chooses where and when the colony network expands.
//!
//! The strategist runs once per tick. Every `check_frequency` ticks (offset by
//! `trigger_phase`), if the network is fully automatic and below its site
//! limit, it scores every colony's cached expansion candidates, picks the best
//! site across the whole network and asks the operation registry to claim it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  on_tick   ┌─────────┐   ┌──────────┐   ┌────────┐
//! │ tick driver  │ ─────────▶ │ trigger │ ─▶│ selector │ ─▶│ scorer │
//! └──────────────┘            └─────────┘   └──────────┘   └────────┘
//!                                  │
//!                                  ▼
//!                    path planner + operation registry + notifier
//! ```
//!
//! # Modules
//!
//! - [`config`]: TOML configuration with defaults
//! - [`context`]: Collaborator bundles passed into each call
//! - [`scorer`]: Per-colony candidate scoring
//! - [`selector`]: Cross-colony selection
//! - [`trigger`]: Cadence and capacity gates
//! - [`memory`]: Persisted scratch state

pub mod config;
pub mod context;
pub mod memory;
pub mod scorer;
pub mod selector;
pub mod trigger;

// Re-export config types
pub use config::{
    default_config_toml, CadenceConfig, CapacityConfig, ConfigError, ExpansionConfig,
    ScoringWeights, StrategistConfig, MAX_EXPANSION_DISTANCE,
};

// Re-export context types
pub use context::{TickContext, WorldView};

// Re-export memory types
pub use memory::{ExpansionRecord, StrategistMemory};

// Re-export scorer types
pub use scorer::{ExpansionCandidate, ExpansionScorer, Exclusion, ScoringContext};

// Re-export selector types
pub use selector::{ExpansionDecision, ExpansionSelector};

// Re-export trigger types
pub use trigger::{ExpansionTrigger, SkipReason, TickOutcome};

use std::path::Path;
use thiserror::Error;

use colony_state::Notifier;

/// Errors that can occur in Strategist operations.
#[derive(Debug, Error)]
pub enum StrategistError {
    /// Error loading configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// Error serializing memory
    #[error("Memory error: {0}")]
    Memory(#[from] serde_json::Error),
}

/// Top-level expansion strategist.
///
/// Owns the configuration, the trigger and the persisted memory. Holds no
/// world state; every call receives its collaborators.
#[derive(Debug, Clone)]
pub struct Strategist {
    /// Configuration settings
    config: StrategistConfig,
    /// Cadence and capacity gates wrapping the selector
    trigger: ExpansionTrigger,
    /// Persisted scratch state
    memory: StrategistMemory,
}

impl Strategist {
    /// Creates a new Strategist with the given configuration.
    pub fn new(config: StrategistConfig) -> Result<Self, StrategistError> {
        config.validate()?;
        let trigger = ExpansionTrigger::from_config(&config);
        Ok(Self {
            config,
            trigger,
            memory: StrategistMemory::default(),
        })
    }

    /// Creates a Strategist from a configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, StrategistError> {
        let config = StrategistConfig::from_file(path)?;
        Self::new(config)
    }

    /// Creates a Strategist with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            trigger: ExpansionTrigger::default(),
            config: StrategistConfig::default(),
            memory: StrategistMemory::default(),
        }
    }

    /// Replaces the memory with a stored blob (or defaults), builder style.
    pub fn with_memory(mut self, raw: Option<&str>) -> Self {
        self.refresh(raw);
        self
    }

    /// Reloads memory from a stored blob.
    pub fn refresh(&mut self, raw: Option<&str>) {
        self.memory = StrategistMemory::load_or_default(raw);
    }

    /// Serializes memory for storage.
    pub fn save_memory(&self) -> Result<String, StrategistError> {
        Ok(self.memory.to_json()?)
    }

    /// Runs one tick.
    pub fn on_tick(&mut self, tick: u64, ctx: &mut TickContext<'_>) -> TickOutcome {
        let outcome = self.trigger.on_tick(tick, ctx);
        if let TickOutcome::Expanded {
            decision,
            created: true,
            ..
        } = &outcome
        {
            self.memory.record_expansion(ExpansionRecord {
                tick,
                site: decision.site.clone(),
                score: decision.score,
                sponsor: decision.sponsor.clone(),
            });
        }
        outcome
    }

    /// Picks the next expansion site without any gating or side effects
    /// beyond notifications.
    pub fn choose_next_site(
        &self,
        view: WorldView<'_>,
        notifier: &mut dyn Notifier,
    ) -> Option<ExpansionDecision> {
        self.trigger.selector().choose_next_site(view, notifier)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StrategistConfig {
        &self.config
    }

    /// Returns the persisted memory.
    pub fn memory(&self) -> &StrategistMemory {
        &self.memory
    }

    /// Returns the trigger.
    pub fn trigger(&self) -> &ExpansionTrigger {
        &self.trigger
    }
}

impl Default for Strategist {
    fn default() -> Self {
        Self::with_defaults()
    }
}
