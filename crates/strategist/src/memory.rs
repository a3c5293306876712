//! Persisted strategist memory.
//!
//! The driver loads this blob once per session with
//! [`StrategistMemory::load_or_default`] and saves it back with
//! [`StrategistMemory::to_json`]. Selection never reads it.

use serde::{Deserialize, Serialize};

use colony_state::SiteId;

/// Record of the last expansion the strategist requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionRecord {
    pub tick: u64,
    pub site: SiteId,
    pub score: f64,
    pub sponsor: SiteId,
}

/// Scratch state kept between sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategistMemory {
    /// Most recent expansion request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_expansion: Option<ExpansionRecord>,
    /// Number of expansion operations requested so far
    pub expansions_requested: u32,
}

impl StrategistMemory {
    /// Parses a stored blob, falling back to defaults if it is missing or
    /// unreadable.
    pub fn load_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) if !raw.trim().is_empty() => match serde_json::from_str(raw) {
                Ok(memory) => memory,
                Err(e) => {
                    tracing::warn!("Discarding unreadable strategist memory: {}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// Serializes the memory for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Notes a newly requested expansion.
    pub fn record_expansion(&mut self, record: ExpansionRecord) {
        self.expansions_requested += 1;
        self.last_expansion = Some(record);
    }
}
