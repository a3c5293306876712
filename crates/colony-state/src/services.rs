//! Collaborator Interfaces
//!
//! Narrow query and effect traits the expansion strategist consumes. The
//! strategist receives these as trait objects per call and never reaches for
//! global state, so tests can substitute small doubles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::{Colony, Position, SiteId, SiteMetadata};

/// Failure of a world lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The collaborator has no record of the site
    #[error("unknown site: {0}")]
    UnknownSite(SiteId),
}

/// How much the network is allowed to decide on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomyLevel {
    #[default]
    Manual,
    SemiAutomatic,
    Automatic,
}

/// Severity of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Info,
    Alert,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyLevel::Info => write!(f, "info"),
            NotifyLevel::Alert => write!(f, "alert"),
        }
    }
}

/// What counts as "already present" when creating an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceScope {
    /// Any operation anywhere in the same site
    Site,
    /// Only an operation at the exact same position
    Position,
}

/// Topological neighbour queries over the site graph.
pub trait SiteGraph {
    /// Returns every site within `range` steps of `site`, including `site`.
    fn sites_in_range(&self, site: &SiteId, range: u32) -> Result<BTreeSet<SiteId>, LookupError>;
}

/// Read-only world facts and network counters.
pub trait WorldState {
    /// Scouted metadata for a site.
    fn site_metadata(&self, site: &SiteId) -> Result<SiteMetadata, LookupError>;

    /// Whether the platform currently permits claiming the site.
    fn is_site_available(&self, site: &SiteId) -> Result<bool, LookupError>;

    /// Number of sites the network owns.
    fn owned_site_count(&self) -> usize;

    /// Network-wide limit on owned sites.
    fn expansion_capacity_limit(&self) -> usize;

    /// Platform (shard) the network runs on.
    fn platform_id(&self) -> &str;

    /// Operator-selected autonomy mode.
    fn autonomy_level(&self) -> AutonomyLevel;
}

/// Source of the colonies owned by the network.
pub trait ColonyRegistry {
    /// All colonies in stable registry order.
    fn all_colonies(&self) -> &[Colony];
}

/// Turns a site into a concrete anchor position.
pub trait PathPlanner {
    fn resolve_anchor_position(&self, site: &SiteId) -> Result<Position, LookupError>;
}

/// Registry of externally managed expansion operations.
pub trait OperationRegistry {
    /// Creates an expansion operation at `position` unless an equivalent one
    /// already exists within `scope`. Returns true if one was created.
    fn create_expansion_operation_if_absent(
        &mut self,
        position: Position,
        scope: PresenceScope,
    ) -> bool;
}

/// Operator notification sink.
pub trait Notifier {
    fn notify(&mut self, level: NotifyLevel, message: &str);
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Info => tracing::info!(target: "notify", "{}", message),
            NotifyLevel::Alert => tracing::warn!(target: "notify", "{}", message),
        }
    }
}

/// A recorded notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

/// Keeps every notification it receives, and logs it.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications in the order received.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Removes and returns all recorded notifications.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, level: NotifyLevel, message: &str) {
        TracingNotifier.notify(level, message);
        self.entries.push(Notification {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_log_records_in_order() {
        let mut log = NotificationLog::new();
        log.notify(NotifyLevel::Info, "first");
        log.notify(NotifyLevel::Alert, "second");

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].level, NotifyLevel::Info);
        assert_eq!(log.entries()[1].message, "second");

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_autonomy_level_serialization() {
        assert_eq!(
            serde_json::to_string(&AutonomyLevel::SemiAutomatic).unwrap(),
            r#""semi_automatic""#
        );
        let parsed: AutonomyLevel = serde_json::from_str(r#""automatic""#).unwrap();
        assert_eq!(parsed, AutonomyLevel::Automatic);
        assert_eq!(AutonomyLevel::default(), AutonomyLevel::Manual);
    }

    #[test]
    fn test_lookup_error_message() {
        let err = LookupError::UnknownSite(SiteId::new("W9N9"));
        assert_eq!(err.to_string(), "unknown site: W9N9");
    }
}
