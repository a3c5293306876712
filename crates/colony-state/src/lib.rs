//! Shared world types for the colony expansion strategist.
//!
//! This crate contains the data model (sites, colonies, suitability caches),
//! the collaborator traits the strategist consumes, and in-memory
//! implementations of those traits used by the simulator and the tests.
//! It holds no decision logic.

pub mod colony;
pub mod coord;
pub mod operations;
pub mod services;
pub mod site;
pub mod snapshot;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export site types
pub use site::{Position, ResourceType, SiteId, SiteMetadata};

// Re-export colony types
pub use colony::{CacheEntry, Colony, ExpansionCache};

// Re-export coordinate types
pub use coord::{CoordError, RoomCoord, MAX_ROOM_INDEX};

// Re-export collaborator interfaces
pub use services::{
    AutonomyLevel, ColonyRegistry, LookupError, Notification, NotificationLog, Notifier,
    NotifyLevel, OperationRegistry, PathPlanner, PresenceScope, SiteGraph, TracingNotifier,
    WorldState,
};

// Re-export in-memory implementations
pub use operations::{ExpansionOperation, OperationLedger};
pub use snapshot::{SiteRecord, SnapshotError, WorldSnapshot, SITE_CENTER};
