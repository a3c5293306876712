//! Expansion Operation Ledger
//!
//! In-memory registry of expansion operations ("claim and settle this site").
//! Creation is idempotent within a presence scope.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::{OperationRegistry, PresenceScope};
use crate::{Position, SiteId};

/// A pending expansion operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionOperation {
    pub id: Uuid,
    pub position: Position,
}

impl ExpansionOperation {
    /// Site the operation targets.
    pub fn site(&self) -> &SiteId {
        &self.position.site
    }
}

/// Ordered collection of open expansion operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationLedger {
    operations: Vec<ExpansionOperation>,
}

impl OperationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open operations in creation order.
    pub fn operations(&self) -> &[ExpansionOperation] {
        &self.operations
    }

    /// Returns true if an operation matching `position` exists within `scope`.
    pub fn is_present(&self, position: &Position, scope: PresenceScope) -> bool {
        self.operations.iter().any(|op| match scope {
            PresenceScope::Site => op.position.site == position.site,
            PresenceScope::Position => &op.position == position,
        })
    }

    /// Finds the operation targeting a site.
    pub fn for_site(&self, site: &SiteId) -> Option<&ExpansionOperation> {
        self.operations.iter().find(|op| op.site() == site)
    }

    /// Removes an operation once it has completed or been abandoned.
    pub fn remove(&mut self, id: Uuid) -> Option<ExpansionOperation> {
        let index = self.operations.iter().position(|op| op.id == id)?;
        Some(self.operations.remove(index))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl OperationRegistry for OperationLedger {
    fn create_expansion_operation_if_absent(
        &mut self,
        position: Position,
        scope: PresenceScope,
    ) -> bool {
        if self.is_present(&position, scope) {
            tracing::debug!("Expansion operation already present for {}", position);
            return false;
        }
        let operation = ExpansionOperation {
            id: Uuid::new_v4(),
            position,
        };
        tracing::info!(
            "Created expansion operation {} at {}",
            operation.id,
            operation.position
        );
        self.operations.push(operation);
        true
    }
}
