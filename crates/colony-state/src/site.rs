//! Site Types
//!
//! Identifiers and read-only facts about map sites.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique site identifier (a room name such as `W3N5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(String);

impl SiteId {
    /// Creates a site identifier from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SiteId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SiteId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Mineral deposit type found in a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "H")]
    Hydrogen,
    #[serde(rename = "O")]
    Oxygen,
    #[serde(rename = "U")]
    Utrium,
    #[serde(rename = "L")]
    Lemergium,
    #[serde(rename = "K")]
    Keanium,
    #[serde(rename = "Z")]
    Zynthium,
    #[serde(rename = "X")]
    Catalyst,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Hydrogen,
        ResourceType::Oxygen,
        ResourceType::Utrium,
        ResourceType::Lemergium,
        ResourceType::Keanium,
        ResourceType::Zynthium,
        ResourceType::Catalyst,
    ];

    /// Returns true for the rare catalyst type.
    pub fn is_catalyst(self) -> bool {
        matches!(self, ResourceType::Catalyst)
    }

    /// Single-letter symbol used in persisted records.
    pub fn symbol(self) -> &'static str {
        match self {
            ResourceType::Hydrogen => "H",
            ResourceType::Oxygen => "O",
            ResourceType::Utrium => "U",
            ResourceType::Lemergium => "L",
            ResourceType::Keanium => "K",
            ResourceType::Zynthium => "Z",
            ResourceType::Catalyst => "X",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Known facts about a site, as last recorded by scouting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// Mineral deposit, if one has been observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    /// Whether the site should be avoided
    #[serde(default)]
    pub hostile: bool,
}

/// A tile position inside a site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub site: SiteId,
    pub x: u8,
    pub y: u8,
}

impl Position {
    /// Creates a position inside the given site.
    pub fn new(site: SiteId, x: u8, y: u8) -> Self {
        Self { site, x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {},{}]", self.site, self.x, self.y)
    }
}
