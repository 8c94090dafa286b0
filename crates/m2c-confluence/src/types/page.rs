//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version information (present when expanded).
    #[serde(default)]
    pub version: Option<Version>,
    /// Owning space (present when expanded).
    #[serde(default)]
    pub space: Option<Space>,
}

/// Page version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
}

/// Space reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Space {
    /// Space key.
    pub key: String,
}

/// Parent page reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ancestor {
    /// Parent page ID.
    pub id: String,
}

/// Content search API response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Matching pages in service order.
    pub results: Vec<Page>,
}
