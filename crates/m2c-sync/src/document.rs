//! Document preparation: front matter, default merge, validation, fingerprint.
//!
//! Preparation is purely local. A document that fails here never reaches
//! the page repository.

use m2c_config::SyncConfig;

use crate::error::SyncError;
use crate::fingerprint::Fingerprint;
use crate::frontmatter;

/// Where a new or updated page is nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// Explicit parent page ID (front matter or default ancestor).
    Id(String),
    /// Parent page title, resolved within the document's space.
    Title(String),
}

/// A validated document ready for synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    /// Source identifier (usually a file path).
    pub id: String,
    /// Target space key.
    pub space: String,
    /// Page title.
    pub title: String,
    /// Parent page reference.
    pub parent: ParentRef,
    /// Markdown body without front matter.
    pub body: String,
    /// Fingerprint of `body`.
    pub fingerprint: Fingerprint,
}

impl PreparedDocument {
    /// Parse, merge defaults and validate one document.
    ///
    /// Parent precedence: `parent_id` > `parent_title` > default ancestor.
    pub fn prepare(id: &str, bytes: &[u8], config: &SyncConfig) -> Result<Self, SyncError> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            SyncError::Read(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        let (front_matter, body) =
            frontmatter::split(text).map_err(|e| SyncError::FrontMatter(e.to_string()))?;

        let space = front_matter
            .space
            .or_else(|| config.default_space().map(str::to_owned))
            .ok_or(SyncError::MissingSpace)?;

        let parent = match (front_matter.parent_id, front_matter.parent_title) {
            (Some(parent_id), _) => ParentRef::Id(parent_id),
            (None, Some(parent_title)) => ParentRef::Title(parent_title),
            (None, None) => config
                .default_ancestor()
                .map(|id| ParentRef::Id(id.to_owned()))
                .ok_or(SyncError::MissingParent)?,
        };

        let title = front_matter.page_title.ok_or(SyncError::MissingTitle)?;

        Ok(Self {
            id: id.to_owned(),
            space,
            title,
            parent,
            fingerprint: Fingerprint::of(body.as_bytes()),
            body: body.to_owned(),
        })
    }
}
