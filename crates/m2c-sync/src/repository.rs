//! Page repository abstraction over the remote service.

use std::collections::BTreeSet;

use crate::error::RepositoryError;

/// A page that already exists in the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Key of the space the page lives in.
    pub space_key: String,
    /// Service-assigned version, starting at 1.
    pub version: u32,
}

/// Page fields submitted on create and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContent<'a> {
    /// Page title.
    pub title: &'a str,
    /// Target space key.
    pub space_key: &'a str,
    /// Parent page ID.
    pub parent_id: &'a str,
    /// Storage-format markup.
    pub body: &'a str,
}

/// Remote page operations consumed by the sync engine.
///
/// Every call may fail with a transport or service error. The engine treats
/// such errors as fatal to the current document only.
pub trait PageRepository: Send + Sync {
    /// Exact-title search scoped to a space.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the search fails.
    fn find(&self, space_key: &str, title: &str) -> Result<Vec<RemotePage>, RepositoryError>;

    /// Get a page by ID, including its current version.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the page can't be fetched.
    fn get_by_id(&self, page_id: &str) -> Result<RemotePage, RepositoryError>;

    /// Get all label names attached to a page.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if labels can't be fetched.
    fn get_labels(&self, page_id: &str) -> Result<BTreeSet<String>, RepositoryError>;

    /// Attach a label to a page.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the label can't be added.
    fn add_label(&self, page_id: &str, label: &str) -> Result<(), RepositoryError>;

    /// Remove a label from a page.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the label can't be removed.
    fn delete_label(&self, page_id: &str, label: &str) -> Result<(), RepositoryError>;

    /// Create a page. The service assigns the ID and version 1.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if creation fails.
    fn create(&self, content: &PageContent<'_>) -> Result<RemotePage, RepositoryError>;

    /// Replace a page's content, setting its version to `new_version`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the update fails (e.g. version conflict).
    fn update(
        &self,
        page_id: &str,
        content: &PageContent<'_>,
        new_version: u32,
    ) -> Result<(), RepositoryError>;
}
