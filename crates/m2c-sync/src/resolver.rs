//! Page lookup by title.

use crate::error::SyncError;
use crate::repository::{PageRepository, RemotePage};

/// Resolves titles to remote pages within a space.
pub struct PageResolver<'a> {
    repo: &'a dyn PageRepository,
}

impl<'a> PageResolver<'a> {
    pub fn new(repo: &'a dyn PageRepository) -> Self {
        Self { repo }
    }

    /// Find a page by exact title.
    ///
    /// When several pages match, the first one returned by the repository
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Lookup`] if the search fails.
    pub fn find_page_by_title(
        &self,
        space: &str,
        title: &str,
    ) -> Result<Option<RemotePage>, SyncError> {
        let results = self.repo.find(space, title).map_err(SyncError::Lookup)?;
        if results.len() > 1 {
            tracing::warn!(
                space,
                title,
                count = results.len(),
                "Multiple pages share title, using first"
            );
        }
        Ok(results.into_iter().next())
    }

    /// Resolve a parent page title to its ID.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ParentNotFound`] if no page matches and
    /// [`SyncError::Lookup`] if the search fails.
    pub fn resolve_parent(&self, space: &str, parent_title: &str) -> Result<String, SyncError> {
        self.find_page_by_title(space, parent_title)?
            .map(|page| page.id)
            .ok_or_else(|| SyncError::ParentNotFound {
                space: space.to_owned(),
                title: parent_title.to_owned(),
            })
    }
}
