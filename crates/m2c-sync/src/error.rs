//! Error types for the sync engine.

use std::path::PathBuf;

/// Error returned by a [`PageRepository`](crate::PageRepository) call.
///
/// Transport and service failures are not distinguished: both are fatal to
/// the current document and harmless to the rest of the batch.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RepositoryError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RepositoryError {
    /// Create an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Error message without the source chain.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Semantic category of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    /// Document bytes could not be read.
    ReadFailure,
    /// Front matter block is malformed.
    FrontMatterFailure,
    /// Fingerprinting failed.
    HashFailure,
    /// No space in front matter and no default space.
    MissingSpace,
    /// No parent in front matter and no default ancestor.
    MissingParent,
    /// No page title in front matter.
    MissingTitle,
    /// Remote lookup failed.
    LookupFailure,
    /// Parent page title did not match any page.
    ParentNotFound,
    /// Page creation failed.
    CreateFailure,
    /// Page content update failed.
    UpdateFailure,
    /// Fingerprint label bookkeeping failed.
    LabelFailure,
}

/// Failure of a single document. Never aborts the batch.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("failed to read document: {0}")]
    Read(std::io::Error),

    #[error("failed to process front matter: {0}")]
    FrontMatter(String),

    #[error("failed to fingerprint document body: {0}")]
    Hash(String),

    #[error("missing space and no default space configured")]
    MissingSpace,

    #[error("missing parent_id/parent_title and no default ancestor configured")]
    MissingParent,

    #[error("front matter missing page_title")]
    MissingTitle,

    #[error("page lookup failed: {0}")]
    Lookup(RepositoryError),

    #[error("parent page \"{title}\" not found in space {space}")]
    ParentNotFound {
        /// Space searched.
        space: String,
        /// Parent title searched for.
        title: String,
    },

    #[error("failed to create page: {0}")]
    Create(RepositoryError),

    #[error("failed to update page content: {0}")]
    Update(RepositoryError),

    #[error("failed to update page labels: {0}")]
    Label(RepositoryError),
}

impl SyncError {
    /// Semantic category of this error.
    #[must_use]
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            Self::Read(_) => SyncErrorKind::ReadFailure,
            Self::FrontMatter(_) => SyncErrorKind::FrontMatterFailure,
            Self::Hash(_) => SyncErrorKind::HashFailure,
            Self::MissingSpace => SyncErrorKind::MissingSpace,
            Self::MissingParent => SyncErrorKind::MissingParent,
            Self::MissingTitle => SyncErrorKind::MissingTitle,
            Self::Lookup(_) => SyncErrorKind::LookupFailure,
            Self::ParentNotFound { .. } => SyncErrorKind::ParentNotFound,
            Self::Create(_) => SyncErrorKind::CreateFailure,
            Self::Update(_) => SyncErrorKind::UpdateFailure,
            Self::Label(_) => SyncErrorKind::LabelFailure,
        }
    }
}

/// Error while discovering documents on disk.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("cannot access {}: {error}", path.display())]
    Access {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        error: std::io::Error,
    },
}

/// Error that prevents a batch from running at all.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_repository_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = RepositoryError::with_source("GET /content failed", io);
        assert_eq!(err.to_string(), "GET /content failed");
        assert_eq!(err.message(), "GET /content failed");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_sync_error_kind() {
        assert_eq!(SyncError::MissingTitle.kind(), SyncErrorKind::MissingTitle);
        assert_eq!(
            SyncError::Lookup(RepositoryError::new("boom")).kind(),
            SyncErrorKind::LookupFailure
        );
        assert_eq!(
            SyncError::ParentNotFound {
                space: "DOCS".to_owned(),
                title: "Guides".to_owned(),
            }
            .kind(),
            SyncErrorKind::ParentNotFound
        );
    }

    #[test]
    fn test_sync_error_display_includes_cause() {
        let err = SyncError::Update(RepositoryError::new("HTTP error: 409 - conflict"));
        assert_eq!(
            err.to_string(),
            "failed to update page content: HTTP error: 409 - conflict"
        );
    }
}
