//! Fingerprint-based sync of markdown documents to Confluence pages.
//!
//! Each document is published as one page. The body's fingerprint is stored
//! as a `sha-` page label, so an unchanged document costs a lookup and a
//! label read but never a write.
//!
//! # Architecture
//!
//! - [`PreparedDocument`] splits front matter, merges configured defaults,
//!   validates and fingerprints a document. Purely local.
//! - [`PageResolver`] finds pages by title within a space.
//! - [`SyncEngine`] decides skip, create or update and applies it through a
//!   [`PageRepository`].
//! - [`SyncRunner`] drives a whole [`DocumentSource`] and collects a
//!   [`SyncReport`]. Per-document failures never abort the batch.
//! - [`mock::MockRepository`] for testing (behind the `mock` feature flag).
//!
//! # Example
//!
//! ```ignore
//! use m2c_config::SyncConfig;
//! use m2c_renderer::StorageRenderer;
//! use m2c_sync::{FsSource, SyncEngine, SyncRunner};
//!
//! let config = SyncConfig::default();
//! let source = FsSource::discover(&config.paths, config.recursive)?;
//! let engine = SyncEngine::new(&client, &config, StorageRenderer::new());
//! let report = SyncRunner::new(engine, config.jobs).run(&source)?;
//! assert!(report.is_success());
//! ```

mod document;
mod engine;
mod error;
mod fingerprint;
pub mod frontmatter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod repository;
mod resolver;
mod runner;
mod source;

pub use document::{ParentRef, PreparedDocument};
pub use engine::{SyncAction, SyncEngine, SyncOutcome};
pub use error::{RepositoryError, RunError, SourceError, SyncError, SyncErrorKind};
pub use fingerprint::{FINGERPRINT_PREFIX, Fingerprint, is_fingerprint_label};
pub use repository::{PageContent, PageRepository, RemotePage};
pub use resolver::PageResolver;
pub use runner::{DocumentResult, SyncReport, SyncRunner};
pub use source::{DocumentSource, FsSource};
