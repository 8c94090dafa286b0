//! Sync decision engine.
//!
//! Drives one document to a terminal outcome: skip when the page's
//! fingerprint label matches, create when no page has the title, update
//! otherwise. Label bookkeeping keeps at most one fingerprint label per page.
//!
//! The update sequence (delete old labels, update content, add new label) is
//! not transactional. If the content update fails after the old label is
//! gone, the page has no fingerprint label and the next run updates it again.

use std::fmt;

use m2c_config::SyncConfig;
use m2c_renderer::StorageRenderer;

use crate::document::{ParentRef, PreparedDocument};
use crate::error::{RepositoryError, SyncError};
use crate::fingerprint::{Fingerprint, is_fingerprint_label};
use crate::repository::{PageContent, PageRepository, RemotePage};
use crate::resolver::PageResolver;

/// Action taken (or planned, in dry-run mode) for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncAction {
    /// Page content is unchanged.
    Skip,
    /// Page did not exist.
    Create,
    /// Page content changed or its fingerprint is unknown.
    Update,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skip => "unchanged",
            Self::Create => "created",
            Self::Update => "updated",
        })
    }
}

/// Successful result of syncing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub action: SyncAction,
    /// Page ID. `None` for a planned create.
    pub page_id: Option<String>,
    /// Page version after the sync. `None` for a planned create.
    pub version: Option<u32>,
    /// Fingerprint of the document body.
    pub fingerprint: Fingerprint,
    /// Whether mutations were suppressed.
    pub dry_run: bool,
}

/// Synchronizes prepared documents against a page repository.
pub struct SyncEngine<'a> {
    repo: &'a dyn PageRepository,
    config: &'a SyncConfig,
    renderer: StorageRenderer,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        repo: &'a dyn PageRepository,
        config: &'a SyncConfig,
        renderer: StorageRenderer,
    ) -> Self {
        Self {
            repo,
            config,
            renderer,
        }
    }

    /// Parse and validate a document without touching the repository.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] for unreadable text, malformed front matter, or
    /// missing space, parent or title.
    pub fn prepare(&self, id: &str, bytes: &[u8]) -> Result<PreparedDocument, SyncError> {
        PreparedDocument::prepare(id, bytes, self.config)
    }

    /// Sync one prepared document.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] on lookup, parent resolution or mutation failure.
    /// Mutations already applied are not rolled back.
    pub fn sync(&self, doc: &PreparedDocument) -> Result<SyncOutcome, SyncError> {
        tracing::debug!(
            document = %doc.id,
            space = %doc.space,
            title = %doc.title,
            "Syncing document"
        );

        let resolver = PageResolver::new(self.repo);
        let parent_id = match &doc.parent {
            ParentRef::Id(id) => id.clone(),
            ParentRef::Title(title) => resolver.resolve_parent(&doc.space, title)?,
        };

        let outcome = match resolver.find_page_by_title(&doc.space, &doc.title)? {
            None => self.create(doc, &parent_id)?,
            Some(page) => self.reconcile(doc, &parent_id, &page)?,
        };

        tracing::info!(
            document = %doc.id,
            action = %outcome.action,
            page_id = outcome.page_id.as_deref().unwrap_or("-"),
            fingerprint = %outcome.fingerprint,
            dry_run = outcome.dry_run,
            "Synced document"
        );
        Ok(outcome)
    }

    fn create(&self, doc: &PreparedDocument, parent_id: &str) -> Result<SyncOutcome, SyncError> {
        if self.config.dry_run {
            return Ok(self.outcome(doc, SyncAction::Create, None, None));
        }

        let body = self.renderer.render(&doc.body);
        let page = self
            .repo
            .create(&PageContent {
                title: &doc.title,
                space_key: &doc.space,
                parent_id,
                body: &body,
            })
            .map_err(SyncError::Create)?;

        self.repo
            .add_label(&page.id, doc.fingerprint.as_str())
            .map_err(SyncError::Label)?;

        Ok(self.outcome(doc, SyncAction::Create, Some(page.id), Some(page.version)))
    }

    fn reconcile(
        &self,
        doc: &PreparedDocument,
        parent_id: &str,
        page: &RemotePage,
    ) -> Result<SyncOutcome, SyncError> {
        let labels = self.repo.get_labels(&page.id).map_err(SyncError::Lookup)?;
        let stale: Vec<&String> = labels.iter().filter(|l| is_fingerprint_label(l)).collect();

        if stale.len() > 1 {
            tracing::warn!(
                document = %doc.id,
                page_id = %page.id,
                labels = ?stale,
                "Page has multiple fingerprint labels"
            );
        }

        // BTreeSet iteration is sorted, so the first label is the smallest.
        if stale.first().is_some_and(|l| l.as_str() == doc.fingerprint.as_str()) {
            return Ok(self.outcome(
                doc,
                SyncAction::Skip,
                Some(page.id.clone()),
                Some(page.version),
            ));
        }

        let current = self.repo.get_by_id(&page.id).map_err(SyncError::Lookup)?;
        let new_version = current.version.checked_add(1).ok_or_else(|| {
            SyncError::Update(RepositoryError::new(format!(
                "page {} is at version {}, which cannot be incremented",
                current.id, current.version
            )))
        })?;

        if self.config.dry_run {
            return Ok(self.outcome(
                doc,
                SyncAction::Update,
                Some(current.id),
                Some(new_version),
            ));
        }

        for label in stale {
            self.repo
                .delete_label(&current.id, label)
                .map_err(SyncError::Label)?;
        }

        let body = self.renderer.render(&doc.body);
        self.repo
            .update(
                &current.id,
                &PageContent {
                    title: &doc.title,
                    space_key: &doc.space,
                    parent_id,
                    body: &body,
                },
                new_version,
            )
            .map_err(SyncError::Update)?;

        self.repo
            .add_label(&current.id, doc.fingerprint.as_str())
            .map_err(SyncError::Label)?;

        Ok(self.outcome(
            doc,
            SyncAction::Update,
            Some(current.id),
            Some(new_version),
        ))
    }

    fn outcome(
        &self,
        doc: &PreparedDocument,
        action: SyncAction,
        page_id: Option<String>,
        version: Option<u32>,
    ) -> SyncOutcome {
        SyncOutcome {
            action,
            page_id,
            version,
            fingerprint: doc.fingerprint.clone(),
            dry_run: self.config.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::SyncErrorKind;
    use crate::mock::{MockRepository, Operation, RepositoryCall};

    const DOC: &str = "---\nspace: DOCS\npage_title: T\nparent_id: \"1\"\n---\nHello\n";

    fn config() -> SyncConfig {
        SyncConfig::default()
    }

    fn engine<'a>(repo: &'a MockRepository, config: &'a SyncConfig) -> SyncEngine<'a> {
        SyncEngine::new(repo, config, StorageRenderer::new())
    }

    fn fingerprint() -> Fingerprint {
        Fingerprint::of(b"Hello\n")
    }

    fn fingerprint_labels(repo: &MockRepository, page_id: &str) -> Vec<String> {
        repo.labels(page_id)
            .into_iter()
            .filter(|l| is_fingerprint_label(l))
            .collect()
    }

    fn run(
        repo: &MockRepository,
        config: &SyncConfig,
        text: &str,
    ) -> Result<SyncOutcome, SyncError> {
        let engine = engine(repo, config);
        let doc = engine.prepare("doc.md", text.as_bytes())?;
        engine.sync(&doc)
    }

    #[test]
    fn test_create_when_page_missing() {
        let repo = MockRepository::new();
        let config = config();
        let outcome = run(&repo, &config, DOC).unwrap();

        assert_eq!(outcome.action, SyncAction::Create);
        assert_eq!(outcome.version, Some(1));
        let page_id = outcome.page_id.unwrap();
        assert_eq!(repo.page_count(), 1);
        assert_eq!(
            fingerprint_labels(&repo, &page_id),
            vec![fingerprint().as_str().to_owned()]
        );
        assert_eq!(
            repo.mutations(),
            vec![
                RepositoryCall::Create {
                    space_key: "DOCS".to_owned(),
                    title: "T".to_owned(),
                    parent_id: "1".to_owned(),
                },
                RepositoryCall::AddLabel {
                    page_id: page_id.clone(),
                    label: fingerprint().as_str().to_owned(),
                },
            ]
        );
        let (body, parent) = repo.content(&page_id).unwrap();
        assert_eq!(body, "<p>Hello</p>\n");
        assert_eq!(parent.as_deref(), Some("1"));
    }

    #[test]
    fn test_skip_when_fingerprint_matches() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 4)
            .with_label("100", fingerprint().as_str());
        let config = config();
        let outcome = run(&repo, &config, DOC).unwrap();

        assert_eq!(outcome.action, SyncAction::Skip);
        assert_eq!(outcome.page_id.as_deref(), Some("100"));
        assert_eq!(outcome.version, Some(4));
        assert!(repo.mutations().is_empty());
    }

    #[test]
    fn test_update_when_fingerprint_stale() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 4)
            .with_label("100", "sha-00000000")
            .with_label("100", "team-docs");
        let config = config();
        let outcome = run(&repo, &config, DOC).unwrap();

        assert_eq!(outcome.action, SyncAction::Update);
        assert_eq!(outcome.version, Some(5));
        assert_eq!(repo.page("100").unwrap().version, 5);
        assert_eq!(
            repo.mutations(),
            vec![
                RepositoryCall::DeleteLabel {
                    page_id: "100".to_owned(),
                    label: "sha-00000000".to_owned(),
                },
                RepositoryCall::Update {
                    page_id: "100".to_owned(),
                    version: 5,
                },
                RepositoryCall::AddLabel {
                    page_id: "100".to_owned(),
                    label: fingerprint().as_str().to_owned(),
                },
            ]
        );
        assert!(repo.labels("100").contains("team-docs"));
        assert_eq!(
            fingerprint_labels(&repo, "100"),
            vec![fingerprint().as_str().to_owned()]
        );
    }

    #[test]
    fn test_update_when_fingerprint_label_absent() {
        let repo = MockRepository::new().with_page("100", "DOCS", "T", 1);
        let config = config();
        let outcome = run(&repo, &config, DOC).unwrap();

        assert_eq!(outcome.action, SyncAction::Update);
        assert!(
            !repo
                .mutations()
                .iter()
                .any(|c| matches!(c, RepositoryCall::DeleteLabel { .. }))
        );
        assert_eq!(
            fingerprint_labels(&repo, "100"),
            vec![fingerprint().as_str().to_owned()]
        );
    }

    #[test]
    fn test_duplicate_fingerprint_labels_all_removed() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 2)
            .with_label("100", "sha-11111111")
            .with_label("100", "sha-22222222");
        let config = config();
        let outcome = run(&repo, &config, DOC).unwrap();

        assert_eq!(outcome.action, SyncAction::Update);
        assert_eq!(
            fingerprint_labels(&repo, "100"),
            vec![fingerprint().as_str().to_owned()]
        );
    }

    #[test]
    fn test_duplicate_labels_compare_smallest() {
        let current = fingerprint();
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 2)
            .with_label("100", current.as_str())
            .with_label("100", "sha-ffffffff");
        let config = config();
        let outcome = run(&repo, &config, DOC).unwrap();

        // "sha-ffffffff" sorts after every other fingerprint.
        assert_eq!(outcome.action, SyncAction::Skip);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let repo = MockRepository::new();
        let config = config();
        run(&repo, &config, DOC).unwrap();
        repo.clear_calls();

        let outcome = run(&repo, &config, DOC).unwrap();
        assert_eq!(outcome.action, SyncAction::Skip);
        assert!(repo.mutations().is_empty());
    }

    #[test]
    fn test_parent_title_resolved() {
        let repo = MockRepository::new().with_page("7", "DOCS", "Guides", 1);
        let config = config();
        let text = "---\nspace: DOCS\npage_title: T\nparent_title: Guides\n---\nHello\n";
        let outcome = run(&repo, &config, text).unwrap();

        let (_, parent) = repo.content(&outcome.page_id.unwrap()).unwrap();
        assert_eq!(parent.as_deref(), Some("7"));
    }

    #[test]
    fn test_parent_title_not_found() {
        let repo = MockRepository::new();
        let config = config();
        let text = "---\nspace: DOCS\npage_title: T\nparent_title: Guides\n---\nHello\n";
        let err = run(&repo, &config, text).unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::ParentNotFound);
        assert!(repo.mutations().is_empty());
    }

    #[test]
    fn test_validation_failure_makes_no_calls() {
        let repo = MockRepository::new();
        let config = config();
        let err = run(&repo, &config, "---\nspace: DOCS\nparent_id: 1\n---\n").unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::MissingTitle);
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_missing_space_makes_no_calls() {
        let repo = MockRepository::new();
        let config = config();
        let err = run(&repo, &config, "---\npage_title: T\nparent_id: 1\n---\n").unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::MissingSpace);
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_lookup_failure() {
        let repo = MockRepository::new().with_failure(Operation::Find);
        let config = config();
        let err = run(&repo, &config, DOC).unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::LookupFailure);
    }

    #[test]
    fn test_label_read_failure() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 1)
            .with_failure(Operation::GetLabels);
        let config = config();
        let err = run(&repo, &config, DOC).unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::LookupFailure);
        assert!(repo.mutations().is_empty());
    }

    #[test]
    fn test_create_failure() {
        let repo = MockRepository::new().with_failure(Operation::Create);
        let config = config();
        let err = run(&repo, &config, DOC).unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::CreateFailure);
    }

    #[test]
    fn test_update_failure_leaves_page_unlabeled() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 3)
            .with_label("100", "sha-00000000")
            .with_failure(Operation::Update);
        let config = config();
        let err = run(&repo, &config, DOC).unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::UpdateFailure);
        assert!(fingerprint_labels(&repo, "100").is_empty());
        assert_eq!(repo.page("100").unwrap().version, 3);
    }

    #[test]
    fn test_rerun_after_partial_update_heals() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 3)
            .with_label("100", "sha-00000000")
            .with_failure(Operation::Update);
        let config = config();
        run(&repo, &config, DOC).unwrap_err();

        repo.clear_failures();
        let outcome = run(&repo, &config, DOC).unwrap();
        assert_eq!(outcome.action, SyncAction::Update);
        assert_eq!(repo.page("100").unwrap().version, 4);
        assert_eq!(
            fingerprint_labels(&repo, "100"),
            vec![fingerprint().as_str().to_owned()]
        );
    }

    #[test]
    fn test_version_overflow_is_update_failure() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", u32::MAX)
            .with_label("100", "sha-00000000");
        let config = config();
        let err = run(&repo, &config, DOC).unwrap_err();

        assert_eq!(err.kind(), SyncErrorKind::UpdateFailure);
        assert!(repo.mutations().is_empty());
        assert!(repo.labels("100").contains("sha-00000000"));
    }

    #[test]
    fn test_label_add_failure() {
        let repo = MockRepository::new().with_failure(Operation::AddLabel);
        let config = config();
        let err = run(&repo, &config, DOC).unwrap_err();
        assert_eq!(err.kind(), SyncErrorKind::LabelFailure);
    }

    #[test]
    fn test_dry_run_create() {
        let repo = MockRepository::new();
        let config = SyncConfig {
            dry_run: true,
            ..SyncConfig::default()
        };
        let outcome = run(&repo, &config, DOC).unwrap();

        assert_eq!(outcome.action, SyncAction::Create);
        assert!(outcome.dry_run);
        assert_eq!(outcome.page_id, None);
        assert!(repo.mutations().is_empty());
    }

    #[test]
    fn test_dry_run_update() {
        let repo = MockRepository::new()
            .with_page("100", "DOCS", "T", 3)
            .with_label("100", "sha-00000000");
        let config = SyncConfig {
            dry_run: true,
            ..SyncConfig::default()
        };
        let outcome = run(&repo, &config, DOC).unwrap();

        assert_eq!(outcome.action, SyncAction::Update);
        assert_eq!(outcome.version, Some(4));
        assert!(repo.mutations().is_empty());
        assert_eq!(repo.page("100").unwrap().version, 3);
    }

    #[test]
    fn test_code_block_rendered_as_macro() {
        let repo = MockRepository::new();
        let config = config();
        let text = "---\nspace: DOCS\npage_title: T\nparent_id: 1\n---\n```python\nprint(1)\n```\n";
        let outcome = run(&repo, &config, text).unwrap();

        let (body, _) = repo.content(&outcome.page_id.unwrap()).unwrap();
        assert!(body.contains(r#"<ac:structured-macro ac:name="code">"#));
        assert!(body.contains(r#"<ac:parameter ac:name="language">python</ac:parameter>"#));
        assert!(body.contains("<![CDATA[print(1)\n]]>"));
    }
}
