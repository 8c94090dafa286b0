//! In-memory page repository and document source for testing.
//!
//! Provides [`MockRepository`] and [`MemorySource`] for exercising the sync
//! engine without a Confluence instance or filesystem.

use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use crate::error::RepositoryError;
use crate::repository::{PageContent, PageRepository, RemotePage};
use crate::source::DocumentSource;

/// Repository operation, used for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Find,
    GetById,
    GetLabels,
    AddLabel,
    DeleteLabel,
    Create,
    Update,
}

/// A call recorded by [`MockRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryCall {
    Find { space_key: String, title: String },
    GetById { page_id: String },
    GetLabels { page_id: String },
    AddLabel { page_id: String, label: String },
    DeleteLabel { page_id: String, label: String },
    Create { space_key: String, title: String, parent_id: String },
    Update { page_id: String, version: u32 },
}

impl RepositoryCall {
    /// Whether the call changes remote state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::AddLabel { .. }
                | Self::DeleteLabel { .. }
                | Self::Create { .. }
                | Self::Update { .. }
        )
    }
}

#[derive(Debug)]
struct StoredPage {
    page: RemotePage,
    parent_id: Option<String>,
    body: String,
    labels: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct State {
    pages: Vec<StoredPage>,
    calls: Vec<RepositoryCall>,
    failures: HashSet<Operation>,
    next_id: u64,
}

impl State {
    fn check(&self, op: Operation) -> Result<(), RepositoryError> {
        if self.failures.contains(&op) {
            return Err(RepositoryError::new(format!("injected {op:?} failure")));
        }
        Ok(())
    }

    fn page_mut(&mut self, page_id: &str) -> Result<&mut StoredPage, RepositoryError> {
        self.pages
            .iter_mut()
            .find(|p| p.page.id == page_id)
            .ok_or_else(|| RepositoryError::new(format!("page {page_id} not found")))
    }
}

/// In-memory page repository.
///
/// Pages keep their insertion order, so `find` returns matches in the order
/// they were added. Every call is recorded, including failed ones.
///
/// # Example
///
/// ```ignore
/// use m2c_sync::mock::MockRepository;
///
/// let repo = MockRepository::new()
///     .with_page("100", "DOCS", "Guide", 3)
///     .with_label("100", "sha-deadbeef");
/// ```
#[derive(Debug, Default)]
pub struct MockRepository {
    state: Mutex<State>,
}

impl MockRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(
        self,
        id: impl Into<String>,
        space_key: impl Into<String>,
        title: impl Into<String>,
        version: u32,
    ) -> Self {
        self.state.lock().unwrap().pages.push(StoredPage {
            page: RemotePage {
                id: id.into(),
                title: title.into(),
                space_key: space_key.into(),
                version,
            },
            parent_id: None,
            body: String::new(),
            labels: BTreeSet::new(),
        });
        self
    }

    /// Attach a label to an existing page.
    ///
    /// # Panics
    ///
    /// Panics if the page doesn't exist or the internal lock is poisoned.
    #[must_use]
    pub fn with_label(self, page_id: &str, label: impl Into<String>) -> Self {
        self.state
            .lock()
            .unwrap()
            .page_mut(page_id)
            .unwrap()
            .labels
            .insert(label.into());
        self
    }

    /// Make every call of `op` fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, op: Operation) -> Self {
        self.state.lock().unwrap().failures.insert(op);
        self
    }

    /// Stop injecting failures.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// All recorded calls in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<RepositoryCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded calls that change remote state.
    #[must_use]
    pub fn mutations(&self) -> Vec<RepositoryCall> {
        self.calls()
            .into_iter()
            .filter(RepositoryCall::is_mutation)
            .collect()
    }

    /// Forget recorded calls, keeping pages and labels.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Current state of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, page_id: &str) -> Option<RemotePage> {
        let state = self.state.lock().unwrap();
        state
            .pages
            .iter()
            .find(|p| p.page.id == page_id)
            .map(|p| p.page.clone())
    }

    /// Current labels of a page (empty if the page doesn't exist).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn labels(&self, page_id: &str) -> BTreeSet<String> {
        let state = self.state.lock().unwrap();
        state
            .pages
            .iter()
            .find(|p| p.page.id == page_id)
            .map(|p| p.labels.clone())
            .unwrap_or_default()
    }

    /// Current body and parent of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, page_id: &str) -> Option<(String, Option<String>)> {
        let state = self.state.lock().unwrap();
        state
            .pages
            .iter()
            .find(|p| p.page.id == page_id)
            .map(|p| (p.body.clone(), p.parent_id.clone()))
    }

    /// Number of stored pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.state.lock().unwrap().pages.len()
    }
}

impl PageRepository for MockRepository {
    fn find(&self, space_key: &str, title: &str) -> Result<Vec<RemotePage>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::Find {
            space_key: space_key.to_owned(),
            title: title.to_owned(),
        });
        state.check(Operation::Find)?;
        Ok(state
            .pages
            .iter()
            .filter(|p| p.page.space_key == space_key && p.page.title == title)
            .map(|p| p.page.clone())
            .collect())
    }

    fn get_by_id(&self, page_id: &str) -> Result<RemotePage, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::GetById {
            page_id: page_id.to_owned(),
        });
        state.check(Operation::GetById)?;
        Ok(state.page_mut(page_id)?.page.clone())
    }

    fn get_labels(&self, page_id: &str) -> Result<BTreeSet<String>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::GetLabels {
            page_id: page_id.to_owned(),
        });
        state.check(Operation::GetLabels)?;
        Ok(state.page_mut(page_id)?.labels.clone())
    }

    fn add_label(&self, page_id: &str, label: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::AddLabel {
            page_id: page_id.to_owned(),
            label: label.to_owned(),
        });
        state.check(Operation::AddLabel)?;
        state.page_mut(page_id)?.labels.insert(label.to_owned());
        Ok(())
    }

    fn delete_label(&self, page_id: &str, label: &str) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::DeleteLabel {
            page_id: page_id.to_owned(),
            label: label.to_owned(),
        });
        state.check(Operation::DeleteLabel)?;
        state.page_mut(page_id)?.labels.remove(label);
        Ok(())
    }

    fn create(&self, content: &PageContent<'_>) -> Result<RemotePage, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::Create {
            space_key: content.space_key.to_owned(),
            title: content.title.to_owned(),
            parent_id: content.parent_id.to_owned(),
        });
        state.check(Operation::Create)?;
        state.next_id += 1;
        let page = RemotePage {
            id: format!("new-{}", state.next_id),
            title: content.title.to_owned(),
            space_key: content.space_key.to_owned(),
            version: 1,
        };
        state.pages.push(StoredPage {
            page: page.clone(),
            parent_id: Some(content.parent_id.to_owned()),
            body: content.body.to_owned(),
            labels: BTreeSet::new(),
        });
        Ok(page)
    }

    fn update(
        &self,
        page_id: &str,
        content: &PageContent<'_>,
        new_version: u32,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RepositoryCall::Update {
            page_id: page_id.to_owned(),
            version: new_version,
        });
        state.check(Operation::Update)?;
        let stored = state.page_mut(page_id)?;
        if new_version != stored.page.version + 1 {
            return Err(RepositoryError::new(format!(
                "version conflict: page {page_id} is at {}, got {new_version}",
                stored.page.version
            )));
        }
        stored.page.version = new_version;
        stored.page.title = content.title.to_owned();
        stored.page.space_key = content.space_key.to_owned();
        stored.parent_id = Some(content.parent_id.to_owned());
        stored.body = content.body.to_owned();
        Ok(())
    }
}

/// In-memory document source.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: Vec<(String, Option<Vec<u8>>)>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document.
    #[must_use]
    pub fn with_document(mut self, id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.documents.push((id.into(), Some(content.into())));
        self
    }

    /// Add a document whose read always fails.
    #[must_use]
    pub fn with_unreadable(mut self, id: impl Into<String>) -> Self {
        self.documents.push((id.into(), None));
        self
    }
}

impl DocumentSource for MemorySource {
    fn list(&self) -> Vec<String> {
        self.documents.iter().map(|(id, _)| id.clone()).collect()
    }

    fn read(&self, id: &str) -> std::io::Result<Vec<u8>> {
        self.documents
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .and_then(|(_, content)| content.clone())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("{id}: unreadable"))
            })
    }
}
