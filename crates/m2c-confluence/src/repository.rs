//! [`PageRepository`] implementation over the REST client.

use std::collections::BTreeSet;

use m2c_sync::{PageContent, PageRepository, RemotePage, RepositoryError};

use crate::client::ConfluenceClient;
use crate::types::Page;

/// Map an API page onto a remote page record.
///
/// `fallback_space` is used when the response lacks the space expansion.
fn remote_page(page: Page, fallback_space: &str) -> RemotePage {
    RemotePage {
        space_key: page
            .space
            .map_or_else(|| fallback_space.to_owned(), |s| s.key),
        version: page.version.map_or(1, |v| v.number),
        id: page.id,
        title: page.title,
    }
}

impl PageRepository for ConfluenceClient {
    fn find(&self, space_key: &str, title: &str) -> Result<Vec<RemotePage>, RepositoryError> {
        Ok(self
            .find_pages(space_key, title)?
            .into_iter()
            .map(|page| remote_page(page, space_key))
            .collect())
    }

    fn get_by_id(&self, page_id: &str) -> Result<RemotePage, RepositoryError> {
        let page = self.get_page(page_id)?;
        if page.version.is_none() {
            return Err(RepositoryError::new(format!(
                "page {page_id} response has no version"
            )));
        }
        Ok(remote_page(page, ""))
    }

    fn get_labels(&self, page_id: &str) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(self
            .list_labels(page_id)?
            .into_iter()
            .map(|label| label.name)
            .collect())
    }

    fn add_label(&self, page_id: &str, label: &str) -> Result<(), RepositoryError> {
        Ok(self.add_labels(page_id, &[label])?)
    }

    fn delete_label(&self, page_id: &str, label: &str) -> Result<(), RepositoryError> {
        Ok(self.remove_label(page_id, label)?)
    }

    fn create(&self, content: &PageContent<'_>) -> Result<RemotePage, RepositoryError> {
        let page = self.create_page(content)?;
        Ok(remote_page(page, content.space_key))
    }

    fn update(
        &self,
        page_id: &str,
        content: &PageContent<'_>,
        new_version: u32,
    ) -> Result<(), RepositoryError> {
        self.update_page(page_id, content, new_version)?;
        Ok(())
    }
}
