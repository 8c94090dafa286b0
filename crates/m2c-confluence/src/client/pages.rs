//! Page operations for Confluence API.

use m2c_sync::PageContent;
use serde_json::{Value, json};
use tracing::info;

use super::{ConfluenceClient, check_status};
use crate::error::ConfluenceError;
use crate::types::{Ancestor, Page, SearchResponse, Space, Version};

/// Expansions needed to map a page onto a remote page record.
const PAGE_EXPAND: &str = "version,space";

impl ConfluenceClient {
    /// Find pages by exact title within a space.
    pub fn find_pages(&self, space_key: &str, title: &str) -> Result<Vec<Page>, ConfluenceError> {
        let url = format!("{}/content", self.api_url);

        info!("Searching for page '{}' in space {}", title, space_key);

        let response = self
            .agent
            .get(&url)
            .query("title", title)
            .query("spaceKey", space_key)
            .query("expand", PAGE_EXPAND)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let search: SearchResponse = check_status(response)?.read_json()?;
        Ok(search.results)
    }

    /// Get page by ID with version and space expanded.
    pub fn get_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url, page_id);

        info!("Getting page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .query("expand", PAGE_EXPAND)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        Ok(check_status(response)?.read_json()?)
    }

    /// Create a page under a parent.
    pub fn create_page(&self, content: &PageContent<'_>) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url);
        let payload_bytes = serde_json::to_vec(&page_payload(content, None))?;

        info!(
            "Creating page '{}' in space {}",
            content.title, content.space_key
        );

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = check_status(response)?.read_json()?;
        info!("Created page {}", page.id);
        Ok(page)
    }

    /// Replace page content, setting its version to `new_version`.
    pub fn update_page(
        &self,
        page_id: &str,
        content: &PageContent<'_>,
        new_version: u32,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url, page_id);

        let mut payload = page_payload(content, Some(new_version));
        payload["id"] = json!(page_id);
        let payload_bytes = serde_json::to_vec(&payload)?;

        info!("Updating page {} to version {}", page_id, new_version);

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        Ok(check_status(response)?.read_json()?)
    }
}

/// Build a create/update payload in storage representation.
fn page_payload(content: &PageContent<'_>, version: Option<u32>) -> Value {
    let space = Space {
        key: content.space_key.to_owned(),
    };
    let ancestors = [Ancestor {
        id: content.parent_id.to_owned(),
    }];
    let mut payload = json!({
        "type": "page",
        "status": "current",
        "title": content.title,
        "space": space,
        "ancestors": ancestors,
        "body": {
            "storage": {
                "value": content.body,
                "representation": "storage"
            }
        }
    });

    if let Some(number) = version {
        payload["version"] = json!(Version { number });
    }

    payload
}
