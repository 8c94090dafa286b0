//! Label operations for Confluence API.

use tracing::info;

use super::{ConfluenceClient, check_status};
use crate::error::ConfluenceError;
use crate::types::{Label, LabelsResponse};

impl ConfluenceClient {
    /// List labels on a page.
    pub fn list_labels(&self, page_id: &str) -> Result<Vec<Label>, ConfluenceError> {
        let url = format!("{}/content/{}/label", self.api_url, page_id);

        info!("Getting labels for page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let labels: LabelsResponse = check_status(response)?.read_json()?;
        Ok(labels.results)
    }

    /// Add global labels to a page.
    pub fn add_labels(&self, page_id: &str, names: &[&str]) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}/label", self.api_url, page_id);
        let labels: Vec<Label> = names.iter().map(|n| Label::global(*n)).collect();
        let payload_bytes = serde_json::to_vec(&labels)?;

        info!("Adding labels {:?} to page {}", names, page_id);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        check_status(response)?;
        Ok(())
    }

    /// Remove a label from a page.
    pub fn remove_label(&self, page_id: &str, name: &str) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}/label", self.api_url, page_id);

        info!("Removing label '{}' from page {}", name, page_id);

        let response = self
            .agent
            .delete(&url)
            .query("name", name)
            .header("Authorization", &self.auth_header)
            .call()?;

        check_status(response)?;
        Ok(())
    }
}
