//! Confluence REST API client for markdown page sync.
//!
//! [`ConfluenceClient`] talks to the Confluence Cloud / Server REST API with
//! HTTP Basic authentication (user plus password or API token) and
//! implements [`m2c_sync::PageRepository`] on top of it.
//!
//! # Example
//!
//! ```ignore
//! use m2c_confluence::ConfluenceClient;
//!
//! let client = ConfluenceClient::from_config(config.require_confluence()?);
//! let pages = client.find_pages("DOCS", "Runbook")?;
//! ```

mod client;
mod error;
mod repository;
mod types;

pub use client::ConfluenceClient;
pub use error::ConfluenceError;
pub use types::{Ancestor, Label, LabelsResponse, Page, SearchResponse, Space, Version};
