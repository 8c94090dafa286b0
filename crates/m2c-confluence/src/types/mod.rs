//! Confluence API types.

mod label;
mod page;

pub use label::{Label, LabelsResponse};
pub use page::{Ancestor, Page, SearchResponse, Space, Version};
