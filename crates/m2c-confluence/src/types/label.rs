//! Confluence label types.

use serde::{Deserialize, Serialize};

/// Content label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    /// Label prefix (`global` for user-visible labels).
    pub prefix: String,
    /// Label name.
    pub name: String,
}

impl Label {
    /// Create a global label.
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            prefix: "global".to_owned(),
            name: name.into(),
        }
    }
}

/// Labels API response.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelsResponse {
    /// Labels on the content.
    pub results: Vec<Label>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_global_label_serialization() {
        let json = serde_json::to_string(&[Label::global("sha-2cf24dba")]).unwrap();
        assert_eq!(json, r#"[{"prefix":"global","name":"sha-2cf24dba"}]"#);
    }

    #[test]
    fn test_labels_response() {
        let json = r#"{
            "results": [
                {"prefix": "global", "name": "sha-2cf24dba", "id": "9"},
                {"prefix": "global", "name": "runbook", "id": "10"}
            ],
            "size": 2
        }"#;
        let response: LabelsResponse = serde_json::from_str(json).unwrap();
        let names: Vec<_> = response.results.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["sha-2cf24dba", "runbook"]);
    }
}
