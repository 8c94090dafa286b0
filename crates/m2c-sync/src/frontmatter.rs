//! YAML front matter extraction.
//!
//! A document may open with a `---` line followed by YAML and a closing
//! `---` (or `...`) line. Everything after the closing line is the body.

use serde::{Deserialize, Deserializer};

/// Metadata fields recognized in front matter.
///
/// Empty values are normalized to `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Target space key.
    #[serde(deserialize_with = "scalar_string")]
    pub space: Option<String>,
    /// Page title, unique within a space.
    #[serde(deserialize_with = "scalar_string")]
    pub page_title: Option<String>,
    /// Explicit parent page ID.
    #[serde(deserialize_with = "scalar_string")]
    pub parent_id: Option<String>,
    /// Parent page title, resolved within the space.
    #[serde(deserialize_with = "scalar_string")]
    pub parent_title: Option<String>,
}

/// Front matter parse failure.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("front matter block is not terminated")]
    Unterminated,
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Split a document into front matter and body.
///
/// Documents without an opening delimiter have empty front matter and the
/// whole text as body.
pub fn split(text: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let Some(rest) = strip_delimiter_line(text, "---") else {
        return Ok((FrontMatter::default(), text));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((parse_yaml(yaml)?, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

/// Strip `delimiter` plus its line ending from the start of `text`.
fn strip_delimiter_line<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(delimiter)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn parse_yaml(yaml: &str) -> Result<FrontMatter, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Accept any YAML scalar as a string; numeric page IDs are common.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a scalar value, found {other:?}"
            )));
        }
    };
    Ok(text.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()))
}
