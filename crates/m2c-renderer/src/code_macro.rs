//! Confluence code macro emission.
//!
//! A code block becomes, one part per line:
//!
//! ```text
//! <ac:structured-macro ac:name="code">
//! <ac:parameter ac:name="language">LANGUAGE</ac:parameter>
//! <ac:plain-text-body><![CDATA[BODY]]></ac:plain-text-body>
//! </ac:structured-macro>
//! ```
//!
//! The language line is left out entirely when the block has no annotation.

use crate::node::CodeBlock;

const MACRO_START: &str = r#"<ac:structured-macro ac:name="code">"#;
const MACRO_STOP: &str = "</ac:structured-macro>";

/// Code macro writer.
#[derive(Clone, Copy, Debug)]
pub struct CodeMacro {
    escape_language: bool,
}

impl Default for CodeMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeMacro {
    /// Create a writer that escapes the language parameter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            escape_language: true,
        }
    }

    /// Toggle escaping of the language parameter.
    ///
    /// Disabling reproduces the verbatim substitution of older publishers
    /// byte for byte, at the cost of letting a hostile info string break the markup.
    #[must_use]
    pub fn escape_language(mut self, enabled: bool) -> Self {
        self.escape_language = enabled;
        self
    }

    /// Render one code block as a code macro.
    #[must_use]
    pub fn render(&self, block: &CodeBlock) -> String {
        let mut parts = Vec::with_capacity(4);
        parts.push(MACRO_START.to_owned());

        if let Some(lang) = block.language() {
            let lang = if self.escape_language {
                escape_html(lang)
            } else {
                lang.to_owned()
            };
            parts.push(format!(
                r#"<ac:parameter ac:name="language">{lang}</ac:parameter>"#
            ));
        }

        parts.push(format!(
            "<ac:plain-text-body><![CDATA[{}]]></ac:plain-text-body>",
            cdata_safe(&block.literal)
        ));
        parts.push(MACRO_STOP.to_owned());

        parts.join("\n")
    }
}

/// Split any `]]>` so the literal survives inside a single CDATA envelope.
fn cdata_safe(literal: &str) -> String {
    literal.replace("]]>", "]]]]><![CDATA[>")
}

/// Escape markup-special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn block(info: Option<&str>, literal: &str) -> CodeBlock {
        CodeBlock {
            info: info.map(str::to_owned),
            literal: literal.to_owned(),
        }
    }

    #[test]
    fn test_code_macro_with_language() {
        let out = CodeMacro::new().render(&block(Some("python"), "print(1)"));
        assert_eq!(
            out,
            "<ac:structured-macro ac:name=\"code\">\n\
             <ac:parameter ac:name=\"language\">python</ac:parameter>\n\
             <ac:plain-text-body><![CDATA[print(1)]]></ac:plain-text-body>\n\
             </ac:structured-macro>"
        );
    }

    #[test]
    fn test_code_macro_without_language() {
        let out = CodeMacro::new().render(&block(None, "plain"));
        assert_eq!(
            out,
            "<ac:structured-macro ac:name=\"code\">\n\
             <ac:plain-text-body><![CDATA[plain]]></ac:plain-text-body>\n\
             </ac:structured-macro>"
        );
        assert!(!out.contains("ac:parameter"));
    }

    #[test]
    fn test_body_is_not_escaped() {
        let out = CodeMacro::new().render(&block(Some("html"), "<b>&amp;</b>\n"));
        assert!(out.contains("<![CDATA[<b>&amp;</b>\n]]>"));
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        let out = CodeMacro::new().render(&block(None, "a]]>b"));
        assert!(out.contains("<![CDATA[a]]]]><![CDATA[>b]]>"));
    }

    #[test]
    fn test_language_escaped_by_default() {
        let out = CodeMacro::new().render(&block(Some("c<script>"), "x"));
        assert!(out.contains(r#"<ac:parameter ac:name="language">c&lt;script&gt;</ac:parameter>"#));
    }

    #[test]
    fn test_language_verbatim_when_escaping_disabled() {
        let out = CodeMacro::new()
            .escape_language(false)
            .render(&block(Some("c<script>"), "x"));
        assert!(out.contains(r#"<ac:parameter ac:name="language">c<script></ac:parameter>"#));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b<c>"d"'e"#), "a&amp;b&lt;c&gt;&quot;d&quot;&#x27;e");
    }
}
