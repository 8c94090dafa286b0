//! Markdown to Confluence storage format renderer.

use m2c_config::RenderConfig;
use pulldown_cmark::{CowStr, Event, Options, Parser, html};

use crate::code_macro::CodeMacro;
use crate::node::{CodeBlock, Node, Nodes};

/// Renders markdown bodies to Confluence XHTML storage format.
#[derive(Clone, Debug)]
pub struct StorageRenderer {
    gfm: bool,
    code_macro: CodeMacro,
}

impl Default for StorageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageRenderer {
    /// Create a new renderer with GFM enabled and escaped code languages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gfm: true,
            code_macro: CodeMacro::new(),
        }
    }

    /// Create a renderer from the `[render]` configuration section.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new()
            .with_gfm(config.gfm)
            .escape_code_language(config.escape_code_language)
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Enable or disable escaping of code block language names.
    #[must_use]
    pub fn escape_code_language(mut self, enabled: bool) -> Self {
        self.code_macro = self.code_macro.escape_language(enabled);
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render a markdown body to storage markup.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        render_with(parser, |block| self.code_macro.render(block))
    }
}

/// Render parser events to markup, calling `code_block` once per code block.
///
/// Every other node is written by the default `pulldown-cmark` HTML writer.
pub fn render_with<'a, I, F>(events: I, mut code_block: F) -> String
where
    I: Iterator<Item = Event<'a>>,
    F: FnMut(&CodeBlock) -> String,
{
    let mut out = String::new();
    let events = Nodes::new(events).map(|node| match node {
        Node::CodeBlock(block) => Event::Html(CowStr::from(code_block(&block))),
        Node::Event(event) => event,
    });
    html::push_html(&mut out, events);
    out
}
