//! Markdown to Confluence storage format renderer.
//!
//! Rendering is a single top-to-bottom walk over `pulldown-cmark` events.
//! Fenced and indented code blocks are folded into [`Node::CodeBlock`] and
//! rewritten into the Confluence code macro; every other node goes through
//! the stock `pulldown-cmark` HTML writer unchanged.
//!
//! # Example
//!
//! ```
//! use m2c_renderer::StorageRenderer;
//!
//! let markup = StorageRenderer::new().render("```python\nprint(1)\n```\n");
//! assert!(markup.contains(r#"<ac:parameter ac:name="language">python</ac:parameter>"#));
//! ```

mod code_macro;
mod node;
mod renderer;

pub use code_macro::{CodeMacro, escape_html};
pub use node::{CodeBlock, Node, Nodes};
pub use renderer::{StorageRenderer, render_with};
