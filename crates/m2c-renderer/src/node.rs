//! Document nodes seen by the storage renderer.

use pulldown_cmark::{CodeBlockKind, Event, Tag, TagEnd};

/// A code block collected from the event stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBlock {
    /// Raw fence info string (`None` for indented blocks or bare fences).
    pub info: Option<String>,
    /// Code text exactly as written, including the trailing newline.
    pub literal: String,
}

impl CodeBlock {
    /// Language annotation: the first word of the info string.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.info
            .as_deref()
            .and_then(|info| info.split_whitespace().next())
    }
}

/// Rendering node.
///
/// Only code blocks are special-cased; everything else stays a raw parser event.
#[derive(Debug)]
pub enum Node<'a> {
    /// A complete fenced or indented code block.
    CodeBlock(CodeBlock),
    /// Any other parser event, rendered by the default HTML writer.
    Event(Event<'a>),
}

/// Iterator adapter folding `Start(CodeBlock) .. End(CodeBlock)` runs into [`Node::CodeBlock`].
pub struct Nodes<I> {
    events: I,
}

impl<I> Nodes<I> {
    /// Wrap a parser event iterator.
    pub fn new(events: I) -> Self {
        Self { events }
    }
}

impl<'a, I> Iterator for Nodes<I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.events.next()? {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let info = info.trim();
                        (!info.is_empty()).then(|| info.to_owned())
                    }
                    CodeBlockKind::Indented => None,
                };
                let mut literal = String::new();
                for event in self.events.by_ref() {
                    match event {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => literal.push_str(&text),
                        // Code blocks only carry text; anything else would be a parser quirk.
                        _ => {}
                    }
                }
                Some(Node::CodeBlock(CodeBlock { info, literal }))
            }
            event => Some(Node::Event(event)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use pulldown_cmark::Parser;

    use super::*;

    fn code_blocks(markdown: &str) -> Vec<CodeBlock> {
        Nodes::new(Parser::new(markdown))
            .filter_map(|node| match node {
                Node::CodeBlock(block) => Some(block),
                Node::Event(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_fenced_block_with_language() {
        let blocks = code_blocks("```python\nprint(1)\n```\n");
        assert_eq!(
            blocks,
            vec![CodeBlock {
                info: Some("python".to_owned()),
                literal: "print(1)\n".to_owned(),
            }]
        );
        assert_eq!(blocks[0].language(), Some("python"));
    }

    #[test]
    fn test_language_is_first_word_of_info() {
        let blocks = code_blocks("```rust ignore\nfn main() {}\n```\n");
        assert_eq!(blocks[0].info.as_deref(), Some("rust ignore"));
        assert_eq!(blocks[0].language(), Some("rust"));
    }

    #[test]
    fn test_bare_fence_has_no_language() {
        let blocks = code_blocks("```\nplain\n```\n");
        assert_eq!(blocks[0].info, None);
        assert_eq!(blocks[0].language(), None);
    }

    #[test]
    fn test_indented_block() {
        let blocks = code_blocks("Text\n\n    indented code\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].info, None);
        assert_eq!(blocks[0].literal, "indented code\n");
    }

    #[test]
    fn test_other_events_pass_through() {
        let nodes: Vec<_> = Nodes::new(Parser::new("Hello *world*")).collect();
        assert!(nodes.iter().all(|n| matches!(n, Node::Event(_))));
        assert!(!nodes.is_empty());
    }
}
