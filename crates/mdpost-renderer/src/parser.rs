//! Markdown parser producing an owned [`Document`].
//!
//! `pulldown-cmark` emits a flat event stream; this module folds it into the
//! arena tree by keeping a stack of open container nodes.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

use crate::ast::{CodeBlockNode, Document, ImageNode, LinkNode, NodeId, NodeValue};
use crate::util::heading_level_to_num;

/// Configured markdown parser.
#[derive(Clone, Debug)]
pub struct MarkdownParser {
    gfm: bool,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownParser {
    /// Create a parser with GFM extensions enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Parse markdown text into a document tree.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Document {
        let mut doc = Document::new();
        let mut stack: Vec<NodeId> = vec![doc.root()];

        for event in Parser::new_ext(markdown, self.options()) {
            let parent = stack.last().copied().unwrap_or_else(|| doc.root());
            match event {
                Event::Start(tag) => {
                    let id = doc.append(parent, tag_value(tag));
                    stack.push(id);
                }
                Event::End(_) => {
                    // Never pop the root, even on unbalanced input.
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Event::Text(text) => match doc.value_mut(parent) {
                    NodeValue::CodeBlock(block) => block.literal.push_str(&text),
                    _ => {
                        doc.append(parent, NodeValue::Text(text.into_string()));
                    }
                },
                Event::Html(html) => match doc.value_mut(parent) {
                    NodeValue::HtmlBlock { literal } => literal.push_str(&html),
                    _ => {
                        doc.append(parent, NodeValue::InlineHtml(html.into_string()));
                    }
                },
                Event::InlineHtml(html) => {
                    doc.append(parent, NodeValue::InlineHtml(html.into_string()));
                }
                Event::Code(code) => {
                    doc.append(parent, NodeValue::Code(code.into_string()));
                }
                Event::SoftBreak => {
                    doc.append(parent, NodeValue::SoftBreak);
                }
                Event::HardBreak => {
                    doc.append(parent, NodeValue::HardBreak);
                }
                Event::Rule => {
                    doc.append(parent, NodeValue::ThematicBreak);
                }
                Event::TaskListMarker(checked) => {
                    doc.append(parent, NodeValue::TaskListMarker { checked });
                }
                Event::FootnoteReference(text)
                | Event::InlineMath(text)
                | Event::DisplayMath(text) => {
                    // Not enabled in options; keep the raw text if it ever appears.
                    doc.append(parent, NodeValue::Text(text.into_string()));
                }
            }
        }

        doc
    }
}

fn tag_value(tag: Tag<'_>) -> NodeValue {
    match tag {
        Tag::Paragraph => NodeValue::Paragraph,
        Tag::Heading { level, .. } => NodeValue::Heading {
            level: heading_level_to_num(level),
        },
        Tag::BlockQuote(_) => NodeValue::BlockQuote,
        Tag::CodeBlock(kind) => NodeValue::CodeBlock(CodeBlockNode {
            info: match kind {
                CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                    Some(info.trim().to_owned())
                }
                _ => None,
            },
            literal: String::new(),
        }),
        Tag::HtmlBlock => NodeValue::HtmlBlock {
            literal: String::new(),
        },
        Tag::List(start) => NodeValue::List { start },
        Tag::Item => NodeValue::Item,
        Tag::Table(alignments) => NodeValue::Table { alignments },
        Tag::TableHead => NodeValue::TableHead,
        Tag::TableRow => NodeValue::TableRow,
        Tag::TableCell => NodeValue::TableCell,
        Tag::Emphasis => NodeValue::Emphasis,
        Tag::Strong => NodeValue::Strong,
        Tag::Strikethrough => NodeValue::Strikethrough,
        Tag::Link {
            dest_url, title, ..
        } => NodeValue::Link(LinkNode {
            destination: dest_url.into_string(),
            title: title.into_string(),
        }),
        Tag::Image {
            dest_url, title, ..
        } => NodeValue::Image(ImageNode {
            destination: dest_url.into_string(),
            title: title.into_string(),
            attributes: Vec::new(),
        }),
        Tag::FootnoteDefinition(_)
        | Tag::DefinitionList
        | Tag::DefinitionListTitle
        | Tag::DefinitionListDefinition
        | Tag::Superscript
        | Tag::Subscript
        | Tag::MetadataBlock(_) => NodeValue::Fragment,
    }
}
