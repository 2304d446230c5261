//! Built-in HTML rendering rules.
//!
//! Produces an HTML5 fragment. Block elements are followed by a newline;
//! void elements use HTML5 syntax without a closing slash.

use std::fmt::Write;

use pulldown_cmark::Alignment;

use crate::ast::{Document, NodeId, NodeKind, NodeValue, WalkStatus};
use crate::error::RenderError;
use crate::render::NodeRenderer;
use crate::util::escape_html;

/// Default rendering rule for every node kind.
///
/// Used by [`HtmlRenderer`](crate::HtmlRenderer) whenever no override outranks it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHtmlRenderer;

impl NodeRenderer for DefaultHtmlRenderer {
    #[allow(clippy::too_many_lines)]
    fn render(
        &self,
        out: &mut String,
        doc: &Document,
        id: NodeId,
        entering: bool,
    ) -> Result<WalkStatus, RenderError> {
        match doc.value(id) {
            NodeValue::Document | NodeValue::Fragment => {}
            NodeValue::Paragraph => out.push_str(if entering { "<p>" } else { "</p>\n" }),
            NodeValue::Heading { level } => {
                if entering {
                    write!(out, "<h{level}>")?;
                } else {
                    writeln!(out, "</h{level}>")?;
                }
            }
            NodeValue::BlockQuote => {
                out.push_str(if entering {
                    "<blockquote>\n"
                } else {
                    "</blockquote>\n"
                });
            }
            NodeValue::CodeBlock(block) => {
                if entering {
                    if let Some(lang) = block.language() {
                        writeln!(
                            out,
                            r#"<pre><code class="language-{}">{}</code></pre>"#,
                            escape_html(lang),
                            escape_html(&block.literal)
                        )?;
                    } else {
                        writeln!(out, "<pre><code>{}</code></pre>", escape_html(&block.literal))?;
                    }
                }
                return Ok(WalkStatus::SkipChildren);
            }
            NodeValue::HtmlBlock { literal } => {
                if entering {
                    out.push_str(literal);
                }
            }
            NodeValue::List { start } => match (entering, start) {
                (true, Some(1)) => out.push_str("<ol>\n"),
                (true, Some(n)) => writeln!(out, r#"<ol start="{n}">"#)?,
                (true, None) => out.push_str("<ul>\n"),
                (false, Some(_)) => out.push_str("</ol>\n"),
                (false, None) => out.push_str("</ul>\n"),
            },
            NodeValue::Item => out.push_str(if entering { "<li>" } else { "</li>\n" }),
            NodeValue::ThematicBreak => {
                if entering {
                    out.push_str("<hr>\n");
                }
            }
            NodeValue::Table { .. } => {
                if entering {
                    out.push_str("<table>\n");
                } else {
                    if has_body_rows(doc, id) {
                        out.push_str("</tbody>\n");
                    }
                    out.push_str("</table>\n");
                }
            }
            NodeValue::TableHead => {
                out.push_str(if entering {
                    "<thead>\n<tr>\n"
                } else {
                    "</tr>\n</thead>\n"
                });
            }
            NodeValue::TableRow => {
                if entering {
                    if is_first_body_row(doc, id) {
                        out.push_str("<tbody>\n");
                    }
                    out.push_str("<tr>\n");
                } else {
                    out.push_str("</tr>\n");
                }
            }
            NodeValue::TableCell => {
                let tag = if in_table_head(doc, id) { "th" } else { "td" };
                if entering {
                    write!(out, "<{tag}{}>", cell_alignment_style(doc, id))?;
                } else {
                    writeln!(out, "</{tag}>")?;
                }
            }
            NodeValue::Text(text) => {
                if entering {
                    out.push_str(&escape_html(text));
                }
            }
            NodeValue::Code(code) => {
                if entering {
                    write!(out, "<code>{}</code>", escape_html(code))?;
                }
            }
            NodeValue::InlineHtml(html) => {
                if entering {
                    out.push_str(html);
                }
            }
            NodeValue::SoftBreak => {
                if entering {
                    out.push('\n');
                }
            }
            NodeValue::HardBreak => {
                if entering {
                    out.push_str("<br>\n");
                }
            }
            NodeValue::Emphasis => out.push_str(if entering { "<em>" } else { "</em>" }),
            NodeValue::Strong => out.push_str(if entering { "<strong>" } else { "</strong>" }),
            NodeValue::Strikethrough => out.push_str(if entering { "<s>" } else { "</s>" }),
            NodeValue::Link(link) => {
                if entering {
                    write!(out, r#"<a href="{}""#, escape_html(&link.destination))?;
                    if !link.title.is_empty() {
                        write!(out, r#" title="{}""#, escape_html(&link.title))?;
                    }
                    out.push('>');
                } else {
                    out.push_str("</a>");
                }
            }
            NodeValue::Image(image) => {
                if entering {
                    write!(out, r#"<img src="{}""#, escape_html(&image.destination))?;
                    if !image.title.is_empty() {
                        write!(out, r#" title="{}""#, escape_html(&image.title))?;
                    }
                    write!(out, r#" alt="{}">"#, escape_html(&doc.text_content(id)))?;
                }
                return Ok(WalkStatus::SkipChildren);
            }
            NodeValue::TaskListMarker { checked } => {
                if entering {
                    if *checked {
                        out.push_str(r#"<input type="checkbox" checked disabled> "#);
                    } else {
                        out.push_str(r#"<input type="checkbox" disabled> "#);
                    }
                }
            }
        }
        Ok(WalkStatus::Continue)
    }
}

fn kind_of(doc: &Document, id: Option<NodeId>) -> Option<NodeKind> {
    id.map(|id| doc.node(id).kind())
}

fn in_table_head(doc: &Document, cell: NodeId) -> bool {
    kind_of(doc, doc.node(cell).parent()) == Some(NodeKind::TableHead)
}

fn has_body_rows(doc: &Document, table: NodeId) -> bool {
    doc.children(table)
        .iter()
        .any(|&c| doc.node(c).kind() == NodeKind::TableRow)
}

fn is_first_body_row(doc: &Document, row: NodeId) -> bool {
    let Some(parent) = doc.node(row).parent() else {
        return false;
    };
    doc.children(parent)
        .iter()
        .find(|&&c| doc.node(c).kind() == NodeKind::TableRow)
        == Some(&row)
}

fn cell_alignment_style(doc: &Document, cell: NodeId) -> &'static str {
    let table = doc
        .node(cell)
        .parent()
        .and_then(|row| doc.node(row).parent());
    let (Some(table), Some(column)) = (table, doc.index_in_parent(cell)) else {
        return "";
    };
    let NodeValue::Table { alignments } = doc.value(table) else {
        return "";
    };
    match alignments.get(column) {
        Some(Alignment::Left) => r#" style="text-align: left""#,
        Some(Alignment::Center) => r#" style="text-align: center""#,
        Some(Alignment::Right) => r#" style="text-align: right""#,
        Some(Alignment::None) | None => "",
    }
}
