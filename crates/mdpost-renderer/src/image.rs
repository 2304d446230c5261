//! `<img>` rendering override.

use std::fmt::Write;

use crate::ast::{Document, NodeId, NodeKind, NodeValue, WalkStatus};
use crate::attributes::is_image_attribute;
use crate::error::RenderError;
use crate::render::NodeRenderer;
use crate::util::escape_html;

/// Renders image nodes as `<img src=".." alt=".." title="">`.
///
/// Unlike the default rule, `title` is always written (empty when the source
/// had none) and attribute order is fixed: `src`, `alt`, `title`, then any
/// extra attributes accepted by [`is_image_attribute`](crate::is_image_attribute).
/// Alt text is the concatenated text of the image's children; children are
/// never rendered as HTML.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageRenderer;

impl NodeRenderer for ImageRenderer {
    fn render(
        &self,
        out: &mut String,
        doc: &Document,
        id: NodeId,
        entering: bool,
    ) -> Result<WalkStatus, RenderError> {
        if !entering {
            return Ok(WalkStatus::Continue);
        }
        let NodeValue::Image(image) = doc.value(id) else {
            return Err(RenderError::KindMismatch {
                expected: NodeKind::Image,
                found: doc.node(id).kind(),
            });
        };

        write!(
            out,
            r#"<img src="{}" alt="{}" title="{}""#,
            escape_html(&image.destination),
            escape_html(&doc.text_content(id)),
            escape_html(&image.title)
        )?;
        for attr in image
            .attributes
            .iter()
            .filter(|a| is_image_attribute(&a.name))
        {
            write!(out, r#" {}="{}""#, attr.name, escape_html(&attr.value))?;
        }
        out.push('>');
        Ok(WalkStatus::SkipChildren)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MarkdownParser;
    use crate::render::HtmlRenderer;
    use pretty_assertions::assert_eq;

    fn render_with_override(doc: &Document) -> String {
        HtmlRenderer::new()
            .with_override(NodeKind::Image, 500, ImageRenderer)
            .render(doc)
            .unwrap()
    }

    fn render(markdown: &str) -> String {
        render_with_override(&MarkdownParser::new().parse(markdown))
    }

    #[test]
    fn test_image_without_title_has_empty_title() {
        assert_eq!(
            render("![alt](https://cdn/a.png)"),
            "<p><img src=\"https://cdn/a.png\" alt=\"alt\" title=\"\"></p>\n"
        );
    }

    #[test]
    fn test_image_with_title() {
        assert_eq!(
            render(r#"![A cat](cat.jpg "My cat")"#),
            "<p><img src=\"cat.jpg\" alt=\"A cat\" title=\"My cat\"></p>\n"
        );
    }

    #[test]
    fn test_alt_text_is_plain_text() {
        assert_eq!(
            render("![a *b* `c`](x.png)"),
            "<p><img src=\"x.png\" alt=\"a b c\" title=\"\"></p>\n"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        assert_eq!(
            render(r#"![say "hi" & a < b](a.png?x=1&y=2 "it's")"#),
            "<p><img src=\"a.png?x=1&amp;y=2\" alt=\"say &quot;hi&quot; &amp; a &lt; b\" \
             title=\"it&#x27;s\"></p>\n"
        );
    }

    #[test]
    fn test_allowed_attributes_follow_title() {
        let mut doc = MarkdownParser::new().parse("![a](a.png)");
        let id = doc.ids().find(|&id| doc.node(id).kind() == NodeKind::Image).unwrap();
        if let NodeValue::Image(image) = doc.value_mut(id) {
            image.set_attribute("width", "600");
            image.set_attribute("onerror", "alert(1)");
            image.set_attribute("data-zoom", "a\"b");
        }
        assert_eq!(
            render_with_override(&doc),
            "<p><img src=\"a.png\" alt=\"a\" title=\"\" width=\"600\" data-zoom=\"a&quot;b\"></p>\n"
        );
    }

    #[test]
    fn test_other_nodes_unaffected() {
        assert_eq!(
            render("**bold** ![i](i.png)"),
            "<p><strong>bold</strong> <img src=\"i.png\" alt=\"i\" title=\"\"></p>\n"
        );
    }

    #[test]
    fn test_non_image_node_is_rejected() {
        let doc = MarkdownParser::new().parse("text");
        let mut out = String::new();
        let err = ImageRenderer
            .render(&mut out, &doc, doc.root(), true)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::KindMismatch {
                expected: NodeKind::Image,
                found: NodeKind::Document
            }
        ));
        assert!(out.is_empty());
    }
}
