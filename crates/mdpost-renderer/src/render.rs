//! HTML serialization with per-kind render overrides.

use crate::ast::{Document, NodeId, NodeKind, WalkStatus};
use crate::error::RenderError;
use crate::html::DefaultHtmlRenderer;
use crate::transform::{Prioritized, insert_sorted};

/// Priority of the built-in rendering rules. Overrides must use a lower value.
pub const DEFAULT_RENDER_PRIORITY: u32 = 1000;

/// Rendering rule for one or more node kinds.
///
/// Called twice per visited node: on enter and on exit. Returning
/// [`WalkStatus::SkipChildren`] on enter prevents the children from being
/// rendered.
pub trait NodeRenderer {
    /// Write the HTML for one phase of a node.
    fn render(
        &self,
        out: &mut String,
        doc: &Document,
        id: NodeId,
        entering: bool,
    ) -> Result<WalkStatus, RenderError>;
}

type Override<'a> = (NodeKind, Box<dyn NodeRenderer + 'a>);

/// AST to HTML serializer.
///
/// Each node is rendered by the registered override with the lowest priority
/// value for its kind, provided that priority is below
/// [`DEFAULT_RENDER_PRIORITY`]; otherwise [`DefaultHtmlRenderer`] is used.
pub struct HtmlRenderer<'a> {
    overrides: Vec<Prioritized<Override<'a>>>,
    fallback: DefaultHtmlRenderer,
}

impl Default for HtmlRenderer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> HtmlRenderer<'a> {
    /// Create a renderer using only the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
            fallback: DefaultHtmlRenderer,
        }
    }

    /// Register an override for a node kind.
    #[must_use]
    pub fn with_override<R: NodeRenderer + 'a>(
        mut self,
        kind: NodeKind,
        priority: u32,
        renderer: R,
    ) -> Self {
        self.register(kind, priority, Box::new(renderer));
        self
    }

    /// Register a boxed override for a node kind.
    pub fn register(&mut self, kind: NodeKind, priority: u32, renderer: Box<dyn NodeRenderer + 'a>) {
        insert_sorted(&mut self.overrides, Prioritized::new(priority, (kind, renderer)));
    }

    fn rule_for(&self, kind: NodeKind) -> &dyn NodeRenderer {
        match self
            .overrides
            .iter()
            .find(|p| p.value.0 == kind && p.priority < DEFAULT_RENDER_PRIORITY)
        {
            Some(p) => p.value.1.as_ref(),
            None => &self.fallback,
        }
    }

    /// Render a whole document to an HTML fragment.
    pub fn render(&self, doc: &Document) -> Result<String, RenderError> {
        let mut out = String::with_capacity(4096);
        doc.walk(doc.root(), &mut |doc: &Document, id, entering| {
            self.rule_for(doc.node(id).kind())
                .render(&mut out, doc, id, entering)
        })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeValue;
    use crate::parser::MarkdownParser;
    use pretty_assertions::assert_eq;

    struct Marker(&'static str);

    impl NodeRenderer for Marker {
        fn render(
            &self,
            out: &mut String,
            _doc: &Document,
            _id: NodeId,
            entering: bool,
        ) -> Result<WalkStatus, RenderError> {
            if entering {
                out.push_str(self.0);
            }
            Ok(WalkStatus::SkipChildren)
        }
    }

    fn render(renderer: &HtmlRenderer<'_>, markdown: &str) -> String {
        renderer.render(&MarkdownParser::new().parse(markdown)).unwrap()
    }

    #[test]
    fn test_default_rules_without_overrides() {
        let html = render(&HtmlRenderer::new(), "Hello **world**");
        assert_eq!(html, "<p>Hello <strong>world</strong></p>\n");
    }

    #[test]
    fn test_override_replaces_default_for_kind() {
        let renderer = HtmlRenderer::new().with_override(NodeKind::Strong, 500, Marker("[B]"));
        assert_eq!(render(&renderer, "a **b** c"), "<p>a [B] c</p>\n");
    }

    #[test]
    fn test_lowest_priority_override_wins() {
        let renderer = HtmlRenderer::new()
            .with_override(NodeKind::Strong, 500, Marker("[500]"))
            .with_override(NodeKind::Strong, 100, Marker("[100]"));
        assert_eq!(render(&renderer, "**b**"), "<p>[100]</p>\n");
    }

    #[test]
    fn test_override_at_default_priority_is_ignored() {
        let renderer = HtmlRenderer::new().with_override(
            NodeKind::Strong,
            DEFAULT_RENDER_PRIORITY,
            Marker("[B]"),
        );
        assert_eq!(render(&renderer, "**b**"), "<p><strong>b</strong></p>\n");
    }

    #[test]
    fn test_override_only_affects_its_kind() {
        let renderer = HtmlRenderer::new().with_override(NodeKind::Emphasis, 10, Marker("[E]"));
        assert_eq!(render(&renderer, "*a* **b**"), "<p>[E] <strong>b</strong></p>\n");
    }

    #[test]
    fn test_render_does_not_mutate_document() {
        let doc = MarkdownParser::new().parse("![a](a.png)");
        let before: Vec<NodeValue> = doc.ids().map(|id| doc.value(id).clone()).collect();
        HtmlRenderer::new().render(&doc).unwrap();
        let after: Vec<NodeValue> = doc.ids().map(|id| doc.value(id).clone()).collect();
        assert_eq!(before, after);
    }
}
