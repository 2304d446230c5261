//! Parse, transform, render.

use crate::ast::NodeKind;
use crate::error::ConvertError;
use crate::extension::Extension;
use crate::parser::MarkdownParser;
use crate::render::{HtmlRenderer, NodeRenderer};
use crate::transform::{AstTransformer, ParseContext, Prioritized, insert_sorted};

/// Configurable markdown to HTML converter.
///
/// Holds a parser, transform passes sorted by priority, and an [`HtmlRenderer`]
/// with its overrides. Configuration is fixed once conversion starts.
pub struct Markdown<'a> {
    parser: MarkdownParser,
    transformers: Vec<Prioritized<Box<dyn AstTransformer + 'a>>>,
    renderer: HtmlRenderer<'a>,
}

impl Default for Markdown<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Markdown<'a> {
    /// Create a converter with GFM enabled and no passes or overrides.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: MarkdownParser::new(),
            transformers: Vec::new(),
            renderer: HtmlRenderer::new(),
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.parser = self.parser.with_gfm(enabled);
        self
    }

    /// Register a transform pass. Lower priority values run first.
    #[must_use]
    pub fn with_transformer<T: AstTransformer + 'a>(mut self, priority: u32, transformer: T) -> Self {
        self.add_transformer(priority, Box::new(transformer));
        self
    }

    /// Register a render override for a node kind.
    #[must_use]
    pub fn with_renderer<R: NodeRenderer + 'a>(
        mut self,
        kind: NodeKind,
        priority: u32,
        renderer: R,
    ) -> Self {
        self.add_renderer(kind, priority, Box::new(renderer));
        self
    }

    /// Install an extension.
    #[must_use]
    pub fn with_extension<E: Extension<'a>>(mut self, extension: E) -> Self {
        extension.extend(&mut self);
        self
    }

    /// Register a boxed transform pass.
    pub fn add_transformer(&mut self, priority: u32, transformer: Box<dyn AstTransformer + 'a>) {
        insert_sorted(&mut self.transformers, Prioritized::new(priority, transformer));
    }

    /// Register a boxed render override.
    pub fn add_renderer(&mut self, kind: NodeKind, priority: u32, renderer: Box<dyn NodeRenderer + 'a>) {
        self.renderer.register(kind, priority, renderer);
    }

    /// Convert markdown text to an HTML fragment.
    ///
    /// The first failing transform pass aborts the conversion; no HTML is
    /// produced in that case.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Transform`] if a pass fails (for example when
    /// the asset resolver rejects an image) and [`ConvertError::Render`] if
    /// serialization fails.
    pub fn convert(&mut self, source: &str) -> Result<String, ConvertError> {
        let mut doc = self.parser.parse(source);
        let ctx = ParseContext { source };
        for pass in &mut self.transformers {
            pass.value.transform(&mut doc, &ctx)?;
        }
        tracing::trace!(nodes = doc.len(), passes = self.transformers.len(), "Transformed document");
        Ok(self.renderer.render(&doc)?)
    }
}
