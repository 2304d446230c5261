//! AST transform passes.

use crate::ast::Document;
use crate::error::TransformError;

/// Parse-time information handed to every transform pass.
#[derive(Clone, Copy, Debug)]
pub struct ParseContext<'a> {
    /// Markdown text the document was parsed from.
    pub source: &'a str,
}

/// A pass that rewrites a parsed document before rendering.
///
/// Passes run once per conversion in ascending priority order. They may update
/// payloads of existing nodes but must not change the tree shape.
///
/// # Example
///
/// ```
/// use mdpost_renderer::{
///     AstTransformer, Document, Markdown, NodeValue, ParseContext, TransformError, WalkStatus,
/// };
///
/// struct Shout;
///
/// impl AstTransformer for Shout {
///     fn transform(&mut self, doc: &mut Document, _ctx: &ParseContext<'_>) -> Result<(), TransformError> {
///         let root = doc.root();
///         doc.walk_mut(root, &mut |doc: &mut Document, id, entering| {
///             if entering && let NodeValue::Text(text) = doc.value_mut(id) {
///                 *text = text.to_uppercase();
///             }
///             Ok::<_, TransformError>(WalkStatus::Continue)
///         })?;
///         Ok(())
///     }
/// }
///
/// let html = Markdown::new().with_transformer(100, Shout).convert("hello").unwrap();
/// assert_eq!(html, "<p>HELLO</p>\n");
/// ```
pub trait AstTransformer {
    /// Rewrite the document in place.
    fn transform(
        &mut self,
        doc: &mut Document,
        ctx: &ParseContext<'_>,
    ) -> Result<(), TransformError>;
}

/// A value paired with its registration priority. Lower values run first.
#[derive(Debug)]
pub struct Prioritized<T> {
    pub priority: u32,
    pub value: T,
}

impl<T> Prioritized<T> {
    /// Pair a value with a priority.
    pub fn new(priority: u32, value: T) -> Self {
        Self { priority, value }
    }
}

/// Insert keeping ascending priority order; equal priorities keep registration order.
pub(crate) fn insert_sorted<T>(list: &mut Vec<Prioritized<T>>, item: Prioritized<T>) {
    let at = list.partition_point(|p| p.priority <= item.priority);
    list.insert(at, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sorted_orders_by_priority() {
        let mut list = Vec::new();
        insert_sorted(&mut list, Prioritized::new(999, "assets"));
        insert_sorted(&mut list, Prioritized::new(100, "first"));
        insert_sorted(&mut list, Prioritized::new(999, "after-assets"));
        insert_sorted(&mut list, Prioritized::new(1000, "last"));
        let order: Vec<_> = list.iter().map(|p| p.value).collect();
        assert_eq!(order, vec!["first", "assets", "after-assets", "last"]);
    }
}
