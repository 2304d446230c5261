//! Image attributes: the render allow-list and a pass that adds defaults.

use crate::ast::{Attribute, Document, NodeValue};
use crate::error::TransformError;
use crate::transform::{AstTransformer, ParseContext};

/// Global HTML attributes valid on any element.
const GLOBAL_ATTRIBUTES: &[&str] = &[
    "accesskey",
    "autocapitalize",
    "autofocus",
    "class",
    "contenteditable",
    "dir",
    "draggable",
    "enterkeyhint",
    "hidden",
    "id",
    "inert",
    "inputmode",
    "is",
    "itemid",
    "itemprop",
    "itemref",
    "itemscope",
    "itemtype",
    "lang",
    "part",
    "role",
    "slot",
    "spellcheck",
    "style",
    "tabindex",
    "translate",
];

/// Attributes specific to `<img>`.
const IMAGE_ATTRIBUTES: &[&str] = &[
    "align",
    "border",
    "crossorigin",
    "decoding",
    "fetchpriority",
    "height",
    "ismap",
    "loading",
    "referrerpolicy",
    "sizes",
    "srcset",
    "usemap",
    "width",
];

/// Whether an extra attribute may be emitted on an `<img>` tag.
///
/// Accepts global HTML attributes, `data-*` and `aria-*` attributes, and
/// image-specific ones. `src`, `alt` and `title` are always written by the
/// image renderer itself and are rejected here to avoid duplicates.
#[must_use]
pub fn is_image_attribute(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("data-") || name.starts_with("aria-") {
        return name.len() > 5;
    }
    GLOBAL_ATTRIBUTES.contains(&name.as_str()) || IMAGE_ATTRIBUTES.contains(&name.as_str())
}

/// Transform pass that sets a fixed set of attributes on every image node.
///
/// Attributes already present on a node are overwritten.
#[derive(Clone, Debug, Default)]
pub struct ImageAttributesTransform {
    attributes: Vec<Attribute>,
}

impl ImageAttributesTransform {
    /// Create a pass adding the given `(name, value)` pairs.
    pub fn new<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, value)| Attribute {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Whether the pass has nothing to add.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl AstTransformer for ImageAttributesTransform {
    fn transform(
        &mut self,
        doc: &mut Document,
        _ctx: &ParseContext<'_>,
    ) -> Result<(), TransformError> {
        if self.attributes.is_empty() {
            return Ok(());
        }
        for id in doc.ids() {
            if let NodeValue::Image(image) = doc.value_mut(id) {
                for attr in &self.attributes {
                    image.set_attribute(attr.name.clone(), attr.value.clone());
                }
            }
        }
        Ok(())
    }
}
