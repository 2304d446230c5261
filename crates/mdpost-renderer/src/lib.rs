//! Markdown AST with pluggable transform passes and HTML render overrides.
//!
//! This crate parses markdown with `pulldown-cmark` into an owned, arena-backed
//! [`Document`] tree, runs registered [`AstTransformer`] passes over it, and
//! serializes it with [`HtmlRenderer`].
//!
//! # Architecture
//!
//! Conversion happens in three steps driven by [`Markdown`]:
//!
//! 1. **Parse**: [`MarkdownParser`] folds parser events into a [`Document`].
//! 2. **Transform**: transformers run in ascending priority order and may update
//!    fields of visited nodes in place. The tree shape never changes.
//! 3. **Render**: [`HtmlRenderer`] walks the tree, using a registered
//!    [`NodeRenderer`] override for a node kind when one outranks the default.
//!
//! [`ImageExtension`] wires the two image-specific pieces together: an
//! [`AssetResolutionTransform`] that rewrites local image destinations through
//! an [`AssetResolver`], and the [`ImageRenderer`] override.
//!
//! # Example
//!
//! ```
//! use mdpost_renderer::{BoxError, ImageExtension, Markdown};
//!
//! let mut resolver = |path: &str| -> Result<String, BoxError> {
//!     Ok(format!("https://cdn.example.com/{path}"))
//! };
//! let html = Markdown::new()
//!     .with_extension(ImageExtension::new(&mut resolver))
//!     .convert("![Logo](logo.png)")
//!     .unwrap();
//! assert!(html.contains(r#"<img src="https://cdn.example.com/logo.png" alt="Logo" title="">"#));
//! ```

mod assets;
mod ast;
mod attributes;
mod error;
mod extension;
mod html;
mod image;
mod markdown;
mod parser;
mod render;
mod transform;
mod util;

pub use assets::{AssetResolutionTransform, AssetResolver, is_remote_url};
pub use ast::{
    Attribute, CodeBlockNode, Document, ImageNode, LinkNode, Node, NodeId, NodeKind, NodeValue,
    WalkStatus,
};
pub use attributes::{ImageAttributesTransform, is_image_attribute};
pub use error::{BoxError, ConvertError, RenderError, TransformError};
pub use extension::{ASSET_RESOLUTION_PRIORITY, Extension, IMAGE_RENDER_PRIORITY, ImageExtension};
pub use html::DefaultHtmlRenderer;
pub use image::ImageRenderer;
pub use markdown::Markdown;
pub use parser::MarkdownParser;
pub use render::{DEFAULT_RENDER_PRIORITY, HtmlRenderer, NodeRenderer};
pub use transform::{AstTransformer, ParseContext, Prioritized};
pub use util::escape_html;
