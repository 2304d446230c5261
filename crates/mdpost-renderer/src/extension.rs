//! Bundles of transform passes and render overrides.

use crate::assets::{AssetResolutionTransform, AssetResolver};
use crate::ast::NodeKind;
use crate::image::ImageRenderer;
use crate::markdown::Markdown;

/// Priority of [`AssetResolutionTransform`] when installed by [`ImageExtension`].
pub const ASSET_RESOLUTION_PRIORITY: u32 = 999;

/// Priority of the [`ImageRenderer`] override installed by [`ImageExtension`].
pub const IMAGE_RENDER_PRIORITY: u32 = 500;

/// Something that registers passes and overrides on a [`Markdown`] converter.
pub trait Extension<'a> {
    /// Register everything this extension provides.
    fn extend(self, markdown: &mut Markdown<'a>);
}

/// Image handling: local destination rewriting plus the `<img>` override.
pub struct ImageExtension<'a> {
    resolver: &'a mut dyn AssetResolver,
}

impl<'a> ImageExtension<'a> {
    /// Create the extension around an asset resolver.
    pub fn new(resolver: &'a mut dyn AssetResolver) -> Self {
        Self { resolver }
    }
}

impl<'a> Extension<'a> for ImageExtension<'a> {
    fn extend(self, markdown: &mut Markdown<'a>) {
        markdown.add_transformer(
            ASSET_RESOLUTION_PRIORITY,
            Box::new(AssetResolutionTransform::new(self.resolver)),
        );
        markdown.add_renderer(NodeKind::Image, IMAGE_RENDER_PRIORITY, Box::new(ImageRenderer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, ConvertError, TransformError};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_extension_rewrites_and_renders() {
        let mut resolver = |path: &str| -> Result<String, BoxError> {
            Ok(format!("https://cdn/{}", path.trim_start_matches("img/")))
        };
        let html = Markdown::new()
            .with_extension(ImageExtension::new(&mut resolver))
            .convert("![alt](img/a.png)")
            .unwrap();
        assert_eq!(
            html,
            "<p><img src=\"https://cdn/a.png\" alt=\"alt\" title=\"\"></p>\n"
        );
    }

    #[test]
    fn test_image_extension_error_aborts_conversion() {
        let mut resolver = |_: &str| -> Result<String, BoxError> { Err("no network".into()) };
        let err = Markdown::new()
            .with_extension(ImageExtension::new(&mut resolver))
            .convert("![a](a.png)")
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Transform(TransformError::Resolve { .. })
        ));
    }
}
