//! End-to-end conversion of a post to an HTML fragment.

use std::collections::BTreeMap;

use mdpost_renderer::{
    ASSET_RESOLUTION_PRIORITY, AssetResolver, ImageAttributesTransform, ImageExtension, Markdown,
};

use crate::compose::{ComposeOptions, compose_markdown};
use crate::error::{ParseError, PipelineError};
use crate::frontmatter::{self, FrontMatter};

/// Priority of the default image attributes pass; runs after asset resolution.
pub const IMAGE_ATTRIBUTES_PRIORITY: u32 = ASSET_RESOLUTION_PRIORITY + 1;

/// Result of a successful conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Converted {
    /// Post metadata from the front matter.
    pub front_matter: FrontMatter,
    /// Markdown actually parsed (title heading, body, trailing note).
    pub markdown: String,
    /// Rendered HTML fragment.
    pub html: String,
}

/// Front matter, composition, parse, asset resolution and render in one call.
///
/// # Example
///
/// ```
/// use mdpost_core::Pipeline;
/// use mdpost_renderer::BoxError;
///
/// let mut resolver = |path: &str| -> Result<String, BoxError> {
///     Ok(format!("https://cdn.example.com/{path}"))
/// };
/// let converted = Pipeline::new()
///     .convert(b"---\ntitle: Hello\n---\n![Logo](logo.png)\n", &mut resolver)
///     .unwrap();
/// assert_eq!(
///     converted.html,
///     "<h1>Hello</h1>\n<p><img src=\"https://cdn.example.com/logo.png\" alt=\"Logo\" title=\"\"></p>\n"
/// );
/// ```
#[derive(Clone, Debug)]
pub struct Pipeline {
    canonical_url: String,
    original_note: Option<String>,
    title_heading: bool,
    gfm: bool,
    image_attributes: BTreeMap<String, String>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a pipeline with a title heading, GFM, and no trailing note.
    #[must_use]
    pub fn new() -> Self {
        Self {
            canonical_url: String::new(),
            original_note: None,
            title_heading: true,
            gfm: true,
            image_attributes: BTreeMap::new(),
        }
    }

    /// Set the canonical URL of the original post.
    #[must_use]
    pub fn with_canonical_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = url.into();
        self
    }

    /// Set the trailing note template.
    #[must_use]
    pub fn with_original_note(mut self, note: impl Into<String>) -> Self {
        self.original_note = Some(note.into());
        self
    }

    /// Enable or disable the `# {title}` heading.
    #[must_use]
    pub fn with_title_heading(mut self, enabled: bool) -> Self {
        self.title_heading = enabled;
        self
    }

    /// Enable or disable GitHub Flavored Markdown.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Add an attribute to every rendered image.
    #[must_use]
    pub fn with_image_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.image_attributes.insert(name.into(), value.into());
        self
    }

    /// Convert a raw document.
    ///
    /// The resolver is called once per local image, in document order. The
    /// first error from any stage aborts the run and no HTML is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Parse`] for front matter, encoding, URL or
    /// template problems, [`PipelineError::Transform`] when the resolver fails,
    /// and [`PipelineError::Render`] when serialization fails.
    pub fn convert(
        &self,
        raw: &[u8],
        resolver: &mut dyn AssetResolver,
    ) -> Result<Converted, PipelineError> {
        let (front_matter, body) = frontmatter::split(raw)?;
        let body = std::str::from_utf8(body).map_err(ParseError::BodyEncoding)?;
        tracing::debug!(title = %front_matter.title, tags = front_matter.tags.len(), "Parsed front matter");

        let markdown = compose_markdown(
            &front_matter,
            body,
            &ComposeOptions {
                title_heading: self.title_heading,
                original_note: self.original_note.as_deref(),
                canonical_url: &self.canonical_url,
            },
        )?;

        let mut converter = Markdown::new()
            .with_gfm(self.gfm)
            .with_extension(ImageExtension::new(resolver));
        if !self.image_attributes.is_empty() {
            converter = converter.with_transformer(
                IMAGE_ATTRIBUTES_PRIORITY,
                ImageAttributesTransform::new(self.image_attributes.clone()),
            );
        }
        let html = converter.convert(&markdown)?;

        Ok(Converted {
            front_matter,
            markdown,
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpost_renderer::BoxError;
    use pretty_assertions::assert_eq;

    fn cdn(path: &str) -> Result<String, BoxError> {
        Ok(format!("https://cdn/{path}"))
    }

    #[test]
    fn test_convert_with_front_matter_and_note() {
        let raw = b"---\ntitle: Hello\ndate: 2020-05-01\n---\nSome *text*.\n";
        let converted = Pipeline::new()
            .with_canonical_url("https://blog.example.com/hello")
            .with_original_note("Originally published at [{{.BaseURL}}]({{.CanonicalURL}}).")
            .convert(raw, &mut cdn)
            .unwrap();

        assert_eq!(converted.front_matter.title, "Hello");
        assert_eq!(
            converted.html,
            "<h1>Hello</h1>\n<p>Some <em>text</em>.</p>\n\
             <p>Originally published at \
             <a href=\"https://blog.example.com/hello\">https://blog.example.com</a>.</p>\n"
        );
    }

    #[test]
    fn test_image_attributes_applied() {
        let converted = Pipeline::new()
            .with_image_attribute("loading", "lazy")
            .convert(b"![a](a.png)", &mut cdn)
            .unwrap();
        assert_eq!(
            converted.html,
            "<p><img src=\"https://cdn/a.png\" alt=\"a\" title=\"\" loading=\"lazy\"></p>\n"
        );
    }

    #[test]
    fn test_invalid_body_utf8() {
        let err = Pipeline::new().convert(b"ok \xFF", &mut cdn).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Parse(ParseError::BodyEncoding(_))
        ));
    }

    #[test]
    fn test_front_matter_error_stops_before_resolver() {
        let mut calls = 0;
        let mut resolver = |_: &str| -> Result<String, BoxError> {
            calls += 1;
            Ok(String::new())
        };
        let err = Pipeline::new()
            .convert(b"---\ntitle: T\n![a](a.png)\n", &mut resolver)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(ParseError::Unterminated { .. })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_template_error_is_parse_error() {
        let err = Pipeline::new()
            .with_original_note("{{ Title")
            .convert(b"body", &mut cdn)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(ParseError::Template(_))));
    }

    #[test]
    fn test_markdown_is_exposed() {
        let converted = Pipeline::new()
            .convert(b"+++\ntitle = \"T\"\n+++\nBody", &mut cdn)
            .unwrap();
        assert_eq!(converted.markdown, "# T\n\n\nBody");
    }
}
