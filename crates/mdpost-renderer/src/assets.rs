//! Local image destination rewriting.
//!
//! [`AssetResolutionTransform`] walks the document once and hands every local
//! image destination to an [`AssetResolver`], writing the returned location
//! back into the image node. Network URLs are left alone.

use crate::ast::{Document, NodeValue, WalkStatus};
use crate::error::{BoxError, TransformError};
use crate::transform::{AstTransformer, ParseContext};

/// Maps a local asset path to its publishable location.
///
/// The resolver may perform I/O (uploads, copies, lookups). It is called
/// synchronously, once per local image, in document order. The returned string
/// is used verbatim as the new image source.
///
/// Closures of type `FnMut(&str) -> Result<String, BoxError>` implement this trait.
pub trait AssetResolver {
    /// Resolve a local image destination.
    fn resolve(&mut self, path: &str) -> Result<String, BoxError>;
}

impl<F> AssetResolver for F
where
    F: FnMut(&str) -> Result<String, BoxError>,
{
    fn resolve(&mut self, path: &str) -> Result<String, BoxError> {
        self(path)
    }
}

/// Whether a destination is an absolute `http://` or `https://` URL.
#[must_use]
pub fn is_remote_url(destination: &str) -> bool {
    destination.starts_with("http://") || destination.starts_with("https://")
}

/// Transform pass rewriting local image destinations through a resolver.
///
/// On resolver failure the walk stops, the image keeps its original
/// destination, and [`TransformError::Resolve`] is returned.
pub struct AssetResolutionTransform<'a> {
    resolver: &'a mut dyn AssetResolver,
}

impl<'a> AssetResolutionTransform<'a> {
    /// Create a transform backed by the given resolver.
    pub fn new(resolver: &'a mut dyn AssetResolver) -> Self {
        Self { resolver }
    }
}

impl AstTransformer for AssetResolutionTransform<'_> {
    fn transform(
        &mut self,
        doc: &mut Document,
        _ctx: &ParseContext<'_>,
    ) -> Result<(), TransformError> {
        let resolver = &mut *self.resolver;
        let root = doc.root();
        doc.walk_mut(root, &mut |doc: &mut Document, id, entering| {
            if !entering {
                return Ok(WalkStatus::Continue);
            }
            let NodeValue::Image(image) = doc.value_mut(id) else {
                return Ok(WalkStatus::Continue);
            };
            if is_remote_url(&image.destination) {
                return Ok(WalkStatus::Continue);
            }

            let resolved =
                resolver
                    .resolve(&image.destination)
                    .map_err(|source| TransformError::Resolve {
                        path: image.destination.clone(),
                        source,
                    })?;
            tracing::debug!(original = %image.destination, resolved = %resolved, "Resolved image");
            image.destination = resolved;

            // Alt text children hold no images.
            Ok(WalkStatus::SkipChildren)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MarkdownParser;
    use pretty_assertions::assert_eq;

    fn run(markdown: &str, resolver: &mut dyn AssetResolver) -> (Document, Result<(), TransformError>) {
        let mut doc = MarkdownParser::new().parse(markdown);
        let ctx = ParseContext { source: markdown };
        let result = AssetResolutionTransform::new(resolver).transform(&mut doc, &ctx);
        (doc, result)
    }

    fn destinations(doc: &Document) -> Vec<String> {
        doc.images().map(|i| i.destination.clone()).collect()
    }

    #[test]
    fn test_is_remote_url() {
        assert!(is_remote_url("http://example.com/a.png"));
        assert!(is_remote_url("https://example.com/a.png"));
        assert!(!is_remote_url("img/a.png"));
        assert!(!is_remote_url("//example.com/a.png"));
        assert!(!is_remote_url("HTTPS://example.com/a.png"));
        assert!(!is_remote_url(""));
    }

    #[test]
    fn test_local_image_rewritten() {
        let mut resolver = |path: &str| -> Result<String, BoxError> {
            Ok(format!("https://cdn/{}", path.trim_start_matches("img/")))
        };
        let (doc, result) = run("![alt](img/a.png)", &mut resolver);
        assert!(result.is_ok());
        assert_eq!(destinations(&doc), vec!["https://cdn/a.png".to_owned()]);
    }

    #[test]
    fn test_remote_image_not_resolved() {
        let mut calls = Vec::new();
        let mut resolver = |path: &str| -> Result<String, BoxError> {
            calls.push(path.to_owned());
            Ok("replaced".to_owned())
        };
        let (doc, result) = run(
            "![x](https://example.com/b.png) ![y](http://example.com/c.png)",
            &mut resolver,
        );
        assert!(result.is_ok());
        assert!(calls.is_empty());
        assert_eq!(
            destinations(&doc),
            vec![
                "https://example.com/b.png".to_owned(),
                "http://example.com/c.png".to_owned()
            ]
        );
    }

    #[test]
    fn test_resolver_called_once_per_image_in_order() {
        let mut calls = Vec::new();
        let mut resolver = |path: &str| -> Result<String, BoxError> {
            calls.push(path.to_owned());
            Ok(format!("/r/{path}"))
        };
        let markdown = "![a](a.png)\n\n- ![b](b.png)\n- ![c](https://x/c.png)\n\n> ![d](d.png)\n";
        let (doc, result) = run(markdown, &mut resolver);
        assert!(result.is_ok());
        assert_eq!(calls, vec!["a.png", "b.png", "d.png"]);
        assert_eq!(
            destinations(&doc),
            vec!["/r/a.png", "/r/b.png", "https://x/c.png", "/r/d.png"]
        );
    }

    #[test]
    fn test_same_path_resolved_per_occurrence() {
        let mut count = 0;
        let mut resolver = |_: &str| -> Result<String, BoxError> {
            count += 1;
            Ok("https://cdn/a.png".to_owned())
        };
        let (_, result) = run("![a](a.png) ![b](a.png)", &mut resolver);
        assert!(result.is_ok());
        assert_eq!(count, 2);
    }

    #[test]
    fn test_resolver_error_stops_walk() {
        let mut calls = Vec::new();
        let mut resolver = |path: &str| -> Result<String, BoxError> {
            calls.push(path.to_owned());
            if path == "bad.png" {
                Err("upload failed".into())
            } else {
                Ok(format!("https://cdn/{path}"))
            }
        };
        let (doc, result) = run("![a](ok.png)\n\n![b](bad.png)\n\n![c](later.png)", &mut resolver);

        let err = result.unwrap_err();
        match &err {
            TransformError::Resolve { path, source } => {
                assert_eq!(path, "bad.png");
                assert_eq!(source.to_string(), "upload failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("bad.png"));
        assert_eq!(calls, vec!["ok.png", "bad.png"]);
        // The failing image keeps its original destination.
        assert_eq!(
            destinations(&doc),
            vec!["https://cdn/ok.png", "bad.png", "later.png"]
        );
    }

    #[test]
    fn test_empty_destination_is_local() {
        let mut calls = Vec::new();
        let mut resolver = |path: &str| -> Result<String, BoxError> {
            calls.push(path.to_owned());
            Ok(String::new())
        };
        let (_, result) = run("![empty]()", &mut resolver);
        assert!(result.is_ok());
        assert_eq!(calls, vec![String::new()]);
    }
}
