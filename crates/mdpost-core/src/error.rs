//! Error types for the publishing pipeline.

use std::str::Utf8Error;

use mdpost_renderer::{ConvertError, RenderError, TransformError};

use crate::frontmatter::FrontMatterFormat;

/// Error raised before the markdown is handed to the parser.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The opening delimiter line has no matching closing line.
    #[error("{format} front matter is not closed: missing '{}' line", format.delimiter())]
    Unterminated { format: FrontMatterFormat },

    /// The metadata block could not be decoded.
    #[error("invalid {format} front matter: {message}")]
    Metadata {
        format: FrontMatterFormat,
        message: String,
    },

    /// The metadata block is not UTF-8.
    #[error("{format} front matter is not valid UTF-8")]
    MetadataEncoding {
        format: FrontMatterFormat,
        #[source]
        source: Utf8Error,
    },

    /// The `date` field is not a recognized timestamp.
    #[error("invalid date '{value}' in {format} front matter")]
    Date {
        format: FrontMatterFormat,
        value: String,
    },

    /// The document body is not UTF-8.
    #[error("document body is not valid UTF-8")]
    BodyEncoding(#[source] Utf8Error),

    /// The canonical URL could not be parsed.
    #[error("invalid canonical URL '{url}': {source}")]
    CanonicalUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The trailing note template failed to compile or evaluate.
    #[error("original note template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Error from a full pipeline run. Every stage is fail fast.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<ConvertError> for PipelineError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Transform(e) => Self::Transform(e),
            ConvertError::Render(e) => Self::Render(e),
        }
    }
}
