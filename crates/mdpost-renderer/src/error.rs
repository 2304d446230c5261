//! Error types for markdown conversion.

use crate::ast::NodeKind;

/// Boxed error returned by resolvers and custom passes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error raised by an AST transform pass.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransformError {
    /// The asset resolver failed for an image destination.
    #[error("failed to resolve image '{path}': {source}")]
    Resolve {
        /// Original image destination passed to the resolver.
        path: String,
        /// Resolver error.
        #[source]
        source: BoxError,
    },

    /// A custom transform pass failed.
    #[error("transform pass '{pass}' failed: {source}")]
    Pass {
        /// Name of the failing pass.
        pass: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },
}

/// Error raised while serializing the AST to HTML.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Writing to the output buffer failed.
    #[error("failed to write HTML output")]
    Write(#[from] std::fmt::Error),

    /// A render override was invoked for a node it cannot handle.
    #[error("renderer for {expected:?} nodes received a {found:?} node")]
    KindMismatch {
        /// Kind the renderer handles.
        expected: NodeKind,
        /// Kind it was given.
        found: NodeKind,
    },
}

/// Error from a full markdown conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A transform pass failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}
