//! Publishing pipeline for markdown posts.
//!
//! Turns a post (optional YAML or TOML front matter followed by markdown) into
//! an HTML fragment ready to hand to a publishing platform:
//!
//! 1. [`frontmatter::split`] separates metadata from the body.
//! 2. [`compose::compose_markdown`] prefixes the title heading and appends the
//!    rendered trailing note.
//! 3. The markdown is parsed, local images are resolved through an
//!    [`AssetResolver`](mdpost_renderer::AssetResolver), and the tree is rendered.
//!
//! [`AssetCollector`] is the resolver used for posts on disk; it records every
//! local image that must be relocated before the HTML works remotely.

pub mod assets;
pub mod compose;
mod error;
pub mod frontmatter;
mod pipeline;

pub use assets::{Asset, AssetCollector, AssetError, AssetManifest};
pub use compose::{ComposeOptions, NoteContext, compose_markdown};
pub use error::{ParseError, PipelineError};
pub use frontmatter::{FrontMatter, FrontMatterFormat};
pub use pipeline::{Converted, IMAGE_ATTRIBUTES_PRIORITY, Pipeline};

pub use mdpost_renderer::{AssetResolver, BoxError};
