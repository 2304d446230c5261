//! Local asset collection.
//!
//! [`AssetCollector`] is an [`AssetResolver`] for posts on disk. Each local
//! image path is resolved against the markdown file's directory, checked for
//! existence, and recorded as an [`Asset`]. The collected list is what an
//! external uploader needs to relocate before the HTML is published; it can be
//! written out as a JSON manifest.

use std::fs;
use std::path::{Path, PathBuf};

use mdpost_renderer::{AssetResolver, BoxError};
use serde::{Deserialize, Serialize};
use url::Url;

/// A local file referenced by the post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Image destination as written in the markdown.
    pub original: String,
    /// File on disk.
    pub source_path: PathBuf,
    /// Destination written into the HTML.
    pub resolved: String,
    /// MIME type guessed from the file extension.
    pub content_type: String,
}

/// JSON manifest listing assets to relocate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub assets: Vec<Asset>,
}

/// Error raised while collecting assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The referenced image does not exist.
    #[error("image file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid asset base URL '{url}': expected an absolute http or https URL")]
    InvalidBaseUrl { url: String },

    /// The image path cannot be appended to the base URL.
    #[error("cannot build asset URL for '{path}': {source}")]
    Url {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// Writing the manifest failed.
    #[error("failed to write asset manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the manifest failed.
    #[error("failed to serialize asset manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolver that records local images and optionally rewrites them to a base URL.
#[derive(Debug)]
pub struct AssetCollector {
    base_dir: PathBuf,
    base_url: Option<Url>,
    dry_run: bool,
    assets: Vec<Asset>,
}

impl AssetCollector {
    /// Create a collector resolving paths against `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_url: None,
            dry_run: false,
            assets: Vec::new(),
        }
    }

    /// Rewrite local images to `base_url` joined with their relative path.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// `http` or `https` URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, AssetError> {
        let invalid = || AssetError::InvalidBaseUrl {
            url: base_url.to_owned(),
        };
        let mut url = Url::parse(base_url).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid());
        }
        // Url::join replaces the last segment unless the path ends with '/'.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Record assets without rewriting any destination.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Assets collected so far, in first-reference order and without duplicates.
    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Manifest of the collected assets.
    #[must_use]
    pub fn manifest(&self) -> AssetManifest {
        AssetManifest {
            assets: self.assets.clone(),
        }
    }

    /// Write the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError`] if serialization or the write fails.
    pub fn write_manifest(&self, path: &Path) -> Result<(), AssetError> {
        let json = serde_json::to_string_pretty(&self.manifest())?;
        fs::write(path, json + "\n").map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), count = self.assets.len(), "Wrote asset manifest");
        Ok(())
    }

    /// Resolve one image destination.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] if the file does not exist and
    /// [`AssetError::Url`] if the rewritten URL cannot be built.
    pub fn collect(&mut self, path: &str) -> Result<String, AssetError> {
        let source_path = self.base_dir.join(path);
        if !source_path.is_file() {
            return Err(AssetError::NotFound { path: source_path });
        }

        let resolved = match (&self.base_url, self.dry_run) {
            (Some(base), false) => {
                let relative = path.trim_start_matches("./").replace('\\', "/");
                base.join(&relative)
                    .map_err(|source| AssetError::Url {
                        path: path.to_owned(),
                        source,
                    })?
                    .to_string()
            }
            _ => path.to_owned(),
        };

        if self.dry_run {
            tracing::info!(path = %source_path.display(), "Should upload image file");
        } else {
            tracing::debug!(path = %source_path.display(), resolved = %resolved, "Collected image file");
        }

        if !self.assets.iter().any(|a| a.source_path == source_path) {
            let content_type = mime_guess::from_path(&source_path)
                .first_or_octet_stream()
                .to_string();
            self.assets.push(Asset {
                original: path.to_owned(),
                source_path,
                resolved: resolved.clone(),
                content_type,
            });
        }
        Ok(resolved)
    }
}

impl AssetResolver for AssetCollector {
    fn resolve(&mut self, path: &str) -> Result<String, BoxError> {
        Ok(self.collect(path)?)
    }
}
