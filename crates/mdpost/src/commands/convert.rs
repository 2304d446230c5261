//! `mdpost convert` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use mdpost_config::{CliSettings, Config};
use mdpost_core::{Asset, AssetCollector, Converted, Pipeline};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to the markdown post.
    markdown_file: PathBuf,

    /// URL of the original post (overrides config).
    #[arg(short = 'u', long)]
    canonical_url: Option<String>,

    /// Note template appended after the post (overrides config).
    #[arg(long)]
    original_note: Option<String>,

    /// Base URL local images are rewritten to (overrides config).
    #[arg(long, env = "MDPOST_ASSET_BASE_URL")]
    asset_base_url: Option<String>,

    /// Write the HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the JSON asset manifest to this file (overrides config).
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Do not prefix the post with a title heading.
    #[arg(long)]
    no_title_heading: bool,

    /// Disable GitHub Flavored Markdown extensions.
    #[arg(long)]
    no_gfm: bool,

    /// Report local images without rewriting them.
    #[arg(long)]
    dry_run: bool,

    /// Additional logging and an HTML dump to `<file-name>.html`.
    #[arg(long)]
    pub(crate) debug: bool,

    /// Path to configuration file (default: auto-discover mdpost.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, conversion or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        if !self.markdown_file.is_file() {
            return Err(CliError::Validation(format!(
                "File does not exist: {}",
                self.markdown_file.display()
            )));
        }
        tracing::info!(path = %self.markdown_file.display(), "Processing");
        let raw = std::fs::read(&self.markdown_file)?;

        let mut collector =
            AssetCollector::new(post_dir(&self.markdown_file)).with_dry_run(self.dry_run);
        if let Some(base_url) = &config.assets_resolved.base_url {
            collector = collector.with_base_url(base_url)?;
        }

        let converted = build_pipeline(&config).convert(&raw, &mut collector)?;
        tracing::info!(
            bytes = converted.html.len(),
            assets = collector.assets().len(),
            "Converted post"
        );

        if self.debug {
            let dump = debug_dump_path(&self.markdown_file);
            std::fs::write(&dump, &converted.html)?;
            output.info(&format!("HTML written to {}", dump.display()));
        }

        if let Some(manifest) = &config.assets_resolved.manifest {
            collector.write_manifest(manifest)?;
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &converted.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(converted.html.as_bytes())?;
                stdout.flush()?;
            }
        }

        print_summary(&output, &self.markdown_file, &converted, collector.assets(), self.dry_run);
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            canonical_url: self.canonical_url.clone(),
            original_note: self.original_note.clone(),
            asset_base_url: self.asset_base_url.clone(),
            manifest: self.manifest.clone(),
            title_heading: self.no_title_heading.then_some(false),
            gfm: self.no_gfm.then_some(false),
        }
    }
}

fn build_pipeline(config: &Config) -> Pipeline {
    let mut pipeline = Pipeline::new()
        .with_canonical_url(config.post.canonical_url.clone().unwrap_or_default())
        .with_title_heading(config.post.title_heading)
        .with_gfm(config.render.gfm);
    if let Some(note) = &config.post.original_note {
        pipeline = pipeline.with_original_note(note.clone());
    }
    for (name, value) in &config.images.attributes {
        pipeline = pipeline.with_image_attribute(name.clone(), value.clone());
    }
    pipeline
}

/// Directory local image paths are resolved against.
fn post_dir(markdown_file: &Path) -> PathBuf {
    match markdown_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `<file-name>.html` in the working directory.
fn debug_dump_path(markdown_file: &Path) -> PathBuf {
    let mut name = markdown_file
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_else(|| "post".into());
    name.push(".html");
    PathBuf::from(name)
}

fn print_summary(
    output: &Output,
    markdown_file: &Path,
    converted: &Converted,
    assets: &[Asset],
    dry_run: bool,
) {
    if !converted.front_matter.title.is_empty() {
        output.info(&format!("Title: {}", converted.front_matter.title));
    }
    if !converted.front_matter.tags.is_empty() {
        output.info(&format!("Tags: {}", converted.front_matter.tags.join(", ")));
    }

    if assets.is_empty() {
        output.success("No local assets to relocate.");
    } else {
        output.heading(&format!("\nAssets to relocate ({}):", assets.len()));
        for asset in assets {
            output.info(&format!(
                "  -> {} ({})",
                asset.source_path.display(),
                asset.content_type
            ));
        }
    }

    if dry_run {
        output.warning(&format!(
            "\nPost {} not rewritten (dry run)",
            markdown_file.display()
        ));
    }
}
