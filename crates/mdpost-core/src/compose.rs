//! Final markdown composition: title heading, body, trailing note.
//!
//! The trailing note is a [`minijinja`] template evaluated against
//! [`NoteContext`]. Go-style field references such as `{{.CanonicalURL}}` are
//! accepted and rewritten to `{{ CanonicalURL }}` before compilation.
//!
//! Available variables: `BaseURL`, `CanonicalURL`, `Title`, `Date` (RFC 3339,
//! empty when the post has no date). The `date` filter formats `Date` with a
//! strftime pattern: `{{ Date | date("%B %-d, %Y") }}`.
//!
//! Only plain field references are translated from Go syntax. Actions such as
//! `{{if .Title}}...{{end}}` or method calls like `{{.Date.Format "..."}}` must
//! be written in minijinja syntax (`{% if Title %}...{% endif %}`,
//! `{{ Date | date("...") }}`); left as Go they fail to compile. Unknown
//! variables are errors, not empty text.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::DateTime;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::ParseError;
use crate::frontmatter::FrontMatter;

static GO_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(-?\s*)\.([A-Za-z_][A-Za-z0-9_]*)").unwrap());

/// Variables visible to the trailing note template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NoteContext {
    /// Scheme and host (with non-default port) of the canonical URL.
    #[serde(rename = "BaseURL")]
    pub base_url: String,
    #[serde(rename = "CanonicalURL")]
    pub canonical_url: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Date")]
    pub date: String,
}

impl NoteContext {
    /// Build the context from the post metadata and canonical URL.
    ///
    /// An empty canonical URL yields an empty `BaseURL`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::CanonicalUrl`] if a non-empty URL cannot be parsed.
    pub fn new(front_matter: &FrontMatter, canonical_url: &str) -> Result<Self, ParseError> {
        Ok(Self {
            base_url: base_url(canonical_url)?,
            canonical_url: canonical_url.to_owned(),
            title: front_matter.title.clone(),
            date: front_matter
                .date
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
        })
    }
}

fn base_url(canonical_url: &str) -> Result<String, ParseError> {
    if canonical_url.is_empty() {
        return Ok(String::new());
    }
    let url = Url::parse(canonical_url).map_err(|source| ParseError::CanonicalUrl {
        url: canonical_url.to_owned(),
        source,
    })?;
    let mut base = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        base.push_str(&format!(":{port}"));
    }
    Ok(base)
}

/// Rewrite Go template field references (`{{.Field}}`) to `{{ Field }}`.
#[must_use]
pub fn normalize_template(template: &str) -> String {
    GO_FIELD_RE.replace_all(template, "{{${1}${2}").into_owned()
}

/// Evaluate the trailing note template.
///
/// # Errors
///
/// Returns [`ParseError::Template`] on syntax errors, unknown variables or
/// filters, and evaluation failures.
pub fn render_note(template: &str, context: &NoteContext) -> Result<String, ParseError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_filter("date", date_filter);
    Ok(env.render_str(&normalize_template(template), context)?)
}

fn date_filter(value: String, format: Option<String>) -> Result<String, minijinja::Error> {
    if value.is_empty() {
        return Ok(value);
    }
    let date = DateTime::parse_from_rfc3339(&value).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, format!("not a date: '{value}'"))
            .with_source(e)
    })?;
    let format = format.as_deref().unwrap_or("%Y-%m-%d");
    let mut out = String::new();
    write!(out, "{}", date.format(format)).map_err(|_| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format '{format}'"),
        )
    })?;
    Ok(out)
}

/// Options controlling how the final markdown is assembled.
#[derive(Clone, Debug)]
pub struct ComposeOptions<'a> {
    /// Prefix a level-1 heading built from the title.
    pub title_heading: bool,
    /// Trailing note template. `None` or empty appends nothing.
    pub original_note: Option<&'a str>,
    /// Canonical URL of the original post.
    pub canonical_url: &'a str,
}

impl Default for ComposeOptions<'_> {
    fn default() -> Self {
        Self {
            title_heading: true,
            original_note: None,
            canonical_url: "",
        }
    }
}

/// Assemble `# {title}\n\n{body}\n\n{note}`.
///
/// The heading is omitted when disabled or when the title is empty; the note
/// separator and note are omitted when there is no note.
///
/// # Errors
///
/// Returns [`ParseError`] for a bad canonical URL or a failing note template.
pub fn compose_markdown(
    front_matter: &FrontMatter,
    body: &str,
    options: &ComposeOptions<'_>,
) -> Result<String, ParseError> {
    let mut markdown = String::with_capacity(body.len() + front_matter.title.len() + 64);

    if options.title_heading && !front_matter.title.is_empty() {
        markdown.push_str("# ");
        markdown.push_str(&front_matter.title);
        markdown.push_str("\n\n");
    }

    markdown.push_str(body);

    if let Some(note) = options.original_note.filter(|n| !n.is_empty()) {
        let context = NoteContext::new(front_matter, options.canonical_url)?;
        markdown.push_str("\n\n");
        markdown.push_str(&render_note(note, &context)?);
    }

    Ok(markdown)
}
