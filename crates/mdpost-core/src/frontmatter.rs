//! Front matter extraction.
//!
//! A document may open with a metadata block bracketed by two delimiter lines:
//! `---` for YAML or `+++` for TOML. Recognized fields are `title`, `date` and
//! `tags`; unknown keys are ignored.
//!
//! ```
//! use mdpost_core::frontmatter::split;
//!
//! let (meta, body) = split(b"---\ntitle: Hello\ntags: [a, b]\n---\nBody\n").unwrap();
//! assert_eq!(meta.title, "Hello");
//! assert_eq!(meta.tags, vec!["a", "b"]);
//! assert_eq!(body, b"\nBody\n");
//! ```

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::error::ParseError;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Metadata encoding, identified by its delimiter line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrontMatterFormat {
    /// `---` delimited YAML.
    Yaml,
    /// `+++` delimited TOML.
    Toml,
}

impl FrontMatterFormat {
    /// Formats in detection order.
    const ALL: [Self; 2] = [Self::Yaml, Self::Toml];

    /// The delimiter line for this format.
    #[must_use]
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

impl fmt::Display for FrontMatterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        })
    }
}

/// Post metadata. Every field defaults to empty when absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct RawYaml {
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: Option<serde_yaml::Value>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
struct RawToml {
    #[serde(default)]
    title: String,
    #[serde(default)]
    date: Option<toml::Value>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Split a raw document into front matter and body.
///
/// A leading UTF-8 byte order mark is dropped first. If the first line is
/// exactly `---` or `+++` the metadata runs up to the next line that is exactly
/// the same delimiter, and the body is every byte after that closing delimiter.
/// Otherwise the front matter is empty and the whole input is the body.
///
/// # Errors
///
/// Returns [`ParseError`] when the closing delimiter is missing, the metadata
/// is not UTF-8, cannot be decoded, or carries an unrecognized `date`.
pub fn split(raw: &[u8]) -> Result<(FrontMatter, &[u8]), ParseError> {
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);

    let (first, mut rest) = next_line(raw);
    let Some(format) = FrontMatterFormat::ALL
        .into_iter()
        .find(|f| first == f.delimiter().as_bytes())
    else {
        return Ok((FrontMatter::default(), raw));
    };

    let meta_start = raw.len() - rest.len();
    loop {
        if rest.is_empty() {
            return Err(ParseError::Unterminated { format });
        }
        let line_start = raw.len() - rest.len();
        let (line, after) = next_line(rest);
        if line == format.delimiter().as_bytes() {
            let metadata = &raw[meta_start..line_start];
            let body = &raw[line_start + format.delimiter().len()..];
            return Ok((decode(format, metadata)?, body));
        }
        rest = after;
    }
}

/// Return the first line without its terminator and everything after the `\n`.
fn next_line(buf: &[u8]) -> (&[u8], &[u8]) {
    match buf.iter().position(|&b| b == b'\n') {
        Some(end) => {
            let line = &buf[..end];
            (line.strip_suffix(b"\r").unwrap_or(line), &buf[end + 1..])
        }
        None => (buf, &[]),
    }
}

fn decode(format: FrontMatterFormat, metadata: &[u8]) -> Result<FrontMatter, ParseError> {
    let text = std::str::from_utf8(metadata)
        .map_err(|source| ParseError::MetadataEncoding { format, source })?;
    if text.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    let invalid = |message: String| ParseError::Metadata { format, message };

    let (title, date, tags) = match format {
        FrontMatterFormat::Yaml => {
            let raw: RawYaml = serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;
            let date = match raw.date {
                None | Some(serde_yaml::Value::Null) => None,
                Some(serde_yaml::Value::String(s)) => Some(s),
                Some(other) => {
                    return Err(invalid(format!("'date' must be a timestamp, got {other:?}")));
                }
            };
            (raw.title, date, raw.tags)
        }
        FrontMatterFormat::Toml => {
            let raw: RawToml =
                toml::from_str(text).map_err(|e| invalid(e.to_string().trim_end().to_owned()))?;
            let date = match raw.date {
                None => None,
                Some(toml::Value::Datetime(dt)) => Some(dt.to_string()),
                Some(toml::Value::String(s)) => Some(s),
                Some(other) => {
                    return Err(invalid(format!("'date' must be a datetime, got {}", other.type_str())));
                }
            };
            (raw.title, date, raw.tags)
        }
    };

    let date = date
        .map(|value| parse_date(&value).ok_or(ParseError::Date { format, value }))
        .transpose()?;
    Ok(FrontMatter { title, date, tags })
}

/// Parse an ISO-8601 style timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS [+-]HHMM`, local date-times (taken as
/// UTC) and bare dates (midnight UTC).
pub(crate) fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(value: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(value).unwrap()
    }

    #[test]
    fn test_split_yaml() {
        let raw = b"---\ntitle: Hello\ndate: 2020-05-01T10:00:00+02:00\ntags:\n  - rust\n  - blog\n---\n# Body\n";
        let (meta, body) = split(raw).unwrap();
        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.date, Some(date("2020-05-01T10:00:00+02:00")));
        assert_eq!(meta.tags, vec!["rust", "blog"]);
        assert_eq!(body, b"\n# Body\n");
    }

    #[test]
    fn test_split_toml() {
        let raw = b"+++\ntitle = \"Hello\"\ndate = 2020-05-01T10:00:00Z\ntags = [\"a\"]\n+++\nBody";
        let (meta, body) = split(raw).unwrap();
        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.date, Some(date("2020-05-01T10:00:00Z")));
        assert_eq!(meta.tags, vec!["a"]);
        assert_eq!(body, b"\nBody");
    }

    #[test]
    fn test_split_toml_local_date() {
        let (meta, _) = split(b"+++\ndate = 2021-03-04\n+++\n").unwrap();
        assert_eq!(meta.date, Some(date("2021-03-04T00:00:00Z")));
    }

    #[test]
    fn test_no_front_matter_returns_input() {
        let raw = b"# Title\n\nText with --- inside\n";
        let (meta, body) = split(raw).unwrap();
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_bom_stripped() {
        let (meta, body) = split(b"\xEF\xBB\xBF---\ntitle: T\n---\nx").unwrap();
        assert_eq!(meta.title, "T");
        assert_eq!(body, b"\nx");

        let (_, body) = split(b"\xEF\xBB\xBFplain").unwrap();
        assert_eq!(body, b"plain");
    }

    #[test]
    fn test_crlf_delimiters() {
        let (meta, body) = split(b"---\r\ntitle: T\r\n---\r\nx").unwrap();
        assert_eq!(meta.title, "T");
        assert_eq!(body, b"\r\nx");
    }

    #[test]
    fn test_delimiter_must_be_whole_line() {
        let raw = b"----\ntitle: T\n----\n";
        let (meta, body) = split(raw).unwrap();
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, raw);
    }

    #[test]
    fn test_closing_delimiter_must_be_whole_line() {
        let raw = b"+++\ntitle = \"T\"\nnote = \"\"\"\n+++ not yet\n\"\"\"\n+++\nbody";
        let (meta, body) = split(raw).unwrap();
        assert_eq!(meta.title, "T");
        assert_eq!(body, b"\nbody");
    }

    #[test]
    fn test_yaml_document_marker_inside_block_is_error() {
        // `--- not yet` does not close the block but starts a second YAML document.
        let err = split(b"---\ntitle: T\n--- not yet\n---\nbody").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Metadata {
                format: FrontMatterFormat::Yaml,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_closing_delimiter_is_error() {
        let err = split(b"---\ntitle: T\nno end\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Unterminated {
                format: FrontMatterFormat::Yaml
            }
        ));
        assert!(err.to_string().contains("'---'"));

        assert!(matches!(
            split(b"+++").unwrap_err(),
            ParseError::Unterminated {
                format: FrontMatterFormat::Toml
            }
        ));
    }

    #[test]
    fn test_mixed_delimiters_not_closed() {
        assert!(split(b"---\ntitle: T\n+++\nbody").is_err());
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let err = split(b"---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Metadata {
                format: FrontMatterFormat::Yaml,
                ..
            }
        ));
        assert!(err.to_string().starts_with("invalid YAML front matter"));
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let err = split(b"+++\ntitle = \n+++\n").unwrap_err();
        assert!(err.to_string().starts_with("invalid TOML front matter"));
    }

    #[test]
    fn test_wrong_field_type_is_error() {
        assert!(split(b"---\ntags: 3\n---\n").is_err());
        assert!(split(b"---\ndate: 5\n---\n").is_err());
        assert!(split(b"+++\ndate = true\n+++\n").is_err());
    }

    #[test]
    fn test_invalid_date_is_error() {
        let err = split(b"---\ndate: yesterday\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::Date { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn test_invalid_utf8_metadata_is_error() {
        let err = split(b"---\ntitle: \xFF\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::MetadataEncoding { .. }));
    }

    #[test]
    fn test_empty_metadata_block() {
        let (meta, body) = split(b"---\n---\nbody").unwrap();
        assert_eq!(meta, FrontMatter::default());
        assert_eq!(body, b"\nbody");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (meta, _) = split(b"---\ntitle: T\ndraft: true\n---\n").unwrap();
        assert_eq!(meta.title, "T");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2020-01-02"), Some(date("2020-01-02T00:00:00Z")));
        assert_eq!(
            parse_date("2020-01-02T03:04:05"),
            Some(date("2020-01-02T03:04:05Z"))
        );
        assert_eq!(
            parse_date("2020-01-02 03:04:05 +0100"),
            Some(date("2020-01-02T03:04:05+01:00"))
        );
        assert_eq!(parse_date("02/01/2020"), None);
    }
}
