//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Supports:
/// - `${VAR}` - expands to the value of VAR, errors if unset
/// - `${VAR:-default}` - expands to VAR if set, otherwise uses default
///
/// Strings without `${` are returned unchanged, so a bare `$VAR` or a `$` in a
/// note template stays literal.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand an optional string field in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(v) = value {
        *v = expand_env(v, field)?;
    }
    Ok(())
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("MDPOST_TEST_SIMPLE", "hello");
        }
        let result = expand_env("${MDPOST_TEST_SIMPLE}", "post.canonical_url").unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("MDPOST_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("MDPOST_TEST_UNSET");
        }
        let result = expand_env("${MDPOST_TEST_UNSET:-https://cdn}", "assets.base_url").unwrap();
        assert_eq!(result, "https://cdn");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("MDPOST_TEST_MISSING");
        }
        let err = expand_env("${MDPOST_TEST_MISSING}", "assets.base_url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MDPOST_TEST_MISSING"));
        assert!(err.to_string().contains("assets.base_url"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("MDPOST_TEST_HOST", "blog.example.com");
        }
        let result = expand_env("https://${MDPOST_TEST_HOST}/posts", "post.canonical_url").unwrap();
        assert_eq!(result, "https://blog.example.com/posts");
        unsafe {
            std::env::remove_var("MDPOST_TEST_HOST");
        }
    }

    #[test]
    fn test_template_text_without_braces_unchanged() {
        let note = "Costs $5 at {{.CanonicalURL}}";
        assert_eq!(expand_env(note, "post.original_note").unwrap(), note);
    }

    #[test]
    fn test_expand_opt() {
        let mut none = None;
        expand_opt(&mut none, "x").unwrap();
        assert!(none.is_none());

        let mut some = Some("plain".to_owned());
        expand_opt(&mut some, "x").unwrap();
        assert_eq!(some.as_deref(), Some("plain"));
    }
}
