//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.
//!
//! Bare `$VAR` is left alone so literal dollar signs survive.

use crate::ConfigError;

/// Name of a variable that is referenced but not set.
struct UnsetVar(String);

/// Expand environment variable references in `value`.
///
/// `field` names the configuration key for error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| -> Result<Option<String>, UnsetVar> {
        std::env::var(name)
            .map(Some)
            .map_err(|_| UnsetVar(name.to_owned()))
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var_inside_path() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("DIASITE_TEST_OUT_ROOT", "/srv/www");
        }
        let result = expand_env("${DIASITE_TEST_OUT_ROOT}/docs", "site.output_dir").unwrap();
        assert_eq!(result, "/srv/www/docs");
        unsafe {
            std::env::remove_var("DIASITE_TEST_OUT_ROOT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("DIASITE_TEST_UNSET_TITLE");
        }
        let result = expand_env("${DIASITE_TEST_UNSET_TITLE:-Architecture}", "site.title").unwrap();
        assert_eq!(result, "Architecture");
    }

    #[test]
    fn test_expand_unset_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("DIASITE_TEST_MISSING");
        }
        let err = expand_env("${DIASITE_TEST_MISSING}", "site.title").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let message = err.to_string();
        assert!(message.contains("DIASITE_TEST_MISSING"));
        assert!(message.contains("site.title"));
    }

    #[test]
    fn test_literal_dollar_is_kept() {
        assert_eq!(expand_env("cost $5", "site.title").unwrap(), "cost $5");
    }
}
