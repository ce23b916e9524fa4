//! Operator-facing terminal output.
//!
//! Everything goes to stderr; tracing shares the stream, so messages are
//! written line by line.

use console::{Style, Term};
use diasite_site::{Diagnostics, Warning};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print every warning and error of a generation pass, then a tally.
    pub(crate) fn diagnostics(&self, diagnostics: &Diagnostics) {
        for warning in &diagnostics.warnings {
            self.warning(&format!("Warning: {}", describe_warning(warning)));
        }
        for error in &diagnostics.errors {
            self.error(&format!("Error: {error}"));
        }
        if let Some(summary) = summary(diagnostics) {
            if diagnostics.errors.is_empty() {
                self.warning(&summary);
            } else {
                self.error(&summary);
            }
        }
    }
}

/// Operator-facing text of a warning.
fn describe_warning(warning: &Warning) -> String {
    match warning {
        Warning::UnresolvedReference { target, action } => {
            format!("unresolved reference '{target}' in action {action} rendered as plain text")
        }
        Warning::OrphanAction { action } => {
            format!("action {action} is not reachable from the root and was not rendered")
        }
        Warning::DuplicateSemanticMatch { .. } => format!("{warning}; using the first match"),
    }
}

/// One-line tally, `None` for a clean pass.
fn summary(diagnostics: &Diagnostics) -> Option<String> {
    if diagnostics.is_empty() {
        return None;
    }
    let warnings = diagnostics.warnings.len();
    let errors = diagnostics.errors.len();
    Some(format!(
        "{warnings} warning{}, {errors} error{}",
        plural(warnings),
        plural(errors)
    ))
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use diasite_site::ResolveError;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_summary_of_clean_pass_is_none() {
        assert_eq!(summary(&Diagnostics::default()), None);
    }

    #[test]
    fn test_summary_counts_warnings_and_errors() {
        let action = Uuid::nil();
        let diagnostics = Diagnostics {
            warnings: vec![
                Warning::OrphanAction { action },
                Warning::UnresolvedReference {
                    action,
                    target: "urn:x".to_owned(),
                },
            ],
            errors: vec![ResolveError::DuplicateSemanticMatch {
                action,
                target: "urn:y".to_owned(),
                matches: 2,
            }],
        };

        assert_eq!(
            summary(&diagnostics).as_deref(),
            Some("2 warnings, 1 error")
        );
    }

    #[test]
    fn test_describe_unresolved_reference() {
        let warning = Warning::UnresolvedReference {
            action: Uuid::nil(),
            target: "urn:metrics".to_owned(),
        };

        assert_eq!(
            describe_warning(&warning),
            format!(
                "unresolved reference 'urn:metrics' in action {} rendered as plain text",
                Uuid::nil()
            )
        );
    }

    #[test]
    fn test_describe_duplicate_match_names_first_match_rule() {
        let warning = Warning::DuplicateSemanticMatch {
            action: Uuid::nil(),
            target: "urn:shared".to_owned(),
            matches: 3,
        };

        let text = describe_warning(&warning);

        assert!(text.contains("matches 3 semantic nodes"));
        assert!(text.ends_with("; using the first match"));
    }
}
