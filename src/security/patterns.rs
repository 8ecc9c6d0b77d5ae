use regex::Regex;

use crate::findings::Severity;

/// One table-driven content rule: a severity, a matcher and the finding
/// message it emits
#[derive(Debug)]
pub struct PatternRule {
    pub severity: Severity,
    pub regex: Regex,
    pub message: &'static str,
}

impl PatternRule {
    fn new(severity: Severity, pattern: &str, message: &'static str) -> Self {
        Self {
            severity,
            // Built-in patterns are compile-checked by the test below
            regex: Regex::new(pattern).expect("invalid built-in pattern"),
            message,
        }
    }
}

/// The three built-in pattern tiers, iterated uniformly over document bodies
#[derive(Debug)]
pub struct PatternSet {
    rules: Vec<PatternRule>,
}

impl PatternSet {
    pub fn builtin() -> Self {
        let rules = vec![
            // Critical tier
            PatternRule::new(
                Severity::Critical,
                r"\brm\s+-[a-zA-Z]*(rf|fr)\b|\brm\s+-r\s+-f\b",
                "recursive destructive delete",
            ),
            PatternRule::new(
                Severity::Critical,
                r"\bsudo\s+\S",
                "privilege escalation invocation",
            ),
            PatternRule::new(
                Severity::Critical,
                r#"\beval\s+"?\$"#,
                "unguarded eval of a variable",
            ),
            // High tier
            PatternRule::new(
                Severity::High,
                r"\b(curl|wget)\b[^|\n]*\|\s*(ba|z)?sh\b",
                "remote script piped to a shell",
            ),
            PatternRule::new(
                Severity::High,
                r"`[^`]+`|\$\([^)]+\)",
                "backtick or subshell execution",
            ),
            // Medium tier
            PatternRule::new(
                Severity::Medium,
                r"(?i)\b(password|secret|api[-_]?key|token|credential)s?\b",
                "possible credential reference",
            ),
        ];

        Self { rules }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Rules matching one line of body text, at most one hit per rule
    pub fn matches<'a>(&'a self, line: &str) -> Vec<&'a PatternRule> {
        self.rules
            .iter()
            .filter(|rule| rule.regex.is_match(line))
            .collect()
    }
}
