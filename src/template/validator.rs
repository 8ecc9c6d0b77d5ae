use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::settings::Config;
use crate::findings::{Finding, Severity};
use crate::template::document::TemplateDocument;

// Severity convention: structural errors are High, advisory warnings are
// Medium. The security auditor owns Critical.
const ERROR: Severity = Severity::High;
const WARNING: Severity = Severity::Medium;

/// Structural validator for template documents.
///
/// Stateless per document; `validate_batch` additionally builds the
/// cross-document dependency graph and reports reference cycles.
pub struct TemplateValidator {
    known_tools: HashSet<String>,
    min_description_len: usize,
    max_description_len: usize,
    forbidden_terms: Regex,
}

impl TemplateValidator {
    pub fn new() -> Self {
        Self::from_config(&Config::default_config())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            known_tools: config.tools.iter().map(|t| t.name.clone()).collect(),
            min_description_len: config.validation.min_description_len,
            max_description_len: config.validation.max_description_len,
            // Word-boundary match so e.g. "monkey" does not trip on "key"
            forbidden_terms: Regex::new(r"(?i)\b(password|secret|key|token)\b").unwrap(),
        }
    }

    /// Validate a single document's structure.
    ///
    /// Defects accumulate as findings; validation always completes even over
    /// badly broken documents.
    pub fn validate_document(&self, doc: &TemplateDocument) -> Vec<Finding> {
        let mut findings = Vec::new();

        self.check_frontmatter(doc, &mut findings);
        self.check_headings(doc, &mut findings);
        self.check_usage(doc, &mut findings);
        self.check_links(doc, &mut findings);

        findings
    }

    /// Validate a batch of documents, including cross-document cycles
    pub fn validate_batch(&self, docs: &[TemplateDocument]) -> Vec<Finding> {
        let mut findings = Vec::new();
        for doc in docs {
            findings.extend(self.validate_document(doc));
        }
        findings.extend(self.check_cycles(docs));
        findings
    }

    fn check_frontmatter(&self, doc: &TemplateDocument, findings: &mut Vec<Finding>) {
        for line in &doc.malformed_frontmatter_lines {
            findings.push(
                Finding::new(
                    WARNING,
                    "frontmatter line is not 'key: value' shaped",
                    &doc.path,
                )
                .with_line(*line),
            );
        }

        match doc.frontmatter.get("allowed-tools") {
            None => findings.push(Finding::new(
                ERROR,
                "missing required frontmatter key 'allowed-tools'",
                &doc.path,
            )),
            Some(value) => self.check_allowed_tools(doc, value, findings),
        }

        match doc.frontmatter.get("description") {
            None => findings.push(Finding::new(
                ERROR,
                "missing required frontmatter key 'description'",
                &doc.path,
            )),
            Some(value) => self.check_description(doc, value, findings),
        }
    }

    fn check_allowed_tools(
        &self,
        doc: &TemplateDocument,
        value: &str,
        findings: &mut Vec<Finding>,
    ) {
        let value = value.trim();
        if value == "all" || value == "none" {
            return;
        }

        for token in value.split(',') {
            let token = token.trim();
            if token.is_empty() {
                findings.push(Finding::new(
                    ERROR,
                    "empty entry in 'allowed-tools' list",
                    &doc.path,
                ));
                continue;
            }
            if !self.known_tools.contains(token) {
                findings.push(Finding::new(
                    ERROR,
                    format!("unknown tool '{}' in 'allowed-tools'", token),
                    &doc.path,
                ));
            }
        }
    }

    fn check_description(&self, doc: &TemplateDocument, value: &str, findings: &mut Vec<Finding>) {
        let length = value.chars().count();
        if length < self.min_description_len || length > self.max_description_len {
            findings.push(Finding::new(
                ERROR,
                format!(
                    "description length {} is outside [{},{}]",
                    length, self.min_description_len, self.max_description_len
                ),
                &doc.path,
            ));
        }

        if let Some(first) = value.chars().next()
            && !first.is_uppercase()
        {
            findings.push(Finding::new(
                ERROR,
                "description must start with an uppercase letter",
                &doc.path,
            ));
        }

        if value.ends_with('.') {
            findings.push(Finding::new(
                ERROR,
                "description must not end with a period",
                &doc.path,
            ));
        }

        if let Some(m) = self.forbidden_terms.find(value) {
            findings.push(Finding::new(
                ERROR,
                format!("description contains forbidden term '{}'", m.as_str()),
                &doc.path,
            ));
        }
    }

    fn check_headings(&self, doc: &TemplateDocument, findings: &mut Vec<Finding>) {
        let count = doc
            .body
            .lines()
            .filter(|l| l.starts_with("# "))
            .count();

        if count == 0 {
            findings.push(Finding::new(
                ERROR,
                "template has no top-level heading",
                &doc.path,
            ));
        } else if count > 1 {
            findings.push(Finding::new(
                WARNING,
                format!("template has {} top-level headings, expected one", count),
                &doc.path,
            ));
        }
    }

    fn check_usage(&self, doc: &TemplateDocument, findings: &mut Vec<Finding>) {
        match &doc.usage_line {
            None => findings.push(Finding::new(
                WARNING,
                "missing 'Usage:' line",
                &doc.path,
            )),
            Some(line) => {
                if !line.contains(doc.base_name()) {
                    findings.push(Finding::new(
                        WARNING,
                        format!("'Usage:' line does not reference '{}'", doc.base_name()),
                        &doc.path,
                    ));
                }
            }
        }
    }

    fn check_links(&self, doc: &TemplateDocument, findings: &mut Vec<Finding>) {
        for link in &doc.links {
            // Strip an in-page anchor before resolving
            let target = link.target.split('#').next().unwrap_or("");
            if target.is_empty() {
                continue;
            }
            let resolved = doc.dir().join(target);
            if !resolved.exists() {
                findings.push(
                    Finding::new(
                        ERROR,
                        format!("broken relative link '{}'", link.target),
                        &doc.path,
                    )
                    .with_line(link.line),
                );
            }
        }
    }

    /// Report every cycle in the cross-document reference graph
    fn check_cycles(&self, docs: &[TemplateDocument]) -> Vec<Finding> {
        let index: HashMap<&str, usize> = docs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.file_name(), i))
            .collect();

        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); docs.len()];
        for (i, doc) in docs.iter().enumerate() {
            for reference in &doc.md_refs {
                let name = Path::new(reference)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("");
                if let Some(&j) = index.get(name)
                    && j != i
                    && !edges[i].contains(&j)
                {
                    edges[i].push(j);
                }
            }
        }

        let mut findings = Vec::new();
        let mut seen_cycles: HashSet<Vec<usize>> = HashSet::new();
        let mut color = vec![0u8; docs.len()]; // 0 white, 1 gray, 2 black
        let mut path = Vec::new();

        for start in 0..docs.len() {
            if color[start] == 0 {
                Self::dfs_cycles(
                    start,
                    &edges,
                    docs,
                    &mut color,
                    &mut path,
                    &mut seen_cycles,
                    &mut findings,
                );
            }
        }

        findings
    }

    fn dfs_cycles(
        node: usize,
        edges: &[Vec<usize>],
        docs: &[TemplateDocument],
        color: &mut Vec<u8>,
        path: &mut Vec<usize>,
        seen_cycles: &mut HashSet<Vec<usize>>,
        findings: &mut Vec<Finding>,
    ) {
        color[node] = 1;
        path.push(node);

        for &next in &edges[node] {
            if color[next] == 1 {
                // Found a cycle: the path segment from `next` to `node`
                let from = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle: Vec<usize> = path[from..].to_vec();

                // Normalize rotation so each cycle is reported once
                let min_pos = cycle
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, &n)| n)
                    .map(|(p, _)| p)
                    .unwrap_or(0);
                cycle.rotate_left(min_pos);

                if seen_cycles.insert(cycle.clone()) {
                    let mut names: Vec<&str> =
                        cycle.iter().map(|&n| docs[n].file_name()).collect();
                    names.push(docs[cycle[0]].file_name());
                    findings.push(Finding::new(
                        ERROR,
                        format!("circular reference detected: {}", names.join(" -> ")),
                        &docs[cycle[0]].path,
                    ));
                }
            } else if color[next] == 0 {
                Self::dfs_cycles(next, edges, docs, color, path, seen_cycles, findings);
            }
        }

        path.pop();
        color[node] = 2;
    }
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, content: &str) -> TemplateDocument {
        TemplateDocument::parse(name, content)
    }

    fn valid_content(base: &str) -> String {
        format!(
            "---\nallowed-tools: Read, Grep\ndescription: Summarize repository activity\n---\n\
             # Heading\n\nUsage: /{}\n",
            base
        )
    }

    #[test]
    fn test_valid_document_has_no_findings() {
        let validator = TemplateValidator::new();
        let findings = validator.validate_document(&doc("report.md", &valid_content("report")));
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn test_missing_description_yields_one_finding() {
        let validator = TemplateValidator::new();
        let content = "---\nallowed-tools: Read\n---\n# H\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", content));

        let about_description: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.message.contains("description"))
            .collect();
        assert_eq!(about_description.len(), 1);
        assert_eq!(about_description[0].severity, Severity::High);
    }

    #[test]
    fn test_description_length_boundaries() {
        let validator = TemplateValidator::new();

        // 9 characters: error
        let content = "---\nallowed-tools: Read\ndescription: Nine char\n---\n# H\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", content));
        assert!(findings.iter().any(|f| f.message.contains("length")));

        // 10 characters: no length finding
        let content = "---\nallowed-tools: Read\ndescription: Ten chars!\n---\n# H\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", content));
        assert!(!findings.iter().any(|f| f.message.contains("length")));
    }

    #[test]
    fn test_description_casing_and_period() {
        let validator = TemplateValidator::new();
        let content =
            "---\nallowed-tools: Read\ndescription: lowercase start ends here.\n---\n# H\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", content));

        assert!(findings.iter().any(|f| f.message.contains("uppercase")));
        assert!(findings.iter().any(|f| f.message.contains("period")));
    }

    #[test]
    fn test_description_forbidden_terms() {
        let validator = TemplateValidator::new();
        let content =
            "---\nallowed-tools: Read\ndescription: Rotate the api token nightly\n---\n# H\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", content));
        assert!(findings.iter().any(|f| f.message.contains("forbidden term")));
    }

    #[test]
    fn test_forbidden_term_requires_word_boundary() {
        let validator = TemplateValidator::new();
        let content =
            "---\nallowed-tools: Read\ndescription: Track monkeys in the keyboard zoo\n---\n# H\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", content));
        assert!(!findings.iter().any(|f| f.message.contains("forbidden term")));
    }

    #[test]
    fn test_allowed_tools_all_and_none() {
        let validator = TemplateValidator::new();
        for value in ["all", "none"] {
            let content = format!(
                "---\nallowed-tools: {}\ndescription: Summarize the log\n---\n# H\n\nUsage: /a\n",
                value
            );
            let findings = validator.validate_document(&doc("a.md", &content));
            assert!(
                !findings.iter().any(|f| f.message.contains("tool")),
                "{} flagged",
                value
            );
        }
    }

    #[test]
    fn test_unknown_tool_is_error() {
        let validator = TemplateValidator::new();
        let content =
            "---\nallowed-tools: Read, Teleport\ndescription: Summarize the log\n---\n# H\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", content));
        assert!(
            findings
                .iter()
                .any(|f| f.message.contains("unknown tool 'Teleport'") && f.severity == Severity::High)
        );
    }

    #[test]
    fn test_heading_count_checks() {
        let validator = TemplateValidator::new();

        let none = "---\nallowed-tools: Read\ndescription: Summarize the log\n---\nNo heading\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", none));
        assert!(
            findings
                .iter()
                .any(|f| f.message.contains("no top-level heading") && f.severity == Severity::High)
        );

        let two = "---\nallowed-tools: Read\ndescription: Summarize the log\n---\n# One\n# Two\n\nUsage: /a\n";
        let findings = validator.validate_document(&doc("a.md", two));
        assert!(
            findings
                .iter()
                .any(|f| f.message.contains("2 top-level headings")
                    && f.severity == Severity::Medium)
        );
    }

    #[test]
    fn test_usage_line_warnings() {
        let validator = TemplateValidator::new();

        let missing = "---\nallowed-tools: Read\ndescription: Summarize the log\n---\n# H\n";
        let findings = validator.validate_document(&doc("a.md", missing));
        assert!(findings.iter().any(|f| f.message.contains("missing 'Usage:'")));

        let wrong = "---\nallowed-tools: Read\ndescription: Summarize the log\n---\n# H\n\nUsage: /other\n";
        let findings = validator.validate_document(&doc("a.md", wrong));
        assert!(
            findings
                .iter()
                .any(|f| f.message.contains("does not reference 'a'"))
        );
    }

    #[test]
    fn test_cycle_detection() {
        let validator = TemplateValidator::new();
        let a = doc("a.md", "See b.md for details.");
        let b = doc("b.md", "See a.md for details.");
        let c = doc("c.md", "Standalone.");

        let findings = validator.check_cycles(&[a, b, c]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("circular reference"));
        assert!(findings[0].message.contains("a.md"));
        assert!(findings[0].message.contains("b.md"));
    }

    #[test]
    fn test_three_node_cycle_reported_once() {
        let validator = TemplateValidator::new();
        let a = doc("a.md", "Continue in b.md.");
        let b = doc("b.md", "Continue in c.md.");
        let c = doc("c.md", "Back to a.md.");

        let findings = validator.check_cycles(&[a, b, c]);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_acyclic_graph_is_clean() {
        let validator = TemplateValidator::new();
        let a = doc("a.md", "Uses b.md and c.md.");
        let b = doc("b.md", "Uses c.md.");
        let c = doc("c.md", "Leaf document.");

        let findings = validator.check_cycles(&[a, b, c]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let validator = TemplateValidator::new();
        let a = doc("a.md", "This file is a.md.");

        let findings = validator.check_cycles(&[a]);
        assert!(findings.is_empty());
    }
}
