use regex::Regex;
use std::collections::HashMap;

use crate::config::settings::Config;
use crate::findings::{Finding, SecurityVerdict, Severity, SeverityCounts};
use crate::security::patterns::PatternSet;
use crate::template::document::TemplateDocument;

#[derive(Debug, Clone, Copy, Default)]
struct ToolCaps {
    executes: bool,
    network: bool,
    mutates_files: bool,
}

/// Classifies risk in a template's declared permissions and content.
///
/// Stateless per document apart from the run-scoped severity counters;
/// findings are purely additive and never halt processing. Independent
/// per-document runs can be combined with [`absorb`].
///
/// [`absorb`]: SecurityAuditor::absorb
pub struct SecurityAuditor {
    tools: HashMap<String, ToolCaps>,
    justification_keywords: Vec<String>,
    safeguard_keywords: Vec<String>,
    patterns: PatternSet,
    parameter_expansion: Regex,
    direct_execution: Regex,
    counts: SeverityCounts,
}

impl SecurityAuditor {
    pub fn new() -> Self {
        Self::from_config(&Config::default_config())
    }

    pub fn from_config(config: &Config) -> Self {
        let tools = config
            .tools
            .iter()
            .map(|t| {
                (
                    t.name.clone(),
                    ToolCaps {
                        executes: t.executes,
                        network: t.network,
                        mutates_files: t.mutates_files,
                    },
                )
            })
            .collect();

        Self {
            tools,
            justification_keywords: config.audit.justification_keywords.clone(),
            safeguard_keywords: config.audit.safeguard_keywords.clone(),
            patterns: PatternSet::builtin(),
            // Positional ($1, $@, $*) or environment-style ($NAME, ${NAME})
            parameter_expansion: Regex::new(r"\$\{?([0-9@*]|[A-Z_][A-Z0-9_]*)").unwrap(),
            direct_execution: Regex::new(r"\b(eval|exec|system)\b").unwrap(),
            counts: SeverityCounts::default(),
        }
    }

    /// Audit one document, returning its findings and recording them in the
    /// run-scoped counters
    pub fn audit_document(&mut self, doc: &TemplateDocument) -> Vec<Finding> {
        let mut findings = Vec::new();

        self.check_tool_permissions(doc, &mut findings);
        self.scan_content(doc, &mut findings);
        self.check_sanitization(doc, &mut findings);

        for finding in &findings {
            self.counts.record(finding.severity);
        }

        findings
    }

    /// Run-scoped counters accumulated so far
    pub fn counts(&self) -> SeverityCounts {
        self.counts
    }

    /// Merge counters produced by an independent auditor run
    pub fn absorb(&mut self, other: SeverityCounts) {
        self.counts.merge(&other);
    }

    /// Overall verdict: highest severity observed across the run
    pub fn verdict(&self) -> SecurityVerdict {
        SecurityVerdict::from_counts(self.counts)
    }

    fn check_tool_permissions(&self, doc: &TemplateDocument, findings: &mut Vec<Finding>) {
        let Some(declared) = doc.frontmatter.get("allowed-tools") else {
            // Missing key is a structural defect; the validator reports it
            return;
        };

        let declared = declared.trim();
        let body_lower = doc.body.to_lowercase();

        if declared == "all" {
            findings.push(Finding::new(
                Severity::High,
                "'allowed-tools: all' grants unrestricted tool access",
                &doc.path,
            ));

            let justified = self
                .justification_keywords
                .iter()
                .any(|k| body_lower.contains(k.as_str()));
            if !justified {
                findings.push(Finding::new(
                    Severity::Medium,
                    "unrestricted tool access without a documented justification",
                    &doc.path,
                ));
            }
            return;
        }

        if declared == "none" {
            return;
        }

        let mut caps = ToolCaps::default();
        for token in declared.split(',') {
            if let Some(tool) = self.tools.get(token.trim()) {
                caps.executes |= tool.executes;
                caps.network |= tool.network;
                caps.mutates_files |= tool.mutates_files;
            }
        }

        if caps.executes {
            findings.push(Finding::new(
                Severity::High,
                "execution-capable tool declared in 'allowed-tools'",
                &doc.path,
            ));
        }

        if caps.executes && caps.network {
            findings.push(Finding::new(
                Severity::Critical,
                "execution-capable and network-capable tools declared together",
                &doc.path,
            ));
        }

        if caps.mutates_files {
            let safeguarded = self
                .safeguard_keywords
                .iter()
                .any(|k| body_lower.contains(k.as_str()));
            if !safeguarded {
                findings.push(Finding::new(
                    Severity::Medium,
                    "file-mutating tools declared without backup or rollback guidance",
                    &doc.path,
                ));
            }
        }
    }

    fn scan_content(&self, doc: &TemplateDocument, findings: &mut Vec<Finding>) {
        for (offset, line) in doc.body.lines().enumerate() {
            for rule in self.patterns.matches(line) {
                findings.push(
                    Finding::new(rule.severity, rule.message, &doc.path)
                        .with_line(doc.body_start_line + offset),
                );
            }
        }
    }

    /// Heuristic: parameter expansion is suspect unless a validation keyword
    /// appears within two lines of it; direct eval/exec/system mentions are
    /// critical regardless of context.
    fn check_sanitization(&self, doc: &TemplateDocument, findings: &mut Vec<Finding>) {
        let lines: Vec<&str> = doc.body.lines().collect();

        for (offset, line) in lines.iter().enumerate() {
            if self.direct_execution.is_match(line) {
                findings.push(
                    Finding::new(
                        Severity::Critical,
                        "direct eval/exec/system invocation",
                        &doc.path,
                    )
                    .with_line(doc.body_start_line + offset),
                );
            }

            if self.parameter_expansion.is_match(line) {
                let window_start = offset.saturating_sub(2);
                let window_end = (offset + 3).min(lines.len());
                let guarded = lines[window_start..window_end].iter().any(|nearby| {
                    let lower = nearby.to_lowercase();
                    crate::security::SANITIZE_KEYWORDS
                        .iter()
                        .any(|k| lower.contains(k))
                });

                if !guarded {
                    findings.push(
                        Finding::new(
                            Severity::High,
                            "parameter expansion without nearby input validation",
                            &doc.path,
                        )
                        .with_line(doc.body_start_line + offset),
                    );
                }
            }
        }
    }
}

impl Default for SecurityAuditor {
    fn default() -> Self {
        Self::new()
    }
}
