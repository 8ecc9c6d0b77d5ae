use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Severity of a single validation or security finding.
///
/// Ordered ascending so `max()` over a set of findings yields the most
/// severe one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// One classified observation from validation or security analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: file.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "[{}] {}:{}: {}",
                self.severity,
                self.file.display(),
                line,
                self.message
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.file.display(), self.message),
        }
    }
}

/// Run-scoped counters, one per severity.
///
/// Independent per-document counters can be combined with [`merge`], which is
/// the safe aggregation step required when documents are analyzed in parallel.
///
/// [`merge`]: SeverityCounts::merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            counts.record(finding.severity);
        }
        counts
    }

    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn merge(&mut self, other: &SeverityCounts) {
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
        self.info += other.info;
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }

    /// Most severe level with at least one finding
    pub fn highest(&self) -> Option<Severity> {
        if self.critical > 0 {
            Some(Severity::Critical)
        } else if self.high > 0 {
            Some(Severity::High)
        } else if self.medium > 0 {
            Some(Severity::Medium)
        } else if self.low > 0 {
            Some(Severity::Low)
        } else if self.info > 0 {
            Some(Severity::Info)
        } else {
            None
        }
    }
}

/// Tri-state overall status derived from the highest severity present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictStatus {
    Clean,
    NeedsReview,
    Blocking,
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerdictStatus::Clean => "clean",
            VerdictStatus::NeedsReview => "needs-review",
            VerdictStatus::Blocking => "blocking",
        };
        write!(f, "{}", s)
    }
}

/// Aggregate outcome of a validation/audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityVerdict {
    pub counts: SeverityCounts,
    pub status: VerdictStatus,
}

impl SecurityVerdict {
    pub fn from_counts(counts: SeverityCounts) -> Self {
        let status = match counts.highest() {
            Some(Severity::Critical) => VerdictStatus::Blocking,
            Some(Severity::High) | Some(Severity::Medium) => VerdictStatus::NeedsReview,
            _ => VerdictStatus::Clean,
        };
        Self { counts, status }
    }

    /// Process exit code contract: critical findings exit 2, high findings
    /// exit 1, anything else exits 0.
    pub fn exit_code(&self) -> i32 {
        if self.counts.critical > 0 {
            2
        } else if self.counts.high > 0 {
            1
        } else {
            0
        }
    }
}
