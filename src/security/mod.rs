pub mod auditor;
pub mod patterns;

pub use auditor::SecurityAuditor;
pub use patterns::{PatternRule, PatternSet};

/// Recognized tool vocabulary with capability flags:
/// (name, executes, network, mutates_files).
///
/// Shared by the template validator (vocabulary membership) and the security
/// auditor (capability analysis) so the two can never drift apart. Adding an
/// execution- or network-capable tool requires careful security review.
pub const KNOWN_TOOLS: &[(&str, bool, bool, bool)] = &[
    // Read-only
    ("Read", false, false, false),
    ("Grep", false, false, false),
    ("Glob", false, false, false),
    ("TodoWrite", false, false, false),
    // Execution-capable
    ("Bash", true, false, false),
    ("Task", true, false, false),
    // Network-capable
    ("WebFetch", false, true, false),
    ("WebSearch", false, true, false),
    // File-mutating
    ("Write", false, false, true),
    ("Edit", false, false, true),
    ("MultiEdit", false, false, true),
    ("NotebookEdit", false, false, true),
];

/// Keywords that count as a documented justification for broad tool access
pub const JUSTIFICATION_KEYWORDS: &[&str] =
    &["security", "caution", "danger", "warning", "critical"];

/// Keywords that count as backup/rollback guidance for file-mutating tools
pub const SAFEGUARD_KEYWORDS: &[&str] = &["backup", "rollback", "restore", "undo"];

/// Keywords that count as nearby input validation for parameter expansion
pub const SANITIZE_KEYWORDS: &[&str] = &["validate", "sanitize", "escape", "quote"];
