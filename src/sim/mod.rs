pub mod command;
pub mod ids;
pub mod interpreter;
pub mod repo;
pub mod sanitizer;
pub mod state;

// Re-export commonly used types
pub use command::{CommandError, CommandInvocation, CommandKind};
pub use ids::{CommitIdSource, SeededIds};
pub use interpreter::{CommandOutput, Interpreter};
pub use repo::MockRepository;
pub use sanitizer::SanitizeError;
pub use state::{CommitRecord, FileState, HookOutcome, PushMode, RepositoryState};

/// Branch names on which direct mutating operations are policy-blocked.
///
/// Used by both the Interpreter (to reject commits and branch deletion) and
/// the default configuration, so the two can never drift apart.
pub const PROTECTED_BRANCHES: &[&str] = &["main", "master", "develop", "production", "release"];

/// Largest declared size (in bytes) a staged file may have for a commit to
/// succeed: 100 MiB, matching the common hosting limit.
pub const MAX_STAGED_FILE_SIZE: u64 = 104_857_600;

/// Check a branch name against the built-in protected set
pub fn is_protected_branch(name: &str) -> bool {
    PROTECTED_BRANCHES.contains(&name)
}
