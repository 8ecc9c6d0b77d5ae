use crate::error::{EngineError, EngineResult};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome a configured hook reports when it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Pass,
    Fail,
}

/// Outcome mode the simulated remote is configured to answer pushes with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Success,
    Rejected,
    NonFastForward,
}

/// Per-path status within the working tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Unmodified,
    Modified,
    Staged,
    Untracked,
    Conflicted,
}

/// The most recent commit recorded by the simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub message: String,
}

/// In-memory stand-in for a git working tree.
///
/// One instance is owned exclusively by one scenario and mutated only through
/// [`Interpreter`](crate::sim::Interpreter) transitions. Path sets are
/// `BTreeSet`s so every report iterates in a stable order.
#[derive(Debug, Clone)]
pub struct RepositoryState {
    pub branch: String,
    pub branches: Vec<String>,
    pub staged: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub untracked: BTreeSet<String>,
    pub conflicted: BTreeSet<String>,
    pub sizes: BTreeMap<String, u64>,
    pub has_conflicts: bool,
    pub hooks_enabled: bool,
    pub hook_outcome: HookOutcome,
    pub push_mode: PushMode,
    pub remote: Option<String>,
    pub last_commit: Option<CommitRecord>,
}

impl RepositoryState {
    /// Fresh state: on `main`, all sets empty, no conflict, hooks off, a
    /// default `origin` remote and a push mode of `Success`.
    pub fn new() -> Self {
        Self {
            branch: "main".to_string(),
            branches: vec!["main".to_string()],
            staged: BTreeSet::new(),
            modified: BTreeSet::new(),
            untracked: BTreeSet::new(),
            conflicted: BTreeSet::new(),
            sizes: BTreeMap::new(),
            has_conflicts: false,
            hooks_enabled: false,
            hook_outcome: HookOutcome::Pass,
            push_mode: PushMode::Success,
            remote: Some("origin".to_string()),
            last_commit: None,
        }
    }

    /// Return to the initial state, discarding all scenario mutations
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Check if the working tree is in a clean state (no changes)
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.untracked.is_empty()
            && self.conflicted.is_empty()
    }

    /// True when any conflict is present, via the flag or a conflicted path
    pub fn in_conflict(&self) -> bool {
        self.has_conflicts || !self.conflicted.is_empty()
    }

    /// Place `path` into exactly one status set, recording its declared size.
    ///
    /// Scenario setup helper: removes the path from every other set first so
    /// the per-path status stays single-valued.
    pub fn set_file(&mut self, path: &str, state: FileState, size: u64) {
        self.staged.remove(path);
        self.modified.remove(path);
        self.untracked.remove(path);
        self.conflicted.remove(path);

        match state {
            FileState::Unmodified => {}
            FileState::Modified => {
                self.modified.insert(path.to_string());
            }
            FileState::Staged => {
                self.staged.insert(path.to_string());
            }
            FileState::Untracked => {
                self.untracked.insert(path.to_string());
            }
            FileState::Conflicted => {
                self.conflicted.insert(path.to_string());
            }
        }

        self.sizes.insert(path.to_string(), size);
    }

    /// Declared size of a path, defaulting to zero when never declared
    pub fn file_size(&self, path: &str) -> u64 {
        self.sizes.get(path).copied().unwrap_or(0)
    }

    /// Verify the structural invariants that every reachable state must hold.
    ///
    /// A violation is an engine bug, not a scenario failure, and aborts the
    /// scenario as unrecoverable.
    pub fn check_invariants(&self) -> EngineResult<()> {
        if let Some(path) = self.staged.intersection(&self.untracked).next() {
            return Err(EngineError::InvariantViolation(format!(
                "path '{}' is both staged and untracked",
                path
            )));
        }

        if !self.branches.contains(&self.branch) {
            return Err(EngineError::InvariantViolation(format!(
                "current branch '{}' is not in the branch list",
                self.branch
            )));
        }

        Ok(())
    }

    /// Ordered status report: conflicts first, then staged, unstaged and
    /// untracked. Ends with the clean message only when all four sets are
    /// empty.
    pub fn status_report(&self) -> Vec<String> {
        let mut lines = vec![format!("On branch {}", self.branch)];

        if !self.conflicted.is_empty() {
            lines.push("Unmerged paths:".to_string());
            for path in &self.conflicted {
                lines.push(format!("  both modified:   {}", path));
            }
        }

        if !self.staged.is_empty() {
            lines.push("Changes to be committed:".to_string());
            for path in &self.staged {
                lines.push(format!("  staged:     {}", path));
            }
        }

        if !self.modified.is_empty() {
            lines.push("Changes not staged for commit:".to_string());
            for path in &self.modified {
                lines.push(format!("  modified:   {}", path));
            }
        }

        if !self.untracked.is_empty() {
            lines.push("Untracked files:".to_string());
            for path in &self.untracked {
                lines.push(format!("  {}", path));
            }
        }

        if self.is_clean() {
            lines.push("nothing to commit, working tree clean".to_string());
        }

        lines
    }
}

impl Default for RepositoryState {
    fn default() -> Self {
        Self::new()
    }
}
