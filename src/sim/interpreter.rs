use crate::config::settings::SimConfig;
use crate::sim::command::{CommandInvocation, CommandKind};
use crate::sim::ids::CommitIdSource;
use crate::sim::state::{CommitRecord, PushMode, RepositoryState};
use crate::sim::{HookOutcome, MAX_STAGED_FILE_SIZE, PROTECTED_BRANCHES};

/// Result of interpreting one command against the mock repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
            success: true,
        }
    }

    pub fn fail(stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
            success: false,
        }
    }

    /// Combined transcript, stderr after stdout, for assertions
    pub fn transcript(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            (true, _) => self.stderr.clone(),
        }
    }
}

/// Interprets command invocations against a [`RepositoryState`].
///
/// Every transition either succeeds (possibly mutating the state) or fails
/// with a deterministic transcript and the state untouched. Nothing here
/// panics or returns an error for recoverable conditions.
pub struct Interpreter {
    protected_branches: Vec<String>,
    max_file_size: u64,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            protected_branches: PROTECTED_BRANCHES.iter().map(|s| s.to_string()).collect(),
            max_file_size: MAX_STAGED_FILE_SIZE,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            protected_branches: config.protected_branches.clone(),
            max_file_size: config.max_staged_file_size,
        }
    }

    fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches.iter().any(|b| b == branch)
    }

    /// Apply one invocation to the state, returning its transcript and exit
    /// code. Failures leave the state unchanged.
    pub fn apply(
        &self,
        state: &mut RepositoryState,
        invocation: &CommandInvocation,
        ids: &mut dyn CommitIdSource,
    ) -> CommandOutput {
        match &invocation.kind {
            CommandKind::Status => self.status(state),
            CommandKind::Add => self.add(state, &invocation.args),
            CommandKind::Commit => self.commit(state, &invocation.args, ids),
            CommandKind::Branch => self.branch(state, &invocation.args),
            CommandKind::Checkout => self.checkout(state, &invocation.args),
            CommandKind::Push => self.push(state),
            CommandKind::Diff => self.diff(state),
            CommandKind::Log => self.log(state),
            CommandKind::Config => self.config(state),
            CommandKind::Custom(name) => {
                CommandOutput::fail(format!("git: '{}' is not a git command", name), 1)
            }
        }
    }

    fn status(&self, state: &RepositoryState) -> CommandOutput {
        CommandOutput::ok(state.status_report().join("\n"))
    }

    fn add(&self, state: &mut RepositoryState, args: &[String]) -> CommandOutput {
        if args.is_empty() {
            return CommandOutput::fail("Nothing specified, nothing added.", 1);
        }

        if args.iter().any(|a| a == "." || a == "-A" || a == "--all") {
            let modified = std::mem::take(&mut state.modified);
            let untracked = std::mem::take(&mut state.untracked);
            state.staged.extend(modified);
            state.staged.extend(untracked);
            return CommandOutput::ok("");
        }

        let paths: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();
        if paths.is_empty() {
            return CommandOutput::fail("Nothing specified, nothing added.", 1);
        }

        // Verify every pathspec before mutating anything
        for path in &paths {
            let known = state.modified.contains(*path)
                || state.untracked.contains(*path)
                || state.staged.contains(*path);
            if !known {
                return CommandOutput::fail(
                    format!("fatal: pathspec '{}' did not match any files", path),
                    1,
                );
            }
        }

        for path in paths {
            state.modified.remove(path);
            state.untracked.remove(path);
            state.staged.insert(path.clone());
        }

        CommandOutput::ok("")
    }

    fn commit(
        &self,
        state: &mut RepositoryState,
        args: &[String],
        ids: &mut dyn CommitIdSource,
    ) -> CommandOutput {
        let mut message: Option<&str> = None;
        let mut amend = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-m" | "--message" => message = iter.next().map(String::as_str),
                "--amend" => amend = true,
                _ => {}
            }
        }

        // Protected-branch policy comes first so it holds even on a clean tree
        if self.is_protected(&state.branch) {
            return CommandOutput::fail(
                format!(
                    "error: commit to protected branch '{}' is not allowed",
                    state.branch
                ),
                1,
            );
        }

        if state.staged.is_empty() && !amend {
            return CommandOutput::fail("nothing to commit, working tree clean", 1);
        }

        if state.hooks_enabled && state.hook_outcome == HookOutcome::Fail {
            return CommandOutput::fail("error: pre-commit hook failed", 1);
        }

        for path in &state.staged {
            let size = state.file_size(path);
            if size > self.max_file_size {
                return CommandOutput::fail(
                    format!(
                        "error: file '{}' exceeds maximum file size ({} bytes)",
                        path, self.max_file_size
                    ),
                    1,
                );
            }
        }

        let message = match (message, amend) {
            (Some(m), _) => m.to_string(),
            // Amend without -m reuses the previous message
            (None, true) => match &state.last_commit {
                Some(commit) => commit.message.clone(),
                None => {
                    return CommandOutput::fail("error: you have nothing to amend", 1);
                }
            },
            (None, false) => {
                return CommandOutput::fail("error: no commit message given (use -m)", 1);
            }
        };

        let id = ids.next_id();
        state.staged.clear();
        let output = format!("[{} {}] {}", state.branch, id, message);
        state.last_commit = Some(CommitRecord { id, message });

        CommandOutput::ok(output)
    }

    fn branch(&self, state: &mut RepositoryState, args: &[String]) -> CommandOutput {
        if args.is_empty() {
            let mut names: Vec<&String> = state.branches.iter().collect();
            names.sort();
            let lines: Vec<String> = names
                .into_iter()
                .map(|name| {
                    if *name == state.branch {
                        format!("* {}", name)
                    } else {
                        format!("  {}", name)
                    }
                })
                .collect();
            return CommandOutput::ok(lines.join("\n"));
        }

        match args[0].as_str() {
            "-b" => {
                let Some(name) = args.get(1) else {
                    return CommandOutput::fail("error: switch 'b' requires a value", 129);
                };
                self.create_branch(state, name)
            }
            "-d" | "-D" => {
                let Some(name) = args.get(1) else {
                    return CommandOutput::fail("error: branch name required", 129);
                };
                self.delete_branch(state, name)
            }
            name if !name.starts_with('-') => self.create_branch(state, &args[0]),
            flag => CommandOutput::fail(format!("error: unknown switch '{}'", flag), 129),
        }
    }

    fn create_branch(&self, state: &mut RepositoryState, name: &str) -> CommandOutput {
        if self.is_protected(name) {
            return CommandOutput::fail(
                format!("error: branch name '{}' is protected", name),
                1,
            );
        }
        if state.branches.iter().any(|b| b == name) {
            return CommandOutput::fail(
                format!("fatal: a branch named '{}' already exists", name),
                128,
            );
        }
        state.branches.push(name.to_string());
        CommandOutput::ok("")
    }

    fn delete_branch(&self, state: &mut RepositoryState, name: &str) -> CommandOutput {
        if name == state.branch {
            return CommandOutput::fail(
                format!(
                    "error: cannot delete branch '{}' checked out at the moment",
                    name
                ),
                1,
            );
        }
        if self.is_protected(name) {
            return CommandOutput::fail(format!("error: branch '{}' is protected", name), 1);
        }
        let Some(pos) = state.branches.iter().position(|b| b == name) else {
            return CommandOutput::fail(format!("error: branch '{}' not found", name), 1);
        };
        state.branches.remove(pos);
        CommandOutput::ok(format!("Deleted branch {}", name))
    }

    fn checkout(&self, state: &mut RepositoryState, args: &[String]) -> CommandOutput {
        if args.is_empty() {
            return CommandOutput::fail("error: missing branch name", 129);
        }

        if args[0] == "-b" {
            let Some(name) = args.get(1) else {
                return CommandOutput::fail("error: switch 'b' requires a value", 129);
            };
            // Unconditional create + switch
            if !state.branches.iter().any(|b| b == name) {
                state.branches.push(name.clone());
            }
            state.branch = name.clone();
            return CommandOutput::ok(format!("Switched to a new branch '{}'", name));
        }

        let name = &args[0];
        // Only exact main/develop and the feature/ prefix resolve here; this
        // is a documented simplification, not full ref resolution.
        let recognized = name == "main" || name == "develop" || name.starts_with("feature/");
        if !recognized {
            return CommandOutput::fail(
                format!(
                    "error: pathspec '{}' did not match any file(s) known to git",
                    name
                ),
                1,
            );
        }

        if !state.branches.iter().any(|b| b == name) {
            state.branches.push(name.clone());
        }
        state.branch = name.clone();
        CommandOutput::ok(format!("Switched to branch '{}'", name))
    }

    fn push(&self, state: &RepositoryState) -> CommandOutput {
        if state.in_conflict() {
            return CommandOutput::fail("error: cannot push with unresolved conflicts", 1);
        }

        let Some(remote) = &state.remote else {
            return CommandOutput::fail("fatal: no configured push destination", 128);
        };

        match state.push_mode {
            PushMode::Success => CommandOutput::ok(format!(
                "To {}\n   {} -> {}",
                remote, state.branch, state.branch
            )),
            PushMode::Rejected => CommandOutput::fail(
                format!(
                    "To {}\n ! [rejected] {} -> {} (fetch first)",
                    remote, state.branch, state.branch
                ),
                1,
            ),
            PushMode::NonFastForward => CommandOutput::fail(
                format!(
                    "To {}\n ! [rejected] {} -> {} (non-fast-forward)\nhint: updates were rejected because the remote contains work you do not have locally",
                    remote, state.branch, state.branch
                ),
                1,
            ),
        }
    }

    fn diff(&self, state: &RepositoryState) -> CommandOutput {
        let lines: Vec<String> = state
            .modified
            .iter()
            .map(|path| format!("diff --git a/{} b/{}", path, path))
            .collect();
        CommandOutput::ok(lines.join("\n"))
    }

    fn log(&self, state: &RepositoryState) -> CommandOutput {
        match &state.last_commit {
            Some(commit) => CommandOutput::ok(format!("{} {}", commit.id, commit.message)),
            None => CommandOutput::fail(
                format!(
                    "fatal: your current branch '{}' does not have any commits yet",
                    state.branch
                ),
                128,
            ),
        }
    }

    fn config(&self, state: &RepositoryState) -> CommandOutput {
        let hook_result = match state.hook_outcome {
            HookOutcome::Pass => "pass",
            HookOutcome::Fail => "fail",
        };
        let push_mode = match state.push_mode {
            PushMode::Success => "success",
            PushMode::Rejected => "rejected",
            PushMode::NonFastForward => "non-fast-forward",
        };

        let mut lines = vec![
            format!("branch.current={}", state.branch),
            format!("hooks.enabled={}", state.hooks_enabled),
            format!("hooks.result={}", hook_result),
            format!("push.mode={}", push_mode),
        ];
        if let Some(remote) = &state.remote {
            lines.push(format!("remote.name={}", remote));
        }

        CommandOutput::ok(lines.join("\n"))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
