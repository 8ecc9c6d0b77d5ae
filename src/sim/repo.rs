use crate::config::settings::SimConfig;
use crate::error::EngineResult;
use crate::sim::command::{CommandInvocation, CommandKind};
use crate::sim::ids::SeededIds;
use crate::sim::interpreter::{CommandOutput, Interpreter};
use crate::sim::state::RepositoryState;

/// Owns one mock repository: canonical state, command history and the commit
/// id source.
///
/// One instance belongs to exactly one test scenario. Concurrent scenarios
/// must each use their own instance; within a scenario all `apply` calls are
/// strictly ordered.
pub struct MockRepository {
    state: RepositoryState,
    interpreter: Interpreter,
    ids: SeededIds,
    seed: u64,
    history: Vec<CommandInvocation>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Deterministic commit ids: the same seed yields the same id sequence
    /// across runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: RepositoryState::new(),
            interpreter: Interpreter::new(),
            ids: SeededIds::new(seed),
            seed,
            history: Vec::new(),
        }
    }

    pub fn from_config(config: &SimConfig, seed: u64) -> Self {
        Self {
            state: RepositoryState::new(),
            interpreter: Interpreter::from_config(config),
            ids: SeededIds::new(seed),
            seed,
            history: Vec::new(),
        }
    }

    /// Discard all scenario state: fresh repository, empty history, id
    /// sequence rewound to the original seed
    pub fn reset(&mut self) {
        self.state.reset();
        self.ids = SeededIds::new(self.seed);
        self.history.clear();
    }

    pub fn state(&self) -> &RepositoryState {
        &self.state
    }

    /// Direct state access for scenario setup
    pub fn state_mut(&mut self) -> &mut RepositoryState {
        &mut self.state
    }

    /// Ordered status report lines; read-only, not recorded in history
    pub fn status(&self) -> Vec<String> {
        self.state.status_report()
    }

    /// Interpret one parsed invocation.
    ///
    /// The invocation is appended to the execution history whether it
    /// succeeds or fails. After the transition the structural invariants are
    /// re-checked; a violation is an engine bug and aborts the scenario.
    pub fn apply(&mut self, invocation: CommandInvocation) -> EngineResult<CommandOutput> {
        let output = self
            .interpreter
            .apply(&mut self.state, &invocation, &mut self.ids);
        self.history.push(invocation);
        self.state.check_invariants()?;
        Ok(output)
    }

    /// Parse, sanitize and interpret a raw command line.
    ///
    /// Sanitization failure short-circuits interpretation: the state is left
    /// untouched and a fixed unsafe-argument transcript with a non-zero exit
    /// code is returned. The rejected call is still recorded in history.
    pub fn apply_raw(&mut self, raw: &str) -> EngineResult<CommandOutput> {
        match CommandInvocation::parse(raw) {
            Ok(invocation) => self.apply(invocation),
            Err(error) => {
                let name = raw
                    .split_whitespace()
                    .find(|w| *w != "git")
                    .unwrap_or("<empty>");
                self.history.push(CommandInvocation {
                    kind: CommandKind::Custom(name.to_string()),
                    raw: raw.to_string(),
                    args: Vec::new(),
                });
                Ok(CommandOutput::fail(error.to_string(), 1))
            }
        }
    }

    /// Ordered record of every invocation this scenario attempted
    pub fn execution_history(&self) -> &[CommandInvocation] {
        &self.history
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}
