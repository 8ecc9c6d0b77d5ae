use crate::sim::sanitizer::{self, SanitizeError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error(transparent)]
    Unsafe(#[from] SanitizeError),
}

/// Closed set of commands the interpreter understands.
///
/// Anything else becomes `Custom`, which the interpreter answers with an
/// explicit "not a git command" failure rather than a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Status,
    Add,
    Commit,
    Branch,
    Checkout,
    Push,
    Diff,
    Log,
    Config,
    Custom(String),
}

impl CommandKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "status" => CommandKind::Status,
            "add" => CommandKind::Add,
            "commit" => CommandKind::Commit,
            "branch" => CommandKind::Branch,
            "checkout" => CommandKind::Checkout,
            "push" => CommandKind::Push,
            "diff" => CommandKind::Diff,
            "log" => CommandKind::Log,
            "config" => CommandKind::Config,
            other => CommandKind::Custom(other.to_string()),
        }
    }
}

/// One parsed command invocation: the raw string as received plus the
/// sanitized token list that survived argument validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub kind: CommandKind,
    pub raw: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    /// Parse and sanitize a raw command line.
    ///
    /// A leading `git` token is stripped. Sanitization failure short-circuits
    /// the invocation before any interpretation happens.
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CommandError::Empty);
        }

        let mut tokens = sanitizer::sanitize_tokens(trimmed)?;
        if tokens.first().map(String::as_str) == Some("git") {
            tokens.remove(0);
        }

        let Some(first) = tokens.first() else {
            return Err(CommandError::Empty);
        };

        let kind = CommandKind::from_token(first);
        let args = tokens[1..].to_vec();

        Ok(Self {
            kind,
            raw: trimmed.to_string(),
            args,
        })
    }
}
