pub mod config;
pub mod error;
pub mod findings;
pub mod security;
pub mod sim;
pub mod template;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult, EngineError, EngineResult};
pub use findings::{Finding, SecurityVerdict, Severity, SeverityCounts, VerdictStatus};
pub use security::SecurityAuditor;
pub use sim::{CommandInvocation, CommandKind, CommandOutput, MockRepository, RepositoryState};
pub use template::{TemplateDocument, TemplateValidator};
