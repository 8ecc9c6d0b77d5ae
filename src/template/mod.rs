pub mod document;
pub mod validator;

pub use document::{RelativeLink, TemplateDocument, TemplateError};
pub use validator::TemplateValidator;
