//! Credential sources for conversational providers.

pub mod gigachat;

pub use gigachat::GigaChatTokenSource;
