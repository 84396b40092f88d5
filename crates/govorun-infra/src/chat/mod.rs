//! Conversational provider adapters.

pub mod gigachat;

pub use gigachat::GigaChatProvider;
