//! The normalized response envelope.
//!
//! Built once per request by the response composer and immutable after
//! construction. The caller receives the same envelope shape regardless of
//! which provider satisfied the request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of payload the envelope carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    Text,
    Image,
    SearchAugmentedText,
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeKind::Text => write!(f, "text"),
            EnvelopeKind::Image => write!(f, "image"),
            EnvelopeKind::SearchAugmentedText => write!(f, "search_augmented_text"),
        }
    }
}

/// An inline citation: its marker index appears inside the composed
/// content as `[index]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub index: u32,
    pub title: String,
    pub url: String,
    pub provider_id: String,
    pub snippet: String,
}

/// Payload of a response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvelopePayload {
    Text {
        content: String,
    },
    Image {
        url: String,
        prompt: String,
    },
    SearchAugmentedText {
        content: String,
        citations: Vec<Citation>,
    },
}

/// Normalized response returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub kind: EnvelopeKind,
    pub payload: EnvelopePayload,
    /// Id of the provider whose output reached the caller.
    pub source_provider_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

impl ResponseEnvelope {
    /// Text form of the payload, used when appending the assistant turn to
    /// the session history.
    pub fn rendered_content(&self) -> String {
        match &self.payload {
            EnvelopePayload::Text { content } => content.clone(),
            EnvelopePayload::Image { prompt, .. } => {
                format!("Изображение создано по запросу: \"{prompt}\"")
            }
            EnvelopePayload::SearchAugmentedText { content, .. } => content.clone(),
        }
    }
}
