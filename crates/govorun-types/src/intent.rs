//! Classified intent of a user utterance.
//!
//! Exactly one [`Intent`] is produced per utterance. The classifier lives
//! in `govorun-core`; this module only carries the data shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::provider::ProviderKind;

/// Category of a search-augmented request.
///
/// Ordering here matches classification precedence: the first category
/// whose keyword set matches the utterance wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCategory {
    Temporal,
    Financial,
    Weather,
    News,
    Tech,
    Sports,
    Location,
    Generic,
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchCategory::Temporal => "temporal",
            SearchCategory::Financial => "financial",
            SearchCategory::Weather => "weather",
            SearchCategory::News => "news",
            SearchCategory::Tech => "tech",
            SearchCategory::Sports => "sports",
            SearchCategory::Location => "location",
            SearchCategory::Generic => "generic",
        };
        write!(f, "{s}")
    }
}

/// The classified purpose of an utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Plain conversational reply. `empty_input` marks an empty or
    /// whitespace-only utterance, which must never reach a provider.
    Conversational { empty_input: bool },
    /// Image generation with the extracted prompt.
    ImageGeneration { prompt: String },
    /// Web-search-augmented answer for the given query.
    SearchAugmented {
        query: String,
        category: SearchCategory,
    },
}

impl Intent {
    /// The provider kind that satisfies this intent.
    pub fn kind(&self) -> ProviderKind {
        match self {
            Intent::Conversational { .. } => ProviderKind::Conversational,
            Intent::ImageGeneration { .. } => ProviderKind::Image,
            Intent::SearchAugmented { .. } => ProviderKind::Search,
        }
    }
}
