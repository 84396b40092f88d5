//! Search provider adapters.
//!
//! Each adapter turns its upstream's wire format into [`SearchFindings`]:
//! an optional synthesized answer plus up to three snippets. An upstream
//! that answers successfully but retrieves nothing reports a malformed
//! payload, so the chain moves on to the next source.

pub mod duckduckgo;
pub mod perplexity;
pub mod wikipedia;
pub mod wttr;
pub mod yandex;

pub use duckduckgo::DuckDuckGoProvider;
pub use perplexity::PerplexityProvider;
pub use wikipedia::WikipediaProvider;
pub use wttr::WttrProvider;
pub use yandex::YandexSearchProvider;

use govorun_types::provider::SearchFindings;

/// Maximum snippets carried out of any single search source.
pub(crate) const MAX_SNIPPETS: usize = 3;

pub(crate) fn non_empty(findings: SearchFindings) -> Option<SearchFindings> {
    if findings.answer.as_deref().is_none_or(str::is_empty) && findings.snippets.is_empty() {
        None
    } else {
        Some(findings)
    }
}
