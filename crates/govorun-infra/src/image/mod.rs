//! Image generation provider adapters.
//!
//! Both adapters verify availability with a HEAD probe and return the
//! generated image as a URL reference; the chat surface embeds it.

pub mod picsum;
pub mod pollinations;

pub use picsum::PicsumProvider;
pub use pollinations::PollinationsProvider;

use std::hash::{DefaultHasher, Hash, Hasher};

/// Deterministic seed derived from the prompt, so identical requests
/// produce identical image URLs (and therefore identical envelopes).
pub(crate) fn prompt_seed(prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    prompt.hash(&mut hasher);
    hasher.finish()
}
