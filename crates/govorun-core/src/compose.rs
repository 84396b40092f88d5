//! Response composition.
//!
//! [`compose`] merges a provider outcome into the normalized envelope.
//! It is a total, deterministic, pure function: identical inputs yield a
//! byte-identical envelope. For search-augmented answers the retrieved
//! snippets become numbered citations interleaved inline into the answer
//! text -- never a source list appended after it.

use govorun_types::envelope::{Citation, EnvelopeKind, EnvelopePayload, ResponseEnvelope};
use govorun_types::intent::Intent;
use govorun_types::provider::{RawResult, SearchFindings, Snippet};

use crate::chain::ProviderOutcome;

/// Merge an intent and the winning provider's output into one envelope.
pub fn compose(intent: &Intent, outcome: &ProviderOutcome) -> ResponseEnvelope {
    let provider_id = outcome.provider_id.as_str();
    match (&outcome.result, intent) {
        (RawResult::Chat(reply), Intent::Conversational { .. }) => ResponseEnvelope {
            kind: EnvelopeKind::Text,
            payload: EnvelopePayload::Text {
                content: reply.content.clone(),
            },
            source_provider_id: provider_id.to_string(),
            attribution: None,
        },
        (RawResult::Image(artifact), Intent::ImageGeneration { .. }) => ResponseEnvelope {
            kind: EnvelopeKind::Image,
            payload: EnvelopePayload::Image {
                url: artifact.url.clone(),
                prompt: artifact.prompt.clone(),
            },
            source_provider_id: provider_id.to_string(),
            attribution: Some(provider_id.to_string()),
        },
        (RawResult::Search(findings), Intent::SearchAugmented { .. }) => {
            let (content, citations) = interleave_citations(findings, provider_id);
            ResponseEnvelope {
                kind: EnvelopeKind::SearchAugmentedText,
                payload: EnvelopePayload::SearchAugmentedText { content, citations },
                source_provider_id: provider_id.to_string(),
                attribution: Some(provider_id.to_string()),
            }
        }
        // A kind mismatch cannot happen through the engine (the chain is
        // resolved from the intent), but composition stays total: wrap the
        // raw content as plain text instead of panicking.
        (result, _) => ResponseEnvelope {
            kind: EnvelopeKind::Text,
            payload: EnvelopePayload::Text {
                content: raw_text(result),
            },
            source_provider_id: provider_id.to_string(),
            attribution: None,
        },
    }
}

/// Build the cited content: marker `[n]` goes after sentence `n` of the
/// answer; markers beyond the sentence count attach to the last sentence.
/// Without a synthesized answer the snippet texts themselves carry the
/// content, each followed by its own marker.
fn interleave_citations(findings: &SearchFindings, provider_id: &str) -> (String, Vec<Citation>) {
    let citations: Vec<Citation> = findings
        .snippets
        .iter()
        .enumerate()
        .map(|(i, snippet)| Citation {
            index: i as u32 + 1,
            title: snippet.title.clone(),
            url: snippet.url.clone(),
            provider_id: provider_id.to_string(),
            snippet: snippet.text.clone(),
        })
        .collect();

    let content = match findings.answer.as_deref() {
        Some(answer) if !answer.trim().is_empty() => {
            cite_into_answer(answer, citations.len())
        }
        _ => content_from_snippets(&findings.snippets),
    };

    (content, citations)
}

fn cite_into_answer(answer: &str, citation_count: usize) -> String {
    let sentences = split_sentences(answer);
    if sentences.is_empty() {
        return String::new();
    }

    let mut parts = Vec::with_capacity(sentences.len());
    for (i, sentence) in sentences.iter().enumerate() {
        let mut part = sentence.clone();
        if i < citation_count {
            part.push_str(&format!(" [{}]", i + 1));
        }
        if i + 1 == sentences.len() {
            for index in sentences.len()..citation_count {
                part.push_str(&format!(" [{}]", index + 1));
            }
        }
        parts.push(part);
    }
    parts.join(" ")
}

fn content_from_snippets(snippets: &[Snippet]) -> String {
    snippets
        .iter()
        .enumerate()
        .map(|(i, snippet)| format!("{} [{}]", snippet.text.trim(), i + 1))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split on sentence-ending punctuation, keeping the delimiter.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            if !current.trim().is_empty() {
                sentences.push(current.trim().to_string());
            }
            current.clear();
        }
    }
    if !current.trim().is_empty() {
        sentences.push(current.trim().to_string());
    }
    sentences
}

fn raw_text(result: &RawResult) -> String {
    match result {
        RawResult::Chat(reply) => reply.content.clone(),
        RawResult::Image(artifact) => artifact.url.clone(),
        RawResult::Search(findings) => findings
            .answer
            .clone()
            .unwrap_or_else(|| content_from_snippets(&findings.snippets)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use govorun_types::intent::SearchCategory;
    use govorun_types::provider::{ChatReply, ImageArtifact};

    fn outcome(provider_id: &str, result: RawResult) -> ProviderOutcome {
        ProviderOutcome {
            provider_id: provider_id.to_string(),
            result,
        }
    }

    fn search_intent() -> Intent {
        Intent::SearchAugmented {
            query: "курс биткоина".into(),
            category: SearchCategory::Financial,
        }
    }

    fn two_snippets() -> Vec<Snippet> {
        vec![
            Snippet {
                title: "Курс биткоина".into(),
                url: "https://example.ru/1".into(),
                text: "Биткоин вырос до нового максимума".into(),
            },
            Snippet {
                title: "Аналитика".into(),
                url: "https://example.ru/2".into(),
                text: "Аналитики ожидают коррекцию".into(),
            },
        ]
    }

    #[test]
    fn test_conversational_wraps_text_verbatim() {
        let envelope = compose(
            &Intent::Conversational { empty_input: false },
            &outcome(
                "gigachat",
                RawResult::Chat(ChatReply {
                    content: "Привет! Чем могу помочь?".into(),
                }),
            ),
        );
        assert_eq!(envelope.kind, EnvelopeKind::Text);
        assert_eq!(
            envelope.payload,
            EnvelopePayload::Text {
                content: "Привет! Чем могу помочь?".into()
            }
        );
        assert_eq!(envelope.source_provider_id, "gigachat");
        assert!(envelope.attribution.is_none());
    }

    #[test]
    fn test_image_carries_prompt_and_attribution() {
        let envelope = compose(
            &Intent::ImageGeneration {
                prompt: "кот в шляпе".into(),
            },
            &outcome(
                "pollinations",
                RawResult::Image(ImageArtifact {
                    url: "https://image.pollinations.ai/prompt/x".into(),
                    prompt: "кот в шляпе".into(),
                }),
            ),
        );
        assert_eq!(envelope.kind, EnvelopeKind::Image);
        assert_eq!(envelope.attribution.as_deref(), Some("pollinations"));
    }

    #[test]
    fn test_citations_interleaved_into_answer() {
        let envelope = compose(
            &search_intent(),
            &outcome(
                "perplexity",
                RawResult::Search(SearchFindings {
                    answer: Some("Биткоин вырос. Аналитики ждут коррекцию. Объемы растут.".into()),
                    snippets: two_snippets(),
                }),
            ),
        );
        let EnvelopePayload::SearchAugmentedText { content, citations } = &envelope.payload
        else {
            panic!("expected search payload");
        };
        assert_eq!(content, "Биткоин вырос. [1] Аналитики ждут коррекцию. [2] Объемы растут.");
        assert_eq!(citations.len(), 2);
        assert!(citations.iter().all(|c| c.provider_id == "perplexity"));
        // Interleaved, not appended: a marker appears before the end.
        assert!(!content.ends_with("[2]"));
    }

    #[test]
    fn test_more_citations_than_sentences_attach_to_last() {
        let envelope = compose(
            &search_intent(),
            &outcome(
                "perplexity",
                RawResult::Search(SearchFindings {
                    answer: Some("Биткоин вырос.".into()),
                    snippets: two_snippets(),
                }),
            ),
        );
        let EnvelopePayload::SearchAugmentedText { content, .. } = &envelope.payload else {
            panic!("expected search payload");
        };
        assert_eq!(content, "Биткоин вырос. [1] [2]");
    }

    #[test]
    fn test_snippet_only_findings_build_cited_content() {
        let envelope = compose(
            &search_intent(),
            &outcome(
                "yandex",
                RawResult::Search(SearchFindings {
                    answer: None,
                    snippets: two_snippets(),
                }),
            ),
        );
        let EnvelopePayload::SearchAugmentedText { content, citations } = &envelope.payload
        else {
            panic!("expected search payload");
        };
        assert_eq!(
            content,
            "Биткоин вырос до нового максимума [1] Аналитики ожидают коррекцию [2]"
        );
        assert_eq!(citations.len(), 2);
        assert!(citations.iter().all(|c| c.provider_id == "yandex"));
    }

    #[test]
    fn test_composition_is_idempotent() {
        let intent = search_intent();
        let outcome = outcome(
            "yandex",
            RawResult::Search(SearchFindings {
                answer: Some("Биткоин вырос. Объемы растут.".into()),
                snippets: two_snippets(),
            }),
        );
        let first = compose(&intent, &outcome);
        let second = compose(&intent, &outcome);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_kind_mismatch_degrades_to_text() {
        let envelope = compose(
            &Intent::Conversational { empty_input: false },
            &outcome(
                "pollinations",
                RawResult::Image(ImageArtifact {
                    url: "https://example.ru/img".into(),
                    prompt: "кот".into(),
                }),
            ),
        );
        assert_eq!(envelope.kind, EnvelopeKind::Text);
        assert_eq!(
            envelope.payload,
            EnvelopePayload::Text {
                content: "https://example.ru/img".into()
            }
        );
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Первое. Второе! Третье?"),
            vec!["Первое.", "Второе!", "Третье?"]
        );
        assert_eq!(split_sentences("Без точки"), vec!["Без точки"]);
        assert!(split_sentences("   ").is_empty());
    }
}
