//! Intent classification.
//!
//! A static, ordered trigger table compiled once at startup; classification
//! is a pure lookup over it -- no side effects, no network. Image triggers
//! are checked before search categories, so an utterance matching both is
//! classified as image generation. Matching is case-insensitive via
//! Unicode-aware lowercasing, which covers Cyrillic input.

use regex::Regex;

use govorun_types::chat::{ChatTurn, Utterance};
use govorun_types::intent::{Intent, SearchCategory};

/// Prompt substituted when stripping the trigger words leaves nothing.
const DEFAULT_IMAGE_PROMPT: &str = "красивый пейзаж";

/// Utterance substrings that mark an image-generation request.
const IMAGE_TRIGGERS: &[&str] = &[
    "нарисуй",
    "нарисовать",
    "создай изображение",
    "создай картинку",
    "сгенерируй картинку",
    "сгенерируй изображение",
    "изобрази",
    "покажи как выглядит",
    "визуализируй",
    "картинка",
    "рисунок",
    "изображение",
    "иллюстрация",
    "фото",
    "generate a picture",
    "generate an image",
    "create an image",
    "draw me",
    "/generate",
    "/img",
    "/image",
    "/draw",
    "/создай",
    "/нарисуй",
];

/// Triggers removed from the utterance when extracting the image prompt.
/// Commands and verbs only; subject nouns stay in the prompt.
const STRIP_TRIGGERS: &[&str] = &[
    "создай изображение",
    "сгенерируй картинку",
    "сгенерируй изображение",
    "создай картинку",
    "покажи как выглядит",
    "визуализируй",
    "нарисовать",
    "нарисуй",
    "изобрази",
    "generate a picture",
    "generate an image",
    "create an image",
    "draw me",
    "/generate",
    "/нарисуй",
    "/создай",
    "/image",
    "/draw",
    "/img",
];

const TEMPORAL: &[&str] = &[
    "сегодня",
    "вчера",
    "сейчас",
    "недавно",
    "в настоящее время",
    "на данный момент",
    "что происходит",
    "актуальн",
    "текущ",
    "today",
    "yesterday",
    "right now",
    "currently",
];

const FINANCIAL: &[&str] = &[
    "курс",
    "цена",
    "стоимость",
    "котировк",
    "биржа",
    "акции",
    "криптовалют",
    "биткоин",
    "доллар",
    "евро",
    "рубл",
    "инфляци",
    "экономик",
    "ввп",
    "бюджет",
    "bitcoin",
    "dollar",
    "exchange rate",
    "stock",
];

const WEATHER: &[&str] = &[
    "погод",
    "прогноз",
    "температур",
    "климат",
    "дождь",
    "снег",
    "ветер",
    "давление",
    "влажность",
    "гроза",
    "weather",
    "forecast",
    "temperature",
];

const NEWS: &[&str] = &[
    "новост",
    "событи",
    "произошло",
    "случилось",
    "сообщают",
    "объявили",
    "заявили",
    "что нового",
    "news",
    "headline",
];

const TECH: &[&str] = &[
    "последняя версия",
    "обновлени",
    "релиз",
    "выпуск",
    "исследовани",
    "открыти",
    "изобретени",
    "патент",
    "технолог",
    "release",
    "version",
    "update",
];

const SPORTS: &[&str] = &[
    "результат",
    "счет",
    "счёт",
    "матч",
    "чемпионат",
    "турнир",
    "лига",
    "трансфер",
    "олимпиад",
    "score",
    "match",
    "championship",
];

const LOCATION: &[&str] = &[
    "расписани",
    "адрес",
    "телефон",
    "время работы",
    "часы работы",
    "как добраться",
    "где находится",
    "работает",
    "открыт",
    "закрыт",
    "address",
    "opening hours",
];

const GENERIC: &[&str] = &[
    "что такое",
    "кто такой",
    "кто такая",
    "определение",
    "истори",
    "биографи",
    "расскажи о",
    "информаци",
    "статистик",
    "рейтинг",
    "обзор",
    "what is",
    "who is",
    "tell me about",
];

/// Static trigger table driving classification.
pub struct ClassifierTable {
    strip_regex: Regex,
    /// Category precedence: first matching set wins.
    rules: Vec<(SearchCategory, &'static [&'static str])>,
}

impl ClassifierTable {
    pub fn new() -> Self {
        // Longest alternatives first so multi-word triggers win over their
        // prefixes inside the alternation.
        let mut alternatives: Vec<String> =
            STRIP_TRIGGERS.iter().map(|t| regex::escape(t)).collect();
        alternatives.sort_by_key(|a| std::cmp::Reverse(a.chars().count()));
        let pattern = format!(r"(?i)(?:^|\s)(?:{})(?:[\s,:.!?]|$)", alternatives.join("|"));
        let strip_regex = Regex::new(&pattern).expect("static trigger pattern compiles");

        Self {
            strip_regex,
            rules: vec![
                (SearchCategory::Temporal, TEMPORAL),
                (SearchCategory::Financial, FINANCIAL),
                (SearchCategory::Weather, WEATHER),
                (SearchCategory::News, NEWS),
                (SearchCategory::Tech, TECH),
                (SearchCategory::Sports, SPORTS),
                (SearchCategory::Location, LOCATION),
                (SearchCategory::Generic, GENERIC),
            ],
        }
    }

    /// Classify one utterance. Pure function of its inputs.
    pub fn classify(&self, utterance: &Utterance, _history: &[ChatTurn]) -> Intent {
        let text = utterance.text.trim();
        if text.is_empty() {
            return Intent::Conversational { empty_input: true };
        }

        let lowered = text.to_lowercase();

        // Image wins over search on a double match: the more deliberate
        // request takes precedence.
        if IMAGE_TRIGGERS.iter().any(|kw| lowered.contains(kw)) {
            return Intent::ImageGeneration {
                prompt: self.extract_image_prompt(text),
            };
        }

        for (category, keywords) in &self.rules {
            if keywords.iter().any(|kw| lowered.contains(kw)) {
                return Intent::SearchAugmented {
                    query: text.to_string(),
                    category: *category,
                };
            }
        }

        Intent::Conversational { empty_input: false }
    }

    /// Strip trigger words and commands from an image request, leaving the
    /// subject as the generation prompt.
    pub fn extract_image_prompt(&self, text: &str) -> String {
        let stripped = self.strip_regex.replace_all(text, " ");
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        let prompt = collapsed.trim_matches(|c: char| " ,:.-".contains(c));
        if prompt.is_empty() {
            DEFAULT_IMAGE_PROMPT.to_string()
        } else {
            prompt.to_string()
        }
    }
}

impl Default for ClassifierTable {
    fn default() -> Self {
        Self::new()
    }
}
