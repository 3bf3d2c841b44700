//! Keyword, readability, uniqueness and search-intent heuristics
//!
//! Everything here is a pure function over extracted text.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Runs of ASCII letters; non-ASCII letters split a word rather than extend it
static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]{3,}").expect("invalid word regex"));
static RE_VOWEL_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[aeiouy]+").expect("invalid vowel regex"));

const TOP_KEYWORDS: usize = 10;
const TITLE_BOOST: usize = 1000;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "his", "how", "its", "may", "new", "now", "old", "see", "two",
    "who", "did", "get", "him", "let", "put", "say", "she", "too", "use", "way", "with", "this",
    "that", "from", "they", "will", "have", "been", "were", "what", "when", "where", "which",
    "your", "more", "also", "into", "than", "then", "them", "these", "those", "there", "their",
    "about", "would", "could", "should", "other", "some", "such", "only", "over", "just", "like",
    "very", "each", "here", "most", "much", "many", "being", "because", "while", "after",
    "before", "under", "between", "through", "does", "doing", "yours", "ours",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Relevance {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordStat {
    pub word: String,
    pub count: usize,
    /// Percentage of all words, two decimals
    pub density: f64,
    pub relevance: Relevance,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeywordAnalysis {
    pub total_words: usize,
    pub unique_words: usize,
    pub top_keywords: Vec<KeywordStat>,
}

fn tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_WORD
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Rank keywords over title, description and body.
///
/// Words that also appear in the title or description get a fixed boost so
/// they always outrank body-only words, and are tagged [`Relevance::High`].
pub fn extract_keywords(title: &str, description: &str, body: &str) -> KeywordAnalysis {
    let all = tokens(&format!("{title} {description} {body}"));
    let total_words = all.len();

    let headline: HashSet<String> = tokens(&format!("{title} {description}"))
        .into_iter()
        .filter(|w| !is_stop_word(w))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for word in all.iter().map(String::as_str).filter(|w| !is_stop_word(w)) {
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            first_seen.push(word);
        }
        *count += 1;
    }

    let score = |word: &str| {
        counts[word] + if headline.contains(word) { TITLE_BOOST } else { 0 }
    };
    // Stable sort keeps first-seen order among equal scores
    first_seen.sort_by(|a, b| score(b).cmp(&score(a)));

    let top_keywords = first_seen
        .iter()
        .take(TOP_KEYWORDS)
        .map(|&word| {
            let count = counts[word];
            KeywordStat {
                word: word.to_string(),
                count,
                density: round2(100.0 * count as f64 / total_words as f64),
                relevance: if headline.contains(word) {
                    Relevance::High
                } else {
                    Relevance::Medium
                },
            }
        })
        .collect();

    KeywordAnalysis {
        total_words,
        unique_words: counts.len(),
        top_keywords,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

/// Flesch reading ease, clamped to 0..=100. Degenerate input scores 50.
pub fn readability_score(text: &str) -> u8 {
    let words = text.split_whitespace().count();
    let sentences = sentence_count(text);
    if words == 0 || sentences == 0 {
        return 50;
    }

    let syllables = RE_VOWEL_GROUP.find_iter(text).count();
    let words_f = words as f64;
    let score = 206.835
        - 1.015 * (words_f / sentences as f64)
        - 84.6 * (syllables as f64 / words_f);

    score.clamp(0.0, 100.0).round() as u8
}

/// Heuristic originality/completeness score, 0..=100.
pub fn uniqueness_score(text: &str, title: &str, description: &str) -> u8 {
    let words = text.split_whitespace().count();
    let sentences = sentence_count(text);
    let mut score: i32 = 50;

    score += match words {
        0..300 => -20,
        300..=2000 => 20,
        _ => 15,
    };

    if !title.trim().is_empty() && !description.trim().is_empty() {
        score += 15;
    }
    if (30..=60).contains(&title.chars().count()) {
        score += 10;
    }
    if (120..=160).contains(&description.chars().count()) {
        score += 10;
    }
    if sentences > 0 {
        let average = words as f64 / sentences as f64;
        if (15.0..=25.0).contains(&average) {
            score += 5;
        }
    }

    score.clamp(0, 100) as u8
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchIntent {
    Informational,
    Navigational,
    Transactional,
    Commercial,
}

/// Intent keyword sets in tie-break order: the first declared wins a tie.
const INTENT_RULES: &[(SearchIntent, &[&str])] = &[
    (
        SearchIntent::Informational,
        &[
            "how to", "what is", "why", "guide", "tutorial", "learn", "tips", "explained",
            "definition", "examples",
        ],
    ),
    (
        SearchIntent::Navigational,
        &[
            "login", "sign in", "contact", "about us", "official", "homepage", "account",
            "location", "support",
        ],
    ),
    (
        SearchIntent::Transactional,
        &[
            "buy", "order", "purchase", "price", "cart", "checkout", "discount", "shop", "deal",
            "subscribe",
        ],
    ),
    (
        SearchIntent::Commercial,
        &[
            "best", "top", "review", "compare", "comparison", " vs ", "alternative", "rating",
        ],
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentSignal {
    pub intent: SearchIntent,
    pub matches: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentAnalysis {
    pub intent: SearchIntent,
    /// 0..=100
    pub confidence: u8,
    /// Confidence above 30
    pub aligned: bool,
    pub signals: Vec<IntentSignal>,
}

/// Classify the dominant search intent by counting keyword occurrences.
pub fn classify_intent(title: &str, description: &str, body: &str) -> IntentAnalysis {
    let haystack = format!("{title} {description} {body}").to_lowercase();

    let signals: Vec<IntentSignal> = INTENT_RULES
        .iter()
        .map(|(intent, terms)| IntentSignal {
            intent: *intent,
            matches: terms.iter().map(|term| haystack.matches(term).count()).sum(),
        })
        .collect();

    let mut best = 0;
    for (index, signal) in signals.iter().enumerate() {
        if signal.matches > signals[best].matches {
            best = index;
        }
    }

    let (intent, terms) = INTENT_RULES[best];
    let matches = signals[best].matches;
    let confidence = if matches == 0 {
        0
    } else {
        (100 * matches / terms.len()).min(100) as u8
    };

    IntentAnalysis {
        intent,
        confidence,
        aligned: confidence > 30,
        signals,
    }
}

/// Combined content scores for the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentScore {
    pub uniqueness_score: u8,
    pub readability_score: u8,
    pub intent: IntentAnalysis,
    pub keywords: KeywordAnalysis,
}

pub fn analyze_content(title: &str, description: &str, body: &str) -> ContentScore {
    ContentScore {
        uniqueness_score: uniqueness_score(body, title, description),
        readability_score: readability_score(body),
        intent: classify_intent(title, description, body),
        keywords: extract_keywords(title, description, body),
    }
}
