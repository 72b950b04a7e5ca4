//! Response shaping pipeline.
//!
//! Transforms a raw, grammatically complete answer into one that begins
//! with an extracted or synthesized subject line and has exactly a
//! caller-specified word count, padding with field- and audience-appropriate
//! filler where needed. The pipeline is deterministic up to its style and
//! phrase picks, which run on a seedable RNG so tests can fix outcomes.

pub mod phrases;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Field label used when none was supplied and none is extractable.
const GENERAL_FIELD: &str = "General Knowledge";

/// Field indicators, in scan order. The first indicator present anywhere in
/// the text wins, regardless of where later indicators appear; this is a
/// deliberate first-match policy.
const FIELD_INDICATORS: [&str; 8] = [
    "in the field of",
    "regarding",
    "concerning",
    "about",
    "related to",
    "in terms of",
    "with respect to",
    "in the domain of",
];

/// Characters that terminate an extracted field value.
const FIELD_TERMINATORS: &str = ".,!?()[]{}";

/// Style constraints for post-processing. All labels are free-form text;
/// missing ones degrade (general audience tier, extracted-or-generic field)
/// rather than failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapingCriteria {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub subject_type: Option<String>,
    #[serde(default)]
    pub abstraction: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub specificity: Option<String>,
}

/// The shaping pipeline. Owns the RNG behind the random picks and the
/// per-field phrase-bank cache.
///
/// The cache is append-only memoization keyed by field string and unbounded
/// for the lifetime of the instance; callers that feed it unbounded distinct
/// field values must bound them upstream.
pub struct ResponseShaper {
    rng: Mutex<StdRng>,
    banks: Mutex<HashMap<String, Arc<Vec<String>>>>,
}

impl Default for ResponseShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseShaper {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Fixed-seed construction for deterministic tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            banks: Mutex::new(HashMap::new()),
        }
    }

    /// Scan the text for the first field indicator and return the label
    /// that follows it, title-cased. The value runs from just after the
    /// indicator to the next punctuation mark or end of string; empty
    /// values fall through to the next indicator in scan order.
    pub fn extract_field(text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        for indicator in FIELD_INDICATORS {
            let Some(position) = lowered.find(indicator) else {
                continue;
            };
            let start = position + indicator.len();
            let rest = &lowered[start..];
            let end = rest
                .find(|c: char| FIELD_TERMINATORS.contains(c))
                .unwrap_or(rest.len());
            let field = rest[..end].trim();
            if !field.is_empty() {
                return Some(title_case(field));
            }
        }
        None
    }

    /// Pick an explanation style compatible with the subject type, or any
    /// of the twelve styles for unknown types.
    pub fn select_explanation_style(&self, subject_type: &str) -> &'static str {
        let styles = phrases::styles_for_subject(subject_type);
        let mut rng = self.rng_guard();
        styles[rng.gen_range(0..styles.len())]
    }

    /// The memoized ten-entry filler bank for one field value. Built at most
    /// once per distinct field; concurrent duplicate builds are idempotent
    /// since the entries are deterministic given the field.
    pub fn phrase_bank(&self, field: &str) -> Arc<Vec<String>> {
        let mut banks = self
            .banks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        banks
            .entry(field.to_string())
            .or_insert_with(|| Arc::new(phrases::build_phrase_bank(field)))
            .clone()
    }

    /// Pad or truncate `text` to exactly `target_words` words.
    ///
    /// Longer texts are hard-cut after `target_words` words. Shorter ones
    /// are extended one filler entry at a time, taking a phrase-bank entry
    /// when the running word count is a multiple of three and an audience
    /// term otherwise; a multi-word entry is cut mid-phrase when it would
    /// overshoot the target.
    pub fn normalize_length(
        &self,
        text: &str,
        target_words: usize,
        field: &str,
        audience: &str,
    ) -> String {
        let mut words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        if words.len() == target_words {
            return text.to_string();
        }
        if words.len() > target_words {
            words.truncate(target_words);
            return words.join(" ");
        }

        let bank = self.phrase_bank(field);
        let terms = phrases::audience_terms(audience);
        let mut rng = self.rng_guard();
        while words.len() < target_words {
            let filler: &str = if words.len() % 3 == 0 {
                &bank[rng.gen_range(0..bank.len())]
            } else {
                terms[rng.gen_range(0..terms.len())]
            };
            for word in filler.split_whitespace() {
                if words.len() == target_words {
                    break;
                }
                words.push(word.to_string());
            }
        }
        words.join(" ")
    }

    /// Full shaping pass: subject line plus (optionally length-normalized)
    /// body, separated by a newline.
    ///
    /// The subject is the raw text's first quoted span, kept quoted; when
    /// the text has none, the first sentence is quoted instead and the body
    /// keeps the whole raw text.
    pub fn format(
        &self,
        raw: &str,
        criteria: &ShapingCriteria,
        target_words: Option<usize>,
    ) -> String {
        let (subject, body) = split_subject(raw);
        let body = match target_words {
            Some(target) => {
                let field = criteria
                    .field
                    .clone()
                    .or_else(|| Self::extract_field(raw))
                    .unwrap_or_else(|| GENERAL_FIELD.to_string());
                let audience = criteria.audience.as_deref().unwrap_or("general");
                self.normalize_length(&body, target, &field, audience)
            }
            None => body,
        };
        format!("{subject}\n{body}")
    }

    fn rng_guard(&self) -> MutexGuard<'_, StdRng> {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Subject extraction: the first quoted span when present (body keeps the
/// surrounding text), else the first sentence wrapped in quotes (body keeps
/// everything).
fn split_subject(raw: &str) -> (String, String) {
    if let Some(open) = raw.find('"') {
        if let Some(close_offset) = raw[open + 1..].find('"') {
            let close = open + 1 + close_offset;
            let subject = raw[open..=close].to_string();
            let body = format!("{} {}", raw[..open].trim(), raw[close + 1..].trim())
                .trim()
                .to_string();
            return (subject, body);
        }
    }
    let sentence_end = raw
        .find(['.', '!', '?'])
        .map(|i| i + 1)
        .unwrap_or(raw.len());
    let sentence = raw[..sentence_end].trim();
    (format!("\"{sentence}\""), raw.trim().to_string())
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
