use crate::mode::RetrievalMode;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

pub const DEFAULT_LEXICAL_WEIGHT: f64 = 0.3;
pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.7;

const SHORT_QUERY_MAX_TOKENS: usize = 6;
const SHORT_QUERY_SHIFT: f64 = 0.20;
const DIGIT_SHIFT: f64 = 0.10;
const ACRONYM_SHIFT: f64 = 0.10;
const CODE_LIKE_SHIFT: f64 = 0.05;

#[allow(clippy::expect_used)]
static DIGIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("Valid regex"));

// A whole word of two or more uppercase letters: "SLA", "HR"
#[allow(clippy::expect_used)]
static ACRONYM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("Valid regex"));

// Identifiers, ticket ids, versions: snake_case, #42, API-123, v1.2
#[allow(clippy::expect_used)]
static CODE_LIKE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_#.]").expect("Valid regex"));

/// Lexical/semantic blend sent to hybrid searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPair {
    pub lexical: f64,
    pub semantic: f64,
}

impl Default for WeightPair {
    fn default() -> Self {
        Self {
            lexical: DEFAULT_LEXICAL_WEIGHT,
            semantic: DEFAULT_SEMANTIC_WEIGHT,
        }
    }
}

impl WeightPair {
    pub fn new(lexical: f64, semantic: f64) -> Self {
        Self { lexical, semantic }
    }

    /// Non-finite components fall back to their default.
    fn sanitized(self) -> Self {
        let lexical = if self.lexical.is_finite() {
            self.lexical
        } else {
            DEFAULT_LEXICAL_WEIGHT
        };
        let semantic = if self.semantic.is_finite() {
            self.semantic
        } else {
            DEFAULT_SEMANTIC_WEIGHT
        };
        Self { lexical, semantic }
    }

    /// Clamp into `[0, 1]` and renormalize; a zero sum resets to the default.
    pub fn normalized(self) -> Self {
        let lexical = self.lexical.clamp(0.0, 1.0);
        let semantic = self.semantic.clamp(0.0, 1.0);
        let sum = lexical + semantic;
        if sum == 0.0 {
            return Self::default();
        }
        Self {
            lexical: lexical / sum,
            semantic: semantic / sum,
        }
    }

    fn shift_towards_lexical(&mut self, amount: f64) {
        self.lexical += amount;
        self.semantic -= amount;
    }
}

/// Text heuristics that push a hybrid query towards lexical matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuerySignals {
    pub token_count: usize,
    pub short: bool,
    pub digits: bool,
    pub acronym: bool,
    pub code_like: bool,
}

impl QuerySignals {
    pub fn detect(query: &str) -> Self {
        let text = query.trim();
        let token_count = text.split_whitespace().count();
        Self {
            token_count,
            short: (1..=SHORT_QUERY_MAX_TOKENS).contains(&token_count),
            digits: DIGIT_PATTERN.is_match(text),
            acronym: ACRONYM_PATTERN.is_match(text),
            code_like: CODE_LIKE_PATTERN.is_match(text),
        }
    }

    /// Total lexical shift these signals contribute.
    pub fn lexical_shift(&self) -> f64 {
        [
            (self.short, SHORT_QUERY_SHIFT),
            (self.digits, DIGIT_SHIFT),
            (self.acronym, ACRONYM_SHIFT),
            (self.code_like, CODE_LIKE_SHIFT),
        ]
        .into_iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, shift)| shift)
        .sum()
    }
}

/// Derive a query-specific weight pair from `base` (default `0.3/0.7`).
///
/// Each detected signal moves weight from semantic to lexical; the result is
/// clamped and renormalized so it always sums to one.
pub fn blend_weights(query: &str, base: Option<WeightPair>) -> WeightPair {
    let signals = QuerySignals::detect(query);
    let mut pair = base.unwrap_or_default().sanitized();

    if signals.short {
        pair.shift_towards_lexical(SHORT_QUERY_SHIFT);
    }
    if signals.digits {
        pair.shift_towards_lexical(DIGIT_SHIFT);
    }
    if signals.acronym {
        pair.shift_towards_lexical(ACRONYM_SHIFT);
    }
    if signals.code_like {
        pair.shift_towards_lexical(CODE_LIKE_SHIFT);
    }

    let blended = pair.normalized();
    debug!(?signals, ?blended, "blended hybrid weights");
    blended
}

/// Weights actually sent for `mode`: smart blending only applies to plain
/// hybrid searches with a non-empty query.
pub fn effective_weights(
    mode: RetrievalMode,
    smart: bool,
    query: &str,
    base: WeightPair,
) -> WeightPair {
    if mode == RetrievalMode::Hybrid && smart && !query.trim().is_empty() {
        blend_weights(query, Some(base))
    } else {
        base
    }
}
