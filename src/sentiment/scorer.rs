//! Lexicon-based sentiment scoring
//!
//! Wraps VADER (valence-aware, handles negation, boosters, caps and
//! punctuation emphasis) and maps its compound score onto a three-way label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound scores at or above this are Positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this are Negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_compound(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "Positive"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
            SentimentLabel::Negative => write!(f, "Negative"),
        }
    }
}

/// Raw lexicon output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polarity {
    /// Positive proportion (0.0 to 1.0)
    pub positive: f64,
    /// Negative proportion (0.0 to 1.0)
    pub negative: f64,
    /// Neutral proportion (0.0 to 1.0)
    pub neutral: f64,
    /// Compound score (-1.0 to 1.0)
    pub compound: f64,
}

impl Polarity {
    pub fn neutral() -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
            compound: 0.0,
        }
    }
}

/// A deterministic polarity algorithm
pub trait PolarityLexicon: Send + Sync {
    fn polarity(&self, text: &str) -> Polarity;
}

/// The standard VADER lexicon
pub struct VaderLexicon {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderLexicon {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityLexicon for VaderLexicon {
    fn polarity(&self, text: &str) -> Polarity {
        if text.trim().is_empty() {
            return Polarity::neutral();
        }

        let scores = self.analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);

        Polarity {
            positive: get("pos"),
            negative: get("neg"),
            neutral: get("neu"),
            compound: get("compound"),
        }
    }
}

/// Scored text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub text: String,
    pub compound_score: f64,
    pub label: SentimentLabel,
}

/// Text → compound score + label
#[derive(Clone)]
pub struct LexiconScorer {
    lexicon: Arc<dyn PolarityLexicon>,
}

impl LexiconScorer {
    /// Scorer backed by VADER
    pub fn new() -> Self {
        Self::with_lexicon(Arc::new(VaderLexicon::new()))
    }

    pub fn with_lexicon(lexicon: Arc<dyn PolarityLexicon>) -> Self {
        Self { lexicon }
    }

    /// Score one text. Never fails; empty text scores 0 / Neutral.
    pub fn score(&self, text: &str) -> SentimentResult {
        let compound = self.lexicon.polarity(text).compound;
        let compound = if compound.is_finite() {
            compound.clamp(-1.0, 1.0)
        } else {
            0.0
        };

        SentimentResult {
            text: text.to_string(),
            compound_score: compound,
            label: SentimentLabel::from_compound(compound),
        }
    }

    pub fn score_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SentimentResult> {
        texts.iter().map(|t| self.score(t.as_ref())).collect()
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}
