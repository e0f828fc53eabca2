//! Sentiment Analysis Module
//!
//! Scores generated content about a movie or actor:
//! - Lexicon scoring with VADER (negation, boosters, punctuation emphasis)
//! - Per-item Positive / Neutral / Negative labels
//! - Mean compound score and label per entity

pub mod scorer;

pub use scorer::{
    LexiconScorer, Polarity, PolarityLexicon, SentimentLabel, SentimentResult, VaderLexicon,
};

use crate::error::Result;
use crate::generation::{ContentGenerator, ContentKind, TextGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Sentiment for one entity across all of its generated items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSentiment {
    /// Correlates log lines for one analysis run
    pub analysis_id: Uuid,
    pub subject: String,
    pub kind: ContentKind,
    /// Scored items in generation order
    pub items: Vec<SentimentResult>,
    /// Arithmetic mean of item compound scores (0.0 when there are none)
    pub average_score: f64,
    pub average_label: SentimentLabel,
    pub generated_at: DateTime<Utc>,
}

/// Number of items per label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl AggregateSentiment {
    /// Build from already-scored items
    pub fn from_items(subject: &str, kind: ContentKind, items: Vec<SentimentResult>) -> Self {
        let average_score = if items.is_empty() {
            0.0
        } else {
            items.iter().map(|r| r.compound_score).sum::<f64>() / items.len() as f64
        };

        Self {
            analysis_id: Uuid::new_v4(),
            subject: subject.to_string(),
            kind,
            items,
            average_score,
            average_label: SentimentLabel::from_compound(average_score),
            generated_at: Utc::now(),
        }
    }

    /// True for the "no data" state: nothing usable came back
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn label_counts(&self) -> LabelCounts {
        self.items.iter().fold(LabelCounts::default(), |mut counts, item| {
            match item.label {
                SentimentLabel::Positive => counts.positive += 1,
                SentimentLabel::Neutral => counts.neutral += 1,
                SentimentLabel::Negative => counts.negative += 1,
            }
            counts
        })
    }
}

/// Generates content for an entity and scores it
#[derive(Clone)]
pub struct SentimentAggregator {
    content: ContentGenerator,
    scorer: LexiconScorer,
}

impl SentimentAggregator {
    pub fn new(content: ContentGenerator, scorer: LexiconScorer) -> Self {
        Self { content, scorer }
    }

    /// Aggregator over a text service with the default VADER scorer
    pub fn with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(ContentGenerator::new(generator), LexiconScorer::new())
    }

    /// Generate `desired_count` items about `subject_name` and score each.
    ///
    /// Generation failures propagate unchanged. An empty content set is not an
    /// error; it yields an empty aggregate with score 0 and label Neutral.
    pub async fn analyze_entity(
        &self,
        subject_name: &str,
        desired_count: usize,
        kind: ContentKind,
    ) -> Result<AggregateSentiment> {
        let texts = self.content.generate(subject_name, desired_count, kind).await?;
        let items = self.scorer.score_batch(&texts);
        let aggregate = AggregateSentiment::from_items(subject_name.trim(), kind, items);

        if aggregate.is_empty() {
            tracing::warn!(
                "[{}] No usable {}s recovered for {:?}",
                aggregate.analysis_id,
                kind,
                aggregate.subject
            );
        } else {
            tracing::info!(
                "[{}] {} {}s for {:?}: average {:.3} ({})",
                aggregate.analysis_id,
                aggregate.items.len(),
                kind,
                aggregate.subject,
                aggregate.average_score,
                aggregate.average_label
            );
        }

        Ok(aggregate)
    }

    /// `analyze_entity` with the kind's default item count
    pub async fn analyze_default(
        &self,
        subject_name: &str,
        kind: ContentKind,
    ) -> Result<AggregateSentiment> {
        self.analyze_entity(subject_name, kind.default_count(), kind).await
    }
}
