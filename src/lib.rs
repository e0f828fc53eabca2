//! Reel Sentiment
//!
//! Generates synthetic reviews and tweets about movies and actors with a
//! language model, then scores them with lexicon-based sentiment analysis.

pub mod config;
pub mod error;
pub mod generation;
pub mod sentiment;


pub use error::{ReelError, Result};
pub use generation::{ContentGenerator, ContentKind, TextGenerator};
pub use sentiment::{AggregateSentiment, LexiconScorer, SentimentAggregator, SentimentLabel};
