//! Reel Sentiment CLI
//!
//! Runs the generate → normalize → score pipeline for one movie or actor.

use clap::{Parser, Subcommand};
use reel_sentiment::{
    config::Config,
    generation::{normalize, ContentKind, LlmClient},
    sentiment::{AggregateSentiment, LexiconScorer, SentimentAggregator, SentimentLabel},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "reel-sentiment")]
#[command(about = "AI-generated reviews and tweets for movies and actors, with sentiment scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: reel.toml, reel.yaml, ~/.config/reel-sentiment/config.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate content about a movie or actor and score it
    Analyze {
        /// Movie title or actor name
        name: String,
        /// review (movie) or tweet (actor)
        #[arg(short, long, default_value = "review")]
        kind: ContentKind,
        /// Number of items to request (default: from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score a single text without calling the model
    Score {
        text: String,
    },
    /// Run the response normalizer over a saved model reply
    Normalize {
        file: PathBuf,
        /// Expected item count
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { name, kind, count, json } => {
            let config = match &cli.config {
                Some(path) => Config::load(path)?,
                None => Config::load_default()?,
            };
            analyze(config, &name, kind, count, json).await
        }
        Commands::Score { text } => {
            score(&text);
            Ok(())
        }
        Commands::Normalize { file, count } => normalize_file(&file, count),
    }
}

async fn analyze(
    config: Config,
    name: &str,
    kind: ContentKind,
    count: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let client = LlmClient::from_config(&config.generator)?;
    tracing::info!("Using text service {}", client.name());

    let aggregator = SentimentAggregator::with_generator(Arc::new(client));
    let count = count.unwrap_or_else(|| config.analysis.count_for(kind));

    let aggregate = match aggregator.analyze_entity(name, count, kind).await {
        Ok(aggregate) => aggregate,
        Err(e) => {
            tracing::error!("Analysis failed for {:?}: {}", name, e);
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&aggregate)?);
    } else {
        print_aggregate(&aggregate);
    }

    Ok(())
}

fn print_aggregate(aggregate: &AggregateSentiment) {
    println!("\n🎬 {} sentiment for {}\n", aggregate.kind, aggregate.subject);

    if aggregate.is_empty() {
        println!("No data: the model returned no usable {}s.", aggregate.kind);
        return;
    }

    for (i, item) in aggregate.items.iter().enumerate() {
        println!(
            "{:>3}. {} {:+.3}  {}",
            i + 1,
            label_emoji(item.label),
            item.compound_score,
            item.text
        );
    }

    let counts = aggregate.label_counts();
    println!("{}", "-".repeat(80));
    println!(
        "Average: {:+.3} ({})   👍 {}  😐 {}  👎 {}",
        aggregate.average_score,
        aggregate.average_label,
        counts.positive,
        counts.neutral,
        counts.negative
    );
}

fn score(text: &str) {
    let result = LexiconScorer::new().score(text);
    println!(
        "{} {:+.4} ({})",
        label_emoji(result.label),
        result.compound_score,
        result.label
    );
}

fn normalize_file(file: &Path, count: usize) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let items = normalize(&raw, count);

    println!("Recovered {} item(s):", items.len());
    for item in items {
        println!("  - {}", item);
    }
    Ok(())
}

fn label_emoji(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "🟢",
        SentimentLabel::Neutral => "⚪",
        SentimentLabel::Negative => "🔴",
    }
}
