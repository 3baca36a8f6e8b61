use clap::{Parser, Subcommand};
use sandhi_postprocess::{
    loader, NegativeSet, PostprocessConfig, RankingEngine, SandhiPostprocessor, SplitStore,
    SqliteStore,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sandhi-cli")]
#[command(about = "Sandhi split post-processor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline from a YAML config
    Run {
        /// Config file
        #[arg(short, long, default_value = "sandhi.yaml")]
        config: PathBuf,

        /// Skip the secondary batch regardless of the config
        #[arg(long)]
        no_secondary: bool,
    },

    /// Rank match tables and print the selected splits as JSON
    Rank {
        /// Match tables, in priority order
        #[arg(required = true)]
        tables: Vec<PathBuf>,

        /// Negative inflection set
        #[arg(short, long)]
        negatives: Option<PathBuf>,
    },

    /// Show the stored splits for a word
    Lookup {
        word: String,

        /// Database path
        #[arg(short, long, default_value = "dpd.db")]
        db: String,
    },

    /// Get store statistics
    Stats {
        /// Database path
        #[arg(short, long, default_value = "dpd.db")]
        db: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sandhi_cli=info,sandhi_postprocess=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, no_secondary } => {
            let mut config = PostprocessConfig::load(&config)?;
            if no_secondary {
                config.include_secondary = false;
            }

            let processor = SandhiPostprocessor::new(config).await?;
            let summary = processor.run().await?;

            println!("✅ Post-processing complete");
            println!("   Rows read: {}", summary.rows_read);
            println!("   Rows skipped: {}", summary.rows_skipped);
            println!("   Duplicates removed: {}", summary.duplicates_removed);
            println!("   Words: {}", summary.words_selected);
            println!("   Splits: {}", summary.splits_selected);
            println!("   Persisted: {}", summary.rows_persisted);
            println!("   Exported: {}", summary.entries_exported);
            println!("   Elapsed: {:.2}ms", summary.elapsed_ms);
        }

        Commands::Rank { tables, negatives } => {
            let batches = tables
                .iter()
                .enumerate()
                .map(|(i, path)| loader::load_batch(path, format!("batch{}", i + 1)))
                .collect::<Result<Vec<_>, _>>()?;

            let negatives = match negatives {
                Some(path) => loader::load_negative_set(path)?,
                None => NegativeSet::new(),
            };

            let (table, mapping) = RankingEngine::default().rank_and_select(&batches, &negatives);
            if !table.skipped.is_empty() {
                eprintln!("⚠️  {} malformed rows skipped", table.skipped.len());
            }
            println!("{}", serde_json::to_string_pretty(&mapping)?);
        }

        Commands::Lookup { word, db } => {
            let store = SqliteStore::new(&db).await?;
            match store.get(&word).await? {
                Some(splits) => {
                    println!("🔍 {}", word);
                    for (i, split) in splits.iter().enumerate() {
                        println!("   {}. {}", i + 1, split);
                    }
                }
                None => println!("❌ No splits stored for {}", word),
            }
        }

        Commands::Stats { db } => {
            let stats = SqliteStore::new(&db).await?.stats().await?;

            println!("📊 Store Statistics:");
            println!("   Words: {}", stats.total_words);
            println!("   Splits: {}", stats.total_splits);
            println!("   Avg splits/word: {:.2}", stats.avg_splits);

            if let Some(updated) = stats.last_updated {
                println!("   Last updated: {}", updated.format("%Y-%m-%d %H:%M:%S"));
            }
        }
    }

    Ok(())
}
