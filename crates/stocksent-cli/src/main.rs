mod news;
mod prices;

use clap::{Parser, Subcommand};
use stocksent_core::config::MAX_LOOKBACK_WEEKS;
use tracing_subscriber::EnvFilter;

pub(crate) use news::SourceArg;

#[derive(Debug, Parser)]
#[command(name = "stocksent")]
#[command(about = "Stock news collection and sentiment scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect recent news for a ticker and score its sentiment
    News {
        /// Ticker symbol, e.g. AAPL
        symbol: String,

        /// Which news providers to query
        #[arg(long, value_enum, default_value_t = SourceArg::All)]
        source: SourceArg,

        /// Look-back window in weeks (overrides `STOCKSENT_LOOKBACK_WEEKS`)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LOOKBACK_WEEKS)))]
        weeks: Option<u32>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print daily price bars for a ticker
    Prices {
        /// Ticker symbol, e.g. AAPL
        symbol: String,

        /// First trading day to include (YYYY-MM-DD); defaults to the news look-back start
        #[arg(long)]
        start: Option<chrono::NaiveDate>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = stocksent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::News {
            symbol,
            source,
            weeks,
            pretty,
        } => {
            if let Some(weeks) = weeks {
                config.lookback_weeks = weeks;
            }
            news::run_news(&config, &symbol, source, pretty).await
        }
        Commands::Prices {
            symbol,
            start,
            pretty,
        } => prices::run_prices(&config, &symbol, start, pretty).await,
    }
}

/// Writes `value` to stdout as JSON.
pub(crate) fn print_json(value: &impl serde::Serialize, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
