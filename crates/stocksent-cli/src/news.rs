//! `stocksent news` command handler.

use clap::ValueEnum;
use stocksent_core::{AppConfig, CredentialProvider};
use stocksent_sentiment::{Pipeline, SourceSelection};

/// News providers selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SourceArg {
    All,
    Newsapi,
    Apitube,
}

impl From<SourceArg> for SourceSelection {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::All => SourceSelection::All,
            SourceArg::Newsapi => SourceSelection::NewsApi,
            SourceArg::Apitube => SourceSelection::ApiTube,
        }
    }
}

/// Collects and scores news for `symbol`, printing the table as a JSON array
/// of rows.
///
/// # Errors
///
/// Returns an error if a provider key is missing or any pipeline stage fails.
pub(crate) async fn run_news(
    config: &AppConfig,
    symbol: &str,
    source: SourceArg,
    pretty: bool,
) -> anyhow::Result<()> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        anyhow::bail!("symbol must not be empty");
    }

    let pipeline = Pipeline::from_config(config, &CredentialProvider::from_env(), source.into())?;
    let table = pipeline.run(&symbol).await?;
    if table.is_empty() {
        tracing::warn!(symbol = %symbol, "no news found");
    }

    crate::print_json(&table, pretty)
}
