use anyhow::Result;
use clap::Args;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat, SearchQuery};
use crate::services::Services;

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(required = true, help = "Search query text")]
    pub query: String,

    #[arg(
        long,
        short = 'n',
        allow_negative_numbers = true,
        help = "Maximum number of results (1-50, anything else uses the default)"
    )]
    pub limit: Option<i64>,
}

pub async fn handle_search(args: SearchArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);
    let pipeline = Services::query_only(&config)?;

    let request = SearchQuery::new(args.query).with_limit(args.limit.unwrap_or(0));
    if verbose {
        eprintln!("Query: \"{}\"", request.query);
        eprintln!("  Limit: {}", pipeline.effective_limit(request.limit));
        eprintln!("  Collection: {}", config.vector_store.collection);
    }

    let results = pipeline.execute(&request).await?;

    if verbose {
        eprintln!("Total: {}ms", results.duration_ms);
        eprintln!();
    }

    print!("{}", formatter.format_search_results(&results));

    Ok(())
}
