// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (errors go to the error log file)
// 3. Crawl the site
// 4. Write the crawled URLs to CSV and print a one-line summary
//
// Exit codes: 0 once the crawl ran (even if pages or the CSV write failed,
// those are only logged), 2 if the crawl could not start at all.
// =============================================================================

mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - crawl settings
mod crawl; // src/crawl/ - the crawl engine
mod fetch; // src/fetch/ - HTTP fetching
mod logging; // src/logging.rs - tracing setup
mod output; // src/output.rs - CSV writer

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::sync::Arc;
use tracing::error;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let config = cli.into_config();

    logging::init(&config.error_log, verbose);

    let fetcher = Arc::new(fetch::HttpFetcher::new(&config.user_agent)?);
    let report = crawl::crawl_site(&config, fetcher).await?;

    if let Err(e) = output::write_csv(&config.output, &report.urls) {
        error!("Failed to write CSV: {:#}", e);
    }

    println!(
        "Done: crawled {} pages in {:.1}s. Output saved to {}",
        report.pages,
        report.elapsed.as_secs_f64(),
        config.output.display()
    );

    Ok(())
}
