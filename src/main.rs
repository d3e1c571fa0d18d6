// src/main.rs
// =============================================================================
// This is the entry point of the dirprobe CLI.
//
// What happens here:
// 1. Parse command-line arguments and build a validated ScanConfig
// 2. Load the wordlist and check that the target answers at all
// 3. Print the banner and run the scan, with Ctrl-C wired to cancellation
// 4. Persist the results and print the summary
// 5. Exit with a code: 0 = completed, 1 = interrupted, 2 = error
//    (130 when a second Ctrl-C forces the exit)
// =============================================================================

mod cli;
mod config;
mod error;
mod preflight;
mod probe;
mod report;
mod scan;
mod wordlist;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use report::ConsoleObserver;
use scan::{CancellationFlag, Coordinator, ScanStatus};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.to_config()?;
    let words = wordlist::load(&cli.wordlist)?;
    preflight::check_reachable(&config.base_url).await?;

    report::print_banner(&config, &cli.wordlist);

    let output = config.output.clone();
    let cancel = CancellationFlag::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if watch_interrupts(cancel, tokio::signal::ctrl_c).await {
                eprintln!("[!] Second interrupt, exiting without waiting for workers.");
                std::process::exit(130);
            }
        }
    });

    let coordinator = Coordinator::new(config, cancel, Arc::new(ConsoleObserver))?;
    let scan = coordinator.run(words).await;
    interrupt.abort();

    // Runs for completed and interrupted scans alike
    if let Some(path) = &output {
        report::write_results(path, &scan.hits)
            .with_context(|| format!("failed to save results to {}", path.display()))?;
    }

    if cli.json {
        println!("{}", report::to_json(&scan.hits)?);
    }

    println!("\n");
    println!("{}", report::rule());
    println!("Scan complete. {} path(s) found.", scan.hits.len());
    println!("{}", report::rule());

    Ok(match scan.status {
        ScanStatus::Completed => 0,
        ScanStatus::Cancelled => 1,
    })
}

// First interrupt raises the cancellation flag: workers finish their current
// request, then stop. Returns true when a second interrupt arrives while they
// drain, meaning the user wants out now. Hits found so far are already in the
// output file through the store's append path.
async fn watch_interrupts<F, Fut>(cancel: CancellationFlag, mut next_interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    println!("\n[!] Keyboard interrupt detected. Stopping...");
    cancel.cancel();

    next_interrupt().await.is_ok()
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "dirprobe=debug" } else { "dirprobe=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
