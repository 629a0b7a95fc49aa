//! Concurrent Ledger CLI
//!
//! Runs a set of concurrent actors against the ledger engine and prints the
//! resulting account states as CSV on stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --users 10 --seed 7 > accounts.csv
//! cargo run -- --script actors.csv --data-dir ./data > accounts.csv
//! cargo run -- --script actors.csv --write-failure-rate 0.2 --reports > reports.csv
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` for per-operation detail.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (store cannot be opened, script not readable, output failure)

use concurrent_ledger::cli;
use concurrent_ledger::core::{AccountStore, LedgerEngine};
use concurrent_ledger::driver::{random_scenario, summarize, ActorDriver};
use concurrent_ledger::io::{read_script, write_accounts_csv, write_reports_csv};
use concurrent_ledger::store::{FaultyStore, InMemoryStore, JsonFileStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

fn main() {
    cli::init_tracing();
    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), String> {
    let backend: Box<dyn AccountStore> = match &args.data_dir {
        Some(dir) => Box::new(
            JsonFileStore::open(dir)
                .map_err(|e| format!("Failed to open store '{}': {}", dir.display(), e))?,
        ),
        None => Box::new(InMemoryStore::new()),
    };
    let store = FaultyStore::new(backend).with_failure_rate(args.write_failure_rate);

    let config = args.to_driver_config();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(config.workers)
        .build()
        .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

    let driver = ActorDriver::new(Arc::new(LedgerEngine::new(store)), config);

    let reports = runtime.block_on(async {
        let requests = match &args.script {
            Some(path) => read_script(path).await?,
            None => {
                let mut rng = match args.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                random_scenario(args.users, args.max_amount, &mut rng)
            }
        };
        info!(actors = requests.len(), "starting actors");
        Ok::<_, String>(driver.run(requests).await)
    })?;

    info!("{}", summarize(&reports));

    let mut output = std::io::stdout();
    if args.reports {
        write_reports_csv(&reports, &mut output)
    } else {
        let accounts = driver
            .engine()
            .store()
            .accounts()
            .map_err(|e| format!("Failed to list accounts: {}", e))?;
        write_accounts_csv(&accounts, &mut output)
    }
}
