use crate::driver::DriverConfig;
use clap::Parser;
use std::path::PathBuf;

/// Run concurrent ledger actors against a durable account store
#[derive(Parser, Debug)]
#[command(name = "concurrent-ledger")]
#[command(about = "Run concurrent ledger actors against a durable account store", long_about = None)]
pub struct CliArgs {
    /// Actor script (CSV: operation,account,amount,target)
    #[arg(
        long = "script",
        value_name = "FILE",
        conflicts_with = "users",
        help = "Path to a CSV actor script; a random scenario is generated when omitted"
    )]
    pub script: Option<PathBuf>,

    /// Number of users in a random scenario, one actor each
    #[arg(long = "users", value_name = "COUNT", default_value_t = 2)]
    pub users: usize,

    /// Upper bound for random amounts
    #[arg(long = "max-amount", value_name = "AMOUNT", default_value_t = 500)]
    pub max_amount: u32,

    /// Seed for the random scenario
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Directory for per-account JSON documents
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "LEDGER_DATA_DIR",
        help = "Directory for per-account JSON documents (in-memory store when omitted)"
    )]
    pub data_dir: Option<PathBuf>,

    /// Maximum number of concurrently executing actors
    #[arg(
        long = "workers",
        value_name = "COUNT",
        env = "LEDGER_WORKERS",
        help = "Maximum number of concurrently executing actors (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Do not open each actor's account before its operation
    #[arg(long = "no-auto-create")]
    pub no_auto_create: bool,

    /// Probability that any store write fails (exercises rollback)
    #[arg(long = "write-failure-rate", value_name = "RATE", default_value_t = 0.0)]
    pub write_failure_rate: f64,

    /// Print one row per actor instead of final account balances
    #[arg(long = "reports")]
    pub reports: bool,
}

impl CliArgs {
    /// Create a DriverConfig from CLI arguments
    ///
    /// Falls back to the default worker count when `--workers` is absent or zero.
    pub fn to_driver_config(&self) -> DriverConfig {
        let default = DriverConfig::default();
        DriverConfig::new(self.workers.unwrap_or(default.workers), !self.no_auto_create)
    }
}
