// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Install the stderr log subscriber
///
/// Honors `RUST_LOG`; defaults to `info`. Stdout is left for CSV output.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
