//! Promptline - shell-aware input engine
//!
//! Command-line front end for the promptline library. Each subcommand runs
//! one step of the keystroke pipeline non-interactively and prints JSON.
//!
//! # Usage
//!
//! ```bash
//! # Token stream of a line
//! promptline tokenize 'git commit -m "fix"'
//!
//! # Completion menu for the cursor at the end, then accept the selection
//! promptline complete "git ch" --keys tab,enter
//! ```

use tracing::Level;

use promptline::cli::CliInterface;
use promptline::error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand().await? {
        return Ok(());
    }

    cli.print_help()
}

/// Initialize logging system based on configuration
///
/// # Arguments
/// * `cli` - CLI interface with parsed arguments
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    // Logs go to stderr so subcommand output stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
