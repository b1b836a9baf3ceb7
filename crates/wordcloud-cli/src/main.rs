use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use wordcloud_cli::{logging, run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging() {
        eprintln!("wordcloud: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            eprintln!("wordcloud: {err:#}");
            ExitCode::FAILURE
        }
    }
}
