mod args;
mod generator;
mod stream;

use args::CliArgs;
use clap::Parser;
use std::process::ExitCode;
use stream::write_log_file;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match write_log_file(&args).await {
        Ok(written) => {
            info!(
                path = %args.output().display(),
                lines = written.lines,
                malformed = written.malformed,
                "log written"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(path = %args.output().display(), "failed to write log: {e}");
            ExitCode::FAILURE
        }
    }
}
