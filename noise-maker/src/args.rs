use clap::Parser;
use derive_getters::Getters;
use std::path::PathBuf;

#[derive(Parser, Debug, Getters)]
#[command(name = "noise-maker")]
#[command(about = "Generate synthetic Common Log Format access logs", long_about = None)]
pub struct CliArgs {
    #[arg(long, default_value_t = 1000)]
    lines: u64,

    #[arg(long, default_value = "server.log")]
    output: PathBuf,

    /// Fixed seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Replace every K-th line with a malformed one
    #[arg(long, value_name = "K", value_parser = clap::value_parser!(u64).range(1..))]
    malformed_every: Option<u64>,

    /// Probability that a line logs `-` as its response size
    #[arg(long, default_value_t = 0.05, value_parser = parse_probability)]
    dash_size_rate: f64,
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is not between 0 and 1"))
    }
}
