use crate::args::CliArgs;
use crate::generator::{Clock, generate_apache_log, generate_malformed_log};
use chrono::{FixedOffset, TimeZone};
use rand::{SeedableRng, rngs::StdRng};
use tokio::{
    fs::File,
    io::{self, AsyncWriteExt, BufWriter},
};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    pub lines: u64,
    pub malformed: u64,
}

pub async fn write_log_file(args: &CliArgs) -> io::Result<Written> {
    let file = File::create(args.output()).await?;
    let mut rng = match args.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };
    let start = FixedOffset::east_opt(0)
        .and_then(|utc| utc.with_ymd_and_hms(2023, 10, 10, 13, 55, 36).single())
        .ok_or_else(|| io::Error::other("invalid start instant"))?;
    let mut clock = Clock::starting_at(start);
    let mut out = BufWriter::new(file);
    let mut written = Written::default();

    for n in 1..=*args.lines() {
        let at = clock.tick(&mut rng);
        let line = match args.malformed_every() {
            Some(k) if n % k == 0 => {
                written.malformed += 1;
                debug!(line = n, "writing malformed line");
                generate_malformed_log(&mut rng, at)
            }
            _ => generate_apache_log(&mut rng, at, *args.dash_size_rate()),
        };
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        written.lines += 1;
    }
    out.flush().await?;
    Ok(written)
}
