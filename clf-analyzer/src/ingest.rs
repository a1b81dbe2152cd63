use std::path::{Path, PathBuf};

use num_format::{Locale, ToFormattedString};
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tracing::{debug, info, warn};

use crate::{
    analytics::{Aggregator, TopLimits},
    error::{AnalyzerError, Result},
    models::Report,
    parser::parse_log_line,
};

const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineCounts {
    pub read: u64,
    pub parsed: u64,
    pub malformed: u64,
}

/// Streams one log file through a fresh aggregator.
pub async fn analyze_file(path: PathBuf, limits: TopLimits) -> Result<Report> {
    let file = File::open(&path)
        .await
        .map_err(|source| read_error(&path, source))?;
    let mut aggregator = Aggregator::new(path.display().to_string(), limits);
    let counts = feed_lines(BufReader::new(file), &mut aggregator)
        .await
        .map_err(|source| read_error(&path, source))?;

    info!(
        file = %path.display(),
        lines = %counts.read.to_formatted_string(&Locale::en),
        parsed = %counts.parsed.to_formatted_string(&Locale::en),
        malformed = %counts.malformed.to_formatted_string(&Locale::en),
        "finished reading"
    );
    if aggregator.statistics().total_requests == 0 {
        warn!(file = %path.display(), "no data to report");
    }
    Ok(aggregator.finalize())
}

/// Feeds every line from `reader` into `aggregator`, one at a time. Bytes that
/// are not UTF-8 are kept as replacement characters so the parser rejects the
/// line instead of the read failing.
pub async fn feed_lines<R>(mut reader: R, aggregator: &mut Aggregator) -> io::Result<LineCounts>
where
    R: AsyncBufRead + Unpin,
{
    let mut counts = LineCounts::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        counts.read += 1;
        let line_number = counts.read as usize;
        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        match parse_log_line(line_number, &line) {
            Ok(entry) => {
                counts.parsed += 1;
                aggregator.update(entry);
            }
            Err(failure) => {
                counts.malformed += 1;
                debug!(
                    line = failure.line_number,
                    reason = %failure.reason,
                    preview = %line.chars().take(PREVIEW_CHARS).collect::<String>(),
                    "skipping malformed line"
                );
                aggregator.record_failure(failure.line_number);
            }
        }
    }
    Ok(counts)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn read_error(path: &Path, source: io::Error) -> AnalyzerError {
    AnalyzerError::Read {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    const GOOD: &str =
        r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET /index.html HTTP/1.1" 200 100"#;

    #[tokio::test]
    async fn every_line_is_classified_once() {
        let input = format!("{GOOD}\n\n   \nnot a log line\n{GOOD}\r\n{GOOD}");
        let mut agg = Aggregator::new("mem", TopLimits::default());
        let counts = feed_lines(input.as_bytes(), &mut agg).await.unwrap();

        assert_that!(counts).is_equal_to(LineCounts {
            read: 6,
            parsed: 3,
            malformed: 3,
        });
        let stats = agg.statistics();
        assert_eq!(stats.total_requests + stats.malformed_count, counts.read);
    }

    #[tokio::test]
    async fn invalid_utf8_is_malformed_not_fatal() {
        let mut input = GOOD.as_bytes().to_vec();
        input.extend_from_slice(b"\n10.0.0.2 - - [10/Oct/2023:13:55:36 +0000] \"GET /\xff HTTP/1.1\" 200 1\n");
        let mut agg = Aggregator::new("mem", TopLimits::default());
        let counts = feed_lines(input.as_slice(), &mut agg).await.unwrap();
        assert_eq!(counts.parsed, 1);
        assert_eq!(counts.malformed, 1);
    }

    #[tokio::test]
    async fn empty_input_reads_nothing() {
        let mut agg = Aggregator::new("mem", TopLimits::default());
        let counts = feed_lines(&b""[..], &mut agg).await.unwrap();
        assert_that!(counts).is_equal_to(LineCounts::default());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = analyze_file("/definitely/not/here.log".into(), TopLimits::default())
            .await
            .unwrap_err();
        assert_that!(matches!(err, AnalyzerError::Read { .. })).is_true();
        assert_that!(err.to_string().starts_with("failed to read /definitely/not/here.log")).is_true();
    }
}
