use std::{str::FromStr, sync::LazyLock};

use chrono::{FixedOffset, TimeZone};
use regex::{Captures, Regex};
use thiserror::Error;

use crate::{
    invariants::{ClientAddress, Endpoint, Timestamp},
    models::LogEntry,
};

// host ident authuser [date] "request" status bytes
static LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\S+) (\S+) (\S+) \[([^\[\]]*)\] "([^"]*)" (\S+) (\S+)$"#)
        .expect("valid line pattern")
});

// Timestamp format for log entries: [01/Jun/1995:00:00:59 -0600]
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})/([A-Za-z]{3})/(\d{4}):(\d{2}):(\d{2}):(\d{2}) ([+-])(\d{2})(\d{2})$")
        .expect("valid timestamp pattern")
});

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("line is empty")]
    Empty,
    #[error("line contains non-ASCII bytes")]
    NonAscii,
    #[error("line does not match the common log layout")]
    Layout,
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),
    #[error("request {0:?} is not `METHOD PATH PROTOCOL`")]
    Request(String),
    #[error("status {0:?} is not a decimal integer")]
    Status(String),
    #[error("size {0:?} is neither a decimal integer nor `-`")]
    Size(String),
}

/// A line that was rejected, with its 1-based position in the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line_number}: {reason}")]
pub struct ParseFailure {
    pub line_number: usize,
    pub reason: MalformedReason,
}

/// Parses one CLF line. Either the whole line matches or nothing is extracted.
pub fn parse_log_line(line_number: usize, line: &str) -> Result<LogEntry, ParseFailure> {
    parse_fields(line).map_err(|reason| ParseFailure {
        line_number,
        reason,
    })
}

fn parse_fields(line: &str) -> Result<LogEntry, MalformedReason> {
    if line.trim().is_empty() {
        return Err(MalformedReason::Empty);
    }
    if !line.is_ascii() {
        return Err(MalformedReason::NonAscii);
    }
    let caps = LINE.captures(line).ok_or(MalformedReason::Layout)?;
    let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

    // fields 2 and 3 (identd, userid) are positional only
    let timestamp = parse_timestamp(field(4))?;

    let request = field(5);
    let mut tokens = request.split_whitespace();
    let (Some(method), Some(path), Some(protocol), None) =
        (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(MalformedReason::Request(request.into()));
    };

    let status = field(6);
    let status_code =
        parse_decimal::<u16>(status).ok_or_else(|| MalformedReason::Status(status.into()))?;

    let size = field(7);
    let response_size = match size {
        "-" => None,
        s => Some(parse_decimal::<u64>(s).ok_or_else(|| MalformedReason::Size(s.into()))?),
    };

    Ok(LogEntry {
        client_address: field(1)
            .parse::<ClientAddress>()
            .map_err(|_| MalformedReason::Layout)?,
        timestamp,
        method: method.into(),
        path: path.parse::<Endpoint>().map_err(|_| MalformedReason::Layout)?,
        protocol: protocol.into(),
        status_code,
        response_size,
    })
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, MalformedReason> {
    let invalid = || MalformedReason::Timestamp(raw.into());
    let caps = TIMESTAMP.captures(raw).ok_or_else(invalid)?;
    let num = |caps: &Captures, i: usize| -> Option<u32> { caps.get(i)?.as_str().parse().ok() };

    let month = MONTHS
        .iter()
        .position(|m| *m == &caps[2])
        .ok_or_else(invalid)? as u32
        + 1;
    let day = num(&caps, 1).ok_or_else(invalid)?;
    let year = caps[3].parse::<i32>().map_err(|_| invalid())?;
    let hour = num(&caps, 4).ok_or_else(invalid)?;
    let minute = num(&caps, 5).ok_or_else(invalid)?;
    let second = num(&caps, 6).ok_or_else(invalid)?;

    let offset_secs = (num(&caps, 8).ok_or_else(invalid)? * 3600
        + num(&caps, 9).ok_or_else(invalid)? * 60) as i32;
    let offset_secs = if &caps[7] == "-" {
        -offset_secs
    } else {
        offset_secs
    };
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(invalid)?;

    offset
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .map(Timestamp::from)
        .ok_or_else(invalid)
}

// `str::parse` accepts a leading `+` and zero padding; CLF numbers are bare
// digits with no leading zero.
fn parse_decimal<T: FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}
