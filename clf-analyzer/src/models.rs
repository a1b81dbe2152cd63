use std::fmt;

use crate::invariants::{ClientAddress, Endpoint, StatusClass, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub client_address: ClientAddress,
    pub timestamp: Timestamp,
    pub method: String,
    pub path: Endpoint,
    pub protocol: String,
    pub status_code: u16,
    /// `None` when the server logged `-`.
    pub response_size: Option<u64>,
}

impl LogEntry {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_status(self.status_code)
    }
}

/// Renders the entry back into a CLF line. The identd and userid fields are
/// not retained, so they always come out as `-`.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{} {} {}\" {} ",
            self.client_address,
            self.timestamp.to_clf(),
            self.method,
            self.path,
            self.protocol,
            self.status_code,
        )?;
        match self.response_size {
            Some(size) => write!(f, "{size}"),
            None => f.write_str("-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub key: String,
    pub requests: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassShare {
    pub class: StatusClass,
    pub count: u64,
    pub percent: f64,
}

/// Final, immutable result of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub source: String,
    pub total_requests: u64,
    pub malformed_lines: u64,
    pub unique_addresses: usize,
    pub average_response_size: u64,
    pub error_rate_percent: f64,
    /// The four ranked classes in 2xx..5xx order.
    pub status_distribution: Vec<ClassShare>,
    /// Statuses outside 200-599.
    pub other_statuses: u64,
    pub top_addresses: Vec<Ranked>,
    pub top_endpoints: Vec<Ranked>,
    pub period: Option<(Timestamp, Timestamp)>,
}
