use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use derive_more::{AsRef, Debug, Display};
use serde::{Serialize, Serializer};

#[derive(Debug, Display, AsRef, Clone, PartialEq, Eq, Hash)]
pub struct ClientAddress(String);

impl FromStr for ClientAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.into()))
    }
}

#[derive(Debug, Display, AsRef, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.into()))
    }
}

/// A request time with the offset it was logged in. Ordering compares instants,
/// so `+0200` and `+0000` stamps for the same moment are equal.
#[derive(Debug, Display, AsRef, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// `10/Oct/2023:13:55:36 +0000`
    pub fn to_clf(self) -> String {
        self.0.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    /// `2023-10-10 13:55:36 +0000`
    pub fn to_human(self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S %z").to_string()
    }
}

/// Serialized as RFC 3339 with a numeric offset, e.g. `2023-10-10T13:55:36+00:00`.
impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self(value)
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusClass {
    #[display("2xx")]
    Success,
    #[display("3xx")]
    Redirect,
    #[display("4xx")]
    ClientError,
    #[display("5xx")]
    ServerError,
    #[display("other")]
    Other,
}

impl StatusClass {
    pub const RANKED: [StatusClass; 4] = [
        Self::Success,
        Self::Redirect,
        Self::ClientError,
        Self::ServerError,
    ];

    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Redirect => "Redirect",
            Self::ClientError => "Client Error",
            Self::ServerError => "Server Error",
            Self::Other => "Other",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::ClientError | Self::ServerError)
    }
}
