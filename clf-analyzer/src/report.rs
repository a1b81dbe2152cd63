//! Renderings of a finished [`Report`].
//!
//! Both functions are pure. The structured form's field names and nesting are
//! consumed by other tools and must not change.

use std::fmt::Write;

use serde::Serialize;

use crate::{
    invariants::{StatusClass, Timestamp},
    models::{ClassShare, Ranked, Report},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredReport {
    pub summary: Summary,
    pub status_distribution: StatusDistribution,
    pub top_ip_addresses: Vec<AddressRank>,
    pub top_endpoints: Vec<EndpointRank>,
    pub malformed_lines: u64,
    pub analysis_period: AnalysisPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_requests: u64,
    pub unique_ip_addresses: usize,
    pub average_response_size: u64,
    pub error_rate_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassCount {
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusDistribution {
    #[serde(rename = "2xx")]
    pub success: ClassCount,
    #[serde(rename = "3xx")]
    pub redirect: ClassCount,
    #[serde(rename = "4xx")]
    pub client_error: ClassCount,
    #[serde(rename = "5xx")]
    pub server_error: ClassCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRank {
    pub address: String,
    pub requests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointRank {
    pub path: String,
    pub requests: u64,
}

/// `start`/`end` are RFC 3339 strings, or `null` when nothing was parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPeriod {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

pub fn to_structured(report: &Report) -> StructuredReport {
    let class = |class: StatusClass| {
        report
            .status_distribution
            .iter()
            .find(|share| share.class == class)
            .map_or(
                ClassCount {
                    count: 0,
                    percent: 0.0,
                },
                |share| ClassCount {
                    count: share.count,
                    percent: share.percent,
                },
            )
    };

    StructuredReport {
        summary: Summary {
            total_requests: report.total_requests,
            unique_ip_addresses: report.unique_addresses,
            average_response_size: report.average_response_size,
            error_rate_percent: report.error_rate_percent,
        },
        status_distribution: StatusDistribution {
            success: class(StatusClass::Success),
            redirect: class(StatusClass::Redirect),
            client_error: class(StatusClass::ClientError),
            server_error: class(StatusClass::ServerError),
        },
        top_ip_addresses: report
            .top_addresses
            .iter()
            .map(|Ranked { key, requests }| AddressRank {
                address: key.clone(),
                requests: *requests,
            })
            .collect(),
        top_endpoints: report
            .top_endpoints
            .iter()
            .map(|Ranked { key, requests }| EndpointRank {
                path: key.clone(),
                requests: *requests,
            })
            .collect(),
        malformed_lines: report.malformed_lines,
        analysis_period: AnalysisPeriod {
            start: report.period.map(|(start, _)| start),
            end: report.period.map(|(_, end)| end),
        },
    }
}

pub fn to_text(report: &Report) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &Report) -> std::fmt::Result {
    writeln!(out, "=== Log Analysis Report ===")?;
    writeln!(out, "File: {}", report.source)?;
    match report.period {
        Some((start, end)) => writeln!(
            out,
            "Analysis Period: {} to {}",
            start.to_human(),
            end.to_human()
        )?,
        None => writeln!(out, "Analysis Period: N/A")?,
    }

    writeln!(out, "\nSUMMARY:")?;
    writeln!(out, "- Total Requests: {}", report.total_requests)?;
    writeln!(out, "- Unique IP Addresses: {}", report.unique_addresses)?;
    writeln!(
        out,
        "- Average Response Size: {} bytes",
        report.average_response_size
    )?;
    writeln!(out, "- Error Rate: {:.1}%", report.error_rate_percent)?;

    writeln!(out, "\nTOP IP ADDRESSES:")?;
    write_ranking(out, &report.top_addresses)?;

    writeln!(out, "\nSTATUS CODE DISTRIBUTION:")?;
    for ClassShare {
        class,
        count,
        percent,
    } in &report.status_distribution
    {
        writeln!(out, "- {class} {}: {count} ({percent:.1}%)", class.label())?;
    }
    if report.other_statuses > 0 {
        writeln!(out, "- other: {}", report.other_statuses)?;
    }

    writeln!(out, "\nTOP ENDPOINTS:")?;
    write_ranking(out, &report.top_endpoints)?;

    writeln!(out, "\nMalformed lines skipped: {}", report.malformed_lines)
}

fn write_ranking(out: &mut String, ranking: &[Ranked]) -> std::fmt::Result {
    for (i, Ranked { key, requests }) in ranking.iter().enumerate() {
        writeln!(out, "{}. {key} ({requests} requests)", i + 1)?;
    }
    Ok(())
}
