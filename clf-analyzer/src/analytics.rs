use std::{
    collections::HashMap,
    fmt::Display,
    hash::Hash,
};

use crate::{
    invariants::{ClientAddress, Endpoint, StatusClass, Timestamp},
    models::{ClassShare, LogEntry, Ranked, Report},
};

pub const DEFAULT_TOP_ADDRESSES: usize = 5;
pub const DEFAULT_TOP_ENDPOINTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopLimits {
    pub addresses: usize,
    pub endpoints: usize,
}

impl Default for TopLimits {
    fn default() -> Self {
        Self {
            addresses: DEFAULT_TOP_ADDRESSES,
            endpoints: DEFAULT_TOP_ENDPOINTS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tally {
    count: u64,
    first_seen: usize,
}

/// Occurrence counter that remembers the order keys first appeared in, so
/// rankings with equal counts come out in input order.
#[derive(Debug)]
pub struct Counter<K> {
    tallies: HashMap<K, Tally>,
}

impl<K> Default for Counter<K> {
    fn default() -> Self {
        Self {
            tallies: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Display> Counter<K> {
    pub fn record(&mut self, key: K) {
        let first_seen = self.tallies.len();
        self.tallies
            .entry(key)
            .or_insert(Tally {
                count: 0,
                first_seen,
            })
            .count += 1;
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn top(&self, n: usize) -> Vec<Ranked> {
        let mut entries: Vec<_> = self.tallies.iter().collect();
        entries.sort_unstable_by(|(_, a), (_, b)| {
            b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen))
        });
        entries.truncate(n);
        entries
            .into_iter()
            .map(|(k, t)| Ranked {
                key: k.to_string(),
                requests: t.count,
            })
            .collect()
    }
}

/// Running totals for one analysis run.
#[derive(Debug, Default)]
pub struct Statistics {
    pub total_requests: u64,
    pub malformed_count: u64,
    pub addresses: Counter<ClientAddress>,
    pub endpoints: Counter<Endpoint>,
    pub status_classes: HashMap<StatusClass, u64>,
    pub size_sum: u64,
    pub size_count: u64,
    pub earliest: Option<Timestamp>,
    pub latest: Option<Timestamp>,
}

impl Statistics {
    pub fn unique_addresses(&self) -> usize {
        self.addresses.len()
    }

    pub fn class_count(&self, class: StatusClass) -> u64 {
        self.status_classes.get(&class).copied().unwrap_or_default()
    }
}

/// Folds parsed entries into [`Statistics`] one line at a time. Not meant to
/// be shared between threads; each run owns its own aggregator.
#[derive(Debug)]
pub struct Aggregator {
    source: String,
    limits: TopLimits,
    stats: Statistics,
}

impl Aggregator {
    pub fn new(source: impl Into<String>, limits: TopLimits) -> Self {
        Self {
            source: source.into(),
            limits,
            stats: Statistics::default(),
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn update(&mut self, entry: LogEntry) {
        let class = entry.status_class();
        let stats = &mut self.stats;
        stats.total_requests += 1;
        stats.addresses.record(entry.client_address);
        stats.endpoints.record(entry.path);
        *stats.status_classes.entry(class).or_default() += 1;
        if let Some(size) = entry.response_size {
            stats.size_sum = stats.size_sum.saturating_add(size);
            stats.size_count += 1;
        }
        let ts = entry.timestamp;
        stats.earliest = Some(stats.earliest.map_or(ts, |e| e.min(ts)));
        stats.latest = Some(stats.latest.map_or(ts, |l| l.max(ts)));
    }

    pub fn record_failure(&mut self, _line_number: usize) {
        self.stats.malformed_count += 1;
    }

    /// Derives the report. Reads state only, so calling it again yields the
    /// same report.
    pub fn finalize(&self) -> Report {
        let stats = &self.stats;
        let total = stats.total_requests;

        let status_distribution = StatusClass::RANKED
            .into_iter()
            .map(|class| {
                let count = stats.class_count(class);
                ClassShare {
                    class,
                    count,
                    percent: percent(count, total),
                }
            })
            .collect::<Vec<_>>();
        let errors = status_distribution
            .iter()
            .filter(|share| share.class.is_error())
            .map(|share| share.count)
            .sum();

        let average_response_size = if stats.size_count == 0 {
            0
        } else {
            (stats.size_sum as f64 / stats.size_count as f64).round() as u64
        };

        Report {
            source: self.source.clone(),
            total_requests: total,
            malformed_lines: stats.malformed_count,
            unique_addresses: stats.unique_addresses(),
            average_response_size,
            error_rate_percent: percent(errors, total),
            status_distribution,
            other_statuses: stats.class_count(StatusClass::Other),
            top_addresses: stats.addresses.top(self.limits.addresses),
            top_endpoints: stats.endpoints.top(self.limits.endpoints),
            period: stats.earliest.zip(stats.latest),
        }
    }
}

/// `part / total` as a percentage rounded to one decimal; 0.0 when `total` is 0.
fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}
