use chrono::{DateTime, Duration, FixedOffset};
use rand::{Rng, seq::IndexedRandom};

const ADDRESSES: [(&str, u8); 8] = [
    ("192.168.1.10", 20),
    ("192.168.1.22", 12),
    ("10.0.0.5", 10),
    ("10.0.0.8", 6),
    ("172.16.0.3", 6),
    ("203.0.113.7", 3),
    ("198.51.100.42", 2),
    ("crawler.example.net", 1),
];
const METHODS: [(&str, u8); 4] = [("GET", 6), ("POST", 2), ("PUT", 1), ("DELETE", 1)];
const PATHS: [(&str, u8); 7] = [
    ("/", 10),
    ("/login", 10),
    ("/api", 50),
    ("/admin", 5),
    ("/splash", 20),
    ("/gallery", 10),
    ("/search?q=rust", 5),
];
const PROTOCOLS: [(&str, u8); 3] = [("HTTP/1.1", 20), ("HTTP/2.0", 5), ("HTTP/1.0", 1)];
const STATUS: [(u16, u8); 8] = [
    (200, 50),
    (201, 10),
    (304, 8),
    (400, 10),
    (401, 20),
    (404, 50),
    (500, 5),
    (503, 2),
];

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, table: &[(T, u8)]) -> T {
    table
        .choose_weighted(rng, |(_, w)| *w)
        .map_or(table[0].0, |(v, _)| *v)
}

/// Monotonic request clock; each call moves forward by 0-4 seconds.
#[derive(Debug, Clone)]
pub struct Clock(DateTime<FixedOffset>);

impl Clock {
    pub fn starting_at(start: DateTime<FixedOffset>) -> Self {
        Self(start)
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> DateTime<FixedOffset> {
        self.0 += Duration::seconds(rng.random_range(0..5));
        self.0
    }
}

pub fn generate_apache_log<R: Rng + ?Sized>(
    rng: &mut R,
    at: DateTime<FixedOffset>,
    dash_size_rate: f64,
) -> String {
    let ip = pick(rng, &ADDRESSES);
    let timestamp = at.format("%d/%b/%Y:%H:%M:%S %z");
    let method = pick(rng, &METHODS);
    let path = pick(rng, &PATHS);
    let protocol = pick(rng, &PROTOCOLS);
    let status = pick(rng, &STATUS);
    let size = if rng.random_bool(dash_size_rate) {
        "-".to_string()
    } else {
        rng.random_range(100..2000).to_string()
    };

    format!("{ip} - - [{timestamp}] \"{method} {path} {protocol}\" {status} {size}")
}

/// A line that an access log parser has to reject.
pub fn generate_malformed_log<R: Rng + ?Sized>(rng: &mut R, at: DateTime<FixedOffset>) -> String {
    let ip = pick(rng, &ADDRESSES);
    let timestamp = at.format("%d/%b/%Y:%H:%M:%S %z");
    match rng.random_range(0..6) {
        0 => format!("{ip} - - {timestamp} \"GET / HTTP/1.1\" 200 512"),
        1 => format!("{ip} - - [{timestamp}] \"GET /\" 200 512"),
        2 => format!("{ip} - - [{timestamp}] \"GET / HTTP/1.1\" OK 512"),
        3 => format!("{ip} - - [{timestamp}] GET / HTTP/1.1 200 512"),
        4 => format!("{ip} - - [{timestamp}] \"GET / HTTP/1.1\" 200 512 trailing"),
        _ => String::new(),
    }
}
