//! Date-time normalization across UI and API renderings
//!
//! The web UI, the seat-map page and the REST API each print showtimes
//! differently (`17/10/2021 ~ 08:10`, `17-10-2021 08:10`,
//! `2021-10-17T08:10:00`, ...). Every value is reduced to one canonical
//! `dd/MM/yyyy HH:mm` string before two sources are compared.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Output pattern: `dd/MM/yyyy HH:mm`, 24-hour, zero padded
pub const CANONICAL_PATTERN: &str = "%d/%m/%Y %H:%M";

/// Known input patterns, tried in order. The first successful parse wins,
/// so a pattern must come before any looser pattern that would also accept
/// its inputs.
pub const INPUT_PATTERNS: &[&str] = &[
    CANONICAL_PATTERN,
    "%d/%m/%Y ~ %H:%M",
    "%d/%m/%Y - %H:%M",
    "%d/%m/%Y | %H:%M",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %I:%M %p",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// A date-time in canonical form, safe to compare across sources
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalDateTime(String);

impl CanonicalDateTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Debug output is the quoted bare value
impl fmt::Debug for CanonicalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl AsRef<str> for CanonicalDateTime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for CanonicalDateTime {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Multi-format date-time parser producing [`CanonicalDateTime`]
#[derive(Debug, Clone, Copy)]
pub struct TemporalNormalizer {
    patterns: &'static [&'static str],
}

impl Default for TemporalNormalizer {
    fn default() -> Self {
        Self {
            patterns: INPUT_PATTERNS,
        }
    }
}

impl TemporalNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input patterns in priority order
    pub fn patterns(&self) -> &'static [&'static str] {
        self.patterns
    }

    /// Parse `input` with the first matching pattern
    pub fn parse(&self, input: &str) -> Option<NaiveDateTime> {
        let trimmed = input.trim();
        self.patterns
            .iter()
            .find_map(|pattern| NaiveDateTime::parse_from_str(trimmed, pattern).ok())
    }

    /// Normalize, returning `None` for unrecognized input
    pub fn try_normalize(&self, input: &str) -> Option<CanonicalDateTime> {
        self.parse(input).map(|dt| self.format(&dt))
    }

    /// Normalize a raw date-time string to canonical form
    pub fn normalize(&self, input: &str) -> Result<CanonicalDateTime> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyDateTime);
        }
        self.try_normalize(trimmed).ok_or_else(|| Error::DateTimeParse {
            input: input.to_string(),
        })
    }

    /// Normalize a date and a time the UI renders in separate elements
    pub fn normalize_parts(&self, date: &str, time: &str) -> Result<CanonicalDateTime> {
        self.normalize(&format!("{} {}", date.trim(), time.trim()))
    }

    /// Format an already structured value, bypassing pattern matching
    pub fn format(&self, value: &NaiveDateTime) -> CanonicalDateTime {
        CanonicalDateTime(value.format(CANONICAL_PATTERN).to_string())
    }

    /// Whether two renderings denote the same minute
    pub fn same_instant(&self, a: &str, b: &str) -> Result<bool> {
        Ok(self.normalize(a)? == self.normalize(b)?)
    }
}
