//! Core types for the booking hierarchy: movies, cinema branches, showtimes and seats

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Movie as listed by the booking API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
}

/// Cinema branch (a physical cinema belonging to a chain)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinemaBranchRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
}

/// Scheduled screening
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Raw date-time as the API renders it; compare via the normalizer
    pub date_time: String,
    #[serde(default)]
    pub seats: Vec<SeatRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRef {
    pub code: String,
    #[serde(default)]
    pub reserved: bool,
}

/// One branch and the showtimes it screens for a given movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchShowtimes {
    pub branch: CinemaBranchRef,
    #[serde(default)]
    pub showtimes: Vec<ShowtimeRef>,
}

/// Seat map and headline information for a single showtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeDetail {
    pub movie_title: String,
    pub cinema_name: String,
    pub date_time: String,
    #[serde(default)]
    pub seats: Vec<SeatRef>,
}

impl ShowtimeDetail {
    /// Number of seats not yet reserved
    pub fn available_seats(&self) -> usize {
        self.seats.iter().filter(|s| !s.reserved).count()
    }
}

/// Where a showtime was first reached while walking movies -> branches -> showtimes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowtimeListing {
    pub showtime_id: String,
    pub movie_id: String,
    pub movie_title: String,
    pub branch_id: String,
    pub branch_name: String,
    pub date_time: String,
}

/// Mapping of identifier to display label, ordered by identifier.
///
/// Built fresh for every query; the ordering keeps seeded sampling reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierIndex {
    entries: BTreeMap<String, String>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. The first label recorded for an id is kept.
    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) -> bool {
        match self.entries.entry(id.into()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(label.into());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Identifiers in ascending order
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentifierIndex {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (id, label) in iter {
            index.insert(id, label);
        }
        index
    }
}

/// Accept identifiers rendered either as JSON strings or integers
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(n) => n.to_string(),
    })
}
