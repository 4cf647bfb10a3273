use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::TodoId;

/// A single todo record as stored and served over HTTP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    pub content: String,
    #[serde(deserialize_with = "bool_or_string")]
    pub done: bool,
}

impl Todo {
    /// Build a fresh, not-done todo with a new id and the current time.
    ///
    /// The timestamp is truncated to milliseconds so a record compares equal
    /// to itself after a round trip through storage.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: TodoId::new(),
            date: Utc::now().trunc_subsecs(3),
            content: content.into(),
            done: false,
        }
    }

    /// Merge the set fields of `patch` into this record.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
    }

    /// The timestamp in the persisted wire format.
    pub fn date_string(&self) -> String {
        format_date(&self.date)
    }
}

/// Partial update for [`Todo`]. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub content: Option<String>,
    pub done: Option<bool>,
}

impl TodoPatch {
    pub fn done(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Newest first, with later insertions ahead of earlier ones on equal dates.
///
/// `todos` must be in insertion order.
pub fn sort_newest_first(todos: &mut [Todo]) {
    todos.reverse();
    todos.sort_by(|a, b| b.date.cmp(&a.date));
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_date(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc))
}

mod iso_millis {
    use super::*;

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_date(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

// Older clients wrote `done` as a string.
fn bool_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Str(String),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Bool(b) => b,
        Raw::Str(s) => s.eq_ignore_ascii_case("true"),
    })
}
