use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format embedded in artifact filenames and used for session ids.
pub const TAG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Correlation id scoping one pipeline run's artifacts for a day.
///
/// Opaque to the pipeline: stages never interpret it beyond exact matching.
/// By convention it is a `YYYY-MM-DD_HH-MM` timestamp, which keeps
/// session-tagged artifacts sortable by the same rule as free timestamps.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh session id stamped with the current local time.
    pub fn now() -> Self {
        Self(chrono::Local::now().format(TAG_TIMESTAMP_FORMAT).to_string())
    }

    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Teaching-day tag ("mon", "tue", ...). Identifies the folder that holds
/// that day's snapshots and artifacts. Stored lowercased; folder lookup is
/// case-insensitive.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayTag(String);

impl DayTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DayTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("day tag must not be empty".into());
        }
        if s.contains(['/', '\\']) || s.contains("..") {
            return Err(format!("day tag must be a plain folder name: {s}"));
        }
        Ok(Self(s.to_lowercase()))
    }
}

impl AsRef<str> for DayTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a `YYYY-MM-DD_HH-MM` tag back into a timestamp. `None` when the
/// tag is free-form (session ids are allowed to be arbitrary strings).
pub fn parse_tag_timestamp(tag: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(tag, TAG_TIMESTAMP_FORMAT).ok()
}
