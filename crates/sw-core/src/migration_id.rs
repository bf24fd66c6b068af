//! Strongly-typed migration id wrapper.

use crate::error::{CoreError, CoreResult};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// A 14-digit `YYYYMMDDHHMMSS` migration id.
///
/// Ids are fixed width, so the derived lexicographic ordering matches numeric
/// order. "Nothing applied yet" is modelled as `Option::<MigrationId>::None`,
/// which sorts below every real id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MigrationId(String);

impl MigrationId {
    /// Number of digits in every migration id.
    pub const LEN: usize = 14;

    const FORMAT: &'static str = "%Y%m%d%H%M%S";

    /// Parse a migration id, rejecting anything that is not exactly 14 ASCII digits.
    pub fn parse(value: impl Into<String>) -> CoreResult<Self> {
        let s = value.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(CoreError::InvalidMigrationId { value: s })
        }
    }

    /// Try to create a migration id, returning `None` on malformed input.
    pub fn try_new(value: impl Into<String>) -> Option<Self> {
        Self::parse(value).ok()
    }

    /// Returns `true` if `s` is exactly 14 ASCII digits.
    pub fn is_valid(s: &str) -> bool {
        s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_digit())
    }

    /// Format a timestamp as a migration id.
    ///
    /// Years outside `0..=9999` do not fit the fixed width and are clamped.
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        let formatted = dt.format(Self::FORMAT).to_string();
        if Self::is_valid(&formatted) {
            Self(formatted)
        } else {
            Self("9".repeat(Self::LEN))
        }
    }

    /// Id for the current UTC wall-clock second.
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now().naive_utc())
    }

    /// Interpret the id as a timestamp, if it encodes a real calendar date.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, Self::FORMAT).ok()
    }

    /// Return the underlying id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl FromStr for MigrationId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for MigrationId {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MigrationId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl<'de> serde::Deserialize<'de> for MigrationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MigrationId::parse(s).map_err(serde::de::Error::custom)
    }
}

impl PartialEq<str> for MigrationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
#[path = "migration_id_test.rs"]
mod tests;
