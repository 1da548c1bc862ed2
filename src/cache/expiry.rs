//! Expiration Module
//!
//! Freshness rules applied to on-disk entries.

use chrono::{DateTime, Utc};

use crate::error::{CacheError, Result};

/// Name of the only supported freshness rule.
pub const MAX_AGE: &str = "max-age";

// == Conditions ==
/// Freshness rules an entry must satisfy to count as a hit.
///
/// Per-call overrides are layered over the configured defaults with
/// [`Conditions::merged_over`]. Without a max-age an entry is fresh as long as
/// its file exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conditions {
    /// Maximum age in seconds; zero or negative means never fresh
    pub max_age: Option<i64>,
}

impl Conditions {
    /// No rules at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only a max-age rule, in seconds.
    pub fn max_age(seconds: i64) -> Self {
        Self {
            max_age: Some(seconds),
        }
    }

    // == From Map ==
    /// Builds conditions from a rule-name map such as `{"max-age": 60}`.
    ///
    /// # Errors
    /// Any key other than `max-age` is a `CacheError::UnsupportedCondition`.
    pub fn from_map<I, K>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let mut conditions = Self::none();
        for (name, value) in rules {
            match name.as_ref() {
                MAX_AGE => conditions.max_age = Some(value),
                other => return Err(CacheError::UnsupportedCondition(other.to_string())),
            }
        }
        Ok(conditions)
    }

    // == Merged Over ==
    /// Returns `self` with any unset rule taken from `defaults`.
    pub fn merged_over(&self, defaults: &Conditions) -> Conditions {
        Conditions {
            max_age: self.max_age.or(defaults.max_age),
        }
    }

    // == Is Satisfied ==
    /// Checks a file modified at `modified` against these rules at time `now`.
    pub fn is_satisfied(&self, modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.max_age {
            Some(max_age) => is_fresh(modified, now, max_age),
            None => true,
        }
    }
}

// == Is Fresh ==
/// Returns true if an entry modified at `modified` is younger than
/// `max_age` seconds at `now`.
///
/// Boundary condition: an age exactly equal to `max_age` is already stale,
/// so a max-age of zero or less is never fresh. A modification time in the
/// future counts as age zero.
pub fn is_fresh(modified: DateTime<Utc>, now: DateTime<Utc>, max_age: i64) -> bool {
    let age = (now - modified).num_seconds().max(0);
    age < max_age
}
