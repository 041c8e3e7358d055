//! Exchange rate snapshot model.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// One fetched set of exchange rates from the upstream provider.
///
/// A snapshot is either empty (no data yet) or fully populated from a single
/// successful fetch. The `timestamp` is the provider's own report time, sent
/// on the wire as integer epoch seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateSnapshot {
    #[serde(default)]
    pub base: String,
    #[serde(default = "unix_epoch", with = "epoch_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

impl RateSnapshot {
    /// The "no data yet" snapshot.
    pub fn empty() -> Self {
        Self {
            base: String::new(),
            timestamp: DateTime::UNIX_EPOCH,
            rates: HashMap::new(),
        }
    }

    /// A snapshot goes stale one hour after its provider-reported timestamp.
    /// The empty snapshot is always stale.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) > TimeDelta::hours(1)
    }

    /// Rate to convert one unit of `from` into `to`, derived via the base
    /// currency. The returned rate is meaningless unless the flag is true.
    pub fn conversion_rate(&self, from: &str, to: &str) -> (f64, bool) {
        let mut rate = 1.0;
        let mut ok = true;

        if !self.base.eq_ignore_ascii_case(from) {
            match self.rates.get(&from.to_uppercase()) {
                Some(value) => rate = 1.0 / value,
                None => ok = false,
            }
        }

        match self.rates.get(&to.to_uppercase()) {
            Some(value) => rate *= value,
            None => ok = false,
        }

        (rate, ok)
    }
}

impl Default for RateSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Serde adapter for the provider's integer epoch-seconds timestamps, shared
/// between the upstream decode and the HTTP response encode.
pub mod epoch_seconds {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(timestamp.timestamp())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = i64::deserialize(deserializer)?;
        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {seconds}")))
    }
}
