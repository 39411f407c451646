use std::{collections::HashMap, fmt, path::Path, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{FlightWatchError, Result},
    store::load_json,
};

static AIRPORT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid regex"));
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// `ORIGIN-DEST-DATE`, e.g. `DEL-BLR-2025-08-25`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub origin: String,
    pub destination: String,
    pub date: String,
}

impl RouteKey {
    pub fn parse(key: &str) -> Result<Self> {
        let mut parts = key.splitn(3, '-');
        let (Some(origin), Some(destination), Some(date)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(FlightWatchError::InvalidRouteKey(key.to_string()));
        };
        if !AIRPORT_RE.is_match(origin) || !AIRPORT_RE.is_match(destination) || !DATE_RE.is_match(date) {
            return Err(FlightWatchError::InvalidRouteKey(key.to_string()));
        }
        Ok(Self { origin: origin.to_string(), destination: destination.to_string(), date: date.to_string() })
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.origin, self.destination, self.date)
    }
}

/// One watched flight. `key` is kept verbatim; it is only validated when a cycle processes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub key: String,
    pub flight_no: String,
    pub airline: String,
}

#[derive(Deserialize)]
struct SubscriptionEntry {
    key: Option<String>,
    #[serde(rename = "flightNo")]
    flight_no: Option<String>,
    airline: Option<String>,
}

impl Subscription {
    pub fn new(key: impl Into<String>, flight_no: impl Into<String>, airline: impl Into<String>) -> Self {
        Self { key: key.into(), flight_no: flight_no.into(), airline: airline.into() }
    }

    /// `None` when no airline was recorded with the subscription.
    pub fn airline(&self) -> Option<&str> {
        Some(self.airline.as_str()).filter(|a| !a.is_empty())
    }

    pub fn tracking_key(&self) -> String {
        tracking_key(&self.key, &self.flight_no)
    }
}

pub fn tracking_key(route_key: &str, flight_no: &str) -> String {
    format!("{route_key}#{flight_no}")
}

/// Flight-level subscriptions of one recipient, in file order. Route-only entries (bare strings) and
/// entries without a key or flight number are skipped.
pub fn flight_subscriptions(all: &HashMap<String, Value>, recipient: &str) -> Vec<Subscription> {
    all.get(recipient)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value::<SubscriptionEntry>(item.clone()).ok())
                .filter_map(|entry| match (entry.key, entry.flight_no) {
                    (Some(key), Some(flight_no)) if !key.is_empty() && !flight_no.is_empty() => {
                        Some(Subscription { key, flight_no, airline: entry.airline.unwrap_or_default() })
                    },
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn load_flight_subscriptions(path: &Path, recipient: &str) -> Result<Vec<Subscription>> {
    let all = load_json::<HashMap<String, Value>>(path, HashMap::new())?;
    Ok(flight_subscriptions(&all, recipient))
}
