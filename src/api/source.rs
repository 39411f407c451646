//! The flight search capability the monitor consumes.
//!
//! A [`FlightSource`] returns the candidate flights for one route and day. Implementations are free
//! to return the list in any order and with unstable flight numbers; identifying the watched flight
//! among them is the matcher's job.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Carrier that has ceased operations. Never offered by any source.
pub const BLACKLISTED_AIRLINE: &str = "Vistara";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFlight {
    pub airline: String,
    #[serde(rename = "flightNo")]
    pub flight_no: String,
    /// Departure as a local ISO timestamp, e.g. `2025-08-25T06:30`.
    pub depart: String,
    pub arrive: String,
    /// Human readable, e.g. `1h 55m`.
    pub duration: String,
    pub price: u64,
}

impl CandidateFlight {
    pub fn departure(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.depart)
    }

    pub fn is_operated_by(&self, airline: &str) -> bool {
        self.airline.to_lowercase() == airline.to_lowercase()
    }
}

#[async_trait]
pub trait FlightSource: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, origin: &str, destination: &str, date: &str) -> Result<Vec<CandidateFlight>>;
}

/// Tries `primary` first and uses `secondary` whenever it fails or comes back empty.
pub struct WithFallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> WithFallback<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: FlightSource, S: FlightSource> FlightSource for WithFallback<P, S> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn fetch(&self, origin: &str, destination: &str, date: &str) -> Result<Vec<CandidateFlight>> {
        match self.primary.fetch(origin, destination, date).await {
            Ok(flights) if !flights.is_empty() => return Ok(flights),
            Ok(_) => {},
            Err(e) => warn!(
                "{} search for {origin}-{destination}-{date} failed, using {}: {e}",
                self.primary.name(),
                self.secondary.name()
            ),
        }
        self.secondary.fetch(origin, destination, date).await
    }
}

pub fn without_blacklisted(flights: Vec<CandidateFlight>) -> Vec<CandidateFlight> {
    flights.into_iter().filter(|f| !f.is_operated_by(BLACKLISTED_AIRLINE)).collect()
}

/// Parses the ISO timestamps used for departures: `T` or space separated, with or without seconds
/// or an offset, or a bare date (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const NAIVE: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    const OFFSET: [&str; 4] =
        ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M%:z"];
    let s = s.trim();
    NAIVE
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local()))
        .or_else(|| OFFSET.iter().find_map(|fmt| DateTime::parse_from_str(s, fmt).ok().map(|dt| dt.naive_local())))
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn flight(airline: &str, flight_no: &str, depart: &str, price: u64) -> CandidateFlight {
        CandidateFlight {
            airline: airline.to_string(),
            flight_no: flight_no.to_string(),
            depart: depart.to_string(),
            arrive: String::new(),
            duration: "2h 00m".to_string(),
            price,
        }
    }
}
