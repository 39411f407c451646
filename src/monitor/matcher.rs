//! Finds the watched flight in a fresh, possibly reshuffled candidate list.
//!
//! Providers renumber flights and nudge departure times, so a plain flight-number lookup is not
//! enough. Three tiers are tried in order; the first hit wins:
//!
//! 1. **Exact**: same flight number.
//! 2. **Fallback**: same airline, departure closest to the last matched departure, within 15 minutes.
//! 3. **Auto-snap**: first observation only, the cheapest flight of the same airline.

use log::info;

use crate::{
    api::source::{parse_timestamp, CandidateFlight},
    store::{prices::TrackingRecord, subscriptions::Subscription},
};

/// Largest departure drift, in seconds, the fallback tier accepts.
pub const MAX_DEPART_DRIFT_SECS: i64 = 15 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Fallback,
    Snap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub flight: &'a CandidateFlight,
    pub kind: MatchKind,
}

pub fn find_exact<'a>(flights: &'a [CandidateFlight], flight_no: &str) -> Option<&'a CandidateFlight> {
    flights.iter().find(|f| f.flight_no == flight_no)
}

pub fn find_fallback<'a>(
    flights: &'a [CandidateFlight],
    airline: Option<&str>,
    last_depart: Option<&str>,
) -> Option<&'a CandidateFlight> {
    let airline = airline?;
    let target = parse_timestamp(last_depart?)?;
    let mut best: Option<(&CandidateFlight, i64)> = None;
    for flight in flights.iter().filter(|f| f.is_operated_by(airline)) {
        let Some(depart) = flight.departure() else { continue };
        let delta = (depart - target).num_seconds().abs();
        if best.map_or(true, |(_, best_delta)| delta < best_delta) {
            best = Some((flight, delta));
        }
    }
    best.filter(|(_, delta)| *delta <= MAX_DEPART_DRIFT_SECS).map(|(flight, _)| flight)
}

/// Cheapest flight of `airline`; ties go to the earliest in the list.
pub fn find_snap<'a>(flights: &'a [CandidateFlight], airline: Option<&str>) -> Option<&'a CandidateFlight> {
    let airline = airline?;
    flights.iter().filter(|f| f.is_operated_by(airline)).fold(None, |best: Option<&CandidateFlight>, f| match best {
        Some(b) if b.price <= f.price => Some(b),
        _ => Some(f),
    })
}

pub fn resolve<'a>(
    flights: &'a [CandidateFlight],
    sub: &Subscription,
    record: Option<&TrackingRecord>,
) -> Option<Match<'a>> {
    if let Some(flight) = find_exact(flights, &sub.flight_no) {
        return Some(Match { flight, kind: MatchKind::Exact });
    }
    let last_depart = record.and_then(|r| r.last_depart.as_deref());
    if let Some(flight) = find_fallback(flights, sub.airline(), last_depart) {
        return Some(Match { flight, kind: MatchKind::Fallback });
    }
    let first_observation = record.map_or(true, |r| r.last_price.is_none());
    if !first_observation {
        return None;
    }
    let flight = find_snap(flights, sub.airline())?;
    info!("[snap] {} snapped to {} ({})", sub.tracking_key(), flight.flight_no, flight.depart);
    Some(Match { flight, kind: MatchKind::Snap })
}
