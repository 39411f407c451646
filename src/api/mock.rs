//! Deterministic stand-in for the live provider.
//!
//! Every (origin, destination, date) triple always yields the same seven flights with the same
//! numbers and times. Only the price moves, slowly, with wall-clock minutes.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    api::source::{without_blacklisted, CandidateFlight, FlightSource},
    error::{FlightWatchError, Result},
};

const AIRLINES: [(&str, &str); 5] =
    [("IndiGo", "6E"), ("Air India", "AI"), ("Akasa", "QP"), ("SpiceJet", "SG"), ("Air India Express", "IX")];
const FLIGHTS_PER_DAY: usize = 7;
const MIN_PRICE: f64 = 1200.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct StableMockSource;

impl StableMockSource {
    pub fn new() -> Self {
        Self
    }

    /// The flight list as it looks during the given wall-clock minute.
    pub fn flights_at(&self, origin: &str, destination: &str, date: &str, minute: i64) -> Result<Vec<CandidateFlight>> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| FlightWatchError::InvalidRouteKey(format!("{origin}-{destination}-{date}: {e}")))?;
        let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
        let mut rng = StdRng::seed_from_u64(route_seed(origin, destination, date));

        let mut slots = (6..23).flat_map(|h| [(h, 0), (h, 30)]).collect::<Vec<(i64, i64)>>();
        slots.shuffle(&mut rng);
        let mut slots = slots[..FLIGHTS_PER_DAY].to_vec();
        slots.sort();

        let base_price = 3200.0 + rng.gen_range(0..3000) as f64;
        let minute = minute as f64;
        let wiggle = (minute / 11.0).sin() * 0.04 + (minute / 7.0).cos() * 0.02;
        let price = (base_price * (1.0 + wiggle)).max(MIN_PRICE) as u64;

        let flights = slots
            .iter()
            .enumerate()
            .map(|(idx, &(h, m))| {
                let (airline, code) = AIRLINES[idx % AIRLINES.len()];
                let number = 200 + idx as i64 * 7 + (h * 2 + m / 30);
                let depart = midnight + Duration::hours(h) + Duration::minutes(m);
                let minutes = 110 + (idx as i64 * 9 % 50);
                let arrive = depart + Duration::minutes(minutes);
                CandidateFlight {
                    airline: airline.to_string(),
                    flight_no: format!("{code}{number}"),
                    depart: depart.format("%Y-%m-%dT%H:%M").to_string(),
                    arrive: arrive.format("%Y-%m-%dT%H:%M").to_string(),
                    duration: format!("{}h {:02}m", minutes / 60, minutes % 60),
                    price,
                }
            })
            .collect();
        Ok(without_blacklisted(flights))
    }
}

#[async_trait]
impl FlightSource for StableMockSource {
    fn name(&self) -> &'static str {
        "stand-in"
    }

    async fn fetch(&self, origin: &str, destination: &str, date: &str) -> Result<Vec<CandidateFlight>> {
        self.flights_at(origin, destination, date, Utc::now().timestamp() / 60)
    }
}

// FNV-1a; std's hasher is not guaranteed stable between releases.
fn route_seed(origin: &str, destination: &str, date: &str) -> u64 {
    format!("{origin}-{destination}-{date}")
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, b| (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3))
}
