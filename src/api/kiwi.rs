use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;

use crate::{
    api::source::{without_blacklisted, CandidateFlight, FlightSource},
    error::{FlightWatchError, Result},
};

const KIWI_HOST: &str = "kiwi-com-cheap-flights.p.rapidapi.com";
const ONE_WAY_ENDPOINT: &str = "one-way";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_RESULTS: usize = 20;
const PRICE_FIELDS: [&str; 5] = ["amount", "raw", "value", "min", "max"];

/// One-way searches against the Kiwi cheap-flights API on RapidAPI.
pub struct KiwiSource {
    client: reqwest::Client,
    api_key: String,
}

impl KiwiSource {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key: api_key.into() })
    }

    async fn query(&self, params: &[(&str, String)]) -> Result<Vec<CandidateFlight>> {
        let url = format!("https://{KIWI_HOST}/{ONE_WAY_ENDPOINT}");
        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", KIWI_HOST)
            .query(params)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlightWatchError::UpstreamStatus { status: status.as_u16(), body });
        }
        let json = response.json::<Value>().await?;
        Ok(parse_list_like(&json))
    }
}

#[async_trait]
impl FlightSource for KiwiSource {
    fn name(&self) -> &'static str {
        "kiwi"
    }

    /// Tries airport codes first, then the provider's city slugs. The first non-empty answer wins.
    async fn fetch(&self, origin: &str, destination: &str, date: &str) -> Result<Vec<CandidateFlight>> {
        if self.api_key.is_empty() {
            return Ok(Vec::new());
        }
        let (o, d) = (origin.to_lowercase(), destination.to_lowercase());
        let attempts = [
            (format!("Airport:{origin}"), format!("Airport:{destination}")),
            (format!("City:{o}_in"), format!("City:{d}_in")),
            (format!("City:{o}"), format!("City:{d}")),
        ];
        let mut last_error = None;
        for (source, target) in attempts {
            let mut params = base_params(date);
            params.push(("source", source.clone()));
            params.push(("destination", target.clone()));
            match self.query(&params).await {
                Ok(flights) if !flights.is_empty() => {
                    info!("kiwi: {} flights for {source} -> {target} on {date}", flights.len());
                    return Ok(flights);
                },
                Ok(_) => debug!("kiwi: nothing for {source} -> {target} on {date}"),
                Err(e) => {
                    warn!("kiwi: query {source} -> {target} failed: {e}");
                    last_error = Some(e);
                },
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}

fn base_params(date: &str) -> Vec<(&'static str, String)> {
    vec![
        ("currency", "INR".into()),
        ("locale", "en".into()),
        ("adults", "1".into()),
        ("limit", MAX_RESULTS.to_string()),
        ("cabinClass", "ECONOMY".into()),
        ("sortBy", "QUALITY".into()),
        ("sortOrder", "ASCENDING".into()),
        ("outboundDepartureDateFrom", date.into()),
        ("outboundDepartureDateTo", date.into()),
        ("transportTypes", "FLIGHT".into()),
    ]
}

/// Lenient parser for `{"data": [...]}` shaped search responses. Entries without a usable price are
/// dropped; the price may be a bare number or nested under one of a few well-known keys.
pub fn parse_list_like(json: &Value) -> Vec<CandidateFlight> {
    let Some(items) = json.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };
    let flights = items
        .iter()
        .take(MAX_RESULTS)
        .filter_map(|item| {
            let price = extract_price(item.get("price")?)?;
            let text = |key: &str| item.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
            Some(CandidateFlight {
                airline: text("airline"),
                flight_no: text("flightNo"),
                depart: text("depart"),
                arrive: text("arrive"),
                duration: text("duration"),
                price,
            })
        })
        .collect();
    without_blacklisted(flights)
}

fn extract_price(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => as_price(n),
        Value::Object(map) => PRICE_FIELDS.iter().find_map(|k| match map.get(*k) {
            Some(Value::Number(n)) => as_price(n),
            _ => None,
        }),
        _ => None,
    }
}

fn as_price(n: &serde_json::Number) -> Option<u64> {
    n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
}
