use serde::{Deserialize, Serialize};

use crate::{
    config::AlertPolicy,
    store::{prices::TrackingRecord, subscriptions::{RouteKey, Subscription}},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Drop,
    Rise,
}

impl Direction {
    /// Direction of the move from `last` to `price`; `None` when the price is unchanged.
    pub fn between(last: u64, price: u64) -> Option<Self> {
        match price.cmp(&last) {
            std::cmp::Ordering::Less => Some(Direction::Drop),
            std::cmp::Ordering::Greater => Some(Direction::Rise),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Size of the move as a percentage of `last`. Zero when there is no positive reference price.
pub fn pct_move(last: u64, price: u64) -> f64 {
    if last == 0 {
        return 0.0;
    }
    100.0 * last.abs_diff(price) as f64 / last as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub direction: Direction,
    pub price: u64,
    pub previous: u64,
    pub pct_move: f64,
}

impl Alert {
    pub fn message(&self, route: &RouteKey, sub: &Subscription) -> String {
        let (title, sign) = match self.direction {
            Direction::Drop => ("Price drop", '−'),
            Direction::Rise => ("Price rise", '+'),
        };
        format!(
            "✈️ {title}\n{} → {} {}\nFlight {} ({})\nNow ₹{} (was ₹{}, {sign}{:.1}%)",
            route.origin,
            route.destination,
            route.date,
            sub.flight_no,
            sub.airline,
            self.price,
            self.previous,
            self.pct_move
        )
    }
}

/// What to persist after a matched observation, and the alert to send, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub record: TrackingRecord,
    pub alert: Option<Alert>,
}

pub struct AlertEngine {
    policy: AlertPolicy,
}

impl AlertEngine {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    /// Applies one matched observation (`price`, departing at `depart`) to the flight's history.
    pub fn evaluate(&self, previous: Option<&TrackingRecord>, price: u64, depart: &str) -> Outcome {
        let depart = Some(depart.to_string()).filter(|d| !d.is_empty());
        let Some((last, prev)) = previous.and_then(|p| p.last_price.map(|last| (last, p))) else {
            // First observation: baseline only.
            return Outcome {
                record: TrackingRecord {
                    last_price: Some(price),
                    last_notified_price: None,
                    last_notified_dir: None,
                    last_depart: depart,
                },
                alert: None,
            };
        };

        let mut record = TrackingRecord { last_price: Some(price), last_depart: depart, ..prev.clone() };
        let alert = Direction::between(last, price)
            .filter(|dir| self.policy.mode.allows(*dir))
            .map(|direction| Alert { direction, price, previous: last, pct_move: pct_move(last, price) })
            .filter(|alert| alert.pct_move >= self.policy.min_change_pct)
            // Same price in the same direction was already announced.
            .filter(|alert| {
                prev.last_notified_price != Some(price) || prev.last_notified_dir != Some(alert.direction)
            });

        if let Some(alert) = &alert {
            record.last_notified_price = Some(price);
            record.last_notified_dir = Some(alert.direction);
        }
        Outcome { record, alert }
    }
}
