//! The polling monitor: one cycle walks every flight subscription in order, matches the watched
//! flight among fresh candidates, updates its price history and sends alerts.

use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::{
    api::{notify::Notifier, source::FlightSource},
    config::MonitorConfig,
    store::{
        prices::PriceStore,
        subscriptions::{load_flight_subscriptions, RouteKey, Subscription},
    },
};

pub mod alerts;
pub mod matcher;

use alerts::AlertEngine;

/// Tally of one cycle, mostly for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub matched: usize,
    pub not_found: usize,
    pub bad_keys: usize,
    pub alerts: usize,
    pub failed_notifications: usize,
    pub saved: bool,
}

pub struct Monitor {
    config: MonitorConfig,
    source: Box<dyn FlightSource>,
    notifier: Box<dyn Notifier>,
    engine: AlertEngine,
}

impl Monitor {
    pub fn new(config: MonitorConfig, source: Box<dyn FlightSource>, notifier: Box<dyn Notifier>) -> Self {
        let engine = AlertEngine::new(config.policy);
        Self { config, source, notifier, engine }
    }

    /// Runs cycles until `shutdown` flips. A signal never interrupts a cycle; it is only observed
    /// while sleeping, so the store write of the last cycle has always completed.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "🛫 Monitor (flights-only, source={}, mode={}, min change={}%) every {}s. Ctrl+C to stop.",
            self.source.name(),
            self.config.policy.mode,
            self.config.policy.min_change_pct,
            self.config.check_interval.as_secs()
        );
        loop {
            let report = self.check_once().await;
            debug!("Cycle finished: {report:?}");
            tokio::select! {
                _ = tokio::time::sleep(self.config.check_interval) => {},
                _ = shutdown.changed() => {
                    info!("Stopping.");
                    return;
                }
            }
        }
    }

    /// One full pass: load subscriptions and the price store, process, save if anything changed.
    pub async fn check_once(&self) -> CycleReport {
        let subs = match load_flight_subscriptions(&self.config.subs_file, &self.config.chat_id) {
            Ok(subs) => subs,
            Err(e) => {
                error!("Could not read subscriptions from {}: {e}", self.config.subs_file.display());
                return CycleReport::default();
            },
        };
        if subs.is_empty() {
            info!("No flight subscriptions yet.");
            return CycleReport::default();
        }
        let mut store = match PriceStore::load(&self.config.prices_file) {
            Ok(store) => store,
            Err(e) => {
                let path = self.config.prices_file.display();
                error!("Could not read the price store {path}, skipping this cycle: {e}");
                return CycleReport::default();
            },
        };
        let mut report = self.run_cycle(&subs, &mut store).await;
        if store.is_dirty() {
            match store.save(&self.config.prices_file) {
                Ok(()) => report.saved = true,
                Err(e) => error!("Could not write the price store {}: {e}", self.config.prices_file.display()),
            }
        }
        report
    }

    /// Processes `subs` in order against an already loaded store. Never persists.
    pub async fn run_cycle(&self, subs: &[Subscription], store: &mut PriceStore) -> CycleReport {
        let mut report = CycleReport::default();
        for sub in subs {
            report.checked += 1;
            self.check_flight(sub, store, &mut report).await;
        }
        report
    }

    async fn check_flight(&self, sub: &Subscription, store: &mut PriceStore, report: &mut CycleReport) {
        let route = match RouteKey::parse(&sub.key) {
            Ok(route) => route,
            Err(e) => {
                warn!("Bad key, skipping {}: {e}", sub.key);
                report.bad_keys += 1;
                return;
            },
        };
        let flights = match self.source.fetch(&route.origin, &route.destination, &route.date).await {
            Ok(flights) => flights,
            Err(e) => {
                warn!("Could not fetch flights for {route}: {e}");
                Vec::new()
            },
        };

        let key = sub.tracking_key();
        let previous = store.get(&key);
        let last = previous.and_then(|r| r.last_price);
        let Some(found) = matcher::resolve(&flights, sub, previous) else {
            info!("{key} | not found, keeping last={last:?}");
            report.not_found += 1;
            return;
        };
        report.matched += 1;
        info!(
            "{key} | price={} | last={last:?} | notif={:?} dir={:?} | via {:?} {}",
            found.flight.price,
            previous.and_then(|r| r.last_notified_price),
            previous.and_then(|r| r.last_notified_dir),
            found.kind,
            found.flight.flight_no
        );

        let outcome = self.engine.evaluate(previous, found.flight.price, &found.flight.depart);
        if let Some(alert) = &outcome.alert {
            report.alerts += 1;
            if let Err(e) = self.notifier.send(&alert.message(&route, sub)).await {
                error!("[notify] ❌ {key}: {e}");
                report.failed_notifications += 1;
            }
        }
        store.put(&key, outcome.record);
    }
}
