use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use log::*;

use crate::monitor::alerts::Direction;

const DEFAULT_MIN_CHANGE_PCT: f64 = 1.0;
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_PRICES_FILE: &str = "prices.json";
const DEFAULT_SUBS_FILE: &str = "subscriptions.json";

/// Which price moves are worth a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertMode {
    #[default]
    Drop,
    Rise,
    Both,
}

impl AlertMode {
    pub fn allows(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (AlertMode::Both, _) | (AlertMode::Drop, Direction::Drop) | (AlertMode::Rise, Direction::Rise)
        )
    }
}

impl FromStr for AlertMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(AlertMode::Drop),
            "rise" => Ok(AlertMode::Rise),
            "both" => Ok(AlertMode::Both),
            other => Err(format!("unknown alert mode '{other}' (expected drop, rise or both)")),
        }
    }
}

impl fmt::Display for AlertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertMode::Drop => write!(f, "drop"),
            AlertMode::Rise => write!(f, "rise"),
            AlertMode::Both => write!(f, "both"),
        }
    }
}

/// The thresholds the alert engine works with. Passed explicitly so tests can vary them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPolicy {
    pub mode: AlertMode,
    /// Minimum move, in percent of the last seen price, before an alert is considered.
    pub min_change_pct: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self { mode: AlertMode::default(), min_change_pct: DEFAULT_MIN_CHANGE_PCT }
    }
}

impl AlertPolicy {
    pub fn new(mode: AlertMode, min_change_pct: f64) -> Self {
        Self { mode, min_change_pct }
    }
}

#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub policy: AlertPolicy,
    pub check_interval: Duration,
    /// Query the live provider instead of the stand-in generator.
    pub use_real: bool,
    pub api_key: String,
    pub bot_token: String,
    /// The single recipient whose subscriptions are monitored.
    pub chat_id: String,
    pub prices_file: PathBuf,
    pub subs_file: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            policy: AlertPolicy::default(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            use_real: false,
            api_key: String::default(),
            bot_token: String::default(),
            chat_id: String::default(),
            prices_file: PathBuf::from(DEFAULT_PRICES_FILE),
            subs_file: PathBuf::from(DEFAULT_SUBS_FILE),
        }
    }
}

impl MonitorConfig {
    pub fn from_env_or_default() -> Self {
        let mode = env::var("ALERT_MODE")
            .map(|s| {
                s.parse::<AlertMode>().unwrap_or_else(|e| {
                    warn!("🪛️ ALERT_MODE: {e}. Using the default, {}, instead.", AlertMode::default());
                    AlertMode::default()
                })
            })
            .unwrap_or_default();
        let min_change_pct = env::var("MIN_CHANGE_PCT")
            .map(|s| parse_min_change_pct(&s))
            .unwrap_or(DEFAULT_MIN_CHANGE_PCT);
        let check_interval = env::var("CHECK_INTERVAL")
            .map(|s| {
                s.trim().parse::<u64>().map(Duration::from_secs).unwrap_or_else(|e| {
                    warn!(
                        "🪛️ {s} is not a valid CHECK_INTERVAL. {e} Using the default, {}s, instead.",
                        DEFAULT_CHECK_INTERVAL.as_secs()
                    );
                    DEFAULT_CHECK_INTERVAL
                })
            })
            .unwrap_or(DEFAULT_CHECK_INTERVAL);
        let use_real = env::var("USE_REAL").map(|s| s.trim() == "1").unwrap_or(false);
        let api_key = trimmed_var("API_KEY");
        let bot_token = trimmed_var("BOT_TOKEN");
        let chat_id = trimmed_var("CHAT_ID");
        if use_real && api_key.is_empty() {
            warn!("🪛️ USE_REAL is on but API_KEY is not set. Live searches will fall back to stand-in data.");
        }
        let prices_file = env::var("PRICES_FILE").map(PathBuf::from).unwrap_or_else(|_| DEFAULT_PRICES_FILE.into());
        let subs_file = env::var("SUBS_FILE").map(PathBuf::from).unwrap_or_else(|_| DEFAULT_SUBS_FILE.into());
        Self {
            policy: AlertPolicy { mode, min_change_pct },
            check_interval,
            use_real,
            api_key,
            bot_token,
            chat_id,
            prices_file,
            subs_file,
        }
    }
}

fn trimmed_var(name: &str) -> String {
    env::var(name).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn parse_min_change_pct(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        Ok(v) => {
            warn!("🪛️ MIN_CHANGE_PCT must be a non-negative percentage, got {v}. Using {DEFAULT_MIN_CHANGE_PCT}.");
            DEFAULT_MIN_CHANGE_PCT
        },
        Err(e) => {
            warn!("🪛️ {s} is not a valid MIN_CHANGE_PCT. {e} Using {DEFAULT_MIN_CHANGE_PCT}.");
            DEFAULT_MIN_CHANGE_PCT
        },
    }
}
