pub mod api;
pub mod config;
pub mod error;
pub mod monitor;
pub mod store;

pub use config::{AlertMode, AlertPolicy, MonitorConfig};
pub use error::{FlightWatchError, Result};
pub use monitor::{CycleReport, Monitor};
