//! The price store: last known state of every watched flight, keyed by tracking key
//! (`ORIGIN-DEST-DATE#FLIGHTNO`).

use std::{collections::BTreeMap, path::Path};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::Result,
    monitor::alerts::Direction,
    store::{load_json, save_json},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub last_price: Option<u64>,
    pub last_notified_price: Option<u64>,
    pub last_notified_dir: Option<Direction>,
    /// Departure of the last matched candidate; anchors fallback matching.
    pub last_depart: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PriceStore {
    records: BTreeMap<String, TrackingRecord>,
    /// Entries that are not valid tracking records. Written back untouched unless overwritten.
    other: BTreeMap<String, Value>,
    dirty: bool,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(entries: BTreeMap<String, Value>) -> Self {
        let mut store = Self::new();
        for (key, value) in entries {
            if !key.contains('#') {
                store.other.insert(key, value);
                continue;
            }
            match serde_json::from_value::<TrackingRecord>(value.clone()) {
                Ok(record) => {
                    store.records.insert(key, record);
                },
                Err(e) => {
                    warn!("Ignoring malformed price record {key}: {e}");
                    store.other.insert(key, value);
                },
            }
        }
        store
    }

    pub fn load(path: &Path) -> Result<Self> {
        let entries = load_json::<BTreeMap<String, Value>>(path, BTreeMap::new())?;
        Ok(Self::from_json(entries))
    }

    pub fn get(&self, key: &str) -> Option<&TrackingRecord> {
        self.records.get(key)
    }

    /// Stores `record`, marking the store dirty only if it actually differs.
    pub fn put(&mut self, key: &str, record: TrackingRecord) {
        if self.records.get(key) == Some(&record) {
            return;
        }
        self.other.remove(key);
        self.records.insert(key.to_string(), record);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> Result<BTreeMap<String, Value>> {
        let mut entries = self.other.clone();
        for (key, record) in &self.records {
            entries.insert(key.clone(), serde_json::to_value(record)?);
        }
        Ok(entries)
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        save_json(path, &self.to_json()?)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entries(v: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn loads_valid_records_and_sets_aside_the_rest() {
        let store = PriceStore::from_json(entries(json!({
            "DEL-BLR-2025-08-25#6E214": {
                "last_price": 4900, "last_notified_price": 4900, "last_notified_dir": "drop",
                "last_depart": "2025-08-25T06:30"
            },
            "DEL-BLR-2025-08-25#AI500": {"last_price": "cheap"},
            "DEL-BLR-2025-08-25#QP300": {"last_price": 4100, "last_notified_dir": "sideways"},
            "DEL-BLR-2025-08-25#SG100": {"last_price": -1},
            "DEL-BLR-2025-08-25": {"last_price": 3900}
        })));
        assert_eq!(store.len(), 1);
        let record = store.get("DEL-BLR-2025-08-25#6E214").unwrap();
        assert_eq!(record.last_price, Some(4900));
        assert_eq!(record.last_notified_dir, Some(Direction::Drop));
        assert!(store.get("DEL-BLR-2025-08-25#AI500").is_none());
        assert!(store.get("DEL-BLR-2025-08-25#QP300").is_none());
        assert!(store.get("DEL-BLR-2025-08-25#SG100").is_none());
        assert!(!store.is_dirty());
    }

    #[test]
    fn nulls_and_missing_fields_are_absent() {
        let store = PriceStore::from_json(entries(json!({
            "DEL-BLR-2025-08-25#6E214": {"last_price": null, "last_notified_price": null},
            "DEL-BLR-2025-08-25#AI500": {}
        })));
        assert_eq!(store.get("DEL-BLR-2025-08-25#6E214"), Some(&TrackingRecord::default()));
        assert_eq!(store.get("DEL-BLR-2025-08-25#AI500"), Some(&TrackingRecord::default()));
    }

    #[test]
    fn put_only_dirties_on_change() {
        let mut store = PriceStore::new();
        let record = TrackingRecord { last_price: Some(5000), ..Default::default() };
        store.put("DEL-BLR-2025-08-25#6E214", record.clone());
        assert!(store.is_dirty());

        let dir = tempfile::tempdir().unwrap();
        store.save(&dir.path().join("prices.json")).unwrap();
        assert!(!store.is_dirty());
        store.put("DEL-BLR-2025-08-25#6E214", record);
        assert!(!store.is_dirty());
    }

    #[test]
    fn save_round_trips_and_keeps_foreign_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        let mut store = PriceStore::from_json(entries(json!({
            "DEL-BLR-2025-08-25": {"last_price": 3900},
            "DEL-BLR-2025-08-25#AI500": {"last_price": "cheap"},
            "DEL-BLR-2025-08-25#QP300": {"last_price": "cheap"}
        })));
        store.put("DEL-BLR-2025-08-25#AI500", TrackingRecord {
            last_price: Some(4100),
            last_depart: Some("2025-08-25T09:00".into()),
            ..Default::default()
        });
        store.save(&path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "DEL-BLR-2025-08-25": {"last_price": 3900},
                "DEL-BLR-2025-08-25#AI500": {
                    "last_price": 4100, "last_notified_price": null, "last_notified_dir": null,
                    "last_depart": "2025-08-25T09:00"
                },
                "DEL-BLR-2025-08-25#QP300": {"last_price": "cheap"}
            })
        );

        let reloaded = PriceStore::load(&path).unwrap();
        assert_eq!(reloaded.get("DEL-BLR-2025-08-25#AI500").unwrap().last_price, Some(4100));
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = PriceStore::load(&dir.path().join("nope.json")).unwrap();
        assert!(store.is_empty());
    }
}
