//! JSON files shared with the route/subscription management surface.

use std::{fs, io, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

pub mod prices;
pub mod subscriptions;

/// Reads a JSON file, returning `default` when the file does not exist yet.
pub fn load_json<T: DeserializeOwned>(path: &Path, default: T) -> Result<T> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(default),
        Err(e) => Err(e.into()),
    }
}

/// Writes the whole document, pretty-printed with two-space indentation.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(data)?;
    fs::write(path, text)?;
    Ok(())
}
