//! Terse nmcli output parsing
//!
//! `nmcli --terse ... show` prints one `key:value` per line. Entities
//! keep the captured bytes and parse them into a map on first access.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::error;

/// Parse newline-delimited `key:value` text into a map.
///
/// Splits each line on the first colon and trims the value. A line
/// without a colon becomes a key with an empty value; nmcli emits such
/// lines for unset properties. Later duplicates overwrite earlier ones.
pub(crate) fn parse_options(text: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for line in text.lines() {
        match line.split_once(':') {
            Some((key, value)) => options.insert(key.to_string(), value.trim().to_string()),
            None => options.insert(line.to_string(), String::new()),
        };
    }
    options
}

/// Captured `show` output plus its lazily-parsed option map.
///
/// The map materializes once, on first read, and is never re-derived
/// from the raw bytes afterwards. Mutators write new values through
/// after the corresponding nmcli command succeeds; the map is not
/// re-fetched, so it can run ahead of the system until the entity is
/// fetched again.
pub struct OptionSet {
    raw: Option<Vec<u8>>,
    parsed: Mutex<Option<HashMap<String, String>>>,
}

impl OptionSet {
    pub(crate) fn new(raw: Vec<u8>) -> Self {
        Self {
            raw: Some(raw),
            parsed: Mutex::new(None),
        }
    }

    /// An option set with no captured output. Every lookup returns the
    /// empty string. Listing commands produce entities in this state.
    pub(crate) fn empty() -> Self {
        Self {
            raw: None,
            parsed: Mutex::new(None),
        }
    }

    /// Option value, or the empty string when the option is absent or
    /// there was no output to parse.
    pub fn get(&self, key: &str) -> String {
        let mut guard = self.parsed.lock().unwrap_or_else(PoisonError::into_inner);
        Self::ensure_parsed(&mut guard, self.raw.as_deref());
        guard
            .as_ref()
            .and_then(|options| options.get(key).cloned())
            .unwrap_or_default()
    }

    /// Write a value into the local map. Called by entity mutators
    /// after the external command succeeded.
    pub(crate) fn put(&self, key: &str, value: &str) {
        let mut guard = self.parsed.lock().unwrap_or_else(PoisonError::into_inner);
        Self::ensure_parsed(&mut guard, self.raw.as_deref());
        if let Some(options) = guard.as_mut() {
            options.insert(key.to_string(), value.to_string());
        }
    }

    fn ensure_parsed(guard: &mut Option<HashMap<String, String>>, raw: Option<&[u8]>) {
        if guard.is_some() {
            return;
        }
        match raw {
            Some(bytes) => {
                *guard = Some(parse_options(&String::from_utf8_lossy(bytes)));
            }
            None => {
                error!("No output to parse options from");
                *guard = Some(HashMap::new());
            }
        }
    }
}
