//! Connected wireless stations via iw
//!
//! Parses the block-structured output of `iw dev <iface> station dump`.

use crate::config::HostctlConfig;
use crate::error::HostctlResult;
use crate::exec::{Invocation, Invoker, ShellInvoker};
use crate::validation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Each station block starts with this token.
const STATION_DELIMITER: &str = "Station";

/// A station associated with the local access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub mac: String,
    pub interface: String,
    pub tx_bitrate: String,
    pub rx_bitrate: String,
}

/// Wireless diagnostics client
pub struct Iw {
    invoker: Arc<dyn Invoker>,
    default_interface: String,
}

impl Iw {
    pub fn new(invoker: Arc<dyn Invoker>, default_interface: impl Into<String>) -> Self {
        Self {
            invoker,
            default_interface: default_interface.into(),
        }
    }

    pub fn from_config(invoker: Arc<dyn Invoker>, config: &HostctlConfig) -> Self {
        Self::new(invoker, config.wireless.default_interface.clone())
    }

    /// Stations connected to the default interface.
    pub async fn stations(&self) -> HostctlResult<Vec<Station>> {
        let interface = self.default_interface.clone();
        self.stations_on(&interface).await
    }

    /// Stations connected to an explicit interface.
    pub async fn stations_on(&self, interface: &str) -> HostctlResult<Vec<Station>> {
        validation::validate_interface_name(interface)?;
        let output = self
            .invoker
            .invoke(
                &Invocation::new("iw")
                    .args(["dev", interface, "station", "dump"]),
            )
            .await?;
        Ok(parse_stations(&String::from_utf8_lossy(&output)))
    }
}

impl Default for Iw {
    fn default() -> Self {
        Self::from_config(Arc::new(ShellInvoker::new()), &HostctlConfig::default())
    }
}

fn parse_stations(output: &str) -> Vec<Station> {
    let mut stations = Vec::new();
    for block in output.split(STATION_DELIMITER) {
        match parse_station_block(block) {
            Some(station) => stations.push(station),
            None => {
                if !block.trim().is_empty() {
                    warn!("Failed parsing station block: '{}'", block.trim());
                }
            }
        }
    }
    stations
}

/// A block's first line looks like ` aa:bb:cc:dd:ee:ff (on wlan0)`;
/// the remaining lines are indented `key: value` attributes.
fn parse_station_block(block: &str) -> Option<Station> {
    let mut lines = block.lines();
    let first = lines.next()?;

    let words: Vec<&str> = first.trim().split(' ').collect();
    if words.len() < 3 {
        return None;
    }
    let mac = words[0].to_string();
    let interface = words[2].replacen(')', "", 1);

    let attributes = parse_attribute_lines(lines);
    Some(Station {
        mac,
        interface,
        tx_bitrate: attributes.get("tx bitrate").cloned().unwrap_or_default(),
        rx_bitrate: attributes.get("rx bitrate").cloned().unwrap_or_default(),
    })
}

fn parse_attribute_lines<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            attributes.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    attributes
}
