//! Wireless connections and hotspot management
//!
//! Option keys follow the NetworkManager settings documentation:
//!
//! - https://www.networkmanager.dev/docs/api/latest/settings-802-11-wireless.html
//!
//! - https://www.networkmanager.dev/docs/api/latest/settings-802-11-wireless-security.html

use super::connection::{Connection, ConnectionType};
use super::{get_values_flag, NmCli, TERSE_FLAG, TRUE_VALUE};
use crate::error::{HostctlError, HostctlResult};
use crate::exec::Invocation;
use crate::validation;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::error;

pub const OPTION_WIRELESS_SSID: &str = "802-11-wireless.ssid";
pub const OPTION_WIRELESS_HIDDEN: &str = "802-11-wireless.hidden";
pub const OPTION_WIRELESS_CHANNEL: &str = "802-11-wireless.channel";
pub const OPTION_WIRELESS_MODE: &str = "802-11-wireless.mode";
pub const OPTION_WIRELESS_BAND: &str = "802-11-wireless.band";
pub const OPTION_WIRELESS_PSK: &str = "802-11-wireless-security.psk";
pub const OPTION_WIRELESS_KEY_MGMT: &str = "802-11-wireless-security.key-mgmt";
pub const OPTION_WIRELESS_PROTO: &str = "802-11-wireless-security.proto";
pub const OPTION_WIRELESS_GROUP: &str = "802-11-wireless-security.group";
pub const OPTION_WIRELESS_PAIRWISE: &str = "802-11-wireless-security.pairwise";
pub const OPTION_WIRELESS_SEEN_BSSIDS: &str = "802-11-wireless.seen-bssids";

/// WPA2 + WPA3 personal
pub const KEY_MGMT_WPA_PERSONAL: &str = "wpa-psk";
/// WPA3 personal only
pub const KEY_MGMT_WPA3_PERSONAL: &str = "sae";
/// WPA2 + WPA3 enterprise
pub const KEY_MGMT_WPA_ENTERPRISE: &str = "wpa-eap";

pub const PROTO_RSN: &str = "rsn";
pub const PROTO_WPA: &str = "wpa";

pub const CIPHER_CCMP: &str = "ccmp";
pub const CIPHER_TKIP: &str = "tkip";

/// Fields accepted by `nmcli device wifi list`.
const FIELD_SIGNAL: &str = "SIGNAL";
const FIELD_RATE: &str = "RATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirelessMode {
    AccessPoint,
    Infrastructure,
    Mesh,
    Adhoc,
}

impl WirelessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WirelessMode::AccessPoint => "ap",
            WirelessMode::Infrastructure => "infrastructure",
            WirelessMode::Mesh => "mesh",
            WirelessMode::Adhoc => "adhoc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WirelessBand {
    Band2GHz,
    Band5GHz,
}

impl WirelessBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            WirelessBand::Band2GHz => "bg",
            WirelessBand::Band5GHz => "a",
        }
    }
}

/// A connection narrowed to the access-point wireless type.
///
/// Derefs to [`Connection`], sharing the same underlying option table.
pub struct WirelessConnection {
    inner: Connection,
}

impl fmt::Debug for WirelessConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WirelessConnection")
            .field("name", &self.inner.name)
            .field("uuid", &self.inner.uuid)
            .finish()
    }
}

impl Deref for WirelessConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.inner
    }
}

impl DerefMut for WirelessConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.inner
    }
}

impl Connection {
    /// Narrow to a wireless connection.
    ///
    /// Fails unless the connection type is the access-point wireless
    /// type, naming the connection and its actual type.
    pub fn into_wireless(self) -> HostctlResult<WirelessConnection> {
        if matches!(self.connection_type, ConnectionType::Wireless) {
            return Ok(WirelessConnection { inner: self });
        }
        Err(HostctlError::NotWireless {
            connection: self.name.clone(),
            actual: self.connection_type.to_string(),
        })
    }
}

impl NmCli {
    /// Create and activate a WPA-personal hotspot on `device`.
    ///
    /// The password is checked before anything is spawned. The base
    /// connection is created first; if the activation step fails the
    /// created connection is left behind, inactive.
    pub async fn create_hotspot(
        &self,
        device: &str,
        name: &str,
        password: &str,
    ) -> HostctlResult<WirelessConnection> {
        validation::validate_hotspot_password(password)?;

        let dev = self.device(device).await?;
        if !dev.can_be_access_point() {
            return Err(HostctlError::NotSupported(format!(
                "Device '{}' can't be an access point",
                device
            )));
        }

        let conn = self
            .add_connection(
                ConnectionType::Wifi,
                device,
                name,
                &[
                    "autoconnect",
                    TRUE_VALUE,
                    "ssid",
                    name,
                    OPTION_WIRELESS_PSK,
                    password,
                    OPTION_WIRELESS_KEY_MGMT,
                    KEY_MGMT_WPA_PERSONAL,
                    OPTION_WIRELESS_PROTO,
                    PROTO_RSN,
                    OPTION_WIRELESS_GROUP,
                    CIPHER_CCMP,
                    OPTION_WIRELESS_PAIRWISE,
                    CIPHER_CCMP,
                ],
            )
            .await?;

        let wireless = WirelessConnection { inner: conn };
        self.invoker()
            .invoke(
                &Invocation::new("nmcli")
                    .args(["device", "wifi", "hotspot", "ifname"])
                    .arg(device)
                    .arg("conn-name")
                    .arg(&wireless.name)
                    .arg("ssid")
                    .arg(wireless.ssid())
                    .arg("password")
                    .arg(wireless.password()),
            )
            .await?;

        Ok(wireless)
    }
}

impl WirelessConnection {
    pub fn ssid(&self) -> String {
        self.get_option(OPTION_WIRELESS_SSID)
    }

    pub async fn set_ssid(&self, ssid: &str) -> HostctlResult<()> {
        self.set_option(OPTION_WIRELESS_SSID, ssid).await
    }

    pub fn is_hidden(&self) -> bool {
        self.get_option(OPTION_WIRELESS_HIDDEN) == TRUE_VALUE
    }

    pub async fn set_hidden(&self, hidden: bool) -> HostctlResult<()> {
        let value = if hidden { TRUE_VALUE } else { super::FALSE_VALUE };
        self.set_option(OPTION_WIRELESS_HIDDEN, value).await
    }

    /// Configured channel; 0 when unset or unparsable.
    pub fn channel(&self) -> u32 {
        self.get_option(OPTION_WIRELESS_CHANNEL).parse().unwrap_or(0)
    }

    pub async fn set_channel(&self, channel: u32) -> HostctlResult<()> {
        self.set_option(OPTION_WIRELESS_CHANNEL, &channel.to_string())
            .await
    }

    pub async fn set_mode(&self, mode: WirelessMode) -> HostctlResult<()> {
        self.set_option(OPTION_WIRELESS_MODE, mode.as_str()).await
    }

    pub fn band(&self) -> String {
        self.get_option(OPTION_WIRELESS_BAND)
    }

    pub async fn set_band(&self, band: WirelessBand) -> HostctlResult<()> {
        self.set_option(OPTION_WIRELESS_BAND, band.as_str()).await
    }

    pub fn password(&self) -> String {
        self.get_option(OPTION_WIRELESS_PSK)
    }

    pub async fn set_password(&self, password: &str) -> HostctlResult<()> {
        self.set_option(OPTION_WIRELESS_PSK, password).await
    }

    /// First BSSID this connection has been seen on.
    pub fn bssid(&self) -> String {
        let seen = self.get_option(OPTION_WIRELESS_SEEN_BSSIDS);
        seen.split(',').next().unwrap_or("").to_string()
    }

    /// Live signal strength in percent from `nmcli device wifi list`;
    /// 0 when the lookup or parse fails.
    pub async fn signal_strength(&self) -> u32 {
        let bssid = self.bssid();
        let value = match self.device_data(FIELD_SIGNAL).await {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to get wifi signal strength for BSSID '{}': {}", bssid, e);
                return 0;
            }
        };
        match value.trim().parse() {
            Ok(strength) => strength,
            Err(_) => {
                error!("Failed to parse wifi signal strength from '{}'", value.trim());
                0
            }
        }
    }

    /// Live bitrate string from `nmcli device wifi list`; empty when
    /// the lookup fails.
    pub async fn network_rate(&self) -> String {
        let bssid = self.bssid();
        match self.device_data(FIELD_RATE).await {
            Ok(value) => value.trim().to_string(),
            Err(e) => {
                error!("Failed to get wifi rate for BSSID '{}': {}", bssid, e);
                String::new()
            }
        }
    }

    async fn device_data(&self, field: &str) -> HostctlResult<String> {
        let bssid = self.bssid();
        let output = self
            .invoker()
            .invoke(
                &Invocation::new("nmcli")
                    .arg(TERSE_FLAG)
                    .arg(get_values_flag(&[field]))
                    .args(["device", "wifi", "list", "bssid"])
                    .arg(&bssid),
            )
            .await
            .map_err(|e| {
                error!(
                    "Failed to get device data for connection '{}' (BSSID '{}'): {}",
                    self.name, bssid, e
                );
                e
            })?;
        Ok(String::from_utf8_lossy(&output).to_string())
    }
}
