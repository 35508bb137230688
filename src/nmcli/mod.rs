//! NetworkManager control via nmcli
//!
//! Connections, devices and hotspot management on top of terse nmcli
//! output.

mod connection;
mod device;
mod options;
mod wireless;

pub use connection::{
    Connection, ConnectionType, IP4_METHOD_SHARED, OPTION_AUTOCONNECT, OPTION_DNS_ADDRESSES,
    OPTION_GENERAL_STATE, OPTION_IP4_ADDRESSES, OPTION_IP4_GATEWAY, OPTION_IP4_METHOD,
};
pub use device::{Device, OPTION_CAN_BE_ACCESS_POINT, OPTION_HARDWARE_ADDRESS};
pub use options::OptionSet;
pub use wireless::{
    WirelessBand, WirelessConnection, WirelessMode, CIPHER_CCMP, CIPHER_TKIP,
    KEY_MGMT_WPA3_PERSONAL, KEY_MGMT_WPA_ENTERPRISE, KEY_MGMT_WPA_PERSONAL,
    OPTION_WIRELESS_BAND, OPTION_WIRELESS_CHANNEL, OPTION_WIRELESS_HIDDEN, OPTION_WIRELESS_MODE,
    OPTION_WIRELESS_PSK, OPTION_WIRELESS_SEEN_BSSIDS, OPTION_WIRELESS_SSID, PROTO_RSN, PROTO_WPA,
};

use crate::exec::{Invoker, ShellInvoker};
use std::sync::Arc;

pub(crate) const TERSE_FLAG: &str = "--terse";
pub(crate) const SHOW_SECRETS_FLAG: &str = "--show-secrets";
pub(crate) const ALL_FIELDS_FLAG: &str = "--fields=all";

/// Affirmative option value as nmcli prints and accepts it.
pub const TRUE_VALUE: &str = "yes";
pub const FALSE_VALUE: &str = "no";

pub(crate) fn get_values_flag(fields: &[&str]) -> String {
    format!("--get-values={}", fields.join(","))
}

/// nmcli output escapes colons inside values with a backslash.
pub(crate) fn clean_output(output: &[u8]) -> String {
    String::from_utf8_lossy(output).trim().replace('\\', "")
}

/// NetworkManager client
pub struct NmCli {
    invoker: Arc<dyn Invoker>,
}

impl NmCli {
    pub fn new(invoker: Arc<dyn Invoker>) -> Self {
        Self { invoker }
    }

    pub(crate) fn invoker(&self) -> Arc<dyn Invoker> {
        self.invoker.clone()
    }
}

impl Default for NmCli {
    fn default() -> Self {
        Self::new(Arc::new(ShellInvoker::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_values_flag() {
        assert_eq!(get_values_flag(&["SIGNAL"]), "--get-values=SIGNAL");
        assert_eq!(
            get_values_flag(&["SSID", "RATE"]),
            "--get-values=SSID,RATE"
        );
    }

    #[test]
    fn test_clean_output() {
        assert_eq!(clean_output(b"  AA\\:BB\\:CC\\:DD\\:EE\\:FF\n"), "AA:BB:CC:DD:EE:FF");
    }
}
