//! nmcli device entities

use super::options::OptionSet;
use super::{clean_output, get_values_flag, NmCli, ALL_FIELDS_FLAG, SHOW_SECRETS_FLAG, TERSE_FLAG, TRUE_VALUE};
use crate::error::HostctlResult;
use crate::exec::Invocation;

pub const OPTION_CAN_BE_ACCESS_POINT: &str = "WIFI-PROPERTIES.AP";
pub const OPTION_HARDWARE_ADDRESS: &str = "GENERAL.HWADDR";

/// A NetworkManager device, backed by the full `device show` table.
pub struct Device {
    options: OptionSet,
}

impl Device {
    /// Option value from the cached table; empty string when absent.
    pub fn get_option(&self, key: &str) -> String {
        self.options.get(key)
    }

    pub fn can_be_access_point(&self) -> bool {
        self.options.get(OPTION_CAN_BE_ACCESS_POINT) == TRUE_VALUE
    }
}

impl NmCli {
    /// Fetch one device with all fields and secrets.
    pub async fn device(&self, name: &str) -> HostctlResult<Device> {
        let output = self
            .invoker()
            .invoke(
                &Invocation::new("nmcli")
                    .arg(SHOW_SECRETS_FLAG)
                    .arg(TERSE_FLAG)
                    .arg(ALL_FIELDS_FLAG)
                    .args(["device", "show", name]),
            )
            .await?;
        Ok(Device {
            options: OptionSet::new(output),
        })
    }

    /// Hardware address of a device, with nmcli's colon escaping
    /// stripped.
    pub async fn hardware_address(&self, device: &str) -> HostctlResult<String> {
        let output = self
            .invoker()
            .invoke(
                &Invocation::new("nmcli")
                    .arg(TERSE_FLAG)
                    .arg(get_values_flag(&[OPTION_HARDWARE_ADDRESS]))
                    .args(["device", "show", device]),
            )
            .await?;
        Ok(clean_output(&output))
    }
}
