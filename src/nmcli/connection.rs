//! nmcli connection entities
//!
//! Fetched connections keep the terse `show` output as a lazily-parsed
//! option table; mutators run `nmcli connection modify` and write the
//! new value through to the local table on success.

use super::options::OptionSet;
use super::{ALL_FIELDS_FLAG, SHOW_SECRETS_FLAG, TERSE_FLAG, TRUE_VALUE};
use crate::error::HostctlResult;
use crate::exec::{Invocation, Invoker};
use crate::nmcli::NmCli;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

pub const OPTION_AUTOCONNECT: &str = "connection.autoconnect";
pub const OPTION_IP4_METHOD: &str = "ipv4.method";
pub const OPTION_IP4_ADDRESSES: &str = "ipv4.addresses";
pub const OPTION_GENERAL_STATE: &str = "GENERAL.STATE";
pub const OPTION_DNS_ADDRESSES: &str = "ipv4.dns";
pub const OPTION_IP4_GATEWAY: &str = "ipv4.gateway";

const OPTION_ID: &str = "connection.id";
const OPTION_UUID: &str = "connection.uuid";
const OPTION_TYPE: &str = "connection.type";
const OPTION_INTERFACE_NAME: &str = "connection.interface-name";

/// IPv4 method that shares the connection's uplink (hotspot mode).
pub const IP4_METHOD_SHARED: &str = "shared";

const STATE_ACTIVATED: &str = "activated";

/// Connection type as reported by nmcli.
///
/// `Wireless` is the access-point connection type; `Wifi` is a plain
/// client-side wifi connection. Unknown types are kept verbatim so
/// listings never drop records over an unrecognized type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionType {
    Wifi,
    Wireless,
    Ethernet,
    Other(String),
}

impl ConnectionType {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionType::Wifi => "wifi",
            ConnectionType::Wireless => "802-11-wireless",
            ConnectionType::Ethernet => "ethernet",
            ConnectionType::Other(s) => s,
        }
    }
}

impl From<&str> for ConnectionType {
    fn from(s: &str) -> Self {
        match s {
            "wifi" => ConnectionType::Wifi,
            "802-11-wireless" => ConnectionType::Wireless,
            "ethernet" => ConnectionType::Ethernet,
            other => ConnectionType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A NetworkManager connection profile.
pub struct Connection {
    invoker: Arc<dyn Invoker>,
    options: OptionSet,

    pub name: String,
    pub uuid: String,
    pub connection_type: ConnectionType,
    pub device: String,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("name", &self.name)
            .field("uuid", &self.uuid)
            .field("connection_type", &self.connection_type)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

pub(crate) fn show_invocation(name: &str) -> Invocation {
    Invocation::new("nmcli")
        .arg(ALL_FIELDS_FLAG)
        .arg(TERSE_FLAG)
        .arg(SHOW_SECRETS_FLAG)
        .args(["connection", "show", name])
}

impl NmCli {
    /// List connection profiles (`nmcli --terse connection`).
    ///
    /// Records with fewer than four fields are dropped with a warning;
    /// a bad line never fails the listing.
    pub async fn connections(&self) -> HostctlResult<Vec<Connection>> {
        let output = self
            .invoker()
            .invoke(&Invocation::new("nmcli").arg(TERSE_FLAG).arg("connection"))
            .await?;
        Ok(parse_connection_list(
            self.invoker(),
            &String::from_utf8_lossy(&output),
        ))
    }

    /// Fetch one connection with all fields and secrets.
    pub async fn connection(&self, name: &str) -> HostctlResult<Connection> {
        let output = self.invoker().invoke(&show_invocation(name)).await?;
        Ok(Connection::from_show_output(self.invoker(), output))
    }

    pub(crate) async fn add_connection(
        &self,
        connection_type: ConnectionType,
        device: &str,
        name: &str,
        extra: &[&str],
    ) -> HostctlResult<Connection> {
        let call = Invocation::new("nmcli")
            .args(["connection", "add", "type"])
            .arg(connection_type.as_str())
            .arg("ifname")
            .arg(device)
            .arg("con-name")
            .arg(name)
            .args(extra.iter().copied());
        self.invoker().invoke(&call).await?;
        self.connection(name).await
    }
}

fn parse_connection_list(invoker: Arc<dyn Invoker>, text: &str) -> Vec<Connection> {
    let mut connections = Vec::new();
    for line in text.lines() {
        match parse_connection_line(line) {
            Some((name, uuid, connection_type, device)) => {
                connections.push(Connection {
                    invoker: invoker.clone(),
                    options: OptionSet::empty(),
                    name,
                    uuid,
                    connection_type,
                    device,
                });
            }
            None => warn!("Bad connection record: '{}'", line),
        }
    }
    connections
}

fn parse_connection_line(line: &str) -> Option<(String, String, ConnectionType, String)> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 4 {
        return None;
    }
    Some((
        fields[0].to_string(),
        fields[1].to_string(),
        ConnectionType::from(fields[2]),
        fields[3].to_string(),
    ))
}

impl Connection {
    pub(crate) fn from_show_output(invoker: Arc<dyn Invoker>, raw: Vec<u8>) -> Self {
        let options = OptionSet::new(raw);
        let name = options.get(OPTION_ID);
        let uuid = options.get(OPTION_UUID);
        let connection_type = ConnectionType::from(options.get(OPTION_TYPE).as_str());
        let device = options.get(OPTION_INTERFACE_NAME);
        Self {
            invoker,
            options,
            name,
            uuid,
            connection_type,
            device,
        }
    }

    pub(crate) fn invoker(&self) -> Arc<dyn Invoker> {
        self.invoker.clone()
    }

    /// Option value from the cached table; empty string when absent.
    pub fn get_option(&self, key: &str) -> String {
        self.options.get(key)
    }

    /// Run `nmcli connection modify` and, on success, write the value
    /// into the local table. The table is not re-fetched; use
    /// [`Connection::refresh`] to verify against the system.
    pub async fn set_option(&self, key: &str, value: &str) -> HostctlResult<()> {
        debug!(
            "Setting option {} to '{}' (current '{}')",
            key,
            value,
            self.options.get(key)
        );
        self.invoker
            .invoke(
                &Invocation::new("nmcli")
                    .args(["connection", "modify"])
                    .arg(&self.name)
                    .arg(key)
                    .arg(value),
            )
            .await?;
        self.options.put(key, value);
        Ok(())
    }

    /// Re-fetch the connection and replace the cached option table.
    pub async fn refresh(&mut self) -> HostctlResult<()> {
        let output = self.invoker.invoke(&show_invocation(&self.name)).await?;
        *self = Connection::from_show_output(self.invoker.clone(), output);
        Ok(())
    }

    pub async fn up(&self) -> HostctlResult<()> {
        self.invoker
            .invoke(&Invocation::new("nmcli").args(["connection", "up"]).arg(&self.name))
            .await?;
        Ok(())
    }

    pub async fn down(&self) -> HostctlResult<()> {
        self.invoker
            .invoke(&Invocation::new("nmcli").args(["connection", "down"]).arg(&self.name))
            .await?;
        Ok(())
    }

    /// General state equals "activated".
    pub fn is_active(&self) -> bool {
        self.options.get(OPTION_GENERAL_STATE) == STATE_ACTIVATED
    }

    pub fn autoconnect(&self) -> bool {
        self.options.get(OPTION_AUTOCONNECT) == TRUE_VALUE
    }

    pub fn gateway(&self) -> Option<IpAddr> {
        self.options.get(OPTION_IP4_GATEWAY).parse().ok()
    }

    pub async fn set_gateway(&self, gateway: IpAddr) -> HostctlResult<()> {
        self.set_option(OPTION_IP4_GATEWAY, &gateway.to_string()).await
    }

    pub async fn set_ip4_method(&self, method: &str) -> HostctlResult<()> {
        self.set_option(OPTION_IP4_METHOD, method).await
    }

    pub async fn set_ip4_address(&self, address: &str) -> HostctlResult<()> {
        self.set_option(OPTION_IP4_ADDRESSES, address).await
    }

    pub async fn set_dns_servers(&self, servers: &[IpAddr]) -> HostctlResult<()> {
        let joined = servers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.set_option(OPTION_DNS_ADDRESSES, &joined).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostctlError;
    use crate::exec::testing::ScriptedInvoker;

    fn client() -> (Arc<ScriptedInvoker>, NmCli) {
        let invoker = Arc::new(ScriptedInvoker::new());
        let client = NmCli::new(invoker.clone());
        (invoker, client)
    }

    #[test]
    fn test_connection_type_round_trip() {
        assert_eq!(ConnectionType::from("wifi"), ConnectionType::Wifi);
        assert_eq!(ConnectionType::from("802-11-wireless"), ConnectionType::Wireless);
        assert_eq!(ConnectionType::from("ethernet"), ConnectionType::Ethernet);
        assert_eq!(
            ConnectionType::from("bridge"),
            ConnectionType::Other("bridge".to_string())
        );
        assert_eq!(ConnectionType::Wireless.to_string(), "802-11-wireless");
    }

    #[tokio::test]
    async fn test_connections_parses_records_and_drops_short_lines() {
        let (invoker, client) = client();
        invoker.push_ok("name1:uuid1:wifi:dev1\n\n");

        let connections = client.connections().await.unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].name, "name1");
        assert_eq!(connections[0].uuid, "uuid1");
        assert_eq!(connections[0].connection_type, ConnectionType::Wifi);
        assert_eq!(connections[0].device, "dev1");
        assert_eq!(invoker.calls(), vec!["nmcli --terse connection"]);
    }

    #[tokio::test]
    async fn test_listed_connection_has_no_options() {
        let (invoker, client) = client();
        invoker.push_ok("lan:u:ethernet:eth0\n");

        let connections = client.connections().await.unwrap();
        assert_eq!(connections[0].get_option(OPTION_GENERAL_STATE), "");
        assert!(!connections[0].is_active());
    }

    #[tokio::test]
    async fn test_connection_promotes_fields() {
        let (invoker, client) = client();
        invoker.push_ok(
            "connection.id:office\nconnection.uuid:abc-123\nconnection.type:ethernet\nconnection.interface-name:eth0\nGENERAL.STATE:activated\n",
        );

        let conn = client.connection("office").await.unwrap();
        assert_eq!(conn.name, "office");
        assert_eq!(conn.uuid, "abc-123");
        assert_eq!(conn.connection_type, ConnectionType::Ethernet);
        assert_eq!(conn.device, "eth0");
        assert!(conn.is_active());
        assert_eq!(
            invoker.calls(),
            vec!["nmcli --fields=all --terse --show-secrets connection show office"]
        );
    }

    #[tokio::test]
    async fn test_set_option_writes_through_on_success() {
        let (invoker, client) = client();
        invoker.push_ok("connection.id:lan\nconnection.autoconnect:no\n");
        let conn = client.connection("lan").await.unwrap();

        invoker.push_ok("");
        conn.set_option(OPTION_AUTOCONNECT, "yes").await.unwrap();

        assert!(conn.autoconnect());
        assert_eq!(
            invoker.calls()[1],
            "nmcli connection modify lan connection.autoconnect yes"
        );
    }

    #[tokio::test]
    async fn test_set_option_keeps_cache_on_failure() {
        let (invoker, client) = client();
        invoker.push_ok("connection.id:lan\nconnection.autoconnect:no\n");
        let conn = client.connection("lan").await.unwrap();

        invoker.push_failure(1, "property invalid");
        let err = conn.set_option(OPTION_AUTOCONNECT, "yes").await.unwrap_err();
        assert!(matches!(err, HostctlError::CommandFailed { .. }));
        assert!(!conn.autoconnect());
    }

    #[tokio::test]
    async fn test_refresh_replaces_options() {
        let (invoker, client) = client();
        invoker.push_ok("connection.id:lan\nGENERAL.STATE:activated\n");
        let mut conn = client.connection("lan").await.unwrap();
        assert!(conn.is_active());

        invoker.push_ok("connection.id:lan\n");
        conn.refresh().await.unwrap();
        assert!(!conn.is_active());
    }

    #[tokio::test]
    async fn test_gateway_parses_address() {
        let (invoker, client) = client();
        invoker.push_ok("connection.id:lan\nipv4.gateway:192.168.1.1\n");
        let conn = client.connection("lan").await.unwrap();
        assert_eq!(conn.gateway(), Some("192.168.1.1".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_gateway_missing_is_none() {
        let (invoker, client) = client();
        invoker.push_ok("connection.id:lan\n");
        let conn = client.connection("lan").await.unwrap();
        assert_eq!(conn.gateway(), None);
    }

    #[tokio::test]
    async fn test_set_dns_servers_joins_addresses() {
        let (invoker, client) = client();
        invoker.push_ok("connection.id:lan\n");
        let conn = client.connection("lan").await.unwrap();

        invoker.push_ok("");
        let servers: Vec<IpAddr> = vec!["1.1.1.1".parse().unwrap(), "8.8.8.8".parse().unwrap()];
        conn.set_dns_servers(&servers).await.unwrap();
        assert_eq!(
            invoker.calls()[1],
            "nmcli connection modify lan ipv4.dns 1.1.1.1,8.8.8.8"
        );
    }

    #[tokio::test]
    async fn test_up_and_down_quote_names() {
        let (invoker, client) = client();
        invoker.push_ok("connection.id:Wired connection 1\n");
        let conn = client.connection("Wired connection 1").await.unwrap();

        invoker.push_ok("");
        conn.up().await.unwrap();
        invoker.push_ok("");
        conn.down().await.unwrap();

        assert_eq!(
            invoker.calls()[1],
            "nmcli connection up 'Wired connection 1'"
        );
        assert_eq!(
            invoker.calls()[2],
            "nmcli connection down 'Wired connection 1'"
        );
    }
}
