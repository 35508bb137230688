//! End-to-end flows over a scripted invoker
//!
//! Drives the public clients through full command sequences without
//! touching the real system tools.

use async_trait::async_trait;
use libhostctl::error::{HostctlError, HostctlResult};
use libhostctl::exec::{Invocation, Invoker};
use libhostctl::nmcli::{ConnectionType, NmCli};
use libhostctl::systemctl::{Service, SystemCtl};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct ScriptedInvoker {
    responses: Mutex<VecDeque<HostctlResult<Vec<u8>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn push_ok(&self, stdout: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(stdout.as_bytes().to_vec()));
    }

    fn push_failure(&self, code: i32, stderr: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(HostctlError::CommandFailed {
                cmd: "scripted".to_string(),
                code: Some(code),
                stderr: stderr.to_string(),
            }));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Invoker for ScriptedInvoker {
    async fn invoke(&self, call: &Invocation) -> HostctlResult<Vec<u8>> {
        self.calls.lock().unwrap().push(call.render());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted invoker ran out of responses")
    }
}

#[tokio::test]
async fn hotspot_creation_runs_the_full_command_sequence() {
    let invoker = Arc::new(ScriptedInvoker::new());
    let nm = NmCli::new(invoker.clone());

    // device show: the device supports AP mode
    invoker.push_ok("GENERAL.DEVICE:wlan0\nWIFI-PROPERTIES.AP:yes\n");
    // connection add
    invoker.push_ok("");
    // connection show after add
    invoker.push_ok(
        "connection.id:guest-ap\n\
         connection.uuid:0e7b0b0a\n\
         connection.type:wifi\n\
         connection.interface-name:wlan0\n\
         802-11-wireless.ssid:guest-ap\n\
         802-11-wireless-security.psk:hunter2hunter2\n",
    );
    // device wifi hotspot
    invoker.push_ok("");

    let hotspot = nm
        .create_hotspot("wlan0", "guest-ap", "hunter2hunter2")
        .await
        .unwrap();

    assert_eq!(hotspot.name, "guest-ap");
    assert_eq!(hotspot.ssid(), "guest-ap");
    assert_eq!(hotspot.device, "wlan0");

    let calls = invoker.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(
        calls[0],
        "nmcli --show-secrets --terse --fields=all device show wlan0"
    );
    assert!(calls[1].starts_with("nmcli connection add type wifi ifname wlan0 con-name guest-ap"));
    assert_eq!(
        calls[2],
        "nmcli --fields=all --terse --show-secrets connection show guest-ap"
    );
    assert_eq!(
        calls[3],
        "nmcli device wifi hotspot ifname wlan0 conn-name guest-ap ssid guest-ap password hunter2hunter2"
    );
}

#[tokio::test]
async fn listed_connection_can_be_narrowed_after_fetch() {
    let invoker = Arc::new(ScriptedInvoker::new());
    let nm = NmCli::new(invoker.clone());

    invoker.push_ok("guest-ap:0e7b0b0a:802-11-wireless:wlan0\nlan:11aa:ethernet:eth0\n");
    let connections = nm.connections().await.unwrap();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[0].connection_type, ConnectionType::Wireless);

    invoker.push_ok(
        "connection.id:guest-ap\nconnection.type:802-11-wireless\n802-11-wireless.ssid:guest-ap\n",
    );
    let fetched = nm.connection("guest-ap").await.unwrap();
    let wireless = fetched.into_wireless().unwrap();
    assert_eq!(wireless.ssid(), "guest-ap");
}

#[tokio::test]
async fn service_lifecycle_and_sentinel_status() {
    let invoker = Arc::new(ScriptedInvoker::new());
    let ctl = SystemCtl::new(invoker.clone());
    let service = Service::new("dnsmasq").unwrap();

    invoker.push_ok("");
    ctl.enable(&service).await.unwrap();

    invoker.push_ok("active\n");
    assert!(ctl.is_active(&service).await);

    invoker.push_ok("");
    ctl.disable(&service).await.unwrap();

    // Exit code 3 is "inactive", not an error.
    invoker.push_failure(3, "");
    assert!(!ctl.is_active(&service).await);

    assert_eq!(
        invoker.calls(),
        vec![
            "systemctl enable --now dnsmasq",
            "systemctl is-active dnsmasq",
            "systemctl disable --now dnsmasq",
            "systemctl is-active dnsmasq",
        ]
    );
}
