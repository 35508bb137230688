//! systemd unit control via systemctl

use crate::error::{HostctlError, HostctlResult};
use crate::exec::{Invocation, Invoker, ShellInvoker};
use crate::validation;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

const SYSTEMCTL_EXECUTABLE: &str = "systemctl";

/// `systemctl is-active` exits with 3 for an inactive unit.
const EXIT_CODE_INACTIVE: i32 = 3;

const STATUS_ACTIVE: &str = "active";

/// A validated systemd unit name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service(String);

impl Service {
    /// Build a service handle; rejects names outside the allowed
    /// character set before anything reaches systemctl.
    pub fn new(name: impl Into<String>) -> HostctlResult<Self> {
        let name = name.into();
        validation::validate_service_name(&name)?;
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// systemd client
pub struct SystemCtl {
    invoker: Arc<dyn Invoker>,
}

impl SystemCtl {
    pub fn new(invoker: Arc<dyn Invoker>) -> Self {
        Self { invoker }
    }

    /// True when the unit file is known to systemd.
    pub async fn exists(&self, service: &Service) -> bool {
        self.invoker
            .invoke(
                &Invocation::new(SYSTEMCTL_EXECUTABLE)
                    .arg("list-unit-files")
                    .arg(service.name()),
            )
            .await
            .is_ok()
    }

    /// Enable and start the unit (`enable --now`).
    pub async fn enable(&self, service: &Service) -> HostctlResult<()> {
        self.lifecycle(service, &["enable", "--now"]).await
    }

    /// Enable and start the unit for the calling user.
    pub async fn enable_for_user(&self, service: &Service) -> HostctlResult<()> {
        self.lifecycle(service, &["enable", "--now", "--user"]).await
    }

    /// Disable and stop the unit (`disable --now`).
    pub async fn disable(&self, service: &Service) -> HostctlResult<()> {
        self.lifecycle(service, &["disable", "--now"]).await
    }

    /// Disable and stop the unit for the calling user.
    pub async fn disable_for_user(&self, service: &Service) -> HostctlResult<()> {
        self.lifecycle(service, &["disable", "--now", "--user"]).await
    }

    pub async fn restart(&self, service: &Service) -> HostctlResult<()> {
        self.lifecycle(service, &["restart"]).await
    }

    /// True when `systemctl is-active` reports "active".
    ///
    /// Exit code 3 is the documented inactive state, not a failure;
    /// every other error is logged and conservatively reported as
    /// inactive.
    pub async fn is_active(&self, service: &Service) -> bool {
        let result = self
            .invoker
            .invoke(
                &Invocation::new(SYSTEMCTL_EXECUTABLE)
                    .arg("is-active")
                    .arg(service.name()),
            )
            .await;

        match result {
            Ok(output) => String::from_utf8_lossy(&output).trim() == STATUS_ACTIVE,
            Err(HostctlError::CommandFailed {
                code: Some(EXIT_CODE_INACTIVE),
                ..
            }) => {
                Self::log_debug_hint(service);
                false
            }
            Err(e) => {
                error!("Failed to get status of '{}' service: {}", service, e);
                Self::log_debug_hint(service);
                false
            }
        }
    }

    async fn lifecycle(&self, service: &Service, args: &[&str]) -> HostctlResult<()> {
        let call = Invocation::new(SYSTEMCTL_EXECUTABLE)
            .args(args.iter().copied())
            .arg(service.name());
        if let Err(e) = self.invoker.invoke(&call).await {
            error!("Failed to {} '{}' service: {}", args[0], service, e);
            Self::log_debug_hint(service);
            return Err(e);
        }
        Ok(())
    }

    fn log_debug_hint(service: &Service) {
        debug!("See `journalctl -xeu {}`", service);
    }
}

impl Default for SystemCtl {
    fn default() -> Self {
        Self::new(Arc::new(ShellInvoker::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedInvoker;

    fn client() -> (Arc<ScriptedInvoker>, SystemCtl) {
        let invoker = Arc::new(ScriptedInvoker::new());
        let client = SystemCtl::new(invoker.clone());
        (invoker, client)
    }

    #[test]
    fn test_service_name_validation() {
        assert!(Service::new("sshd.service").is_ok());
        assert!(Service::new("wpa_supplicant").is_ok());
        assert!(Service::new("bad name").is_err());
        assert!(Service::new("").is_err());
    }

    #[tokio::test]
    async fn test_is_active_on_active_unit() {
        let (invoker, client) = client();
        invoker.push_ok("active\n");
        let service = Service::new("sshd").unwrap();
        assert!(client.is_active(&service).await);
        assert_eq!(invoker.calls(), vec!["systemctl is-active sshd"]);
    }

    #[tokio::test]
    async fn test_is_active_inactive_sentinel_is_false() {
        let (invoker, client) = client();
        invoker.push_failure(3, "");
        let service = Service::new("sshd").unwrap();
        assert!(!client.is_active(&service).await);
    }

    #[tokio::test]
    async fn test_is_active_generic_failure_is_false() {
        let (invoker, client) = client();
        invoker.push_failure(1, "Failed to connect to bus");
        let service = Service::new("sshd").unwrap();
        assert!(!client.is_active(&service).await);
    }

    #[tokio::test]
    async fn test_is_active_spawn_failure_is_false() {
        let (invoker, client) = client();
        invoker.push_spawn_failure("No such file or directory");
        let service = Service::new("sshd").unwrap();
        assert!(!client.is_active(&service).await);
    }

    #[tokio::test]
    async fn test_enable_and_disable_pass_now_flag() {
        let (invoker, client) = client();
        let service = Service::new("dnsmasq").unwrap();

        invoker.push_ok("");
        client.enable(&service).await.unwrap();
        invoker.push_ok("");
        client.disable(&service).await.unwrap();

        assert_eq!(
            invoker.calls(),
            vec![
                "systemctl enable --now dnsmasq",
                "systemctl disable --now dnsmasq",
            ]
        );
    }

    #[tokio::test]
    async fn test_user_scoped_operations() {
        let (invoker, client) = client();
        let service = Service::new("syncthing").unwrap();

        invoker.push_ok("");
        client.enable_for_user(&service).await.unwrap();

        assert_eq!(invoker.calls(), vec!["systemctl enable --now --user syncthing"]);
    }

    #[tokio::test]
    async fn test_restart_propagates_failure() {
        let (invoker, client) = client();
        let service = Service::new("dnsmasq").unwrap();

        invoker.push_failure(5, "Unit dnsmasq.service not found.");
        let err = client.restart(&service).await.unwrap_err();
        assert!(matches!(
            err,
            HostctlError::CommandFailed { code: Some(5), .. }
        ));
    }

    #[tokio::test]
    async fn test_exists() {
        let (invoker, client) = client();
        let service = Service::new("sshd").unwrap();

        invoker.push_ok("sshd.service enabled\n");
        assert!(client.exists(&service).await);

        invoker.push_failure(1, "");
        assert!(!client.exists(&service).await);
    }
}
