//! hostctl - Linux host administration library
//!
//! Typed async wrappers around the administration CLIs a router host is
//! managed with:
//! - NetworkManager connections, devices and hotspots (nmcli)
//! - systemd unit lifecycle (systemctl)
//! - Connected wireless stations (iw)
//! - Disk usage (df)
//!
//! Every operation shells out, captures the tool's text output and
//! parses it into structured values. Commands run through an injectable
//! [`exec::Invoker`] so the clients can be driven by scripted output in
//! tests.

pub mod config;
pub mod df;
pub mod error;
pub mod exec;
pub mod iw;
pub mod nmcli;
pub mod systemctl;
pub mod validation;

// Re-export commonly used types
pub use config::HostctlConfig;
pub use df::{Df, DiskStats};
pub use error::{HostctlError, HostctlResult};
pub use exec::{Invocation, Invoker, ShellInvoker};
pub use iw::{Iw, Station};
pub use nmcli::{Connection, ConnectionType, Device, NmCli, WirelessConnection};
pub use systemctl::{Service, SystemCtl};
