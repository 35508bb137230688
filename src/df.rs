//! Disk usage via df

use crate::config::HostctlConfig;
use crate::exec::{Invocation, Invoker, ShellInvoker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// One mounted filesystem as reported by df.
///
/// Sizes are kept as the human-oriented strings df prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    pub name: String,
    pub size: String,
    pub used: String,
    pub available: String,
    pub mount_point: String,
}

/// Disk usage client
pub struct Df {
    invoker: Arc<dyn Invoker>,
    exclude_fs_types: Vec<String>,
}

impl Df {
    pub fn new(invoker: Arc<dyn Invoker>, exclude_fs_types: Vec<String>) -> Self {
        Self {
            invoker,
            exclude_fs_types,
        }
    }

    pub fn from_config(invoker: Arc<dyn Invoker>, config: &HostctlConfig) -> Self {
        Self::new(invoker, config.disk.exclude_fs_types.clone())
    }

    /// Disk stats for every non-excluded filesystem. A failed df run
    /// is logged and yields an empty list.
    pub async fn stats(&self) -> Vec<DiskStats> {
        let mut call = Invocation::new("df");
        for fs in &self.exclude_fs_types {
            call = call.arg(format!("--exclude-type={}", fs));
        }
        call = call.arg("--output=source,size,used,avail,target");

        let output = match self.invoker.invoke(&call).await {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to get disk stats: {}", e);
                return Vec::new();
            }
        };

        parse_stats(&String::from_utf8_lossy(&output))
    }
}

impl Default for Df {
    fn default() -> Self {
        Self::from_config(Arc::new(ShellInvoker::new()), &HostctlConfig::default())
    }
}

/// The first line is a header; every record line has five
/// whitespace-separated fields. Short lines are skipped with a
/// warning.
fn parse_stats(output: &str) -> Vec<DiskStats> {
    let mut stats = Vec::new();
    for line in output.trim().lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            warn!("Bad disk stats record: '{}'", line);
            continue;
        }
        stats.push(DiskStats {
            name: fields[0].to_string(),
            size: fields[1].to_string(),
            used: fields[2].to_string(),
            available: fields[3].to_string(),
            mount_point: fields[4].to_string(),
        });
    }
    stats
}
