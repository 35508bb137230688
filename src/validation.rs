//! Input validation
//!
//! Rejects values that would be misread by the wrapped CLIs before any
//! subprocess is spawned.

use crate::error::{HostctlError, HostctlResult};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum length for interface names (Linux kernel limit is 15)
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Minimum WPA passphrase length
const MIN_HOTSPOT_PASSWORD_LEN: usize = 8;

/// Characters systemd accepts in unit names
const SERVICE_NAME_PATTERN: &str = r"^[a-zA-Z0-9-_.:\\]+$";

fn service_name_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(SERVICE_NAME_PATTERN).expect("service name pattern must compile")
    })
}

/// Validate a systemd unit name
pub fn validate_service_name(name: &str) -> HostctlResult<()> {
    if !service_name_regex().is_match(name) {
        return Err(HostctlError::InvalidParameter(format!(
            "Invalid service name: '{}'",
            name
        )));
    }
    Ok(())
}

/// Validate a WPA2/WPA3 passphrase
pub fn validate_hotspot_password(password: &str) -> HostctlResult<()> {
    if password.len() < MIN_HOTSPOT_PASSWORD_LEN {
        return Err(HostctlError::InvalidParameter(format!(
            "Invalid password: must be at least {} characters long",
            MIN_HOTSPOT_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Validate interface name to prevent command injection
///
/// Interface names must be alphanumeric with optional dashes and
/// underscores, and no longer than 15 characters (Linux kernel limit)
pub fn validate_interface_name(name: &str) -> HostctlResult<()> {
    if name.is_empty() {
        return Err(HostctlError::InvalidParameter(
            "Interface name cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(HostctlError::InvalidParameter(format!(
            "Interface name too long (max {} characters)",
            MAX_INTERFACE_NAME_LEN
        )));
    }

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
            return Err(HostctlError::InvalidParameter(format!(
                "Invalid interface name '{}': contains invalid character '{}'",
                name, c
            )));
        }
    }

    Ok(())
}
