//! Device identity management.
//!
//! Each device gets a persistent UUID stored in `device.json`. The UUID
//! namespaces companion-sync payloads so a mirrored duty record can be traced
//! back to the device that produced it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Device identity stored in `device.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Persistent UUID for this device.
    pub device_id: String,
    /// Human-friendly label (e.g., "efb-ipad").
    pub label: String,
}

/// Returns the path to device.json in the XDG data directory.
pub fn device_json_path() -> Result<PathBuf> {
    let data_dir = crate::config::dirs_data_path().context("could not determine data directory")?;
    Ok(data_dir.join("device.json"))
}

/// Loads device identity from device.json.
///
/// Returns `None` if the file doesn't exist.
/// Returns an error if the file exists but is unreadable/unparseable.
pub fn load_device_identity() -> Result<Option<DeviceIdentity>> {
    load_from(&device_json_path()?)
}

/// Loads device identity from a specific path.
fn load_from(path: &Path) -> Result<Option<DeviceIdentity>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let identity: DeviceIdentity =
                serde_json::from_str(&content).context("failed to parse device.json")?;
            Ok(Some(identity))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).context("failed to read device.json"),
    }
}

/// Loads device identity, failing with a helpful message if not found.
///
/// Use this in commands that require device identity (export).
pub fn require_device_identity() -> Result<DeviceIdentity> {
    load_device_identity()?.context("No device identity found. Run 'fdt init' first.")
}

/// Initializes device identity.
///
/// If device.json already exists, returns the existing identity (updating
/// the label if a new one is provided). If it doesn't exist, generates a new
/// UUID and writes device.json.
pub fn init_device(label: Option<&str>) -> Result<DeviceIdentity> {
    init_device_at(&device_json_path()?, label)
}

/// Initializes device identity at a specific path.
pub(crate) fn init_device_at(path: &Path, label: Option<&str>) -> Result<DeviceIdentity> {
    let default_label = hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string());

    let identity = if let Some(mut existing) = load_from(path)? {
        if let Some(new_label) = label {
            existing.label = new_label.to_string();
            save_to(path, &existing)?;
        }
        existing
    } else {
        let identity = DeviceIdentity {
            device_id: Uuid::new_v4().to_string(),
            label: label.unwrap_or(&default_label).to_string(),
        };
        save_to(path, &identity)?;
        identity
    };

    Ok(identity)
}

/// Writes device identity to a specific path.
fn save_to(path: &Path, identity: &DeviceIdentity) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let json = serde_json::to_string_pretty(identity).context("failed to serialize identity")?;
    std::fs::write(path, json).context("failed to write device.json")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_new_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");

        let identity = init_device_at(&path, Some("efb-ipad")).unwrap();
        assert_eq!(identity.label, "efb-ipad");
        assert!(!identity.device_id.is_empty());
        Uuid::parse_str(&identity.device_id).unwrap();
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");

        let first = init_device_at(&path, Some("efb-ipad")).unwrap();
        let second = init_device_at(&path, None).unwrap();
        assert_eq!(first.device_id, second.device_id);
        assert_eq!(first.label, second.label);
    }

    #[test]
    fn test_init_updates_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");

        let first = init_device_at(&path, Some("old-name")).unwrap();
        let second = init_device_at(&path, Some("new-name")).unwrap();
        assert_eq!(first.device_id, second.device_id);
        assert_eq!(second.label, "new-name");
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.json");
        assert!(load_from(&path).unwrap().is_none());
    }
}
