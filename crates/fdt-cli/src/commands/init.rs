//! Init command for establishing device identity.

use anyhow::Result;

use crate::device;

/// Runs the init command.
pub fn run(label: Option<&str>) -> Result<()> {
    let identity = device::init_device(label)?;

    println!("Device ID: {}", identity.device_id);
    println!("Label:     {}", identity.label);
    println!("Saved to:  {}", device::device_json_path()?.display());

    Ok(())
}
