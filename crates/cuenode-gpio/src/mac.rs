//! MAC address discovery

use std::path::Path;

use cuenode_core::{CueError, CueResult, MacAddress};

/// Read the hardware address of a network interface from sysfs
pub fn read_mac(interface: &str) -> CueResult<MacAddress> {
    read_mac_from(Path::new("/sys/class/net").join(interface).join("address"))
}

/// Read a hardware address from a sysfs-style file
pub fn read_mac_from(path: impl AsRef<Path>) -> CueResult<MacAddress> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CueError::Hardware(format!("{}: {e}", path.display())))?;

    let addr = raw.trim().to_ascii_lowercase();
    if addr.is_empty() {
        return Err(CueError::Hardware(format!(
            "{}: empty hardware address",
            path.display()
        )));
    }
    Ok(MacAddress::new(addr))
}
