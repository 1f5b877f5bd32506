//! Inventory and connection-guide rendering.
//!
//! Every administrative path goes through the jump host: SSH admin ports are
//! reached with `ssh -J`, web admin ports through a local `ssh -L` tunnel.

use super::types::{Inventory, InventoryEntry};
use crate::device::{admin_port, DeviceInstance};
use crate::fleet::FleetPlan;
use std::net::Ipv4Addr;

/// Login used on the jump host and on every SSH-administered device.
pub const DEFAULT_ADMIN_USER: &str = "fleetadmin";

/// Local port used for web admin tunnels.
pub const TUNNEL_LOCAL_PORT: u16 = 8443;

/// Administrative command for one device, routed through the jump host.
pub fn admin_command(device: &DeviceInstance, jump_host: Ipv4Addr, user: &str) -> String {
    let port = admin_port(device.class);
    if device.address == jump_host {
        return format!("ssh {}@{}", user, jump_host);
    }
    match port.port {
        22 => format!("ssh -J {user}@{jump_host} {user}@{}", device.address),
        remote => format!(
            "ssh -N -L {TUNNEL_LOCAL_PORT}:{}:{remote} {user}@{jump_host}  # then open https://localhost:{TUNNEL_LOCAL_PORT}",
            device.address
        ),
    }
}

/// Build the operator inventory for a plan.
pub fn build_inventory(plan: &FleetPlan, user: &str) -> Inventory {
    let devices = plan
        .instances()
        .iter()
        .map(|device| InventoryEntry {
            name: device.name.clone(),
            class: device.class,
            ip_addr: device.address,
            subnet: device.subnet,
            admin_port: admin_port(device.class).port,
            admin_command: admin_command(device, plan.jump_host(), user),
            rules: device.rules.clone(),
        })
        .collect();

    Inventory {
        jump_host: plan.jump_host(),
        admin_user: user.to_string(),
        devices,
    }
}

/// Render human-readable connection instructions.
pub fn connection_guide(inventory: &Inventory) -> String {
    let mut lines = vec![
        "# Fleet connection guide".to_string(),
        format!("# Jump host: {}@{}", inventory.admin_user, inventory.jump_host),
        "# All administrative access is routed through the jump host.".to_string(),
    ];

    let mut current_class = None;
    for entry in &inventory.devices {
        if current_class != Some(entry.class) {
            lines.push(String::new());
            lines.push(format!("## {} ({})", entry.class, entry.subnet));
            current_class = Some(entry.class);
        }
        lines.push(format!("{:<12} {:<15} {}", entry.name, entry.ip_addr, entry.admin_command));
    }

    let mut guide = lines.join("\n");
    guide.push('\n');
    guide
}
