//! Output artifact type definitions.
//!
//! This module contains the serialized shapes handed to the external
//! collaborators: the provisioning manifest (compute requests plus one
//! security group per subnet) and the inventory registry.

use crate::device::{DeviceClass, FirewallRule};
use crate::utils::ip_utils::Ipv4Net;
use serde::Serialize;
use std::net::Ipv4Addr;

// ============================================================================
// Provisioning Types
// ============================================================================

/// Compute-resource request for one device.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HostRequest {
    pub name: String,
    pub class: DeviceClass,
    /// Name of the subnet (and security group) the host joins
    pub subnet: String,
    pub ip_address: Ipv4Addr,
    /// VM size hint for the provider
    pub size: &'static str,
}

/// One firewall resource group, attached to a whole subnet.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroup {
    pub name: String,
    pub class: DeviceClass,
    pub subnet: Ipv4Net,
    pub rules: Vec<FirewallRule>,
}

/// Everything the provisioning layer needs to realise a plan.
///
/// Written to `provisioning.yaml` (or `.json`).
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningManifest {
    pub address_space: Ipv4Net,
    pub jump_host: Ipv4Addr,
    pub hosts: Vec<HostRequest>,
    pub security_groups: Vec<SecurityGroup>,
}

// ============================================================================
// Inventory Types
// ============================================================================

/// Information about one device for operators.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub name: String,
    pub class: DeviceClass,
    pub ip_addr: Ipv4Addr,
    pub subnet: Ipv4Net,
    pub admin_port: u16,
    /// Command that reaches the admin port through the jump host
    pub admin_command: String,
    /// Inbound rules in priority order, as applied to the device's subnet
    pub rules: Vec<FirewallRule>,
}

/// Inventory of the whole fleet.
///
/// Written to `inventory.json`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    pub jump_host: Ipv4Addr,
    pub admin_user: String,
    pub devices: Vec<InventoryEntry>,
}
