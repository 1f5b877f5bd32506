//! # Plan Rendering Module
//!
//! This module turns a finished `FleetPlan` into the artifacts consumed by
//! the collaborators outside this crate.
//!
//! ## Artifacts
//!
//! **Provisioning manifest** (`provisioning.yaml`):
//! - One compute request per device with its static address and size hint
//! - One security group per active subnet carrying that subnet's rules
//!
//! **Inventory** (`inventory.json`):
//! - Every device, its address, administrative port and firewall rules
//! - The command that reaches it through the jump host
//!
//! **Connection guide** (`connections.txt`):
//! - The inventory as plain text, grouped by device class
//!
//! ## Example Manifest
//!
//! ```yaml
//! address_space: 10.0.0.0/16
//! jump_host: 10.0.1.4
//! hosts:
//!   - name: camera-000
//!     class: camera
//!     subnet: camera-subnet
//!     ip_address: 10.0.2.10
//!     size: Standard_B1s
//! security_groups:
//!   - name: camera-nsg
//!     class: camera
//!     subnet: 10.0.2.0/24
//!     rules:
//!       - name: allow-admin-ssh-from-jump-host
//!         priority: 100
//!         source: 10.0.1.4/32
//! ```
//!
//! All renderers are pure; equal plans render to byte-identical output.

pub mod inventory;
pub mod provisioning;
pub mod types;

// Re-export commonly used types for convenience
pub use inventory::{admin_command, build_inventory, connection_guide, DEFAULT_ADMIN_USER};
pub use provisioning::build_manifest;
pub use types::{HostRequest, Inventory, InventoryEntry, ProvisioningManifest, SecurityGroup};
