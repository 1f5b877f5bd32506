//! # Fleetplan - Network identity planning for simulated device fleets
//!
//! This library computes, for every device of a declared fleet, its subnet,
//! its static IPv4 address, and the firewall rules that apply to it. The
//! result is a finished, read-only plan handed to an external provisioning
//! layer.
//!
//! ## Overview
//!
//! A fleet is made of four device classes: one management jump host plus
//! cameras, wireless access points and printers. Every class owns a fixed
//! /24 subnet and issues addresses sequentially from a base offset. All
//! administrative access to devices is only admitted from the jump host.
//!
//! ## Key Features
//!
//! - **Deterministic**: the same fleet always yields a byte-identical plan
//! - **Collision-free**: no two devices ever share an address
//! - **All-or-nothing**: any error rejects the whole run, no partial plans
//! - **Isolated classes**: no class is reachable from another class's subnet
//!
//! ## Architecture
//!
//! - `config`: Typed YAML configuration and validation
//! - `config_loader`: Configuration file loading
//! - `device`: Device classes, instances and firewall rules
//! - `fleet`: Allocator input (`FleetSpec`) and output (`FleetPlan`)
//! - `ip`: Subnet layout, address registry and the allocator
//! - `plan`: Rendering of provisioning manifest and inventory
//! - `utils`: CIDR helpers and independent plan verification
//! - `orchestrator`: End-to-end planning runs
//!
//! ## Example Usage
//!
//! ```rust
//! use fleetplan::device::DeviceClass;
//! use fleetplan::fleet::FleetSpec;
//! use fleetplan::ip::allocate_default;
//!
//! let spec = FleetSpec::default()
//!     .with_count(DeviceClass::ManagementHost, 1)
//!     .with_count(DeviceClass::Camera, 2);
//!
//! let plan = allocate_default(&spec)?;
//! assert_eq!(plan.jump_host().to_string(), "10.0.1.4");
//! assert_eq!(plan.instances()[2].address.to_string(), "10.0.2.11");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   log_level: info
//!
//! network:
//!   address_space: "10.0.0.0/16"
//!   operator_cidr: "10.0.0.0/28"
//!
//! fleet:
//!   management_host: 1
//!   camera: 2
//!   wireless_access_point: 3
//!   printer: 2
//! ```
//!
//! ## Error Handling
//!
//! Library errors are typed with `thiserror` (`AllocationError`,
//! `ValidationError`, `PlanViolation`). The orchestration layer and the
//! binary use `color_eyre` for reports with context.

pub mod config;
pub mod config_loader;
pub mod device;
pub mod fleet;
pub mod ip;
pub mod orchestrator;
pub mod plan;
pub mod utils;
