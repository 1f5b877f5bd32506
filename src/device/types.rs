//! Device and firewall type definitions.
//!
//! This file contains the enumerated device classes, the firewall rule
//! structures attached to every allocated device, and the allocated
//! `DeviceInstance` itself.

use crate::utils::ip_utils::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Category of simulated device sharing subnet, rule and addressing policy.
///
/// The declaration order is the canonical allocation order: the management
/// host always comes first so that every later class can bind its
/// administrative rule to the jump host's address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    ManagementHost,
    Camera,
    WirelessAccessPoint,
    Printer,
}

impl DeviceClass {
    /// All classes in canonical allocation order.
    pub const ALL: [DeviceClass; 4] = [
        DeviceClass::ManagementHost,
        DeviceClass::Camera,
        DeviceClass::WirelessAccessPoint,
        DeviceClass::Printer,
    ];

    /// Configuration key for this class (matches the serde name).
    pub fn key(&self) -> &'static str {
        match self {
            DeviceClass::ManagementHost => "management_host",
            DeviceClass::Camera => "camera",
            DeviceClass::WirelessAccessPoint => "wireless_access_point",
            DeviceClass::Printer => "printer",
        }
    }

    /// Short prefix used in device names, e.g. `wap-002`.
    pub fn slug(&self) -> &'static str {
        match self {
            DeviceClass::ManagementHost => "mgmt",
            DeviceClass::Camera => "camera",
            DeviceClass::WirelessAccessPoint => "wap",
            DeviceClass::Printer => "printer",
        }
    }

    /// Name of the subnet (and of its security group) in provisioning output.
    pub fn subnet_name(&self) -> String {
        format!("{}-subnet", self.slug())
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Transport protocol matched by a firewall rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Any,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Udp => f.write_str("udp"),
            Protocol::Any => f.write_str("any"),
        }
    }
}

/// A (protocol, port) pair a device class exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePort {
    pub protocol: Protocol,
    pub port: u16,
    pub label: &'static str,
}

/// Whether a rule admits or drops matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAccess {
    Allow,
    Deny,
}

/// What a rule exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Class service port, reachable from inside the virtual network only.
    Service,
    /// Administrative port, reachable from the jump host only.
    Administrative,
    /// Jump-host SSH from the configured operator range.
    Operator,
    /// Lowest-priority catch-all deny.
    DefaultDeny,
}

/// Inbound firewall rule applied to a device's subnet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirewallRule {
    pub name: String,
    /// Lower values are evaluated first.
    pub priority: u16,
    pub kind: RuleKind,
    pub access: RuleAccess,
    pub protocol: Protocol,
    /// `None` matches every port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub source: Ipv4Net,
}

impl FirewallRule {
    /// Does this rule admit traffic originating at `addr`?
    pub fn admits_from(&self, addr: Ipv4Addr) -> bool {
        self.access == RuleAccess::Allow && self.source.contains(&addr)
    }
}

/// One allocated device of the fleet plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInstance {
    pub class: DeviceClass,
    /// Zero-based index within the class.
    pub ordinal: u8,
    pub name: String,
    pub subnet: Ipv4Net,
    pub address: Ipv4Addr,
    pub rules: Vec<FirewallRule>,
}

impl DeviceInstance {
    /// The administrative rule bound to the jump host.
    pub fn admin_rule(&self) -> Option<&FirewallRule> {
        self.rules.iter().find(|r| r.kind == RuleKind::Administrative)
    }
}

/// Build the stable device name for a class ordinal, e.g. `camera-000`.
pub fn device_name(class: DeviceClass, ordinal: u8) -> String {
    format!("{}-{:03}", class.slug(), ordinal)
}
