//! Device classes, allocated instances and their firewall rules.

pub mod rules;
pub mod types;

// Re-export commonly used types
pub use rules::{admin_port, admin_rule, resolve_rules, service_ports};
pub use types::{
    device_name, DeviceClass, DeviceInstance, FirewallRule, Protocol, RuleAccess, RuleKind,
    ServicePort,
};
