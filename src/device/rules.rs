//! Firewall rule catalogue and resolution.
//!
//! Rules are a pure function of the device class, the subnet layout and
//! the jump host address. Two instances of the same class therefore always
//! resolve to the same rule set.

use super::types::{DeviceClass, FirewallRule, Protocol, RuleAccess, RuleKind, ServicePort};
use crate::ip::SubnetLayout;
use crate::utils::ip_utils::Ipv4Net;
use std::net::Ipv4Addr;

pub const ADMIN_RULE_PRIORITY: u16 = 100;
pub const OPERATOR_RULE_PRIORITY: u16 = 110;
pub const SERVICE_RULE_BASE_PRIORITY: u16 = 200;
pub const SERVICE_RULE_PRIORITY_STEP: u16 = 10;
pub const DEFAULT_DENY_PRIORITY: u16 = 4096;

const SSH: ServicePort = ServicePort { protocol: Protocol::Tcp, port: 22, label: "ssh" };
const HTTPS: ServicePort = ServicePort { protocol: Protocol::Tcp, port: 443, label: "https" };

const MANAGEMENT_SERVICES: &[ServicePort] = &[SSH];

const CAMERA_SERVICES: &[ServicePort] = &[
    ServicePort { protocol: Protocol::Tcp, port: 554, label: "rtsp" },
    ServicePort { protocol: Protocol::Tcp, port: 80, label: "http" },
];

const WIRELESS_SERVICES: &[ServicePort] = &[
    ServicePort { protocol: Protocol::Udp, port: 5246, label: "capwap-control" },
    ServicePort { protocol: Protocol::Udp, port: 5247, label: "capwap-data" },
    HTTPS,
];

const PRINTER_SERVICES: &[ServicePort] = &[
    ServicePort { protocol: Protocol::Tcp, port: 9100, label: "raw-print" },
    ServicePort { protocol: Protocol::Tcp, port: 631, label: "ipp" },
    ServicePort { protocol: Protocol::Tcp, port: 515, label: "lpd" },
];

/// Service ports a class exposes inside the virtual network.
pub fn service_ports(class: DeviceClass) -> &'static [ServicePort] {
    match class {
        DeviceClass::ManagementHost => MANAGEMENT_SERVICES,
        DeviceClass::Camera => CAMERA_SERVICES,
        DeviceClass::WirelessAccessPoint => WIRELESS_SERVICES,
        DeviceClass::Printer => PRINTER_SERVICES,
    }
}

/// Administrative port of a class. Printers are administered over their web UI.
pub fn admin_port(class: DeviceClass) -> ServicePort {
    match class {
        DeviceClass::Printer => HTTPS,
        _ => SSH,
    }
}

/// Source range allowed to reach a class's service ports: its own subnet.
pub fn service_source(class: DeviceClass, layout: &SubnetLayout) -> Ipv4Net {
    layout.assignment(class).subnet
}

/// SSH into the management subnet from the operator range.
///
/// The layout guarantees the range lies inside the address space and
/// overlaps no class subnet.
pub fn operator_rule(operator_cidr: Ipv4Net) -> FirewallRule {
    FirewallRule {
        name: format!("allow-{}-from-operator-range", SSH.label),
        priority: OPERATOR_RULE_PRIORITY,
        kind: RuleKind::Operator,
        access: RuleAccess::Allow,
        protocol: SSH.protocol,
        port: Some(SSH.port),
        source: operator_cidr,
    }
}

/// The mandatory administrative rule, bound to the jump host's address.
pub fn admin_rule(class: DeviceClass, jump_host: Ipv4Addr) -> FirewallRule {
    let port = admin_port(class);
    FirewallRule {
        name: format!("allow-admin-{}-from-jump-host", port.label),
        priority: ADMIN_RULE_PRIORITY,
        kind: RuleKind::Administrative,
        access: RuleAccess::Allow,
        protocol: port.protocol,
        port: Some(port.port),
        source: Ipv4Net::from(jump_host),
    }
}

fn default_deny() -> FirewallRule {
    FirewallRule {
        name: "deny-all-inbound".to_string(),
        priority: DEFAULT_DENY_PRIORITY,
        kind: RuleKind::DefaultDeny,
        access: RuleAccess::Deny,
        protocol: Protocol::Any,
        port: None,
        source: Ipv4Net::default(),
    }
}

/// Resolve the full, priority-ordered inbound rule set for a class.
pub fn resolve_rules(
    class: DeviceClass,
    layout: &SubnetLayout,
    jump_host: Ipv4Addr,
) -> Vec<FirewallRule> {
    let source = service_source(class, layout);
    let mut rules = Vec::with_capacity(service_ports(class).len() + 3);

    rules.push(admin_rule(class, jump_host));

    if class == DeviceClass::ManagementHost {
        rules.extend(layout.operator_cidr().map(operator_rule));
    }

    let mut priority = SERVICE_RULE_BASE_PRIORITY;
    for service in service_ports(class) {
        rules.push(FirewallRule {
            name: format!("allow-{}-{}-{}", service.label, service.protocol, service.port),
            priority,
            kind: RuleKind::Service,
            access: RuleAccess::Allow,
            protocol: service.protocol,
            port: Some(service.port),
            source,
        });
        priority += SERVICE_RULE_PRIORITY_STEP;
    }

    rules.push(default_deny());
    rules
}
