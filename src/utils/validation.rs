//! Plan validation utilities.
//!
//! This module re-checks a finished plan against the fleet invariants
//! independently of how it was produced: address uniqueness, per-class
//! totality, subnet containment, canonical ordering, and cross-class
//! isolation.

use crate::device::{DeviceClass, RuleAccess, RuleKind};
use crate::fleet::{FleetPlan, FleetSpec};
use crate::utils::ip_utils::{is_private_net, Ipv4Net};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// A broken plan invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanViolation {
    #[error("address {address} assigned to both {first} and {second}")]
    DuplicateAddress {
        address: Ipv4Addr,
        first: String,
        second: String,
    },
    #[error("{class}: plan holds {planned} device(s), {requested} requested")]
    CountMismatch {
        class: DeviceClass,
        requested: i64,
        planned: usize,
    },
    #[error("{device} address {address} lies outside its subnet {subnet}")]
    AddressOutsideSubnet {
        device: String,
        address: Ipv4Addr,
        subnet: Ipv4Net,
    },
    #[error("{device} subnet {subnet} lies outside address space {address_space}")]
    SubnetOutsideAddressSpace {
        device: String,
        subnet: Ipv4Net,
        address_space: Ipv4Net,
    },
    #[error("{device} is out of class/ordinal order")]
    OutOfOrder { device: String },
    #[error("{device} has no administrative rule bound to jump host {jump_host}")]
    MissingAdminRule { device: String, jump_host: Ipv4Addr },
    #[error("rule {rule} on {device} admits {source_net} from outside address space {address_space}")]
    SourceOutsideAddressSpace {
        device: String,
        rule: String,
        source_net: Ipv4Net,
        address_space: Ipv4Net,
    },
    #[error("rule {rule} on {device} admits traffic from {source_device} in another class")]
    CrossClassAccess {
        device: String,
        rule: String,
        source_device: String,
    },
}

/// Verify every invariant of a plan against the `FleetSpec` it was produced from.
///
/// # Returns
/// * `Ok(())` if the plan is sound
/// * `Err(PlanViolation)` describing the first broken invariant
pub fn verify_plan(plan: &FleetPlan, spec: &FleetSpec) -> Result<(), PlanViolation> {
    validate_unique_addresses(plan)?;
    validate_class_totals(plan, spec)?;
    validate_containment(plan)?;
    validate_ordering(plan)?;
    validate_admin_rules(plan)?;
    validate_isolation(plan)?;

    if !is_private_net(plan.address_space()) {
        log::warn!(
            "Address space {} is not entirely RFC 1918 private space",
            plan.address_space()
        );
    }

    Ok(())
}

/// No two devices share an address.
pub fn validate_unique_addresses(plan: &FleetPlan) -> Result<(), PlanViolation> {
    let mut seen: BTreeMap<Ipv4Addr, &str> = BTreeMap::new();
    for device in plan.instances() {
        if let Some(first) = seen.insert(device.address, &device.name) {
            return Err(PlanViolation::DuplicateAddress {
                address: device.address,
                first: first.to_string(),
                second: device.name.clone(),
            });
        }
    }
    Ok(())
}

/// Each class holds exactly the requested number of devices.
pub fn validate_class_totals(plan: &FleetPlan, spec: &FleetSpec) -> Result<(), PlanViolation> {
    let counts = plan.class_counts();
    for class in DeviceClass::ALL {
        let requested = spec.count(class);
        let planned = counts.get(&class).copied().unwrap_or(0);
        if i64::try_from(planned).ok() != Some(requested) {
            return Err(PlanViolation::CountMismatch {
                class,
                requested,
                planned,
            });
        }
    }
    Ok(())
}

/// Every address sits in its subnet and every subnet in the address space.
pub fn validate_containment(plan: &FleetPlan) -> Result<(), PlanViolation> {
    for device in plan.instances() {
        if !device.subnet.contains(&device.address) {
            return Err(PlanViolation::AddressOutsideSubnet {
                device: device.name.clone(),
                address: device.address,
                subnet: device.subnet,
            });
        }
        if !plan.address_space().contains(&device.subnet) {
            return Err(PlanViolation::SubnetOutsideAddressSpace {
                device: device.name.clone(),
                subnet: device.subnet,
                address_space: *plan.address_space(),
            });
        }
    }
    Ok(())
}

/// Devices are ordered by class, then by consecutive ordinals from zero.
pub fn validate_ordering(plan: &FleetPlan) -> Result<(), PlanViolation> {
    let mut previous: Option<(DeviceClass, u8)> = None;
    for device in plan.instances() {
        let in_order = match previous {
            None => device.ordinal == 0,
            Some((class, ordinal)) if class == device.class => {
                ordinal.checked_add(1) == Some(device.ordinal)
            }
            Some((class, _)) => class < device.class && device.ordinal == 0,
        };
        if !in_order {
            return Err(PlanViolation::OutOfOrder {
                device: device.name.clone(),
            });
        }
        previous = Some((device.class, device.ordinal));
    }
    Ok(())
}

/// Every device carries an administrative rule bound to the jump host.
pub fn validate_admin_rules(plan: &FleetPlan) -> Result<(), PlanViolation> {
    let jump = Ipv4Net::from(plan.jump_host());
    for device in plan.instances() {
        let bound = device
            .admin_rule()
            .map(|rule| rule.source == jump)
            .unwrap_or(false);
        if !bound {
            return Err(PlanViolation::MissingAdminRule {
                device: device.name.clone(),
                jump_host: plan.jump_host(),
            });
        }
    }
    Ok(())
}

/// Every allow rule is sourced inside the address space and admits no
/// device of another class except the jump host.
///
/// The deny-all rule is the only rule allowed to name a wider source.
pub fn validate_isolation(plan: &FleetPlan) -> Result<(), PlanViolation> {
    let jump_host = plan.jump_host();
    for device in plan.instances() {
        for rule in device.rules.iter().filter(|r| r.kind != RuleKind::DefaultDeny) {
            if rule.access == RuleAccess::Allow && !plan.address_space().contains(&rule.source) {
                return Err(PlanViolation::SourceOutsideAddressSpace {
                    device: device.name.clone(),
                    rule: rule.name.clone(),
                    source_net: rule.source,
                    address_space: *plan.address_space(),
                });
            }

            let intruder = plan.instances().iter().find(|other| {
                other.class != device.class
                    && other.address != jump_host
                    && rule.admits_from(other.address)
            });
            if let Some(other) = intruder {
                return Err(PlanViolation::CrossClassAccess {
                    device: device.name.clone(),
                    rule: rule.name.clone(),
                    source_device: other.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceInstance, FirewallRule, Protocol};
    use crate::ip::{allocate, allocate_default, SubnetLayout};
    use crate::utils::ip_utils::slash16;

    fn spec() -> FleetSpec {
        FleetSpec::default()
            .with_count(DeviceClass::ManagementHost, 1)
            .with_count(DeviceClass::Camera, 2)
            .with_count(DeviceClass::WirelessAccessPoint, 3)
            .with_count(DeviceClass::Printer, 2)
    }

    fn rebuild(plan: &FleetPlan, edit: impl FnOnce(&mut Vec<DeviceInstance>)) -> FleetPlan {
        let mut instances = plan.instances().to_vec();
        edit(&mut instances);
        FleetPlan::new(*plan.address_space(), plan.jump_host(), instances)
    }

    #[test]
    fn test_allocated_plan_verifies() {
        let plan = allocate_default(&spec()).unwrap();
        assert!(verify_plan(&plan, &spec()).is_ok());
    }

    #[test]
    fn test_duplicate_detected() {
        let plan = allocate_default(&spec()).unwrap();
        let broken = rebuild(&plan, |devices| devices[2].address = devices[1].address);
        assert!(matches!(
            validate_unique_addresses(&broken),
            Err(PlanViolation::DuplicateAddress { .. })
        ));
    }

    #[test]
    fn test_count_mismatch_detected() {
        let plan = allocate_default(&spec()).unwrap();
        let more = spec().with_count(DeviceClass::Printer, 3);
        assert_eq!(
            validate_class_totals(&plan, &more),
            Err(PlanViolation::CountMismatch {
                class: DeviceClass::Printer,
                requested: 3,
                planned: 2,
            })
        );
    }

    #[test]
    fn test_out_of_order_detected() {
        let plan = allocate_default(&spec()).unwrap();
        let broken = rebuild(&plan, |devices| devices.swap(1, 2));
        assert!(matches!(
            validate_ordering(&broken),
            Err(PlanViolation::OutOfOrder { .. })
        ));

        let broken = rebuild(&plan, |devices| devices.swap(0, 7));
        assert!(validate_ordering(&broken).is_err());
    }

    #[test]
    fn test_address_outside_subnet_detected() {
        let plan = allocate_default(&spec()).unwrap();
        let broken = rebuild(&plan, |devices| {
            devices[1].address = Ipv4Addr::new(10, 0, 9, 10);
        });
        assert!(matches!(
            validate_containment(&broken),
            Err(PlanViolation::AddressOutsideSubnet { .. })
        ));
    }

    #[test]
    fn test_missing_admin_rule_detected() {
        let plan = allocate_default(&spec()).unwrap();
        let broken = rebuild(&plan, |devices| {
            devices[3].rules.retain(|r| r.kind != RuleKind::Administrative);
        });
        assert_eq!(
            validate_admin_rules(&broken),
            Err(PlanViolation::MissingAdminRule {
                device: "wap-000".to_string(),
                jump_host: plan.jump_host(),
            })
        );
    }

    #[test]
    fn test_cross_class_rule_detected() {
        let plan = allocate_default(&spec()).unwrap();
        let broken = rebuild(&plan, |devices| {
            devices[6].rules.push(FirewallRule {
                name: "allow-everything-in-vnet".to_string(),
                priority: 300,
                kind: RuleKind::Service,
                access: RuleAccess::Allow,
                protocol: Protocol::Any,
                port: None,
                source: slash16(10, 0),
            });
        });
        assert!(matches!(
            validate_isolation(&broken),
            Err(PlanViolation::CrossClassAccess { ref device, .. }) if device == "printer-000"
        ));
    }

    #[test]
    fn test_management_subnet_is_guarded() {
        let plan = allocate_default(&spec()).unwrap();
        let camera = plan.of_class(DeviceClass::Camera).next().unwrap().address;
        for mgmt in plan.of_class(DeviceClass::ManagementHost) {
            assert!(!mgmt.rules.iter().any(|r| r.admits_from(camera)));
        }

        // Opening the jump host to the whole virtual network lets cameras in.
        let broken = rebuild(&plan, |devices| {
            devices[0].rules.push(FirewallRule {
                name: "allow-ssh-from-vnet".to_string(),
                priority: 300,
                kind: RuleKind::Service,
                access: RuleAccess::Allow,
                protocol: Protocol::Tcp,
                port: Some(22),
                source: slash16(10, 0),
            });
        });
        assert!(matches!(
            validate_isolation(&broken),
            Err(PlanViolation::CrossClassAccess { ref device, ref source_device, .. })
                if device == "mgmt-000" && source_device == "camera-000"
        ));
    }

    #[test]
    fn test_source_outside_address_space_detected() {
        let plan = allocate_default(&spec()).unwrap();
        let broken = rebuild(&plan, |devices| {
            devices[0].rules.push(FirewallRule {
                name: "allow-ssh-from-anywhere".to_string(),
                priority: 300,
                kind: RuleKind::Service,
                access: RuleAccess::Allow,
                protocol: Protocol::Tcp,
                port: Some(22),
                source: "203.0.113.0/24".parse().unwrap(),
            });
        });
        assert!(matches!(
            validate_isolation(&broken),
            Err(PlanViolation::SourceOutsideAddressSpace { ref rule, .. })
                if rule == "allow-ssh-from-anywhere"
        ));
    }

    #[test]
    fn test_operator_range_plan_verifies() {
        let layout = SubnetLayout::default().with_operator_cidr("10.0.0.0/28".parse().unwrap());
        let plan = allocate(&spec(), &layout).unwrap();
        assert!(verify_plan(&plan, &spec()).is_ok());
    }
}
