//! IP address allocation logic.
//!
//! This file contains the fleet address allocator: a pure, deterministic
//! transformation from a `FleetSpec` and a `SubnetLayout` to a `FleetPlan`.
//! Classes are processed in canonical order, the management host first,
//! and every class issues addresses sequentially from its base offset.

use super::error::AllocationError;
use super::layout::SubnetLayout;
use super::registry::AddressRegistry;
use crate::device::{device_name, resolve_rules, DeviceClass, DeviceInstance};
use crate::fleet::{FleetPlan, FleetSpec};
use crate::utils::ip_utils::host_at;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Allocate a complete fleet plan using the default subnet layout.
pub fn allocate_default(spec: &FleetSpec) -> Result<FleetPlan, AllocationError> {
    allocate(spec, &SubnetLayout::default())
}

/// Allocate subnets, addresses and rule sets for every requested device.
///
/// All checks run before any instance is produced, so a failed run never
/// yields a partial plan. Calling this twice with equal inputs yields
/// equal plans.
pub fn allocate(spec: &FleetSpec, layout: &SubnetLayout) -> Result<FleetPlan, AllocationError> {
    let requested = checked_counts(spec)?;

    let active: Vec<DeviceClass> = DeviceClass::ALL
        .into_iter()
        .filter(|class| requested[class] > 0)
        .collect();

    layout.validate(spec.address_space(), &active)?;

    // Capacity is checked for every class up front so exhaustion of a later
    // class still rejects the whole run.
    let mut counts: BTreeMap<DeviceClass, u8> = BTreeMap::new();
    for &class in &active {
        let requested_count = requested[&class];
        let exhausted = AllocationError::SubnetExhausted {
            class,
            requested_count,
        };
        if requested_count > layout.assignment(class).capacity() {
            return Err(exhausted);
        }
        counts.insert(class, u8::try_from(requested_count).map_err(|_| exhausted)?);
    }

    let mut registry = AddressRegistry::new();
    let mut issued: Vec<(DeviceClass, u8, String, Ipv4Addr)> = Vec::new();

    for &class in &active {
        let assignment = layout.assignment(class);
        registry.reserve_subnet(&assignment.subnet);

        for ordinal in 0..counts[&class] {
            let octet = assignment.base_offset + ordinal;
            let address = host_at(&assignment.subnet, octet)
                .ok_or(AllocationError::InvalidSubnetSize {
                    class,
                    subnet: assignment.subnet,
                })?;
            let name = device_name(class, ordinal);

            registry.register(address, &name)?;
            log::debug!("Assigned {} to {} ({})", address, name, class);
            issued.push((class, ordinal, name, address));
        }

        log::info!(
            "Allocated {} {} device(s) in {} from offset {}",
            counts[&class],
            class,
            assignment.subnet,
            assignment.base_offset
        );
    }

    log::debug!("Registry holds {} device address(es)", registry.device_count());

    // The management host is always issued first, ordinal 0 is the jump host.
    let jump_host = issued
        .first()
        .map(|(_, _, _, address)| *address)
        .ok_or(AllocationError::MissingManagementHost)?;

    let class_rules: BTreeMap<DeviceClass, _> = active
        .iter()
        .map(|&class| (class, resolve_rules(class, layout, jump_host)))
        .collect();

    let instances = issued
        .into_iter()
        .map(|(class, ordinal, name, address)| DeviceInstance {
            class,
            ordinal,
            name,
            subnet: layout.assignment(class).subnet.trunc(),
            address,
            rules: class_rules[&class].clone(),
        })
        .collect::<Vec<_>>();

    log::info!(
        "Fleet plan complete: {} device(s), jump host {}",
        instances.len(),
        jump_host
    );

    Ok(FleetPlan::new(spec.address_space().trunc(), jump_host, instances))
}

/// Reject negative counts, then a fleet without a management host.
///
/// Every class is checked for a negative count before anything else is
/// reported, so the error does not depend on which class comes first.
fn checked_counts(spec: &FleetSpec) -> Result<BTreeMap<DeviceClass, i64>, AllocationError> {
    if let Some(class) = DeviceClass::ALL
        .into_iter()
        .find(|&class| spec.count(class) < 0)
    {
        return Err(AllocationError::InvalidCount { class });
    }

    if spec.count(DeviceClass::ManagementHost) == 0 {
        return Err(AllocationError::MissingManagementHost);
    }

    Ok(DeviceClass::ALL
        .into_iter()
        .map(|class| (class, spec.count(class)))
        .collect())
}
