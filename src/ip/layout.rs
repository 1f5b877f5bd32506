//! Static class-to-subnet layout.
//!
//! Every device class owns one pre-assigned /24 subnet and a base offset
//! from which its static addresses are issued sequentially. The mapping is
//! fixed regardless of requested counts; subnets are never packed
//! dynamically.

use super::error::AllocationError;
use crate::device::DeviceClass;
use crate::utils::ip_utils::{nets_overlap, slash24, Ipv4Net, CLASS_PREFIX_LEN};
use serde::Serialize;
use std::collections::BTreeMap;

/// Host octets 0 to 3 of each /24 are held back for the network address,
/// the gateway and the provider's DNS pair.
pub const FIRST_ASSIGNABLE_HOST: u8 = 4;

/// Last usable host octet in a /24; 255 is broadcast.
pub const LAST_USABLE_HOST: u8 = 254;

/// Subnet and base offset for one device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubnetAssignment {
    pub subnet: Ipv4Net,
    pub base_offset: u8,
}

impl SubnetAssignment {
    pub fn new(subnet: Ipv4Net, base_offset: u8) -> Self {
        Self { subnet, base_offset }
    }

    /// Number of addresses this class can still issue from its base offset.
    pub fn capacity(&self) -> i64 {
        i64::from(LAST_USABLE_HOST) - i64::from(self.base_offset) + 1
    }
}

/// Complete layout: one assignment per class plus the optional operator
/// range allowed to SSH into the management subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetLayout {
    assignments: BTreeMap<DeviceClass, SubnetAssignment>,
    operator_cidr: Option<Ipv4Net>,
}

impl SubnetLayout {
    /// Assignment for a class. Every class always has one.
    pub fn assignment(&self, class: DeviceClass) -> &SubnetAssignment {
        &self.assignments[&class]
    }

    /// Replace the assignment of a single class.
    pub fn with_assignment(mut self, class: DeviceClass, assignment: SubnetAssignment) -> Self {
        self.assignments.insert(class, assignment);
        self
    }

    pub fn with_operator_cidr(mut self, operator_cidr: Ipv4Net) -> Self {
        self.operator_cidr = Some(operator_cidr);
        self
    }

    pub fn operator_cidr(&self) -> Option<Ipv4Net> {
        self.operator_cidr
    }

    /// Check the assignments of `active` classes against the address space.
    ///
    /// Each active subnet must be a /24 inside `address_space`, issue from a
    /// base offset in the assignable host range and not overlap any other
    /// active subnet. The operator range, when set, must lie inside
    /// `address_space` and overlap no active subnet.
    pub fn validate(
        &self,
        address_space: &Ipv4Net,
        active: &[DeviceClass],
    ) -> Result<(), AllocationError> {
        for &class in active {
            let assignment = self.assignment(class);

            if assignment.subnet.prefix_len() != CLASS_PREFIX_LEN {
                return Err(AllocationError::InvalidSubnetSize {
                    class,
                    subnet: assignment.subnet,
                });
            }

            if !address_space.contains(&assignment.subnet) {
                return Err(AllocationError::SubnetOutsideAddressSpace {
                    class,
                    subnet: assignment.subnet,
                    address_space: *address_space,
                });
            }

            if !(FIRST_ASSIGNABLE_HOST..=LAST_USABLE_HOST).contains(&assignment.base_offset) {
                return Err(AllocationError::InvalidBaseOffset {
                    class,
                    base_offset: assignment.base_offset,
                });
            }
        }

        for (i, &first) in active.iter().enumerate() {
            for &second in &active[i + 1..] {
                if nets_overlap(&self.assignment(first).subnet, &self.assignment(second).subnet) {
                    return Err(AllocationError::SubnetOverlap { first, second });
                }
            }
        }

        if let Some(operator_cidr) = self.operator_cidr {
            if !address_space.contains(&operator_cidr) {
                return Err(AllocationError::OperatorRangeOutsideAddressSpace {
                    operator_cidr,
                    address_space: *address_space,
                });
            }
            if let Some(&class) = active
                .iter()
                .find(|&&class| nets_overlap(&operator_cidr, &self.assignment(class).subnet))
            {
                return Err(AllocationError::OperatorRangeOverlap {
                    class,
                    operator_cidr,
                });
            }
        }

        Ok(())
    }
}

impl Default for SubnetLayout {
    fn default() -> Self {
        let assignments = [
            (DeviceClass::ManagementHost, slash24(10, 0, 1), 4),
            (DeviceClass::Camera, slash24(10, 0, 2), 10),
            (DeviceClass::WirelessAccessPoint, slash24(10, 0, 3), 10),
            (DeviceClass::Printer, slash24(10, 0, 4), 10),
        ]
        .into_iter()
        .map(|(class, subnet, base_offset)| (class, SubnetAssignment::new(subnet, base_offset)))
        .collect();

        Self {
            assignments,
            operator_cidr: None,
        }
    }
}
