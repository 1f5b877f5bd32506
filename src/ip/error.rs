//! Allocation error taxonomy.

use crate::device::DeviceClass;
use crate::utils::ip_utils::Ipv4Net;
use std::net::Ipv4Addr;

/// Reasons an allocation run is rejected.
///
/// Every variant is detected before any instance is returned; a run that
/// fails produces no plan at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("subnet for {class} exhausted: {requested_count} devices requested")]
    SubnetExhausted {
        class: DeviceClass,
        requested_count: i64,
    },
    #[error("no management host requested; administrative rules cannot be bound")]
    MissingManagementHost,
    #[error("invalid (negative) device count for {class}")]
    InvalidCount { class: DeviceClass },
    #[error("subnet {subnet} for {class} lies outside address space {address_space}")]
    SubnetOutsideAddressSpace {
        class: DeviceClass,
        subnet: Ipv4Net,
        address_space: Ipv4Net,
    },
    #[error("subnets for {first} and {second} overlap")]
    SubnetOverlap {
        first: DeviceClass,
        second: DeviceClass,
    },
    #[error("base offset {base_offset} for {class} is outside the assignable host range")]
    InvalidBaseOffset { class: DeviceClass, base_offset: u8 },
    #[error("address {address} for {requested} already held by {existing}")]
    AddressConflict {
        address: Ipv4Addr,
        existing: String,
        requested: String,
    },
    #[error("subnet {subnet} for {class} is not a /24")]
    InvalidSubnetSize { class: DeviceClass, subnet: Ipv4Net },
    #[error("operator range {operator_cidr} lies outside address space {address_space}")]
    OperatorRangeOutsideAddressSpace {
        operator_cidr: Ipv4Net,
        address_space: Ipv4Net,
    },
    #[error("operator range {operator_cidr} overlaps the {class} subnet")]
    OperatorRangeOverlap {
        class: DeviceClass,
        operator_cidr: Ipv4Net,
    },
}
