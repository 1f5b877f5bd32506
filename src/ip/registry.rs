//! IP address registry.
//!
//! This file tracks which addresses of a plan are held, and by whom, so
//! that no address is ever issued twice and the per-subnet reserved host
//! addresses are never handed to a device.

use super::error::AllocationError;
use super::layout::{FIRST_ASSIGNABLE_HOST, LAST_USABLE_HOST};
use crate::utils::ip_utils::{host_at, Ipv4Net};
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

/// Owner label for host addresses held back by the subnet itself.
pub const RESERVED_OWNER: &str = "reserved";

/// Registry of held addresses for one allocation run.
#[derive(Debug, Default)]
pub struct AddressRegistry {
    /// Address -> owner (device name or `RESERVED_OWNER`)
    assigned: BTreeMap<Ipv4Addr, String>,
    /// Subnets whose reserved hosts are already registered
    reserved_subnets: BTreeSet<Ipv4Net>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the network, gateway, provider DNS and broadcast addresses of a /24.
    ///
    /// Calling this twice for the same subnet is a no-op.
    pub fn reserve_subnet(&mut self, subnet: &Ipv4Net) {
        if !self.reserved_subnets.insert(subnet.trunc()) {
            return;
        }
        let reserved = (0..FIRST_ASSIGNABLE_HOST).chain(LAST_USABLE_HOST + 1..=u8::MAX);
        for octet in reserved {
            if let Some(addr) = host_at(subnet, octet) {
                self.assigned.insert(addr, RESERVED_OWNER.to_string());
            }
        }
    }

    /// Register `address` for `owner`, failing if someone else holds it.
    pub fn register(&mut self, address: Ipv4Addr, owner: &str) -> Result<(), AllocationError> {
        match self.owner(address) {
            Some(existing) if existing == owner => Ok(()),
            Some(existing) => Err(AllocationError::AddressConflict {
                address,
                existing: existing.to_string(),
                requested: owner.to_string(),
            }),
            None => {
                self.assigned.insert(address, owner.to_string());
                Ok(())
            }
        }
    }

    /// Get the owner of a given address
    pub fn owner(&self, address: Ipv4Addr) -> Option<&str> {
        self.assigned.get(&address).map(String::as_str)
    }

    /// Number of addresses held by devices (reserved hosts excluded)
    pub fn device_count(&self) -> usize {
        self.assigned
            .values()
            .filter(|owner| owner.as_str() != RESERVED_OWNER)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ip_utils::slash24;

    #[test]
    fn test_reserved_hosts() {
        let subnet = slash24(10, 0, 2);
        let mut registry = AddressRegistry::new();
        registry.reserve_subnet(&subnet);
        registry.reserve_subnet(&subnet);

        for octet in [0, 1, 2, 3, 255] {
            let addr = Ipv4Addr::new(10, 0, 2, octet);
            assert_eq!(registry.owner(addr), Some(RESERVED_OWNER), "octet {octet}");
        }
        assert_eq!(registry.owner(Ipv4Addr::new(10, 0, 2, 4)), None);
        assert_eq!(registry.device_count(), 0);
    }

    #[test]
    fn test_register_conflict() {
        let mut registry = AddressRegistry::new();
        let addr = Ipv4Addr::new(10, 0, 2, 10);

        assert!(registry.register(addr, "camera-000").is_ok());
        assert!(registry.register(addr, "camera-000").is_ok());
        assert_eq!(
            registry.register(addr, "printer-000"),
            Err(AllocationError::AddressConflict {
                address: addr,
                existing: "camera-000".to_string(),
                requested: "printer-000".to_string(),
            })
        );
        assert_eq!(registry.device_count(), 1);
    }

    #[test]
    fn test_gateway_cannot_be_registered() {
        let mut registry = AddressRegistry::new();
        registry.reserve_subnet(&slash24(10, 0, 1));
        assert!(registry.register(Ipv4Addr::new(10, 0, 1, 1), "mgmt-000").is_err());
    }
}
