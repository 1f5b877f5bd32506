//! Fleet input and plan output types.
//!
//! `FleetSpec` is the declared fleet (how many devices of each class, inside
//! which virtual-network address space). `FleetPlan` is the finished,
//! read-only result of one allocation run.

use crate::device::{DeviceClass, DeviceInstance};
use crate::utils::ip_utils::{slash16, Ipv4Net};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Requested device counts plus the virtual-network address space.
///
/// Counts are signed so that malformed input can be rejected by the
/// allocator instead of being clamped. A class without an entry counts as
/// zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetSpec {
    counts: BTreeMap<DeviceClass, i64>,
    address_space: Ipv4Net,
}

impl FleetSpec {
    pub fn new(address_space: Ipv4Net) -> Self {
        Self {
            counts: BTreeMap::new(),
            address_space,
        }
    }

    /// Set the requested count for a class.
    pub fn with_count(mut self, class: DeviceClass, count: i64) -> Self {
        self.counts.insert(class, count);
        self
    }

    /// Requested count for a class, zero when unspecified.
    pub fn count(&self, class: DeviceClass) -> i64 {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    pub fn address_space(&self) -> &Ipv4Net {
        &self.address_space
    }

    /// Sum of all non-negative requested counts.
    pub fn total_requested(&self) -> i64 {
        self.counts.values().filter(|c| **c > 0).sum()
    }
}

impl Default for FleetSpec {
    fn default() -> Self {
        Self::new(slash16(10, 0))
    }
}

/// Ordered, immutable output of one allocation run.
///
/// Instances are ordered by class (canonical order) and then by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetPlan {
    address_space: Ipv4Net,
    jump_host: Ipv4Addr,
    instances: Vec<DeviceInstance>,
}

impl FleetPlan {
    pub(crate) fn new(
        address_space: Ipv4Net,
        jump_host: Ipv4Addr,
        instances: Vec<DeviceInstance>,
    ) -> Self {
        Self {
            address_space,
            jump_host,
            instances,
        }
    }

    pub fn address_space(&self) -> &Ipv4Net {
        &self.address_space
    }

    /// Address of the management instance every admin rule is bound to.
    pub fn jump_host(&self) -> Ipv4Addr {
        self.jump_host
    }

    pub fn instances(&self) -> &[DeviceInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Instances of a single class, in ordinal order.
    pub fn of_class(&self, class: DeviceClass) -> impl Iterator<Item = &DeviceInstance> {
        self.instances.iter().filter(move |d| d.class == class)
    }

    /// Number of allocated instances per class (classes with none omitted).
    pub fn class_counts(&self) -> BTreeMap<DeviceClass, usize> {
        let mut counts = BTreeMap::new();
        for instance in &self.instances {
            *counts.entry(instance.class).or_insert(0) += 1;
        }
        counts
    }
}
