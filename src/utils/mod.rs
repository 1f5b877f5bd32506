//! Shared utilities: CIDR helpers and plan validation.

pub mod ip_utils;
pub mod validation;

pub use ip_utils::{host_at, is_private_net, nets_overlap, slash16, slash24, Ipv4Net};
pub use validation::{verify_plan, PlanViolation};
