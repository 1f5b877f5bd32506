//! IP address allocation and management module.
//!
//! This module handles the static class-to-subnet layout, the per-run
//! address registry, and the deterministic fleet allocator built on them.

pub mod allocator;
pub mod error;
pub mod layout;
pub mod registry;

// Re-export commonly used types
pub use allocator::{allocate, allocate_default};
pub use error::AllocationError;
pub use layout::{SubnetAssignment, SubnetLayout, FIRST_ASSIGNABLE_HOST, LAST_USABLE_HOST};
pub use registry::AddressRegistry;
