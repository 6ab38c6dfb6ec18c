//! Beneficiary allocation domain module.
//!
//! Allocation records capture beneficiary demand per article. They are
//! created by data-entry screens and are read-only to this core: the types
//! here describe the shape the demand aggregation consumes.

pub mod allocation;

pub use allocation::{AllocationGroup, AllocationLine, BeneficiaryCategory};
