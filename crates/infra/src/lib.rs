//! `reliefdesk-infra` — collaborator access and load orchestration.
//!
//! The remote data store behind the application (allocations, orders) is a
//! collaborator, not something this workspace owns. This crate defines the
//! async read contracts ([`AllocationSource`], [`OrderSource`]), in-memory
//! implementations for tests/dev, and the [`ConsolidationLoader`] that runs
//! the two-stage consolidation pipeline against them.

pub mod in_memory;
pub mod loader;
pub mod source;

pub use in_memory::{InMemoryAllocationSource, InMemoryOrderSource};
pub use loader::{ConsolidationLoader, LoadError, LoaderConfig};
pub use source::{AllocationSource, OrderSource, SourceError};
