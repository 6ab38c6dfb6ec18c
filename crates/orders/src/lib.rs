//! Supplier order domain module.
//!
//! Order entries are created by order-management screens and are read-only
//! to this core. The one computation owned here is [`OrderSummary`]: the
//! per-article reduction over a set of order entries.

pub mod order;

pub use order::{OrderEntry, OrderStatus, OrderSummary};
