//! `reliefdesk-consolidation` — order-consolidation and inventory-reconciliation core.
//!
//! Pure computation crate: receives pre-loaded allocation and order records,
//! returns the consolidated per-article reporting view. No IO, no HTTP, no
//! storage — fetching lives in `reliefdesk-infra`.
//!
//! The computation is an explicit two-stage pipeline:
//!
//! 1. [`demand::aggregate_demand`] scans the three beneficiary allocation
//!    sources and produces a [`demand::DemandTable`] — per-article totals plus
//!    the exact set of article ids touched.
//! 2. [`reconcile::reconcile`] merges order entries (fetched for that id set
//!    only) into the table and derives pending quantities.
//!
//! Downstream consumers treat the resulting [`view::ConsolidatedReport`] as a
//! read-only snapshot; it is computed fresh on every read and never cached.

pub mod demand;
pub mod reconcile;
pub mod view;

pub use demand::{aggregate_demand, DemandBreakdown, DemandEntry, DemandTable};
pub use reconcile::reconcile;
pub use view::{
    filter_by_name, sort_rows, summarize_by_item_type, ConsolidatedArticleView,
    ConsolidatedReport, ItemTypeSummary, SortColumn, SortDirection,
};
