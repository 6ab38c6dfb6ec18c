//! Consolidated reporting view and its derived rollups.

use serde::{Deserialize, Serialize};

use reliefdesk_catalog::ItemType;
use reliefdesk_core::ArticleId;

use crate::demand::DemandBreakdown;

/// One consolidated row: aggregated demand plus order-tracking figures.
///
/// Derived, never persisted. Stale the moment any allocation or order
/// mutates; callers recompute instead of caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedArticleView {
    pub article_id: ArticleId,
    pub article_name: String,
    pub item_type: ItemType,
    pub total_quantity: i64,
    /// Total demanded value in minor currency units.
    pub total_value: i64,
    pub breakdown: DemandBreakdown,
    pub quantity_ordered: i64,
    pub quantity_received: i64,
    /// Demand not yet covered by placed orders, floor-clamped at zero.
    pub quantity_pending: i64,
}

/// The full consolidated report handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    /// Rows in the demand table's name-sorted order.
    pub rows: Vec<ConsolidatedArticleView>,
    pub distinct_articles: usize,
    /// Grand total demanded value in minor currency units.
    pub grand_total_value: i64,
}

/// Per-item-type rollup over consolidated rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTypeSummary {
    pub item_type: ItemType,
    pub total_quantity: i64,
    pub quantity_ordered: i64,
    pub quantity_pending: i64,
}

/// Partition rows by item type and sum the quantity figures per partition.
///
/// Item types with no rows are omitted; partitions appear in the fixed
/// [`ItemType::ALL`] order.
pub fn summarize_by_item_type(rows: &[ConsolidatedArticleView]) -> Vec<ItemTypeSummary> {
    ItemType::ALL
        .iter()
        .filter_map(|item_type| {
            let mut summary = ItemTypeSummary {
                item_type: *item_type,
                total_quantity: 0,
                quantity_ordered: 0,
                quantity_pending: 0,
            };
            let mut seen = false;
            for row in rows.iter().filter(|r| r.item_type == *item_type) {
                seen = true;
                summary.total_quantity += row.total_quantity;
                summary.quantity_ordered += row.quantity_ordered;
                summary.quantity_pending += row.quantity_pending;
            }
            seen.then_some(summary)
        })
        .collect()
}

/// Case-insensitive substring match on article name.
pub fn filter_by_name(
    rows: &[ConsolidatedArticleView],
    query: &str,
) -> Vec<ConsolidatedArticleView> {
    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| row.article_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Column a consolidated table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    TotalQuantity,
    TotalValue,
    QuantityOrdered,
    QuantityReceived,
    QuantityPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Stable in-place sort by a displayed column.
///
/// String columns compare via lowercase collation, numeric columns directly.
/// Ties keep their prior relative order in either direction.
pub fn sort_rows(
    rows: &mut [ConsolidatedArticleView],
    column: SortColumn,
    direction: SortDirection,
) {
    rows.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::Name => a
                .article_name
                .to_lowercase()
                .cmp(&b.article_name.to_lowercase()),
            SortColumn::TotalQuantity => a.total_quantity.cmp(&b.total_quantity),
            SortColumn::TotalValue => a.total_value.cmp(&b.total_value),
            SortColumn::QuantityOrdered => a.quantity_ordered.cmp(&b.quantity_ordered),
            SortColumn::QuantityReceived => a.quantity_received.cmp(&b.quantity_received),
            SortColumn::QuantityPending => a.quantity_pending.cmp(&b.quantity_pending),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
