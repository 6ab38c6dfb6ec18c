//! Order reconciliation: merge supplier order figures into the demand table.

use std::collections::BTreeMap;

use reliefdesk_core::ArticleId;
use reliefdesk_orders::{OrderEntry, OrderSummary};

use crate::demand::DemandTable;
use crate::view::{ConsolidatedArticleView, ConsolidatedReport};

/// Merge order entries into the demand table.
///
/// `orders` must have been fetched for the table's [`DemandTable::article_ids`]
/// set; entries for articles outside the table are ignored. Every demand
/// entry gains `quantity_ordered` (all statuses), `quantity_received`
/// (delivery-complete only) and the clamped `quantity_pending`. Articles with
/// no matching orders get explicit zeros — "no orders yet" is a legitimate
/// figure, distinct from a failed order fetch, which the caller must never
/// turn into a call to this function.
pub fn reconcile(demand: DemandTable, orders: &[OrderEntry]) -> ConsolidatedReport {
    let mut summaries: BTreeMap<ArticleId, OrderSummary> = BTreeMap::new();
    for entry in orders {
        summaries.entry(entry.article_id).or_default().absorb(entry);
    }

    let rows: Vec<ConsolidatedArticleView> = demand
        .into_entries()
        .into_iter()
        .map(|entry| {
            let summary = summaries
                .get(&entry.article_id)
                .copied()
                .unwrap_or_default();
            let pending = (entry.total_quantity - summary.quantity_ordered).max(0);
            ConsolidatedArticleView {
                article_id: entry.article_id,
                article_name: entry.article_name,
                item_type: entry.item_type,
                total_quantity: entry.total_quantity,
                total_value: entry.total_value,
                breakdown: entry.breakdown,
                quantity_ordered: summary.quantity_ordered,
                quantity_received: summary.quantity_received,
                quantity_pending: pending,
            }
        })
        .collect();

    let distinct_articles = rows.len();
    let grand_total_value = rows.iter().map(|r| r.total_value).sum();

    ConsolidatedReport {
        rows,
        distinct_articles,
        grand_total_value,
    }
}
