use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reliefdesk_core::{ArticleId, FundRequestId, OrderEntryId};

/// Supplier order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Draft,
    Placed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivery-complete marker. Receipt is all-or-nothing per entry; no
    /// row-level partial-receipt quantity is modeled.
    pub fn is_delivered(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

/// A supplier order placed against one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: OrderEntryId,
    pub article_id: ArticleId,
    pub quantity_ordered: i64,
    pub status: OrderStatus,
    pub ordered_at: DateTime<Utc>,
    /// Fund request this order originated from, if any.
    pub fund_request: Option<FundRequestId>,
}

/// Per-article reduction over a set of order entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Sum of ordered quantities across all entries, regardless of status.
    pub quantity_ordered: i64,
    /// Sum restricted to entries whose status is delivery-complete.
    pub quantity_received: i64,
}

impl OrderSummary {
    pub fn absorb(&mut self, entry: &OrderEntry) {
        self.quantity_ordered += entry.quantity_ordered;
        if entry.status.is_delivered() {
            self.quantity_received += entry.quantity_ordered;
        }
    }

    /// Reduce a slice of entries into one summary.
    pub fn of(entries: &[OrderEntry]) -> Self {
        let mut summary = OrderSummary::default();
        for entry in entries {
            summary.absorb(entry);
        }
        summary
    }
}
