use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reliefdesk_catalog::ArticleRef;
use reliefdesk_core::ApplicationId;

/// Beneficiary category an allocation belongs to.
///
/// Closed set; demand breakdown buckets key off this enum, never off strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeneficiaryCategory {
    District,
    Public,
    Institutions,
}

impl BeneficiaryCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BeneficiaryCategory::District => "district",
            BeneficiaryCategory::Public => "public",
            BeneficiaryCategory::Institutions => "institutions",
        }
    }
}

/// One article line-item inside a beneficiary allocation.
///
/// Quantities and values are optional because legacy records can carry gaps;
/// missing figures contribute zero rather than failing aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    /// Denormalized article snapshot. `None` means the line references an
    /// article this core cannot resolve (data-quality gap, skipped).
    pub article: Option<ArticleRef>,
    pub quantity: Option<i64>,
    /// Per-allocation unit-cost override in minor units; beats the article's
    /// snapshot cost when present.
    pub unit_cost_override: Option<i64>,
    /// Precomputed line value in minor units; beats any cost computation
    /// when present.
    pub value: Option<i64>,
}

impl AllocationLine {
    /// Quantity demanded, treating a missing figure as zero.
    pub fn effective_quantity(&self) -> i64 {
        self.quantity.unwrap_or(0)
    }

    /// Line value in minor units: the precomputed value when present,
    /// otherwise quantity × effective unit cost (override beats the article
    /// snapshot cost). A line with no resolvable cost contributes zero.
    pub fn effective_value(&self) -> i64 {
        if let Some(value) = self.value {
            return value;
        }
        let unit_cost = self
            .unit_cost_override
            .or_else(|| self.article.as_ref().map(|a| a.unit_cost));
        match unit_cost {
            Some(cost) => self.effective_quantity() * cost,
            None => 0,
        }
    }
}

/// Application/grant-scoped bundle of allocation lines.
///
/// District and institution allocations arrive grouped per application;
/// public allocations arrive as bare lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationGroup {
    pub application_id: ApplicationId,
    pub submitted_at: DateTime<Utc>,
    pub lines: Vec<AllocationLine>,
}
