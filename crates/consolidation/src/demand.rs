//! Demand aggregation: scan beneficiary allocations, sum demand per article.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use reliefdesk_allocations::{AllocationGroup, AllocationLine, BeneficiaryCategory};
use reliefdesk_catalog::ItemType;
use reliefdesk_core::ArticleId;

/// Per-category quantity breakdown for one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandBreakdown {
    pub district: i64,
    pub public: i64,
    pub institutions: i64,
}

impl DemandBreakdown {
    pub fn add(&mut self, category: BeneficiaryCategory, quantity: i64) {
        match category {
            BeneficiaryCategory::District => self.district += quantity,
            BeneficiaryCategory::Public => self.public += quantity,
            BeneficiaryCategory::Institutions => self.institutions += quantity,
        }
    }

    pub fn total(&self) -> i64 {
        self.district + self.public + self.institutions
    }
}

/// Aggregated demand for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandEntry {
    pub article_id: ArticleId,
    pub article_name: String,
    pub item_type: ItemType,
    pub total_quantity: i64,
    /// Total demanded value in minor currency units.
    pub total_value: i64,
    pub breakdown: DemandBreakdown,
}

impl DemandEntry {
    fn zero(line: &AllocationLine) -> Option<Self> {
        let article = line.article.as_ref()?;
        Some(Self {
            article_id: article.id,
            article_name: article.name.clone(),
            item_type: article.item_type,
            total_quantity: 0,
            total_value: 0,
            breakdown: DemandBreakdown::default(),
        })
    }
}

/// Output of the demand aggregation stage.
///
/// Entries are sorted by article name, case-insensitive ascending (article id
/// breaks exact-name ties so repeated runs against unchanged data produce
/// identical output). The order reconciliation stage must take
/// [`DemandTable::article_ids`] as its only input, which bounds the order
/// query to articles that actually carry demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandTable {
    entries: Vec<DemandEntry>,
    skipped_lines: usize,
}

impl DemandTable {
    /// Name-sorted demand entries.
    pub fn entries(&self) -> &[DemandEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DemandEntry> {
        self.entries
    }

    /// The exact set of article ids touched by any allocation.
    pub fn article_ids(&self) -> BTreeSet<ArticleId> {
        self.entries.iter().map(|e| e.article_id).collect()
    }

    /// Line-items dropped for data-quality reasons (unresolvable article).
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Aggregate beneficiary demand across the three allocation sources.
///
/// One entry per distinct article referenced by any allocation; articles with
/// zero allocations never appear because the scan iterates allocations, not
/// the catalog. Line-items with a missing quantity or value contribute zero;
/// line-items whose article cannot be resolved are skipped and logged.
pub fn aggregate_demand(
    district: &[AllocationGroup],
    public: &[AllocationLine],
    institutions: &[AllocationGroup],
) -> DemandTable {
    let mut entries: BTreeMap<ArticleId, DemandEntry> = BTreeMap::new();
    let mut skipped_lines = 0usize;

    for group in district {
        for line in &group.lines {
            absorb_line(&mut entries, &mut skipped_lines, line, BeneficiaryCategory::District);
        }
    }
    for line in public {
        absorb_line(&mut entries, &mut skipped_lines, line, BeneficiaryCategory::Public);
    }
    for group in institutions {
        for line in &group.lines {
            absorb_line(
                &mut entries,
                &mut skipped_lines,
                line,
                BeneficiaryCategory::Institutions,
            );
        }
    }

    // BTreeMap iteration gives a deterministic (id-ordered) base; the stable
    // sort by lowercase name then leaves exact-name ties in id order.
    let mut entries: Vec<DemandEntry> = entries.into_values().collect();
    entries.sort_by(|a, b| {
        a.article_name
            .to_lowercase()
            .cmp(&b.article_name.to_lowercase())
    });

    DemandTable {
        entries,
        skipped_lines,
    }
}

fn absorb_line(
    entries: &mut BTreeMap<ArticleId, DemandEntry>,
    skipped_lines: &mut usize,
    line: &AllocationLine,
    category: BeneficiaryCategory,
) {
    let Some(zero) = DemandEntry::zero(line) else {
        *skipped_lines += 1;
        warn!(
            category = category.label(),
            "allocation line references an unresolvable article; skipping"
        );
        return;
    };

    let entry = entries.entry(zero.article_id).or_insert(zero);
    let quantity = line.effective_quantity();
    entry.total_quantity += quantity;
    entry.breakdown.add(category, quantity);
    entry.total_value += line.effective_value();
}
