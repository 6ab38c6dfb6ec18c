//! In-memory source implementations for tests and dev.

use std::collections::BTreeSet;
use std::sync::RwLock;

use reliefdesk_allocations::{AllocationGroup, AllocationLine};
use reliefdesk_core::ArticleId;
use reliefdesk_orders::OrderEntry;

use crate::source::{AllocationSource, OrderSource, SourceError};

/// In-memory allocation source.
#[derive(Debug, Default)]
pub struct InMemoryAllocationSource {
    district: RwLock<Vec<AllocationGroup>>,
    public: RwLock<Vec<AllocationLine>>,
    institutions: RwLock<Vec<AllocationGroup>>,
}

impl InMemoryAllocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_district(&self, groups: Vec<AllocationGroup>) {
        if let Ok(mut slot) = self.district.write() {
            *slot = groups;
        }
    }

    pub fn set_public(&self, lines: Vec<AllocationLine>) {
        if let Ok(mut slot) = self.public.write() {
            *slot = lines;
        }
    }

    pub fn set_institutions(&self, groups: Vec<AllocationGroup>) {
        if let Ok(mut slot) = self.institutions.write() {
            *slot = groups;
        }
    }
}

#[async_trait::async_trait]
impl AllocationSource for InMemoryAllocationSource {
    async fn fetch_district(&self) -> Result<Vec<AllocationGroup>, SourceError> {
        Ok(self.district.read().map(|g| g.clone()).unwrap_or_default())
    }

    async fn fetch_public(&self) -> Result<Vec<AllocationLine>, SourceError> {
        Ok(self.public.read().map(|l| l.clone()).unwrap_or_default())
    }

    async fn fetch_institutions(&self) -> Result<Vec<AllocationGroup>, SourceError> {
        Ok(self
            .institutions
            .read()
            .map(|g| g.clone())
            .unwrap_or_default())
    }
}

/// In-memory order source.
#[derive(Debug, Default)]
pub struct InMemoryOrderSource {
    entries: RwLock<Vec<OrderEntry>>,
}

impl InMemoryOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entries(&self, entries: Vec<OrderEntry>) {
        if let Ok(mut slot) = self.entries.write() {
            *slot = entries;
        }
    }
}

#[async_trait::async_trait]
impl OrderSource for InMemoryOrderSource {
    async fn fetch_for_articles(
        &self,
        article_ids: &BTreeSet<ArticleId>,
    ) -> Result<Vec<OrderEntry>, SourceError> {
        let entries = self.entries.read().map(|e| e.clone()).unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter(|e| article_ids.contains(&e.article_id))
            .collect())
    }
}
