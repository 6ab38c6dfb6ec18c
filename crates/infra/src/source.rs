//! Async read contracts for the remote data store.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use reliefdesk_allocations::{AllocationGroup, AllocationLine};
use reliefdesk_core::ArticleId;
use reliefdesk_orders::OrderEntry;

/// Collaborator fetch failure.
///
/// These are **infrastructure errors** (network, auth, query) as opposed to
/// domain errors. Any one of them aborts the in-flight consolidation; partial
/// results would mislead order planning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("not authorized to read source data")]
    Unauthorized,
}

impl SourceError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}

/// Read access to beneficiary allocation records.
///
/// The three fetches have no ordering dependency between them and may be
/// issued concurrently. Implementations work against the hosted data store;
/// [`crate::InMemoryAllocationSource`] serves tests and dev.
#[async_trait::async_trait]
pub trait AllocationSource: Send + Sync {
    /// All district allocations, grouped by application/grant.
    async fn fetch_district(&self) -> Result<Vec<AllocationGroup>, SourceError>;

    /// All public allocations (single line-items).
    async fn fetch_public(&self) -> Result<Vec<AllocationLine>, SourceError>;

    /// All institution allocations, grouped by application/grant.
    async fn fetch_institutions(&self) -> Result<Vec<AllocationGroup>, SourceError>;
}

/// Read access to supplier order records.
#[async_trait::async_trait]
pub trait OrderSource: Send + Sync {
    /// Order entries referencing any of the given article ids — never the
    /// full order book, to bound query size.
    async fn fetch_for_articles(
        &self,
        article_ids: &BTreeSet<ArticleId>,
    ) -> Result<Vec<OrderEntry>, SourceError>;
}

#[async_trait::async_trait]
impl<S> AllocationSource for Arc<S>
where
    S: AllocationSource + ?Sized,
{
    async fn fetch_district(&self) -> Result<Vec<AllocationGroup>, SourceError> {
        (**self).fetch_district().await
    }

    async fn fetch_public(&self) -> Result<Vec<AllocationLine>, SourceError> {
        (**self).fetch_public().await
    }

    async fn fetch_institutions(&self) -> Result<Vec<AllocationGroup>, SourceError> {
        (**self).fetch_institutions().await
    }
}

#[async_trait::async_trait]
impl<S> OrderSource for Arc<S>
where
    S: OrderSource + ?Sized,
{
    async fn fetch_for_articles(
        &self,
        article_ids: &BTreeSet<ArticleId>,
    ) -> Result<Vec<OrderEntry>, SourceError> {
        (**self).fetch_for_articles(article_ids).await
    }
}
