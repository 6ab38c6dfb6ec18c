//! Consolidation load orchestration.
//!
//! Runs the two-stage pipeline against the collaborator sources: the three
//! demand fetches go out concurrently, the order fetch runs strictly after
//! aggregation (it needs the touched article-id set), and the whole sequence
//! sits under one wall-clock timeout. A per-loader re-entrancy guard stops a
//! second load from starting while one is in flight for the same instance —
//! it is not a cross-process lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use reliefdesk_consolidation::{aggregate_demand, reconcile, ConsolidatedReport};

use crate::source::{AllocationSource, OrderSource, SourceError};

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Wall-clock budget for the whole fetch-and-compute sequence.
    pub timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Consolidation load failure.
///
/// No variant is retried automatically; callers re-invoke
/// [`ConsolidationLoader::load`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A source fetch failed; the whole load aborts with no partial result.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The wall-clock budget expired.
    #[error("consolidation load timed out")]
    TimedOut,

    /// A load is already in flight on this loader instance.
    #[error("a consolidation load is already in flight")]
    AlreadyLoading,
}

/// Orchestrates one consolidation load at a time against the sources.
pub struct ConsolidationLoader {
    allocations: Arc<dyn AllocationSource>,
    orders: Arc<dyn OrderSource>,
    config: LoaderConfig,
    in_flight: AtomicBool,
}

impl ConsolidationLoader {
    pub fn new(allocations: Arc<dyn AllocationSource>, orders: Arc<dyn OrderSource>) -> Self {
        Self::with_config(allocations, orders, LoaderConfig::default())
    }

    pub fn with_config(
        allocations: Arc<dyn AllocationSource>,
        orders: Arc<dyn OrderSource>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            allocations,
            orders,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one consolidation load.
    ///
    /// Returns [`LoadError::AlreadyLoading`] without touching the sources if
    /// a load is in flight on this instance. The in-flight flag is released
    /// on every exit path, including timeout, so a manual retry can always
    /// start fresh.
    pub async fn load(&self) -> Result<ConsolidatedReport, LoadError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(LoadError::AlreadyLoading)?;

        match tokio::time::timeout(self.config.timeout, self.run()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.config.timeout.as_secs(), "consolidation load timed out");
                Err(LoadError::TimedOut)
            }
        }
    }

    async fn run(&self) -> Result<ConsolidatedReport, LoadError> {
        // No ordering dependency between the three demand sources.
        let (district, public, institutions) = tokio::try_join!(
            self.allocations.fetch_district(),
            self.allocations.fetch_public(),
            self.allocations.fetch_institutions(),
        )
        .map_err(|e| {
            warn!(error = %e, "demand source fetch failed; aborting load");
            e
        })?;

        let demand = aggregate_demand(&district, &public, &institutions);
        if demand.skipped_lines() > 0 {
            warn!(skipped = demand.skipped_lines(), "allocation lines skipped during aggregation");
        }

        // The order fetch is bounded to exactly the articles demand touched.
        let article_ids = demand.article_ids();
        let orders = self
            .orders
            .fetch_for_articles(&article_ids)
            .await
            .map_err(|e| {
                warn!(error = %e, "order fetch failed; not returning demand-only data");
                e
            })?;

        let report = reconcile(demand, &orders);
        info!(
            articles = report.distinct_articles,
            grand_total_value = report.grand_total_value,
            "consolidation load complete"
        );
        Ok(report)
    }
}

/// RAII in-flight flag: released on drop so error and timeout paths cannot
/// leave the loader wedged.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::Utc;

    use reliefdesk_allocations::{AllocationGroup, AllocationLine};
    use reliefdesk_catalog::{ArticleRef, ItemType};
    use reliefdesk_core::{ApplicationId, ArticleId, OrderEntryId};
    use reliefdesk_orders::{OrderEntry, OrderStatus};

    use crate::in_memory::{InMemoryAllocationSource, InMemoryOrderSource};

    fn article(name: &str, unit_cost: i64) -> ArticleRef {
        ArticleRef {
            id: ArticleId::new(),
            name: name.to_string(),
            unit_cost,
            item_type: ItemType::Article,
        }
    }

    fn line(article: &ArticleRef, quantity: i64) -> AllocationLine {
        AllocationLine {
            article: Some(article.clone()),
            quantity: Some(quantity),
            unit_cost_override: None,
            value: None,
        }
    }

    fn group(lines: Vec<AllocationLine>) -> AllocationGroup {
        AllocationGroup {
            application_id: ApplicationId::new(),
            submitted_at: Utc::now(),
            lines,
        }
    }

    fn order(article_id: ArticleId, quantity: i64, status: OrderStatus) -> OrderEntry {
        OrderEntry {
            id: OrderEntryId::new(),
            article_id,
            quantity_ordered: quantity,
            status,
            ordered_at: Utc::now(),
            fund_request: None,
        }
    }

    /// Allocation source whose public fetch always fails.
    struct FailingAllocationSource;

    #[async_trait::async_trait]
    impl AllocationSource for FailingAllocationSource {
        async fn fetch_district(&self) -> Result<Vec<AllocationGroup>, SourceError> {
            Ok(vec![])
        }

        async fn fetch_public(&self) -> Result<Vec<AllocationLine>, SourceError> {
            Err(SourceError::network("connection reset"))
        }

        async fn fetch_institutions(&self) -> Result<Vec<AllocationGroup>, SourceError> {
            Ok(vec![])
        }
    }

    /// Order source that always fails.
    struct FailingOrderSource;

    #[async_trait::async_trait]
    impl OrderSource for FailingOrderSource {
        async fn fetch_for_articles(
            &self,
            _article_ids: &BTreeSet<ArticleId>,
        ) -> Result<Vec<OrderEntry>, SourceError> {
            Err(SourceError::query("orders table unavailable"))
        }
    }

    /// Order source that records the id set it was asked for.
    struct RecordingOrderSource {
        requested: std::sync::Mutex<Option<BTreeSet<ArticleId>>>,
    }

    #[async_trait::async_trait]
    impl OrderSource for RecordingOrderSource {
        async fn fetch_for_articles(
            &self,
            article_ids: &BTreeSet<ArticleId>,
        ) -> Result<Vec<OrderEntry>, SourceError> {
            *self.requested.lock().unwrap() = Some(article_ids.clone());
            Ok(vec![])
        }
    }

    /// Allocation source that blocks the district fetch until released.
    struct GatedAllocationSource {
        gate: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl AllocationSource for GatedAllocationSource {
        async fn fetch_district(&self) -> Result<Vec<AllocationGroup>, SourceError> {
            self.gate.notified().await;
            Ok(vec![])
        }

        async fn fetch_public(&self) -> Result<Vec<AllocationLine>, SourceError> {
            Ok(vec![])
        }

        async fn fetch_institutions(&self) -> Result<Vec<AllocationGroup>, SourceError> {
            Ok(vec![])
        }
    }

    /// Allocation source that never answers (timeout exercises).
    struct StalledAllocationSource;

    #[async_trait::async_trait]
    impl AllocationSource for StalledAllocationSource {
        async fn fetch_district(&self) -> Result<Vec<AllocationGroup>, SourceError> {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok(vec![])
        }

        async fn fetch_public(&self) -> Result<Vec<AllocationLine>, SourceError> {
            Ok(vec![])
        }

        async fn fetch_institutions(&self) -> Result<Vec<AllocationGroup>, SourceError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn load_produces_consolidated_report() {
        let a1 = article("A1", 100);
        let a2 = article("A2", 100);

        let allocations = Arc::new(InMemoryAllocationSource::new());
        allocations.set_district(vec![group(vec![line(&a1, 10)])]);
        allocations.set_public(vec![line(&a1, 5)]);
        allocations.set_institutions(vec![group(vec![line(&a2, 3)])]);

        let orders = Arc::new(InMemoryOrderSource::new());
        orders.set_entries(vec![order(a1.id, 8, OrderStatus::Placed)]);

        let loader = ConsolidationLoader::new(allocations, orders);
        let report = loader.load().await.unwrap();

        assert_eq!(report.distinct_articles, 2);
        assert_eq!(report.rows[0].total_quantity, 15);
        assert_eq!(report.rows[0].quantity_ordered, 8);
        assert_eq!(report.rows[0].quantity_pending, 7);
        assert_eq!(report.rows[1].total_quantity, 3);
        assert_eq!(report.rows[1].quantity_pending, 3);
    }

    #[tokio::test]
    async fn repeated_loads_against_unchanged_data_are_identical() {
        let a1 = article("A1", 100);
        let allocations = Arc::new(InMemoryAllocationSource::new());
        allocations.set_public(vec![line(&a1, 5)]);
        let orders = Arc::new(InMemoryOrderSource::new());

        let loader = ConsolidationLoader::new(allocations, orders);
        let first = loader.load().await.unwrap();
        let second = loader.load().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn demand_source_failure_aborts_whole_load() {
        let loader = ConsolidationLoader::new(
            Arc::new(FailingAllocationSource),
            Arc::new(InMemoryOrderSource::new()),
        );

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, LoadError::Source(SourceError::Network(_))));
    }

    #[tokio::test]
    async fn order_fetch_failure_is_never_demand_only_data() {
        let a1 = article("A1", 100);
        let allocations = Arc::new(InMemoryAllocationSource::new());
        allocations.set_public(vec![line(&a1, 5)]);

        let loader =
            ConsolidationLoader::new(allocations, Arc::new(FailingOrderSource));

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, LoadError::Source(SourceError::Query(_))));
    }

    #[tokio::test]
    async fn order_fetch_is_bounded_to_demanded_articles() {
        let a1 = article("A1", 100);
        let allocations = Arc::new(InMemoryAllocationSource::new());
        allocations.set_public(vec![line(&a1, 5)]);

        let recording = Arc::new(RecordingOrderSource {
            requested: std::sync::Mutex::new(None),
        });
        let loader = ConsolidationLoader::new(allocations, recording.clone());
        loader.load().await.unwrap();

        let requested = recording.requested.lock().unwrap().clone().unwrap();
        assert_eq!(requested, BTreeSet::from([a1.id]));
    }

    #[tokio::test]
    async fn second_load_while_in_flight_is_rejected() {
        let source = Arc::new(GatedAllocationSource {
            gate: tokio::sync::Notify::new(),
        });
        let loader = Arc::new(ConsolidationLoader::new(
            source.clone(),
            Arc::new(InMemoryOrderSource::new()),
        ));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load().await }
        });

        // Let the first load reach the gated fetch.
        tokio::task::yield_now().await;
        assert!(matches!(loader.load().await, Err(LoadError::AlreadyLoading)));

        source.gate.notify_one();
        first.await.unwrap().unwrap();

        // Guard released; a fresh load goes through (permit stored up front
        // so the gated fetch does not block again).
        source.gate.notify_one();
        assert!(loader.load().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_and_releases_the_guard() {
        let allocations: Arc<dyn AllocationSource> = Arc::new(StalledAllocationSource);
        let loader = ConsolidationLoader::with_config(
            allocations,
            Arc::new(InMemoryOrderSource::new()),
            LoaderConfig {
                timeout: Duration::from_secs(20),
            },
        );

        let err = loader.load().await.unwrap_err();
        assert_eq!(err, LoadError::TimedOut);

        // Manual retry is possible immediately; the flag is not stuck.
        assert!(!loader.in_flight.load(Ordering::Acquire));
    }
}
