pub mod date_util;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod model;
pub mod period;
pub mod products;
pub mod timeseries;

pub use error::{Error, Result};
pub use fetch::{OrderSource, StoreClient};
pub use metrics::{
    compute_change, compute_metrics, format_change, MetricChanges, Metrics, MetricsWithChanges,
};
pub use model::{Billing, LineItem, Order, Product};
pub use period::{ComparisonMode, DateRange, Period};
pub use products::{top_products, ProductSales};
pub use timeseries::{bucket_orders, Bucket, Granularity};

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::Serialize;

/// What to compute on the next refresh.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub period: Period,
    pub comparison: Option<ComparisonMode>,
    pub granularity: Granularity,
    pub top_limit: usize,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            period: Period::MonthToDate,
            comparison: None,
            granularity: Granularity::Daily,
            top_limit: 10,
        }
    }
}

/// Everything one dashboard render needs, computed from a single refresh.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generation: u64,
    pub period: String,
    pub range: DateRange,
    pub comparison_range: Option<DateRange>,
    pub metrics: MetricsWithChanges,
    pub revenue_series: Vec<Bucket>,
    pub comparison_series: Option<Vec<Bucket>>,
    pub top_products: Vec<ProductSales>,
    /// The current period's raw orders, for the orders table.
    pub orders: Vec<Order>,
}

/// Main entry point: owns the order source and turns refresh requests
/// into snapshots. All aggregation below this point is pure; the only
/// state here is the refresh generation counter.
pub struct Dashboard<S: OrderSource> {
    source: S,
    generation: AtomicU64,
}

impl<S: OrderSource + Sync> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Refresh against the local calendar date.
    pub async fn refresh(&self, options: &RefreshOptions) -> Result<DashboardSnapshot> {
        self.refresh_as_of(chrono::Local::now().date_naive(), options)
            .await
    }

    /// Refresh as of a fixed calendar date.
    ///
    /// The current and comparison fetches run concurrently; a failure in
    /// either aborts the whole refresh with that error, so the caller
    /// never renders a partial dashboard. A refresh that was overtaken by
    /// a newer one while its fetches were in flight returns
    /// `Error::Superseded` instead of stale data.
    pub async fn refresh_as_of(
        &self,
        today: NaiveDate,
        options: &RefreshOptions,
    ) -> Result<DashboardSnapshot> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let range = options.period.date_range(today);
        let comparison_range = options
            .comparison
            .map(|mode| options.period.comparison_range(today, mode));
        log::debug!(
            "refresh {generation}: period {} range {range}, comparison {:?}",
            options.period,
            comparison_range.map(|r| r.to_string())
        );

        let comparison_fetch = async {
            match &comparison_range {
                Some(r) => self.source.orders_in_range(r).await.map(Some),
                None => Ok(None),
            }
        };
        let (current_orders, comparison_orders) =
            tokio::try_join!(self.source.orders_in_range(&range), comparison_fetch)?;

        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("refresh {generation} superseded, discarding results");
            return Err(Error::Superseded);
        }

        let comparison_metrics = comparison_orders.as_deref().map(compute_metrics);
        let metrics =
            compute_metrics(&current_orders).with_comparison(comparison_metrics.as_ref());
        let revenue_series = bucket_orders(&current_orders, options.granularity);
        let comparison_series = comparison_orders
            .as_deref()
            .map(|orders| bucket_orders(orders, options.granularity));
        let ranked = top_products(&current_orders, options.top_limit);

        Ok(DashboardSnapshot {
            generation,
            period: options.period.token().to_string(),
            range,
            comparison_range,
            metrics,
            revenue_series,
            comparison_series,
            top_products: ranked,
            orders: current_orders,
        })
    }
}
