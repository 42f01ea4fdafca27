use serde::Serialize;

/// Summary metrics over one order collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub total_customers: u64,
    pub avg_order_value: f64,
}

/// Signed percentage deltas against a comparison period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricChanges {
    pub revenue_change: f64,
    pub orders_change: f64,
    pub customers_change: f64,
    pub aov_change: f64,
}

/// Metrics for the current period plus deltas against the comparison
/// period. All deltas are zero when no comparison was requested.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsWithChanges {
    #[serde(flatten)]
    pub metrics: Metrics,
    pub changes: MetricChanges,
}
