pub mod types;

pub use types::*;

use std::collections::HashSet;

use crate::model::{parse_amount, Order};

/// Percentage reported when the comparison value is zero but the current
/// value is not. Growth from a zero baseline renders as +100% rather than
/// an infinity or a NaN.
const ZERO_BASELINE_CHANGE: f64 = 100.0;

/// Identity used to count distinct customers. Account ids and billing
/// emails never collide across variants.
#[derive(Debug, Hash, PartialEq, Eq)]
enum CustomerKey<'a> {
    Account(i64),
    Email(&'a str),
}

/// Reduce an order collection to its summary metrics. An empty collection
/// yields the all-zero value; malformed totals contribute zero revenue.
pub fn compute_metrics(orders: &[Order]) -> Metrics {
    if orders.is_empty() {
        return Metrics::default();
    }

    let total_revenue: f64 = orders.iter().map(|o| parse_amount(&o.total)).sum();
    let total_orders = orders.len() as u64;

    let mut customers = HashSet::new();
    for order in orders {
        if order.customer_id != 0 {
            customers.insert(CustomerKey::Account(order.customer_id));
        } else if !order.billing.email.is_empty() {
            customers.insert(CustomerKey::Email(order.billing.email.as_str()));
        }
        // No account and no billing email: nothing to dedupe on, skipped.
    }

    Metrics {
        total_revenue,
        total_orders,
        total_customers: customers.len() as u64,
        avg_order_value: total_revenue / total_orders as f64,
    }
}

/// Signed percentage change of `current` against `comparison`.
///
/// No comparison yields 0. A zero comparison yields 0 when the current
/// value is also zero, otherwise the documented zero-baseline sentinel.
pub fn compute_change(current: f64, comparison: Option<f64>) -> f64 {
    match comparison {
        None => 0.0,
        Some(c) if c == 0.0 => {
            if current == 0.0 {
                0.0
            } else {
                ZERO_BASELINE_CHANGE
            }
        }
        Some(c) => 100.0 * (current - c) / c,
    }
}

impl Metrics {
    /// Attach percentage deltas against a comparison period. All deltas are
    /// zero when no comparison exists.
    pub fn with_comparison(self, comparison: Option<&Metrics>) -> MetricsWithChanges {
        let changes = match comparison {
            None => MetricChanges::default(),
            Some(c) => MetricChanges {
                revenue_change: compute_change(self.total_revenue, Some(c.total_revenue)),
                orders_change: compute_change(
                    self.total_orders as f64,
                    Some(c.total_orders as f64),
                ),
                customers_change: compute_change(
                    self.total_customers as f64,
                    Some(c.total_customers as f64),
                ),
                aov_change: compute_change(self.avg_order_value, Some(c.avg_order_value)),
            },
        };
        MetricsWithChanges {
            metrics: self,
            changes,
        }
    }
}

/// Render a change percentage for display: one decimal, sign-prefixed,
/// with anything inside the +/-0.1 band shown as an unsigned `0.0%`.
pub fn format_change(change: f64) -> String {
    if change.abs() < 0.1 {
        "0.0%".to_string()
    } else if change > 0.0 {
        format!("+{change:.1}%")
    } else {
        format!("{change:.1}%")
    }
}
