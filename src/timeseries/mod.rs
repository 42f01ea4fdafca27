use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::date_util::week_start_sunday;
use crate::model::{parse_amount, Order};

/// Chart bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Map a granularity token. Unknown tokens fall back to `Daily`, the
    /// same permissive policy period tokens get.
    pub fn from_token(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Granularity::Weekly,
            "monthly" => Granularity::Monthly,
            "daily" => Granularity::Daily,
            other => {
                log::debug!("unrecognized granularity '{other}', defaulting to daily");
                Granularity::Daily
            }
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// The bucket key for an order dated `d`: the day itself, the Sunday
    /// on or before it, or the first of its month.
    fn bucket_key(&self, d: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => d,
            Granularity::Weekly => week_start_sunday(d),
            Granularity::Monthly => d.with_day(1).unwrap(),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// One aggregation cell of the revenue time series. Carries the summed
/// total and the merge count, not the raw orders, so chart payloads stay
/// bounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub date: NaiveDate,
    pub total: f64,
    pub order_count: u64,
}

/// Re-bucket orders into a revenue series, ascending by bucket date.
/// Orders sharing a key merge; malformed totals contribute zero.
pub fn bucket_orders(orders: &[Order], granularity: Granularity) -> Vec<Bucket> {
    let mut buckets: BTreeMap<NaiveDate, (f64, u64)> = BTreeMap::new();
    for order in orders {
        let key = granularity.bucket_key(order.date_created.date());
        let slot = buckets.entry(key).or_insert((0.0, 0));
        slot.0 += parse_amount(&order.total);
        slot.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(date, (total, order_count))| Bucket {
            date,
            total,
            order_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, total: &str, date: &str) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "date_created": date,
            "total": total
        }))
        .unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_granularity_from_token() {
        assert_eq!(Granularity::from_token("daily"), Granularity::Daily);
        assert_eq!(Granularity::from_token("Weekly"), Granularity::Weekly);
        assert_eq!(Granularity::from_token("monthly"), Granularity::Monthly);
        assert_eq!(Granularity::from_token("hourly"), Granularity::Daily);
    }

    #[test]
    fn test_single_order_daily() {
        let orders = vec![order(1, "49.95", "2024-03-01T14:30:00")];
        let buckets = bucket_orders(&orders, Granularity::Daily);
        assert_eq!(
            buckets,
            vec![Bucket {
                date: d(2024, 3, 1),
                total: 49.95,
                order_count: 1
            }]
        );
    }

    #[test]
    fn test_daily_merges_and_sorts() {
        // Deliberately out of order on input
        let orders = vec![
            order(3, "30", "2024-03-08T09:00:00"),
            order(1, "100", "2024-03-01T10:00:00"),
            order(2, "50", "2024-03-01T18:00:00"),
        ];
        let buckets = bucket_orders(&orders, Granularity::Daily);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, d(2024, 3, 1));
        assert_eq!(buckets[0].total, 150.0);
        assert_eq!(buckets[0].order_count, 2);
        assert_eq!(buckets[1].date, d(2024, 3, 8));
        assert_eq!(buckets[1].total, 30.0);
        assert_eq!(buckets[1].order_count, 1);
    }

    #[test]
    fn test_weekly_buckets_start_sunday() {
        // 2024-03-01 and 2024-03-08 are Fridays in different Sunday weeks
        let orders = vec![
            order(1, "100", "2024-03-01T10:00:00"),
            order(2, "50", "2024-03-01T18:00:00"),
            order(3, "30", "2024-03-08T09:00:00"),
        ];
        let buckets = bucket_orders(&orders, Granularity::Weekly);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, d(2024, 2, 25));
        assert_eq!(buckets[0].total, 150.0);
        assert_eq!(buckets[1].date, d(2024, 3, 3));
        assert_eq!(buckets[1].total, 30.0);
    }

    #[test]
    fn test_monthly_buckets() {
        let orders = vec![
            order(1, "10", "2024-02-29T08:00:00"),
            order(2, "20", "2024-03-01T08:00:00"),
            order(3, "30", "2024-03-28T08:00:00"),
        ];
        let buckets = bucket_orders(&orders, Granularity::Monthly);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, d(2024, 2, 1));
        assert_eq!(buckets[0].total, 10.0);
        assert_eq!(buckets[1].date, d(2024, 3, 1));
        assert_eq!(buckets[1].total, 50.0);
        assert_eq!(buckets[1].order_count, 2);
    }

    #[test]
    fn test_conservation_across_granularities() {
        let orders = vec![
            order(1, "12.34", "2024-01-15T10:00:00"),
            order(2, "56.78", "2024-02-20T10:00:00"),
            order(3, "90.12", "2024-02-25T10:00:00"),
            order(4, "3.45", "2024-03-08T10:00:00"),
            order(5, "bogus", "2024-03-09T10:00:00"),
        ];
        let expected: f64 = 12.34 + 56.78 + 90.12 + 3.45;
        for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
            let total: f64 = bucket_orders(&orders, granularity)
                .iter()
                .map(|b| b.total)
                .sum();
            assert!(
                (total - expected).abs() < 1e-9,
                "{granularity}: {total} != {expected}"
            );
        }
    }

    #[test]
    fn test_empty_orders() {
        assert!(bucket_orders(&[], Granularity::Daily).is_empty());
    }
}
