use std::collections::HashMap;

use serde::Serialize;

use crate::model::{parse_amount, Order};

/// Accumulated sales for one product across every order's line items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_id: u64,
    pub name: String,
    pub quantity: i64,
    pub revenue: f64,
}

/// Rank products by revenue across all orders' line items, descending,
/// truncated to `limit`. The product name is whichever a line item carried
/// on first encounter. Revenue ties keep first-encountered order (the sort
/// is stable), so the ranking is deterministic.
pub fn top_products(orders: &[Order], limit: usize) -> Vec<ProductSales> {
    let mut sales: Vec<ProductSales> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for order in orders {
        for item in &order.line_items {
            let idx = *index.entry(item.product_id).or_insert_with(|| {
                sales.push(ProductSales {
                    product_id: item.product_id,
                    name: item.name.clone(),
                    quantity: 0,
                    revenue: 0.0,
                });
                sales.len() - 1
            });
            sales[idx].quantity += item.quantity;
            sales[idx].revenue += parse_amount(&item.total);
        }
    }

    sales.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    sales.truncate(limit);
    sales
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with_items(id: u64, items: serde_json::Value) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "date_created": "2024-03-01T10:00:00",
            "total": "0.00",
            "line_items": items
        }))
        .unwrap()
    }

    fn item(product_id: u64, name: &str, quantity: i64, total: &str) -> serde_json::Value {
        serde_json::json!({
            "product_id": product_id,
            "name": name,
            "quantity": quantity,
            "total": total
        })
    }

    #[test]
    fn test_accumulates_across_orders() {
        let orders = vec![
            order_with_items(1, serde_json::json!([item(10, "Clover", 2, "40.00")])),
            order_with_items(
                2,
                serde_json::json!([
                    item(10, "Clover", 1, "20.00"),
                    item(20, "Fescue", 5, "100.00")
                ]),
            ),
        ];
        let top = top_products(&orders, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, 20);
        assert_eq!(top[0].revenue, 100.0);
        assert_eq!(top[0].quantity, 5);
        assert_eq!(top[1].product_id, 10);
        assert_eq!(top[1].revenue, 60.0);
        assert_eq!(top[1].quantity, 3);
        assert_eq!(top[1].name, "Clover");
    }

    #[test]
    fn test_limit_and_descending_order() {
        let items: Vec<serde_json::Value> = (1..=15)
            .map(|i| item(i, &format!("P{i}"), 1, &format!("{}.00", i * 10)))
            .collect();
        let orders = vec![order_with_items(1, serde_json::Value::Array(items))];

        let top = top_products(&orders, 10);
        assert_eq!(top.len(), 10);
        for pair in top.windows(2) {
            assert!(pair[0].revenue >= pair[1].revenue);
        }
        assert_eq!(top[0].product_id, 15);

        // Never more than the distinct product count
        assert_eq!(top_products(&orders, 100).len(), 15);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let orders = vec![
            order_with_items(1, serde_json::json!([item(30, "B", 1, "50.00")])),
            order_with_items(2, serde_json::json!([item(10, "A", 1, "50.00")])),
            order_with_items(3, serde_json::json!([item(20, "C", 1, "50.00")])),
        ];
        let top = top_products(&orders, 10);
        let ids: Vec<u64> = top.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_orders_without_line_items() {
        let orders = vec![order_with_items(1, serde_json::json!([]))];
        assert!(top_products(&orders, 10).is_empty());
        assert!(top_products(&[], 10).is_empty());
    }

    #[test]
    fn test_malformed_item_total() {
        let orders = vec![order_with_items(
            1,
            serde_json::json!([item(10, "A", 2, "oops"), item(10, "A", 1, "30.00")]),
        )];
        let top = top_products(&orders, 10);
        assert_eq!(top[0].revenue, 30.0);
        assert_eq!(top[0].quantity, 3);
    }
}
