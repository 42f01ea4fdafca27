use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// An order record as returned by the store's REST API. Only the fields
/// the aggregators read are declared; everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub status: String,
    #[serde(deserialize_with = "de_datetime_lenient")]
    pub date_created: NaiveDateTime,
    pub total: String,
    /// 0 means a guest checkout with no customer account.
    #[serde(default)]
    pub customer_id: i64,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Display name for the orders table: billing name, then email, then "Guest".
    pub fn customer_name(&self) -> String {
        let name = format!("{} {}", self.billing.first_name, self.billing.last_name);
        let name = name.trim();
        if !name.is_empty() {
            name.to_string()
        } else if !self.billing.email.is_empty() {
            self.billing.email.clone()
        } else {
            "Guest".to_string()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Billing {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub total: String,
}

/// A catalog product from the `/products` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_sales: i64,
    #[serde(default)]
    pub price: String,
}

/// Parse a decimal-string amount. Anything that is not a finite number
/// contributes zero; monetary fields are never allowed to fail a refresh.
pub fn parse_amount(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// The API reports timestamps as `2024-03-01T12:34:56` in the store's
/// local time, with no zone suffix. Also accepts a bare date (midnight).
fn de_datetime_lenient<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_datetime_lenient(&s).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid date_created: {s}"))
    })
}

pub(crate) fn parse_datetime_lenient(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches('Z');
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}
