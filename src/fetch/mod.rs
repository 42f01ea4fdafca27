use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::model::{Order, Product};
use crate::period::DateRange;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Where order records come from. The dashboard orchestrator sees only
/// this seam, so tests can script a source without a store.
pub trait OrderSource {
    /// Fetch every order created inside the range, bounds inclusive.
    fn orders_in_range(
        &self,
        range: &DateRange,
    ) -> impl std::future::Future<Output = Result<Vec<Order>>> + Send;
}

/// REST client for a WooCommerce-style store API.
///
/// Authenticates with consumer key/secret as query parameters, which the
/// API accepts over HTTPS. Credentials are passed through, never stored
/// anywhere else.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: Url,
    consumer_key: String,
    consumer_secret: String,
    page_size: u32,
}

impl StoreClient {
    /// Build a client for a base URL like
    /// `https://store.example.com/wp-json/wc/v3`.
    pub fn new(
        base_url: &str,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let consumer_key = consumer_key.into();
        let consumer_secret = consumer_secret.into();
        if consumer_key.is_empty() || consumer_secret.is_empty() {
            return Err(Error::Config(
                "consumer key and secret are required".into(),
            ));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            consumer_key,
            consumer_secret,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the catalog's most popular products, single page.
    pub async fn products(&self, limit: u32) -> Result<Vec<Product>> {
        let query = [
            ("consumer_key", self.consumer_key.clone()),
            ("consumer_secret", self.consumer_secret.clone()),
            ("orderby", "popularity".to_string()),
            ("order", "desc".to_string()),
            ("per_page", limit.to_string()),
        ];
        let (products, _) = self.get_json("products", &query).await?;
        Ok(products)
    }

    /// Connectivity probe: fetch a single order and discard it.
    pub async fn ping(&self) -> Result<()> {
        let query = [
            ("consumer_key", self.consumer_key.clone()),
            ("consumer_secret", self.consumer_secret.clone()),
            ("per_page", "1".to_string()),
        ];
        let _: (Vec<Order>, _) = self.get_json("orders", &query).await?;
        Ok(())
    }

    /// Query parameters for one page of an orders-in-range request.
    fn order_query(&self, range: &DateRange, page: u32) -> Vec<(&'static str, String)> {
        let (after, before) = range.query_bounds();
        vec![
            ("consumer_key", self.consumer_key.clone()),
            ("consumer_secret", self.consumer_secret.clone()),
            ("after", after.format(QUERY_TIME_FORMAT).to_string()),
            ("before", before.format(QUERY_TIME_FORMAT).to_string()),
            ("orderby", "date".to_string()),
            ("order", "desc".to_string()),
            ("per_page", self.page_size.to_string()),
            ("page", page.to_string()),
        ]
    }

    /// Join a path onto the base URL. `Url::join` would replace the last
    /// path segment of a version-suffixed base, so splice strings instead.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&joined)?)
    }

    /// GET a JSON payload, returning it with the `X-WP-TotalPages` header
    /// when the API sends one. Non-success statuses become `Error::Api`
    /// with the response body; nothing is retried here.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Option<u32>)> {
        let url = self.endpoint(path)?;
        log::debug!("GET {}", url.path());
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let total_pages = response
            .headers()
            .get("x-wp-totalpages")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        Ok((response.json::<T>().await?, total_pages))
    }
}

impl OrderSource for StoreClient {
    /// Paginated retrieval: pages accumulate until the total-pages header
    /// (or a short page, when the header is missing) says we are done.
    async fn orders_in_range(&self, range: &DateRange) -> Result<Vec<Order>> {
        let mut all: Vec<Order> = Vec::new();
        let mut page = 1u32;
        loop {
            let query = self.order_query(range, page);
            let (orders, total_pages): (Vec<Order>, _) =
                self.get_json("orders", &query).await?;
            let count = orders.len() as u32;
            all.extend(orders);

            let more = match total_pages {
                Some(total) => page < total,
                None => count == self.page_size,
            };
            if !more {
                break;
            }
            page += 1;
        }
        log::info!("fetched {} orders for {range}", all.len());
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn client() -> StoreClient {
        StoreClient::new(
            "https://store.example.com/wp-json/wc/v3",
            "ck_test",
            "cs_test",
        )
        .unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
    }

    #[test]
    fn test_new_requires_credentials() {
        let err = StoreClient::new("https://store.example.com/wp-json/wc/v3", "", "cs");
        assert!(matches!(err, Err(Error::Config(_))));

        let err = StoreClient::new("not a url", "ck", "cs");
        assert!(matches!(err, Err(Error::UrlParse(_))));
    }

    #[test]
    fn test_order_query_params() {
        let query = client().order_query(&range(), 2);
        let get = |k: &str| {
            query
                .iter()
                .find(|(key, _)| *key == k)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        assert_eq!(get("after"), "2024-03-01T00:00:00");
        assert_eq!(get("before"), "2024-03-15T23:59:59");
        assert_eq!(get("orderby"), "date");
        assert_eq!(get("order"), "desc");
        assert_eq!(get("per_page"), "100");
        assert_eq!(get("page"), "2");
        assert_eq!(get("consumer_key"), "ck_test");
    }

    #[test]
    fn test_page_size_override() {
        let c = client().with_page_size(25);
        let query = c.order_query(&range(), 1);
        assert!(query.contains(&("per_page", "25".to_string())));

        // Zero would loop forever; clamped to one
        let c = client().with_page_size(0);
        assert!(c.order_query(&range(), 1).contains(&("per_page", "1".to_string())));
    }

    #[test]
    fn test_endpoint_join() {
        let c = client();
        assert_eq!(
            c.endpoint("orders").unwrap().as_str(),
            "https://store.example.com/wp-json/wc/v3/orders"
        );
        // Trailing slash on the base or leading slash on the path is fine
        let c = StoreClient::new("https://store.example.com/wp-json/wc/v3/", "ck", "cs").unwrap();
        assert_eq!(
            c.endpoint("/products").unwrap().as_str(),
            "https://store.example.com/wp-json/wc/v3/products"
        );
    }
}
