//! Client for the MercadoLibre public API.
//!
//! Three read endpoints are used: paginated product search, per-item
//! attributes and currency conversion. Every call is timed into the shared
//! `MetricsRegistry`; non-200 responses are not recorded, so failed calls
//! never contribute misleading latency samples.

use crate::metrics::{api_name, MetricsRegistry};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_BASE_URL: &str = "https://api.mercadolibre.com";

/// Status code plus decoded body. Callers only inspect the status and index
/// into the body by key, so responses stay as raw JSON values.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Clone)]
pub struct MeliClient {
    http: Client,
    base_url: String,
    site: String,
    metrics: Arc<MetricsRegistry>,
}

impl MeliClient {
    /// `site` is the country site alias, e.g. MLB (Mercado Libre Brasil).
    pub fn new(base_url: &str, site: &str, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            site: site.to_string(),
            metrics,
        }
    }

    /// One page of the search endpoint. Non-200 statuses are returned to the
    /// caller (pagination treats them as a soft stop).
    pub async fn search_page(
        &self,
        query: &str,
        exclude_seller_id: i64,
        offset: usize,
        limit: usize,
    ) -> Result<ApiResponse> {
        let url = format!("{}/sites/{}/search", self.base_url, self.site);
        let started = Instant::now();
        let response = self
            .http
            .get(url)
            .query(&[("q", query)])
            .query(&[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("seller_id!", exclude_seller_id.to_string()),
            ])
            .send()
            .await?;

        self.finish(api_name::SEARCH, started, response).await
    }

    /// Attributes sub-resource for one item; the caller only reads `warranty`.
    pub async fn item_attributes(&self, item_id: &str) -> Result<ApiResponse> {
        let url = format!("{}/items/{}", self.base_url, item_id);
        let started = Instant::now();
        let response = self.http.get(url).send().await?;

        self.finish(api_name::ITEM_ATTRIBUTES, started, response).await
    }

    /// Conversion rate between two currencies. Unlike search pages, a failed
    /// lookup here is fatal: the whole run depends on the factor.
    pub async fn currency_rate(&self, from_currency: &str, to_currency: &str) -> Result<f64> {
        let url = format!("{}/currency_conversions/search", self.base_url);
        let started = Instant::now();
        let response = self
            .http
            .get(url)
            .query(&[("from", from_currency), ("to", to_currency)])
            .send()
            .await?;

        let response = self
            .finish(api_name::CURRENCY_CONVERTER, started, response)
            .await?;
        if response.status != 200 {
            return Err(EtlError::UpstreamStatus {
                api: api_name::CURRENCY_CONVERTER,
                status: response.status,
            });
        }

        response
            .body
            .get("ratio")
            .and_then(Value::as_f64)
            .ok_or_else(|| EtlError::missing_field("ratio"))
    }

    async fn finish(
        &self,
        api: &str,
        started: Instant,
        response: reqwest::Response,
    ) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        if status != 200 {
            tracing::warn!(api, status, "request failed, request time not measured");
            return Ok(ApiResponse {
                status,
                body: Value::Null,
            });
        }

        let body: Value = response.json().await?;
        self.metrics.record_request(api, started.elapsed());
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> (MeliClient, Arc<MetricsRegistry>) {
        let metrics = Arc::new(MetricsRegistry::new());
        (
            MeliClient::new(&server.base_url(), "MLB", metrics.clone()),
            metrics,
        )
    }

    #[tokio::test]
    async fn test_search_page_returns_body_and_records_one_sample() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/sites/MLB/search")
                .query_param("q", "Iphone 11")
                .query_param("offset", "0")
                .query_param("limit", "50");
            then.status(200)
                .json_body(json!({"results": [{"id": "MLB1"}]}));
        });

        let (client, metrics) = client(&server);
        let response = client.search_page("Iphone 11", 42, 0, 50).await.unwrap();

        mock.assert();
        assert_eq!(response.status, 200);
        assert_eq!(response.body["results"][0]["id"], "MLB1");

        let samples = metrics.request_samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, api_name::SEARCH);
        assert!(samples[0].seconds >= 0.0);
    }

    #[tokio::test]
    async fn test_failed_request_contributes_no_sample() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sites/MLB/search");
            then.status(500);
        });

        let (client, metrics) = client(&server);
        let response = client.search_page("Iphone 11", 42, 0, 50).await.unwrap();

        assert_eq!(response.status, 500);
        assert!(metrics.request_samples().is_empty());
    }

    #[tokio::test]
    async fn test_item_attributes() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/items/MLB1");
            then.status(200).json_body(json!({"warranty": "12 meses"}));
        });

        let (client, metrics) = client(&server);
        let response = client.item_attributes("MLB1").await.unwrap();

        mock.assert();
        assert_eq!(response.body["warranty"], "12 meses");
        assert_eq!(metrics.request_samples()[0].name, api_name::ITEM_ATTRIBUTES);
    }

    #[tokio::test]
    async fn test_currency_rate_parses_ratio() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/currency_conversions/search")
                .query_param("from", "BRL")
                .query_param("to", "USD");
            then.status(200).json_body(json!({"ratio": 0.2}));
        });

        let (client, _metrics) = client(&server);
        let ratio = client.currency_rate("BRL", "USD").await.unwrap();
        assert_eq!(ratio, 0.2);
    }

    #[tokio::test]
    async fn test_currency_rate_non_200_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/currency_conversions/search");
            then.status(503);
        });

        let (client, metrics) = client(&server);
        let err = client.currency_rate("BRL", "USD").await.unwrap_err();

        assert!(matches!(
            err,
            EtlError::UpstreamStatus { status: 503, .. }
        ));
        assert!(metrics.request_samples().is_empty());
    }
}
