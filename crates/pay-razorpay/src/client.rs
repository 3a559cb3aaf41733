//! # Razorpay Client
//!
//! `CapabilityClient` implementation over the Razorpay REST API.
//! Requests use HTTP basic auth with the key id and secret; responses are
//! returned as raw JSON.

use crate::config::RazorpayConfig;
use crate::wire;
use async_trait::async_trait;
use pay_core::{CapabilityClient, LifecycleAction, Payload, Resource, UpstreamError, UpstreamResult};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Authenticated client for the Razorpay API
pub struct RazorpayClient {
    config: RazorpayConfig,
    http: Client,
}

impl RazorpayClient {
    /// Create a new client
    pub fn new(config: RazorpayConfig) -> UpstreamResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, http })
    }

    /// Create from environment variables
    pub fn from_env() -> UpstreamResult<Self> {
        let config = RazorpayConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    fn get(&self, segments: &[String]) -> UpstreamResult<RequestBuilder> {
        Ok(self
            .http
            .get(self.config.endpoint(segments)?)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret)))
    }

    fn post(&self, segments: &[String], body: &Value) -> UpstreamResult<RequestBuilder> {
        Ok(self
            .http
            .post(self.config.endpoint(segments)?)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(body))
    }

    /// Send a request and decode the JSON response
    async fn send(&self, request: RequestBuilder) -> UpstreamResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);
            return Err(wire::provider_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            UpstreamError::Serialization(format!("Failed to parse Razorpay response: {}", e))
        })
    }
}

#[async_trait]
impl CapabilityClient for RazorpayClient {
    #[instrument(skip(self), fields(resource = %resource))]
    async fn fetch(&self, resource: Resource, id: &str) -> UpstreamResult<Value> {
        let path = wire::entity_path(resource, id)?;
        debug!("GET {}", path.join("/"));
        self.send(self.get(&path)?).await
    }

    #[instrument(skip(self, filters), fields(resource = %resource))]
    async fn list(&self, resource: Resource, filters: &Payload) -> UpstreamResult<Value> {
        let path = wire::collection_segments(resource);
        let query = wire::query_pairs(filters);
        debug!("GET {} ({} filters)", path.join("/"), query.len());
        self.send(self.get(&path)?.query(&query)).await
    }

    #[instrument(skip(self, payload), fields(resource = %resource))]
    async fn create(&self, resource: Resource, payload: &Payload) -> UpstreamResult<Value> {
        let (path, body) = wire::create_request(resource, payload)?;
        debug!("POST {}", path.join("/"));
        self.send(self.post(&path, &body)?).await
    }

    #[instrument(skip(self, payload), fields(resource = %resource, action = action.as_str()))]
    async fn act(
        &self,
        resource: Resource,
        id: &str,
        action: LifecycleAction,
        payload: &Payload,
    ) -> UpstreamResult<Value> {
        let path = wire::action_path(resource, id, action)?;
        debug!("POST {}", path.join("/"));
        self.send(self.post(&path, &Value::Object(payload.clone()))?)
            .await
    }

    fn provider_name(&self) -> &'static str {
        "razorpay"
    }
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY_ID: &str = "rzp_test_abc123";
    const KEY_SECRET: &str = "secret";

    fn client_for(server: &MockServer) -> RazorpayClient {
        let config = RazorpayConfig::new(KEY_ID, KEY_SECRET).with_api_base_url(server.uri());
        RazorpayClient::new(config).unwrap()
    }

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_uses_basic_auth() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/payments/pay_29QQoUBi66xm2f"))
            .and(basic_auth(KEY_ID, KEY_SECRET))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pay_29QQoUBi66xm2f",
                "entity": "payment",
                "amount": 5000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .fetch(Resource::Payment, "pay_29QQoUBi66xm2f")
            .await
            .unwrap();

        assert_eq!(response["entity"], "payment");
        assert_eq!(response["amount"], 5000);
    }

    #[tokio::test]
    async fn test_provider_error_is_decoded() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": "BAD_REQUEST_ERROR",
                    "description": "Order amount less than minimum amount allowed",
                    "field": "amount"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .create(Resource::Order, &payload(json!({"amount": 1, "currency": "INR"})))
            .await
            .unwrap_err();

        match err {
            UpstreamError::Provider { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("BAD_REQUEST_ERROR"));
                assert!(message.contains("minimum amount"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_sends_filters_as_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/subscriptions"))
            .and(query_param("plan_id", "plan_1"))
            .and(query_param("count", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entity": "collection",
                "count": 0,
                "items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .list(
                Resource::Subscription,
                &payload(json!({"plan_id": "plan_1", "count": 5})),
            )
            .await
            .unwrap();

        assert_eq!(response["entity"], "collection");
    }

    #[tokio::test]
    async fn test_payment_link_body_is_nested() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payment_links"))
            .and(body_json(json!({
                "amount": 100000,
                "currency": "INR",
                "description": "Payment for service XYZ",
                "customer": {"name": "Jane Doe", "contact": "+919999999999"},
                "notify": {"sms": true, "email": true},
                "reminder_enable": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "plink_1",
                "short_url": "https://rzp.io/i/abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .create(
                Resource::PaymentLink,
                &payload(json!({
                    "amount": 100000,
                    "currency": "INR",
                    "description": "Payment for service XYZ",
                    "customer_name": "Jane Doe",
                    "customer_contact": "+919999999999"
                })),
            )
            .await
            .unwrap();

        assert_eq!(response["id"], "plink_1");
    }

    #[tokio::test]
    async fn test_refund_posts_to_payment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/payments/pay_1/refund"))
            .and(body_json(json!({"amount": 500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "rfnd_1",
                "entity": "refund"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .create(
                Resource::Refund,
                &payload(json!({"payment_id": "pay_1", "amount": 500})),
            )
            .await
            .unwrap();

        assert_eq!(response["entity"], "refund");
    }

    #[tokio::test]
    async fn test_subscription_action_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/subscriptions/sub_1/cancel"))
            .and(body_json(json!({"cancel_at_cycle_end": 1})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "sub_1",
                "status": "cancelled"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let response = client
            .act(
                Resource::Subscription,
                "sub_1",
                LifecycleAction::Cancel,
                &payload(json!({"cancel_at_cycle_end": 1})),
            )
            .await
            .unwrap();

        assert_eq!(response["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_list_sends_booleans_as_digits() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/settlements/recon/combined"))
            .and(query_param("year", "2024"))
            .and(query_param("expand_card", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entity": "collection",
                "count": 0,
                "items": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .list(
                Resource::SettlementReport,
                &payload(json!({"year": 2024, "expand_card": true})),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refund_id_cannot_reach_other_paths() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "rfnd_1"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .create(
                Resource::Refund,
                &payload(json!({"payment_id": "pay_1/capture?x=", "amount": 500})),
            )
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/v1/payments/pay_1%2Fcapture%3Fx=/refund");
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn test_fetch_id_cannot_traverse() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "BAD_REQUEST_ERROR", "description": "The id provided does not exist"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .fetch(Resource::Payment, "../customers/cust_1")
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Provider { status: 404, .. }));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), "/v1/payments/..%2Fcustomers%2Fcust_1");

        for id in ["..", "."] {
            let err = client
                .act(Resource::Subscription, id, LifecycleAction::Cancel, &Payload::new())
                .await
                .unwrap_err();
            assert!(matches!(err, UpstreamError::Configuration(_)));
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_serialization_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/plans/plan_1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch(Resource::Plan, "plan_1").await.unwrap_err();

        assert!(matches!(err, UpstreamError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let config =
            RazorpayConfig::new(KEY_ID, KEY_SECRET).with_api_base_url("http://127.0.0.1:1");
        let client = RazorpayClient::new(config).unwrap();

        let err = client.fetch(Resource::Order, "order_1").await.unwrap_err();

        assert!(matches!(err, UpstreamError::Network(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_unsupported_action_makes_no_request() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let err = client
            .act(
                Resource::Order,
                "order_1",
                LifecycleAction::Pause,
                &Payload::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Configuration(_)));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
