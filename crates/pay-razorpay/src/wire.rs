//! # Razorpay Wire Format
//!
//! Request paths and body shaping for the Razorpay REST API, and decoding of
//! its error envelope.

use pay_core::{LifecycleAction, Payload, Resource, UpstreamError, UpstreamResult};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Collection path for a resource, relative to `/v1/`
pub fn collection(resource: Resource) -> &'static str {
    match resource {
        Resource::Payment => "payments",
        Resource::Order => "orders",
        Resource::Customer => "customers",
        Resource::PaymentLink => "payment_links",
        Resource::Refund => "refunds",
        Resource::Settlement => "settlements",
        Resource::SettlementReport => "settlements/recon/combined",
        Resource::Subscription => "subscriptions",
        Resource::Plan => "plans",
    }
}

/// Path segments of a resource's collection
pub fn collection_segments(resource: Resource) -> Vec<String> {
    collection(resource).split('/').map(str::to_string).collect()
}

/// Path segments for fetching a single entity
pub fn entity_path(resource: Resource, id: &str) -> UpstreamResult<Vec<String>> {
    if resource == Resource::SettlementReport {
        return Err(unsupported("fetch", resource));
    }
    let mut segments = collection_segments(resource);
    segments.push(id_segment(id)?);
    Ok(segments)
}

/// Path segments for a lifecycle action on an entity
pub fn action_path(
    resource: Resource,
    id: &str,
    action: LifecycleAction,
) -> UpstreamResult<Vec<String>> {
    if resource != Resource::Subscription {
        return Err(unsupported(action.as_str(), resource));
    }
    let mut segments = collection_segments(resource);
    segments.push(id_segment(id)?);
    segments.push(action.as_str().to_string());
    Ok(segments)
}

/// Path segments and JSON body for creating an entity
pub fn create_request(
    resource: Resource,
    payload: &Payload,
) -> UpstreamResult<(Vec<String>, Value)> {
    match resource {
        Resource::Refund => {
            let mut body = payload.clone();
            let payment_id = match body.remove("payment_id") {
                Some(Value::String(id)) => id_segment(&id)?,
                _ => {
                    return Err(UpstreamError::Configuration(
                        "refund payload is missing payment_id".to_string(),
                    ))
                }
            };
            let segments = vec!["payments".to_string(), payment_id, "refund".to_string()];
            Ok((segments, Value::Object(body)))
        }
        Resource::Settlement => Ok((
            vec!["settlements".to_string(), "ondemand".to_string()],
            Value::Object(payload.clone()),
        )),
        Resource::PaymentLink => Ok((
            collection_segments(resource),
            payment_link_body(payload),
        )),
        Resource::SettlementReport => Err(unsupported("create", resource)),
        _ => Ok((
            collection_segments(resource),
            Value::Object(payload.clone()),
        )),
    }
}

/// An identifier as a single path segment.
///
/// The segment is percent-encoded when the URL is built; empty and dot
/// segments have no encoded form and are refused.
fn id_segment(id: &str) -> UpstreamResult<String> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(UpstreamError::Configuration(format!(
            "invalid identifier: {id:?}"
        )));
    }
    Ok(id.to_string())
}

/// Query string pairs for a list call.
///
/// Booleans go out as `1`/`0`, the form the list endpoints accept.
pub fn query_pairs(filters: &Payload) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Bool(true) => "1".to_string(),
                Value::Bool(false) => "0".to_string(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Payment link body in the shape the API expects.
///
/// Flat `customer_*` and `notify_*` fields are grouped into `customer` and
/// `notify` objects; notification and reminder flags default to true.
pub fn payment_link_body(payload: &Payload) -> Value {
    let mut body = Map::new();
    let mut customer = Map::new();
    let mut notify = Map::new();

    for (key, value) in payload {
        if let Some(field) = key.strip_prefix("customer_") {
            customer.insert(field.to_string(), value.clone());
        } else if let Some(channel) = key.strip_prefix("notify_") {
            notify.insert(channel.to_string(), value.clone());
        } else {
            body.insert(key.clone(), value.clone());
        }
    }

    notify.entry("sms").or_insert(Value::Bool(true));
    notify.entry("email").or_insert(Value::Bool(true));
    body.entry("reminder_enable").or_insert(Value::Bool(true));
    if body.contains_key("callback_url") {
        body.entry("callback_method").or_insert(Value::from("get"));
    }
    if !customer.is_empty() {
        body.insert("customer".to_string(), Value::Object(customer));
    }
    body.insert("notify".to_string(), Value::Object(notify));

    Value::Object(body)
}

/// Decode a non-2xx response into an `UpstreamError`
pub fn provider_error(status: u16, body: &str) -> UpstreamError {
    match serde_json::from_str::<RazorpayErrorResponse>(body) {
        Ok(response) => {
            let mut message = response.error.description;
            if let Some(field) = response.error.field.filter(|f| !f.is_empty()) {
                message = format!("{message} (field: {field})");
            }
            UpstreamError::Provider {
                status,
                code: response.error.code,
                message,
            }
        }
        Err(_) => UpstreamError::Provider {
            status,
            code: None,
            message: format!("HTTP {status}: {body}"),
        },
    }
}

fn unsupported(operation: &str, resource: Resource) -> UpstreamError {
    UpstreamError::Configuration(format!("{operation} is not supported for {resource}"))
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    #[serde(default)]
    code: Option<String>,
    description: String,
    #[serde(default)]
    field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_payment_link_body_nests_fields() {
        let body = payment_link_body(&payload(json!({
            "amount": 100000,
            "currency": "INR",
            "description": "Payment for service XYZ",
            "customer_name": "Jane Doe",
            "customer_email": "jane.doe@example.com",
            "notify_sms": false,
            "callback_url": "https://example.com/done"
        })));

        assert_eq!(
            body,
            json!({
                "amount": 100000,
                "currency": "INR",
                "description": "Payment for service XYZ",
                "customer": {"name": "Jane Doe", "email": "jane.doe@example.com"},
                "notify": {"sms": false, "email": true},
                "reminder_enable": true,
                "callback_url": "https://example.com/done",
                "callback_method": "get"
            })
        );
    }

    #[test]
    fn test_payment_link_body_without_customer() {
        let body = payment_link_body(&payload(json!({"amount": 1, "description": "x"})));
        assert!(body.get("customer").is_none());
        assert!(body.get("callback_method").is_none());
    }

    #[test]
    fn test_refund_path() {
        let (path, body) = create_request(
            Resource::Refund,
            &payload(json!({"payment_id": "pay_1", "amount": 500})),
        )
        .unwrap();
        assert_eq!(path, ["payments", "pay_1", "refund"]);
        assert_eq!(body, json!({"amount": 500}));

        assert!(create_request(Resource::Refund, &Payload::new()).is_err());
        assert!(create_request(Resource::Refund, &payload(json!({"payment_id": ""}))).is_err());
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            entity_path(Resource::PaymentLink, "plink_1").unwrap(),
            ["payment_links", "plink_1"]
        );
        assert!(entity_path(Resource::SettlementReport, "x").is_err());
        assert_eq!(
            action_path(Resource::Subscription, "sub_1", LifecycleAction::Cancel).unwrap(),
            ["subscriptions", "sub_1", "cancel"]
        );
        assert!(action_path(Resource::Order, "order_1", LifecycleAction::Pause).is_err());
        assert_eq!(
            create_request(Resource::Settlement, &Payload::new()).unwrap().0,
            ["settlements", "ondemand"]
        );
        assert_eq!(
            collection_segments(Resource::SettlementReport),
            ["settlements", "recon", "combined"]
        );
    }

    #[test]
    fn test_id_stays_one_segment() {
        let segments = entity_path(Resource::Payment, "../customers/cust_1").unwrap();
        assert_eq!(segments, ["payments", "../customers/cust_1"]);

        for id in ["", ".", ".."] {
            assert!(entity_path(Resource::Payment, id).is_err());
            assert!(action_path(Resource::Subscription, id, LifecycleAction::Pause).is_err());
        }
    }

    #[test]
    fn test_query_pairs() {
        let pairs = query_pairs(&payload(json!({
            "count": 10,
            "plan_id": "plan_1",
            "expand_card": true,
            "skip_trial": false
        })));
        assert!(pairs.contains(&("count".to_string(), "10".to_string())));
        assert!(pairs.contains(&("plan_id".to_string(), "plan_1".to_string())));
        assert!(pairs.contains(&("expand_card".to_string(), "1".to_string())));
        assert!(pairs.contains(&("skip_trial".to_string(), "0".to_string())));
    }

    #[test]
    fn test_provider_error_decoding() {
        let err = provider_error(
            400,
            r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"The amount must be atleast INR 1.00","field":"amount"}}"#,
        );
        assert_eq!(err.code(), Some("BAD_REQUEST_ERROR"));
        assert!(err.to_string().contains("field: amount"));

        let err = provider_error(502, "Bad Gateway");
        assert_eq!(err.code(), None);
        assert!(err.to_string().contains("HTTP 502: Bad Gateway"));
        assert!(err.is_retryable());
    }
}
