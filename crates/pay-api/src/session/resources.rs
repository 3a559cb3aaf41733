//! # Sample Resources
//!
//! Sample request payloads exposed as read-only session resources.

use serde_json::{json, Value};

pub const MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub struct SampleResource {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub content: Value,
}

impl SampleResource {
    /// Entry for `resources/list`
    pub fn listing(&self) -> Value {
        json!({
            "uri": self.uri,
            "name": self.name,
            "description": self.description,
            "mimeType": MIME_TYPE,
        })
    }

    /// Entry for `resources/read`
    pub fn contents(&self) -> Value {
        json!({
            "uri": self.uri,
            "mimeType": MIME_TYPE,
            "text": self.content.to_string(),
        })
    }
}

pub fn samples() -> Vec<SampleResource> {
    vec![
        SampleResource {
            uri: "mcp-resources://razorpay/order-sample",
            name: "Razorpay Order Example",
            description: "Example Razorpay order payload",
            content: json!({
                "amount": 50000,
                "currency": "INR",
                "receipt": "order_receipt_1",
                "notes": { "purpose": "Sample order for testing" }
            }),
        },
        SampleResource {
            uri: "mcp-resources://razorpay/customer-sample",
            name: "Razorpay Customer Example",
            description: "Example Razorpay customer payload",
            content: json!({
                "name": "John Doe",
                "email": "john.doe@example.com",
                "contact": "+919999999999",
                "notes": { "source": "API demonstration" }
            }),
        },
        SampleResource {
            uri: "mcp-resources://razorpay/payment-link-sample",
            name: "Razorpay Payment Link Example",
            description: "Example Razorpay payment link payload",
            content: json!({
                "amount": 100000,
                "currency": "INR",
                "description": "Payment for service XYZ",
                "customer": {
                    "name": "Jane Doe",
                    "email": "jane.doe@example.com",
                    "contact": "+919999999988"
                },
                "notify": { "sms": false, "email": false },
                "reminder_enable": false
            }),
        },
        SampleResource {
            uri: "mcp-resources://razorpay/subscription-sample",
            name: "Razorpay Subscription Example",
            description: "Example Razorpay subscription payload",
            content: json!({
                "plan_id": "plan_JKQNyZt0DwLa4Y",
                "customer_id": "cust_JKQKkeQicg3EaU",
                "total_count": 12,
                "quantity": 1,
                "start_at": 1655991343,
                "expire_by": 1687527343,
                "customer_notify": true,
                "notes": {
                    "subscription_type": "premium",
                    "billing_cycle": "monthly"
                }
            }),
        },
        SampleResource {
            uri: "mcp-resources://razorpay/settlement-sample",
            name: "Razorpay Settlement Example",
            description: "Example Razorpay on-demand settlement payload",
            content: json!({
                "amount": 100000,
                "settle_full_balance": false,
                "description": "On-demand settlement for May 2025",
                "notes": {
                    "reason": "Month-end reconciliation",
                    "accounting_period": "May 2025"
                }
            }),
        },
    ]
}

pub fn find(uri: &str) -> Option<SampleResource> {
    samples().into_iter().find(|resource| resource.uri == uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_returns_json_text() {
        let resource = find("mcp-resources://razorpay/order-sample").unwrap();
        let contents = resource.contents();

        assert_eq!(contents["mimeType"], MIME_TYPE);
        let text = contents["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["amount"], 50000);
    }

    #[test]
    fn test_unknown_uri() {
        assert!(find("mcp-resources://razorpay/refund-sample").is_none());
        assert_eq!(samples().len(), 5);
    }
}
