//! # Prompt Templates
//!
//! Prompt templates advertised over the session transport.
//!
//! Templates use `{{placeholder}}` markers; the declared arguments of a
//! prompt are exactly the placeholders it contains.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub template: &'static str,
}

pub const PROMPTS: &[PromptTemplate] = &[
    PromptTemplate {
        name: "razorpay_create_order",
        title: "Create Razorpay Order",
        description: "Create a new order in Razorpay",
        template: "Create a new Razorpay order with the following details:\n- Amount: {{amount}} in {{currency}}\n- Receipt: {{receipt}}\n- Notes: {{notes}}\n\nPlease provide the order ID and other details once created.",
    },
    PromptTemplate {
        name: "razorpay_create_customer",
        title: "Create Razorpay Customer",
        description: "Create a new customer in Razorpay",
        template: "Create a new Razorpay customer with the following details:\n- Name: {{name}}\n- Email: {{email}}\n- Contact: {{contact}}\n\nPlease provide the customer ID once created.",
    },
    PromptTemplate {
        name: "razorpay_create_payment_link",
        title: "Create Razorpay Payment Link",
        description: "Create a payment link for a customer",
        template: "Create a new Razorpay payment link with the following details:\n- Amount: {{amount}} in {{currency}}\n- Description: {{description}}\n- Customer Name: {{customer_name}}\n- Customer Email: {{customer_email}}\n- Customer Contact: {{customer_contact}}\n\nPlease provide the payment link URL once created.",
    },
    PromptTemplate {
        name: "razorpay_check_payment_status",
        title: "Check Payment Status",
        description: "Check status of an existing Razorpay payment",
        template: "Check the status of Razorpay payment with ID {{payment_id}} and summarize the results, including the amount, currency, status, and creation date.",
    },
    PromptTemplate {
        name: "razorpay_create_subscription",
        title: "Create Razorpay Subscription",
        description: "Create a new subscription in Razorpay",
        template: "Create a new Razorpay subscription with the following details:\n- Plan ID: {{plan_id}}\n- Customer ID: {{customer_id}}\n- Total Count: {{total_count}} (number of billing cycles)\n- Quantity: {{quantity}}\n- Start Date: {{start_at}}\n- Expire By: {{expire_by}}\n\nPlease provide the subscription ID and other details once created.",
    },
    PromptTemplate {
        name: "razorpay_manage_subscription",
        title: "Manage Razorpay Subscription",
        description: "Manage an existing subscription in Razorpay",
        template: "Perform the following action on the Razorpay subscription with ID {{subscription_id}}:\n\n{{action}} (cancel/pause/resume)\n\nPlease provide details about the updated subscription status once the action is completed.",
    },
    PromptTemplate {
        name: "razorpay_create_settlement",
        title: "Create Razorpay On-demand Settlement",
        description: "Create an on-demand settlement in Razorpay",
        template: "Create a new on-demand settlement in Razorpay with the following details:\n- Amount: {{amount}}\n- Settle Full Balance: {{settle_full_balance}}\n- Description: {{description}}\n- Notes: {{notes}}\n\nPlease provide the settlement ID and other details once created.",
    },
    PromptTemplate {
        name: "razorpay_check_settlement",
        title: "Check Settlement Details",
        description: "Check details of an existing Razorpay settlement",
        template: "Check the details of Razorpay settlement with ID {{settlement_id}} and summarize the results, including the amount, fees, tax, status, and creation date.",
    },
];

pub fn find(name: &str) -> Option<&'static PromptTemplate> {
    PROMPTS.iter().find(|prompt| prompt.name == name)
}

impl PromptTemplate {
    /// Placeholder names in order of first appearance
    pub fn arguments(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.template;
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else { break };
            let name = &after[..end];
            if !names.contains(&name) {
                names.push(name);
            }
            rest = &after[end + 2..];
        }
        names
    }

    /// Substitute supplied arguments; unknown placeholders are left as-is
    pub fn render(&self, arguments: &Map<String, Value>) -> String {
        let mut text = self.template.to_string();
        for (name, value) in arguments {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text = text.replace(&format!("{{{{{name}}}}}"), &rendered);
        }
        text
    }

    /// Entry for `prompts/list`
    pub fn listing(&self) -> Value {
        let arguments: Vec<Value> = self
            .arguments()
            .into_iter()
            .map(|name| json!({ "name": name, "required": false }))
            .collect();

        json!({
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "arguments": arguments,
        })
    }
}
