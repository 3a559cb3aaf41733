//! # Tool Catalog
//!
//! The consolidated Razorpay tool catalog.
//!
//! Tool names use the `entity_action` spelling; the dotted spelling and the
//! legacy session-protocol names (`razorpay_<entities>_<verb>`) resolve to
//! the same tools through the registry's alias table.
//!
//! Two profiles are available:
//!
//! | Profile | Entities |
//! |---------|----------|
//! | `full` | payments, orders, customers, payment links, refunds, settlements, subscriptions, plans |
//! | `core` | payments, orders, customers, payment links |

use crate::capability::{LifecycleAction, Resource};
use crate::error::{ToolError, ToolResult};
use crate::normalize::{Binding, Normalizer, Rule, DEFAULT_CURRENCY};
use crate::registry::{Tool, ToolRegistry};
use crate::schema::{ParamSpec, ToolDefinition};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

/// Which slice of the catalog gets registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogProfile {
    /// Every entity kind
    #[default]
    Full,
    /// Payments, orders, customers and payment links only
    Core,
}

impl CatalogProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogProfile::Full => "full",
            CatalogProfile::Core => "core",
        }
    }

    /// Whether tools for `resource` belong to this profile
    pub fn includes(&self, resource: Resource) -> bool {
        match self {
            CatalogProfile::Full => true,
            CatalogProfile::Core => matches!(
                resource,
                Resource::Payment | Resource::Order | Resource::Customer | Resource::PaymentLink
            ),
        }
    }
}

impl FromStr for CatalogProfile {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(CatalogProfile::Full),
            "core" => Ok(CatalogProfile::Core),
            other => Err(ToolError::Configuration(format!(
                "unknown catalog profile '{other}' (expected 'full' or 'core')"
            ))),
        }
    }
}

impl std::fmt::Display for CatalogProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy session-protocol tool names and the tools they resolve to
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("razorpay_payments_get", "payment_fetch"),
    ("razorpay_payments_list", "payment_list"),
    ("razorpay_orders_create", "order_create"),
    ("razorpay_orders_get", "order_fetch"),
    ("razorpay_orders_list", "order_list"),
    ("razorpay_customers_create", "customer_create"),
    ("razorpay_customers_get", "customer_fetch"),
    ("razorpay_payment_links_create", "payment_link_create"),
    ("razorpay_payment_links_get", "payment_link_fetch"),
    ("razorpay_refunds_create", "refund_create"),
    ("razorpay_refunds_get", "refund_fetch"),
    ("razorpay_settlements_get", "settlement_fetch"),
    ("razorpay_settlements_list", "settlement_list"),
    ("razorpay_settlements_create_ondemand", "settlement_create_ondemand"),
    ("razorpay_settlements_report", "settlement_report"),
    ("razorpay_subscriptions_get", "subscription_fetch"),
    ("razorpay_subscriptions_list", "subscription_list"),
    ("razorpay_subscriptions_create", "subscription_create"),
    ("razorpay_subscriptions_cancel", "subscription_cancel"),
    ("razorpay_subscriptions_pause", "subscription_pause"),
    ("razorpay_subscriptions_resume", "subscription_resume"),
    ("razorpay_plans_get", "plan_fetch"),
    ("razorpay_plans_list", "plan_list"),
    ("razorpay_plans_create", "plan_create"),
];

/// Build the registry for `profile`, leaving out any tool named in `disabled`.
///
/// Unknown names in `disabled` are a configuration error.
pub fn build_registry(profile: CatalogProfile, disabled: &[String]) -> ToolResult<ToolRegistry> {
    let tools = all_tools();

    if let Some(unknown) = disabled
        .iter()
        .find(|name| !tools.iter().any(|t| t.name() == name.as_str()))
    {
        return Err(ToolError::Configuration(format!(
            "cannot disable unknown tool '{unknown}'"
        )));
    }

    let mut registry = ToolRegistry::new();
    for tool in tools {
        if profile.includes(tool.normalizer.binding.resource())
            && !disabled.iter().any(|d| d == tool.name())
        {
            registry.register(tool)?;
        }
    }
    for (alias, canonical) in LEGACY_ALIASES {
        registry.register_alias(alias, canonical)?;
    }

    info!(
        profile = %profile,
        tools = registry.len(),
        "tool catalog built"
    );
    Ok(registry)
}

/// Every tool in the catalog, in canonical order
pub fn all_tools() -> Vec<Tool> {
    let mut tools = Vec::with_capacity(24);
    tools.extend(payment_tools());
    tools.extend(order_tools());
    tools.extend(customer_tools());
    tools.extend(payment_link_tools());
    tools.extend(refund_tools());
    tools.extend(settlement_tools());
    tools.extend(subscription_tools());
    tools.extend(plan_tools());
    tools
}

// =============================================================================
// Shared helpers
// =============================================================================

fn fetch(
    name: &str,
    description: &str,
    resource: Resource,
    id_field: &'static str,
    id_description: &str,
) -> Tool {
    Tool::new(
        ToolDefinition::new(name, description)
            .param(id_field, ParamSpec::string(id_description).required()),
        Normalizer::new(Binding::Fetch { resource, id_field }),
    )
}

fn paging(definition: ToolDefinition) -> ToolDefinition {
    definition
        .param("count", ParamSpec::integer("Number of items to return (max 100)"))
        .param("skip", ParamSpec::integer("Number of items to skip"))
}

fn time_window(definition: ToolDefinition) -> ToolDefinition {
    definition
        .param(
            "from",
            ParamSpec::integer("Start of the window: unix timestamp, RFC 3339 or YYYY-MM-DD"),
        )
        .param(
            "to",
            ParamSpec::integer("End of the window: unix timestamp, RFC 3339 or YYYY-MM-DD"),
        )
}

fn windowed_list(resource: Resource) -> Normalizer {
    Normalizer::new(Binding::List { resource })
        .rule(Rule::Timestamp { field: "from" })
        .rule(Rule::Timestamp { field: "to" })
}

fn currency() -> ParamSpec {
    ParamSpec::string("Currency code (default: INR)").with_default(DEFAULT_CURRENCY)
}

fn notes() -> ParamSpec {
    ParamSpec::object("Additional key-value notes")
}

// =============================================================================
// Entities
// =============================================================================

fn payment_tools() -> Vec<Tool> {
    vec![
        fetch(
            "payment_fetch",
            "Fetch payment details by payment ID",
            Resource::Payment,
            "payment_id",
            "Payment ID",
        ),
        Tool::new(
            time_window(paging(ToolDefinition::new(
                "payment_list",
                "List payments with optional filtering",
            ))),
            windowed_list(Resource::Payment),
        ),
    ]
}

fn order_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            ToolDefinition::new("order_create", "Create a new order")
                .param(
                    "amount",
                    ParamSpec::integer("Order amount in smallest currency unit").required(),
                )
                .param("currency", currency())
                .param("receipt", ParamSpec::string("Receipt number"))
                .param("notes", notes())
                .param(
                    "payment_capture",
                    ParamSpec::boolean("Capture payments automatically").with_default(true),
                ),
            Normalizer::new(Binding::Create {
                resource: Resource::Order,
            }),
        ),
        fetch(
            "order_fetch",
            "Fetch order details by order ID",
            Resource::Order,
            "order_id",
            "Order ID",
        ),
        Tool::new(
            time_window(paging(ToolDefinition::new(
                "order_list",
                "List orders with optional filtering",
            )))
            .param("authorized", ParamSpec::boolean("Only orders with authorized payments"))
            .param("receipt", ParamSpec::string("Filter by receipt number")),
            windowed_list(Resource::Order),
        ),
    ]
}

fn customer_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            ToolDefinition::new("customer_create", "Create a new customer")
                .param("name", ParamSpec::string("Customer name").required())
                .param("email", ParamSpec::string("Customer email").required())
                .param("contact", ParamSpec::string("Customer contact number"))
                .param("notes", notes())
                .param(
                    "fail_existing",
                    ParamSpec::string("\"0\" returns the existing customer instead of failing"),
                ),
            Normalizer::new(Binding::Create {
                resource: Resource::Customer,
            }),
        ),
        fetch(
            "customer_fetch",
            "Fetch customer details by customer ID",
            Resource::Customer,
            "customer_id",
            "Customer ID",
        ),
    ]
}

fn payment_link_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            ToolDefinition::new("payment_link_create", "Create a new payment link")
                .param(
                    "amount",
                    ParamSpec::integer("Payment amount in smallest currency unit").required(),
                )
                .param("currency", currency())
                .param("description", ParamSpec::string("Payment description").required())
                .param(
                    "customer",
                    ParamSpec::object("Customer details: {name, email, contact}"),
                )
                .param("customer_name", ParamSpec::string("Customer name"))
                .param("customer_email", ParamSpec::string("Customer email"))
                .param("customer_contact", ParamSpec::string("Customer contact number"))
                .param(
                    "notify",
                    ParamSpec::object("Notification preferences: {sms, email}"),
                )
                .param("notify_sms", ParamSpec::boolean("Notify the customer by SMS"))
                .param("notify_email", ParamSpec::boolean("Notify the customer by email"))
                .param("reminder_enable", ParamSpec::boolean("Send payment reminders"))
                .param("notes", notes())
                .param("callback_url", ParamSpec::string("Redirect URL after payment"))
                .param("callback_method", ParamSpec::string("Callback HTTP method (get)"))
                .param("expire_by", ParamSpec::integer("Link expiry: unix timestamp or date"))
                .param("reference_id", ParamSpec::string("Your reference for this link")),
            Normalizer::new(Binding::Create {
                resource: Resource::PaymentLink,
            })
            .rule(Rule::Flatten {
                field: "customer",
                keys: &["name", "email", "contact"],
            })
            .rule(Rule::Flatten {
                field: "notify",
                keys: &["sms", "email"],
            })
            .rule(Rule::Timestamp { field: "expire_by" }),
        ),
        fetch(
            "payment_link_fetch",
            "Fetch payment link details by payment link ID",
            Resource::PaymentLink,
            "payment_link_id",
            "Payment Link ID",
        ),
    ]
}

fn refund_tools() -> Vec<Tool> {
    vec![
        Tool::new(
            ToolDefinition::new("refund_create", "Create a new refund")
                .param("payment_id", ParamSpec::string("Payment ID to refund").required())
                .param(
                    "amount",
                    ParamSpec::integer("Refund amount in smallest currency unit (default: full)"),
                )
                .param("speed", ParamSpec::string("Refund speed: normal or optimum"))
                .param("receipt", ParamSpec::string("Receipt number"))
                .param("notes", notes()),
            Normalizer::new(Binding::Create {
                resource: Resource::Refund,
            })
            .rule(Rule::Identifier {
                field: "payment_id",
            }),
        ),
        fetch(
            "refund_fetch",
            "Fetch refund details by refund ID",
            Resource::Refund,
            "refund_id",
            "Refund ID",
        ),
    ]
}

fn settlement_tools() -> Vec<Tool> {
    vec![
        fetch(
            "settlement_fetch",
            "Fetch settlement details by settlement ID",
            Resource::Settlement,
            "settlement_id",
            "Settlement ID",
        ),
        Tool::new(
            time_window(paging(ToolDefinition::new(
                "settlement_list",
                "List settlements with optional filtering",
            ))),
            windowed_list(Resource::Settlement),
        ),
        Tool::new(
            ToolDefinition::new("settlement_create_ondemand", "Create an on-demand settlement")
                .param(
                    "amount",
                    ParamSpec::integer("Amount to settle, required unless settling the full balance"),
                )
                .param(
                    "settle_full_balance",
                    ParamSpec::boolean("Settle the entire available balance").with_default(false),
                )
                .param("description", ParamSpec::string("Settlement description"))
                .param("notes", notes()),
            Normalizer::new(Binding::Create {
                resource: Resource::Settlement,
            })
            .rule(Rule::RequiredUnless {
                field: "amount",
                unless: "settle_full_balance",
            }),
        ),
        Tool::new(
            paging(ToolDefinition::new(
                "settlement_report",
                "Get settlement reports with filtering by year, month, and day",
            ))
            .param("year", ParamSpec::integer("Report year (e.g., 2025)").required())
            .param("month", ParamSpec::integer("Report month (1-12)").required())
            .param("day", ParamSpec::integer("Report day (1-31)")),
            Normalizer::new(Binding::List {
                resource: Resource::SettlementReport,
            }),
        ),
    ]
}

fn lifecycle(
    name: &str,
    description: &str,
    action: LifecycleAction,
    option: &str,
    option_spec: ParamSpec,
) -> Tool {
    Tool::new(
        ToolDefinition::new(name, description)
            .param("subscription_id", ParamSpec::string("Subscription ID").required())
            .param(option, option_spec),
        Normalizer::new(Binding::Act {
            resource: Resource::Subscription,
            id_field: "subscription_id",
            action,
        }),
    )
}

fn subscription_tools() -> Vec<Tool> {
    vec![
        fetch(
            "subscription_fetch",
            "Fetch subscription details by subscription ID",
            Resource::Subscription,
            "subscription_id",
            "Subscription ID",
        ),
        Tool::new(
            time_window(paging(ToolDefinition::new(
                "subscription_list",
                "List subscriptions with optional filtering",
            )))
            .param("plan_id", ParamSpec::string("Filter by plan ID")),
            windowed_list(Resource::Subscription),
        ),
        Tool::new(
            ToolDefinition::new("subscription_create", "Create a new subscription for a customer")
                .param("plan_id", ParamSpec::string("Plan ID").required())
                .param(
                    "total_count",
                    ParamSpec::integer("Number of billing cycles").required(),
                )
                .param("customer_id", ParamSpec::string("Customer ID"))
                .param("quantity", ParamSpec::integer("Units of the plan per cycle"))
                .param("start_at", ParamSpec::integer("Start: unix timestamp or date"))
                .param("expire_by", ParamSpec::integer("Latest start: unix timestamp or date"))
                .param(
                    "customer_notify",
                    ParamSpec::boolean("Let Razorpay notify the customer"),
                )
                .param("notes", notes()),
            Normalizer::new(Binding::Create {
                resource: Resource::Subscription,
            })
            .rule(Rule::Timestamp { field: "start_at" })
            .rule(Rule::Timestamp { field: "expire_by" }),
        ),
        lifecycle(
            "subscription_cancel",
            "Cancel an active subscription",
            LifecycleAction::Cancel,
            "cancel_at_cycle_end",
            ParamSpec::boolean("Cancel at the end of the current cycle").with_default(false),
        ),
        lifecycle(
            "subscription_pause",
            "Pause an active subscription",
            LifecycleAction::Pause,
            "pause_at",
            ParamSpec::string("When to pause (now)").with_default("now"),
        ),
        lifecycle(
            "subscription_resume",
            "Resume a paused subscription",
            LifecycleAction::Resume,
            "resume_at",
            ParamSpec::string("When to resume (now)").with_default("now"),
        ),
    ]
}

fn plan_tools() -> Vec<Tool> {
    vec![
        fetch(
            "plan_fetch",
            "Fetch plan details by plan ID",
            Resource::Plan,
            "plan_id",
            "Plan ID",
        ),
        Tool::new(
            paging(ToolDefinition::new("plan_list", "List subscription plans")),
            Normalizer::new(Binding::List {
                resource: Resource::Plan,
            }),
        ),
        Tool::new(
            ToolDefinition::new("plan_create", "Create a new subscription plan")
                .param(
                    "period",
                    ParamSpec::string("Billing period: daily, weekly, monthly or yearly")
                        .required(),
                )
                .param(
                    "interval",
                    ParamSpec::integer("Number of periods between charges").required(),
                )
                .param(
                    "item",
                    ParamSpec::object("Plan item: {name, amount, currency, description}")
                        .required(),
                )
                .param("notes", notes()),
            Normalizer::new(Binding::Create {
                resource: Resource::Plan,
            })
            .rule(Rule::NestedRequired {
                field: "item",
                keys: &["name", "amount"],
            })
            .rule(Rule::NestedCurrency { field: "item" }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::RemoteCall;
    use serde_json::json;

    #[test]
    fn test_full_catalog() {
        let registry = build_registry(CatalogProfile::Full, &[]).unwrap();
        assert_eq!(registry.len(), 24);
        assert_eq!(registry.names()[0], "payment_fetch");
        assert!(registry.contains("plan_create"));
    }

    #[test]
    fn test_core_catalog() {
        let registry = build_registry(CatalogProfile::Core, &[]).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "payment_fetch",
                "payment_list",
                "order_create",
                "order_fetch",
                "order_list",
                "customer_create",
                "customer_fetch",
                "payment_link_create",
                "payment_link_fetch",
            ]
        );
        assert!(!registry.contains("razorpay_subscriptions_get"));
        assert!(registry.contains("razorpay_orders_create"));
    }

    #[test]
    fn test_disabled_tools() {
        let registry =
            build_registry(CatalogProfile::Full, &["settlement_create_ondemand".to_string()])
                .unwrap();
        assert_eq!(registry.len(), 23);
        assert!(!registry.contains("settlement_create_ondemand"));

        let err = build_registry(CatalogProfile::Full, &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
    }

    #[test]
    fn test_every_fetch_requires_its_id() {
        let registry = build_registry(CatalogProfile::Full, &[]).unwrap();
        for name in registry.names() {
            if !name.ends_with("_fetch") {
                continue;
            }
            let err = registry.resolve(name).unwrap().normalize(&json!({})).unwrap_err();
            assert!(
                matches!(err, ToolError::Validation { .. }),
                "{name} accepted empty arguments"
            );
        }
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("FULL".parse::<CatalogProfile>().unwrap(), CatalogProfile::Full);
        assert_eq!(" core ".parse::<CatalogProfile>().unwrap(), CatalogProfile::Core);
        assert!("partial".parse::<CatalogProfile>().is_err());
    }

    #[test]
    fn test_refund_create_keeps_payment_id() {
        let registry = build_registry(CatalogProfile::Full, &[]).unwrap();
        let call = registry
            .resolve("refund_create")
            .unwrap()
            .normalize(&json!({"payment_id": "pay_1", "amount": 100}))
            .unwrap();
        match call {
            RemoteCall::Create { resource, payload } => {
                assert_eq!(resource, Resource::Refund);
                assert_eq!(payload["payment_id"], "pay_1");
                assert_eq!(payload["amount"], 100);
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[test]
    fn test_subscription_cancel_default() {
        let registry = build_registry(CatalogProfile::Full, &[]).unwrap();
        let call = registry
            .resolve("subscription.cancel")
            .unwrap()
            .normalize(&json!({"subscription_id": "sub_1"}))
            .unwrap();
        assert_eq!(
            call,
            RemoteCall::Act {
                resource: Resource::Subscription,
                id: "sub_1".into(),
                action: LifecycleAction::Cancel,
                payload: json!({"cancel_at_cycle_end": false})
                    .as_object()
                    .cloned()
                    .unwrap(),
            }
        );
    }
}
