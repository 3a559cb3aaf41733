//! # Tool Registry
//!
//! Catalog of named tools, each pairing a `ToolDefinition` with the
//! `Normalizer` that binds it to a remote call.
//!
//! The registry is mutated only while the catalog is being built at
//! startup. It is then shared behind an `Arc` and only read.

use crate::capability::RemoteCall;
use crate::error::{ToolError, ToolResult};
use crate::normalize::Normalizer;
use crate::schema::ToolDefinition;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// A registered tool: its public schema and its normalizer+call pair
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub definition: ToolDefinition,
    pub normalizer: Normalizer,
}

impl Tool {
    pub fn new(definition: ToolDefinition, normalizer: Normalizer) -> Self {
        Self {
            definition,
            normalizer,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Normalize raw arguments into this tool's remote call
    pub fn normalize(&self, raw: &Value) -> ToolResult<RemoteCall> {
        self.normalizer.normalize(&self.definition, raw)
    }
}

/// Registry of tools in registration order
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    /// Canonical name -> position in `tools`
    index: HashMap<String, usize>,
    /// Alternate spelling -> canonical name
    aliases: HashMap<String, String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Fails if the name is already taken by a tool or alias.
    pub fn register(&mut self, tool: Tool) -> ToolResult<()> {
        let name = tool.name().to_string();
        check_spelling(&name)?;
        if self.index.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(ToolError::DuplicateTool { name });
        }
        debug!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Builder: register a tool
    pub fn with_tool(mut self, tool: Tool) -> ToolResult<Self> {
        self.register(tool)?;
        Ok(self)
    }

    /// Map an alternate spelling onto a registered tool.
    ///
    /// Aliases pointing at tools outside this registry are skipped, so one
    /// alias table can serve every catalog profile.
    pub fn register_alias(&mut self, alias: &str, canonical: &str) -> ToolResult<()> {
        check_spelling(alias)?;
        if self.index.contains_key(alias) || self.aliases.contains_key(alias) {
            return Err(ToolError::DuplicateTool {
                name: alias.to_string(),
            });
        }
        if self.index.contains_key(canonical) {
            self.aliases.insert(alias.to_string(), canonical.to_string());
        }
        Ok(())
    }

    /// Canonical spelling of a tool name.
    ///
    /// Dots become underscores first (`order.create` is `order_create`), so
    /// every alias also answers to its dotted spelling.
    pub fn canonical_name(&self, name: &str) -> String {
        let name = name.trim().replace('.', "_");
        match self.aliases.get(&name) {
            Some(canonical) => canonical.clone(),
            None => name,
        }
    }

    /// Resolve any accepted spelling to its tool
    pub fn resolve(&self, name: &str) -> ToolResult<&Tool> {
        self.index
            .get(&self.canonical_name(name))
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_string(),
            })
    }

    /// Get a tool definition by name
    pub fn get(&self, name: &str) -> ToolResult<&ToolDefinition> {
        self.index
            .get(&self.canonical_name(name))
            .map(|&i| &self.tools[i].definition)
            .ok_or_else(|| ToolError::NotFound {
                name: name.to_string(),
            })
    }

    /// All definitions, in registration order
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| &t.definition).collect()
    }

    /// All tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Check if a name (any accepted spelling) is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&self.canonical_name(name))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Registered spellings are dot-free; dots are reserved for lookup.
fn check_spelling(name: &str) -> ToolResult<()> {
    if name.contains('.') {
        return Err(ToolError::Configuration(format!(
            "tool name '{name}' must not contain '.'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Resource;
    use crate::normalize::Binding;
    use crate::schema::ParamSpec;

    fn fetch_tool(name: &str, id_field: &'static str) -> Tool {
        Tool::new(
            ToolDefinition::new(name, "Fetch details")
                .param(id_field, ParamSpec::string("Identifier").required()),
            Normalizer::new(Binding::Fetch {
                resource: Resource::Payment,
                id_field,
            }),
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        let tool = fetch_tool("payment_fetch", "payment_id");
        registry.register(tool.clone()).unwrap();

        assert_eq!(registry.get("payment_fetch").unwrap(), &tool.definition);
        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.get("refund_fetch"),
            Err(ToolError::NotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(fetch_tool("payment_fetch", "payment_id")).unwrap();

        let err = registry
            .register(fetch_tool("payment_fetch", "payment_id"))
            .unwrap_err();
        assert!(matches!(err, ToolError::DuplicateTool { ref name } if name == "payment_fetch"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order() {
        let registry = ToolRegistry::new()
            .with_tool(fetch_tool("order_fetch", "order_id"))
            .unwrap()
            .with_tool(fetch_tool("customer_fetch", "customer_id"))
            .unwrap()
            .with_tool(fetch_tool("payment_fetch", "payment_id"))
            .unwrap();

        assert_eq!(
            registry.names(),
            vec!["order_fetch", "customer_fetch", "payment_fetch"]
        );
    }

    #[test]
    fn test_dotted_and_explicit_aliases() {
        let mut registry = ToolRegistry::new();
        registry.register(fetch_tool("payment_fetch", "payment_id")).unwrap();
        registry
            .register_alias("razorpay_payments_get", "payment_fetch")
            .unwrap();
        // Target outside the registry: skipped, not an error
        registry
            .register_alias("razorpay_plans_get", "plan_fetch")
            .unwrap();

        assert_eq!(registry.resolve("payment.fetch").unwrap().name(), "payment_fetch");
        assert_eq!(
            registry.resolve("razorpay_payments_get").unwrap().name(),
            "payment_fetch"
        );
        assert_eq!(
            registry.resolve("razorpay.payments.get").unwrap().name(),
            "payment_fetch"
        );
        assert_eq!(
            registry.canonical_name(" razorpay.payments_get "),
            "payment_fetch"
        );
        assert!(!registry.contains("razorpay_plans_get"));

        let err = registry.resolve("foo_bar").unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool { ref name } if name == "foo_bar"));
    }

    #[test]
    fn test_alias_cannot_shadow_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(fetch_tool("payment_fetch", "payment_id")).unwrap();
        registry.register(fetch_tool("order_fetch", "order_id")).unwrap();

        assert!(registry.register_alias("order_fetch", "payment_fetch").is_err());
    }

    #[test]
    fn test_dotted_names_rejected() {
        let mut registry = ToolRegistry::new();

        let err = registry
            .register(fetch_tool("payment.fetch", "payment_id"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
        assert!(registry.is_empty());

        registry.register(fetch_tool("payment_fetch", "payment_id")).unwrap();
        let err = registry
            .register_alias("razorpay.payments.get", "payment_fetch")
            .unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
        assert!(!registry.contains("razorpay_payments_get"));
    }
}
