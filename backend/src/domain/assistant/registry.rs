//! Capability registry for the assistant.
//!
//! Tools are callable capabilities with an input and an output schema;
//! components are renderable widgets with a props schema. Schemas are
//! generated from Rust types with [`schemars`] and compiled once with
//! [`jsonschema`] at registration, so dispatch only ever validates.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonschema::Validator;
use schemars::{JsonSchema, schema_for};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::Error;

/// Errors raised while building the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Names must be non-blank and free of whitespace.
    #[error("capability name {0:?} is invalid")]
    InvalidName(String),
    /// A capability of the same kind is already registered under this name.
    #[error("{kind} {name:?} is already registered")]
    Duplicate {
        /// `tool` or `component`.
        kind: &'static str,
        /// Colliding name.
        name: String,
    },
    /// The schema did not compile or does not describe an object.
    #[error("schema for {name:?} is invalid: {reason}")]
    InvalidSchema {
        /// Capability the schema belongs to.
        name: String,
        /// Compiler or shape message.
        reason: String,
    },
}

/// Executes a registered tool.
///
/// Input reaching [`ToolHandler::call`] has already passed the tool's input
/// schema; the returned value is checked against the output schema.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool.
    async fn call(&self, input: Value) -> Result<Value, Error>;
}

/// Registration request for a tool.
pub struct ToolSpec {
    name: String,
    description: String,
    input_schema: Value,
    output_schema: Value,
    handler: Arc<dyn ToolHandler>,
}

impl ToolSpec {
    /// Describe a tool whose schemas are derived from `I` and `O`.
    pub fn typed<I, O>(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> Self
    where
        I: JsonSchema,
        O: JsonSchema,
    {
        Self::with_schemas(
            name,
            description,
            schema_for!(I).to_value(),
            schema_for!(O).to_value(),
            handler,
        )
    }

    /// Describe a tool with explicit schemas.
    pub fn with_schemas(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        output_schema: Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema,
            handler,
        }
    }
}

/// Registration request for a component.
pub struct ComponentSpec {
    name: String,
    description: String,
    props_schema: Value,
}

impl ComponentSpec {
    /// Describe a component whose props schema is derived from `P`.
    pub fn typed<P: JsonSchema>(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_schema(name, description, schema_for!(P).to_value())
    }

    /// Describe a component with an explicit props schema.
    pub fn with_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        props_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            props_schema,
        }
    }
}

/// Public description of a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolSummary {
    /// Dispatch name.
    pub name: String,
    /// Human-readable purpose.
    pub description: String,
    /// JSON Schema of accepted input.
    #[schema(value_type = Object)]
    pub input_schema: Value,
    /// JSON Schema of produced output.
    #[schema(value_type = Object)]
    pub output_schema: Value,
}

/// Public description of a registered component.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    /// Render name.
    pub name: String,
    /// Human-readable purpose.
    pub description: String,
    /// JSON Schema of accepted props.
    #[schema(value_type = Object)]
    pub props_schema: Value,
}

/// Everything the assistant may call or render, sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RegistrySummary {
    /// Registered tools.
    pub tools: Vec<ToolSummary>,
    /// Registered components.
    pub components: Vec<ComponentSummary>,
}

struct RegisteredTool {
    summary: ToolSummary,
    input: Validator,
    output: Validator,
    handler: Arc<dyn ToolHandler>,
}

struct RegisteredComponent {
    summary: ComponentSummary,
    props: Validator,
}

/// Registry of tools and components keyed by name.
#[derive(Default)]
pub struct CapabilityRegistry {
    tools: BTreeMap<String, RegisteredTool>,
    components: BTreeMap<String, RegisteredComponent>,
}

impl CapabilityRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// # Errors
    /// Rejects invalid names, duplicates and schemas that fail to compile or
    /// do not describe an object.
    pub fn register_tool(&mut self, spec: ToolSpec) -> Result<(), RegistryError> {
        let name = checked_name(&spec.name)?;
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate { kind: "tool", name });
        }
        let input = compile(&name, &spec.input_schema)?;
        let output = compile(&name, &spec.output_schema)?;
        let summary = ToolSummary {
            name: name.clone(),
            description: spec.description,
            input_schema: spec.input_schema,
            output_schema: spec.output_schema,
        };
        self.tools.insert(
            name,
            RegisteredTool {
                summary,
                input,
                output,
                handler: spec.handler,
            },
        );
        Ok(())
    }

    /// Register a component.
    ///
    /// # Errors
    /// As for [`CapabilityRegistry::register_tool`].
    pub fn register_component(&mut self, spec: ComponentSpec) -> Result<(), RegistryError> {
        let name = checked_name(&spec.name)?;
        if self.components.contains_key(&name) {
            return Err(RegistryError::Duplicate {
                kind: "component",
                name,
            });
        }
        let props = compile(&name, &spec.props_schema)?;
        let summary = ComponentSummary {
            name: name.clone(),
            description: spec.description,
            props_schema: spec.props_schema,
        };
        self.components
            .insert(name, RegisteredComponent { summary, props });
        Ok(())
    }

    /// Describe every registered capability.
    #[must_use]
    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            tools: self.tools.values().map(|tool| tool.summary.clone()).collect(),
            components: self
                .components
                .values()
                .map(|component| component.summary.clone())
                .collect(),
        }
    }

    /// Validate `input`, run the named tool and validate what it returns.
    ///
    /// # Errors
    /// `not_found` for an unknown tool, `invalid_request` (with violations in
    /// the details) for bad input, `internal_error` when the handler fails or
    /// its result breaks the output schema.
    pub async fn invoke(&self, name: &str, input: Value) -> Result<Value, Error> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {name}")))?;

        let input_violations = violations(&tool.input, &input);
        if !input_violations.is_empty() {
            return Err(Error::invalid_request("Tool input does not match its schema")
                .with_details(json!({ "tool": name, "violations": input_violations })));
        }

        let output = tool.handler.call(input).await?;
        let output_violations = violations(&tool.output, &output);
        if !output_violations.is_empty() {
            error!(tool = name, violations = ?output_violations, "tool returned a result outside its schema");
            return Err(Error::internal("Tool produced an invalid result"));
        }
        Ok(output)
    }

    /// Check props proposed for the named component.
    ///
    /// # Errors
    /// `not_found` for an unknown component, `invalid_request` listing the
    /// violations otherwise.
    pub fn check_props(&self, name: &str, props: &Value) -> Result<(), Error> {
        let component = self
            .components
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unknown component: {name}")))?;
        let prop_violations = violations(&component.props, props);
        if prop_violations.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_request("Component props do not match their schema")
                .with_details(json!({ "component": name, "violations": prop_violations })))
        }
    }
}

fn checked_name(raw: &str) -> Result<String, RegistryError> {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return Err(RegistryError::InvalidName(raw.to_owned()));
    }
    Ok(raw.to_owned())
}

fn compile(name: &str, schema: &Value) -> Result<Validator, RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidSchema {
        name: name.to_owned(),
        reason,
    };
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err(invalid("root schema must describe an object".to_owned()));
    }
    jsonschema::validator_for(schema).map_err(|err| invalid(err.to_string()))
}

fn violations(validator: &Validator, instance: &Value) -> Vec<String> {
    validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect()
}
