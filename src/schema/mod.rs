//! Structural schemas for specification documents.
//!
//! Schemas are plain JSON documents (one per specification kind) parsed at
//! startup into typed [`Schema`] values. A malformed schema document is a
//! configuration error that stops the run before any document is processed.

pub mod structural;

use crate::document::{KIND_AGENT, KIND_RECIPE};
use crate::error::{AgentsmithError, Result};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

const AGENT_SCHEMA: &str = include_str!("../../schemas/agent-spec-v1.json");
const RECIPE_SCHEMA: &str = include_str!("../../schemas/recipe-spec-v1.json");

/// Value types a schema can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Mapping,
    Sequence,
}

impl FieldType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "mapping" => Some(Self::Mapping),
            "sequence" => Some(Self::Sequence),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Mapping => "mapping",
            Self::Sequence => "sequence",
        }
    }
}

/// String formats checked beyond a regular expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Semver,
}

/// Schema node for one field (or the document root).
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    pub field_type: Option<FieldType>,
    pub enum_values: Option<Vec<String>>,
    pub pattern: Option<Regex>,
    pub format: Option<Format>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub required: Vec<String>,
    pub properties: BTreeMap<String, FieldSchema>,
    pub items: Option<Box<FieldSchema>>,
    /// True when `additionalProperties: false` closes the mapping.
    pub closed: bool,
}

/// A complete structural schema for one specification kind.
#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: String,
    pub title: String,
    pub root: FieldSchema,
}

impl Schema {
    /// Parse a schema from its JSON source text.
    pub fn from_json(kind: &str, name: &str, source: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(source).map_err(|e| definition(name, e))?;
        let title = value
            .get("title")
            .and_then(JsonValue::as_str)
            .unwrap_or(name)
            .to_string();
        let root = parse_field(&value, name)?;
        Ok(Self {
            kind: kind.to_string(),
            title,
            root,
        })
    }

    /// Whether the schema declares a property at the given dotted path.
    ///
    /// Used by the semantic validator to gate conditional requirements on
    /// fields the schema actually defines.
    pub fn declares(&self, path: &str) -> bool {
        let mut node = &self.root;
        for part in path.split('.') {
            match node.properties.get(part) {
                Some(child) => node = child,
                None => return false,
            }
        }
        true
    }
}

fn definition(schema: &str, message: impl ToString) -> AgentsmithError {
    AgentsmithError::SchemaDefinition {
        schema: schema.to_string(),
        message: message.to_string(),
    }
}

fn parse_field(value: &JsonValue, schema_name: &str) -> Result<FieldSchema> {
    let obj = value
        .as_object()
        .ok_or_else(|| definition(schema_name, "schema node must be a JSON object"))?;

    let mut field = FieldSchema::default();

    if let Some(type_name) = obj.get("type") {
        let type_name = type_name
            .as_str()
            .ok_or_else(|| definition(schema_name, "'type' must be a string"))?;
        field.field_type = Some(
            FieldType::parse(type_name)
                .ok_or_else(|| definition(schema_name, format!("unknown type '{type_name}'")))?,
        );
    }

    if let Some(values) = obj.get("enum") {
        let values = values
            .as_array()
            .ok_or_else(|| definition(schema_name, "'enum' must be an array"))?;
        let mut parsed = Vec::with_capacity(values.len());
        for v in values {
            parsed.push(
                v.as_str()
                    .ok_or_else(|| definition(schema_name, "'enum' entries must be strings"))?
                    .to_string(),
            );
        }
        field.enum_values = Some(parsed);
    }

    if let Some(pattern) = obj.get("pattern") {
        let pattern = pattern
            .as_str()
            .ok_or_else(|| definition(schema_name, "'pattern' must be a string"))?;
        field.pattern = Some(
            Regex::new(pattern)
                .map_err(|e| definition(schema_name, format!("invalid pattern: {e}")))?,
        );
    }

    if let Some(format) = obj.get("format") {
        let format = format
            .as_str()
            .ok_or_else(|| definition(schema_name, "'format' must be a string"))?;
        field.format = Some(match format {
            "semver" => Format::Semver,
            other => return Err(definition(schema_name, format!("unknown format '{other}'"))),
        });
    }

    field.min_length = parse_bound(obj.get("minLength"), "minLength", schema_name)?;
    field.max_length = parse_bound(obj.get("maxLength"), "maxLength", schema_name)?;
    field.min_items = parse_bound(obj.get("minItems"), "minItems", schema_name)?;
    field.max_items = parse_bound(obj.get("maxItems"), "maxItems", schema_name)?;

    if let Some(required) = obj.get("required") {
        let required = required
            .as_array()
            .ok_or_else(|| definition(schema_name, "'required' must be an array"))?;
        for name in required {
            field.required.push(
                name.as_str()
                    .ok_or_else(|| definition(schema_name, "'required' entries must be strings"))?
                    .to_string(),
            );
        }
    }

    if let Some(props) = obj.get("properties") {
        let props = props
            .as_object()
            .ok_or_else(|| definition(schema_name, "'properties' must be an object"))?;
        for (name, child) in props {
            field
                .properties
                .insert(name.clone(), parse_field(child, schema_name)?);
        }
    }

    if let Some(items) = obj.get("items") {
        field.items = Some(Box::new(parse_field(items, schema_name)?));
    }

    if let Some(additional) = obj.get("additionalProperties") {
        let additional = additional
            .as_bool()
            .ok_or_else(|| definition(schema_name, "'additionalProperties' must be a boolean"))?;
        field.closed = !additional;
    }

    // Every required field must also be declared, otherwise the schema can
    // never be satisfied.
    for name in &field.required {
        if !field.properties.contains_key(name) {
            return Err(definition(
                schema_name,
                format!("required field '{name}' has no property definition"),
            ));
        }
    }

    Ok(field)
}

fn parse_bound(value: Option<&JsonValue>, keyword: &str, schema_name: &str) -> Result<Option<usize>> {
    match value {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| definition(schema_name, format!("'{keyword}' must be a non-negative integer"))),
    }
}

/// Lookup table of schemas, keyed by specification kind.
///
/// Built once at startup and read-only afterwards. The built-in schemas are
/// compiled into the binary; a workspace can override either one by placing
/// `agent-spec-v1.json` / `recipe-spec-v1.json` in its schemas directory.
#[derive(Debug)]
pub struct SchemaStore {
    schemas: BTreeMap<String, Schema>,
}

impl SchemaStore {
    /// Load the embedded schemas.
    pub fn embedded() -> Result<Self> {
        let mut schemas = BTreeMap::new();
        schemas.insert(
            KIND_AGENT.to_string(),
            Schema::from_json(KIND_AGENT, "agent-spec-v1", AGENT_SCHEMA)?,
        );
        schemas.insert(
            KIND_RECIPE.to_string(),
            Schema::from_json(KIND_RECIPE, "recipe-spec-v1", RECIPE_SCHEMA)?,
        );
        Ok(Self { schemas })
    }

    /// Load the embedded schemas, then apply any overrides found in the
    /// workspace schemas directory.
    pub fn load(schemas_dir: &Path) -> Result<Self> {
        let mut store = Self::embedded()?;
        for (kind, file) in [
            (KIND_AGENT, "agent-spec-v1.json"),
            (KIND_RECIPE, "recipe-spec-v1.json"),
        ] {
            let path = schemas_dir.join(file);
            if path.exists() {
                let source = std::fs::read_to_string(&path)?;
                let name = path.display().to_string();
                store
                    .schemas
                    .insert(kind.to_string(), Schema::from_json(kind, &name, &source)?);
            }
        }
        Ok(store)
    }

    pub fn get(&self, kind: &str) -> Option<&Schema> {
        self.schemas.get(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schemas_parse() {
        let store = SchemaStore::embedded().unwrap();
        assert!(store.get(KIND_AGENT).is_some());
        assert!(store.get(KIND_RECIPE).is_some());
        assert!(store.get("workflow").is_none());
        assert_eq!(store.kinds(), vec![KIND_AGENT, KIND_RECIPE]);
    }

    #[test]
    fn test_agent_schema_shape() {
        let store = SchemaStore::embedded().unwrap();
        let schema = store.get(KIND_AGENT).unwrap();
        assert_eq!(schema.title, "Agent Spec v1");
        assert!(schema.root.closed);
        assert!(schema.root.required.contains(&"id".to_string()));
        assert!(schema.declares("model.provider"));
        assert!(schema.declares("constraints.pii_justification"));
        assert!(!schema.declares("model.nonexistent"));
    }

    #[test]
    fn test_malformed_schema_is_fatal() {
        let err = Schema::from_json("agent", "broken", "{ not json").unwrap_err();
        assert!(matches!(
            err,
            AgentsmithError::SchemaDefinition { .. }
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let source = r#"{ "type": "tuple" }"#;
        assert!(Schema::from_json("agent", "bad-type", source).is_err());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let source = r#"{ "type": "string", "pattern": "[unclosed" }"#;
        assert!(Schema::from_json("agent", "bad-pattern", source).is_err());
    }

    #[test]
    fn test_required_without_property_rejected() {
        let source = r#"{ "type": "mapping", "required": ["id"], "properties": {} }"#;
        assert!(Schema::from_json("agent", "bad-required", source).is_err());
    }
}
