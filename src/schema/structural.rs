//! Structural validation: shape conformance of a document against its
//! schema.
//!
//! Pure function of (document, schema). Every check runs; nothing stops at
//! the first failure, so one invocation reports every structural problem
//! with its dotted field path.

use super::{FieldSchema, FieldType, Format, Schema};
use crate::document::Document;
use crate::validation::ValidationResult;
use serde_yaml::Value;

/// Validate a document against the schema for its kind.
pub fn validate_structure(document: &Document, schema: &Schema) -> ValidationResult {
    let mut result = ValidationResult::new();
    check_value(&document.body, &schema.root, "", &mut result);
    result
}

fn check_value(value: &Value, schema: &FieldSchema, path: &str, result: &mut ValidationResult) {
    if let Some(expected) = schema.field_type {
        if !type_matches(expected, value) {
            result.error(
                path,
                format!(
                    "expected {}, found {}",
                    expected.name(),
                    type_name(value)
                ),
            );
            return;
        }
    }

    match value {
        Value::String(s) => check_string(s, schema, path, result),
        Value::Mapping(map) => check_mapping(map, schema, path, result),
        Value::Sequence(seq) => check_sequence(seq, schema, path, result),
        _ => {}
    }
}

fn check_string(value: &str, schema: &FieldSchema, path: &str, result: &mut ValidationResult) {
    if let Some(values) = &schema.enum_values {
        if !values.iter().any(|v| v == value) {
            result.error(path, format!("must be one of: {}", values.join(", ")));
        }
    }

    if let Some(pattern) = &schema.pattern {
        if !pattern.is_match(value) {
            result.error(
                path,
                format!("'{}' does not match pattern '{}'", value, pattern.as_str()),
            );
        }
    }

    if let Some(min) = schema.min_length {
        if value.chars().count() < min {
            result.error(path, format!("must be at least {min} characters"));
        }
    }
    if let Some(max) = schema.max_length {
        if value.chars().count() > max {
            result.error(path, format!("must be at most {max} characters"));
        }
    }

    if let Some(Format::Semver) = schema.format {
        if semver::Version::parse(value).is_err() {
            result.error(path, format!("'{value}' is not a valid semantic version"));
        }
    }
}

fn check_mapping(
    map: &serde_yaml::Mapping,
    schema: &FieldSchema,
    path: &str,
    result: &mut ValidationResult,
) {
    for name in &schema.required {
        if !map.contains_key(&Value::String(name.clone())) {
            result.error(join(path, name), "required field is missing");
        }
    }

    for (key, value) in map {
        let Some(key) = key.as_str() else {
            result.error(path, "mapping keys must be strings");
            continue;
        };
        match schema.properties.get(key) {
            Some(child) => check_value(value, child, &join(path, key), result),
            None => {
                if schema.closed {
                    result.error(join(path, key), "undeclared field");
                }
            }
        }
    }
}

fn check_sequence(
    seq: &[Value],
    schema: &FieldSchema,
    path: &str,
    result: &mut ValidationResult,
) {
    if let Some(min) = schema.min_items {
        if seq.len() < min {
            result.error(path, format!("must have at least {min} items"));
        }
    }
    if let Some(max) = schema.max_items {
        if seq.len() > max {
            result.error(path, format!("must have at most {max} items"));
        }
    }

    if let Some(items) = &schema.items {
        for (index, item) in seq.iter().enumerate() {
            check_value(item, items, &join(path, &index.to_string()), result);
        }
    }
}

fn type_matches(expected: FieldType, value: &Value) -> bool {
    match expected {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
        FieldType::Boolean => value.is_bool(),
        FieldType::Mapping => value.is_mapping(),
        FieldType::Sequence => value.is_sequence(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}
