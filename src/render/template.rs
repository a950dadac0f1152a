//! Built-in target templates and the handlebars helpers they use.
//!
//! Each target declares its template source, the spec kind it consumes, its
//! output filename rule, and the documented defaults for every optional
//! field the template reads. Defaults are explicit per template; a field
//! with neither a value nor a default is a render-time error (strict mode),
//! never a silent blank.

use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, Renderable,
};
use serde_json::{json, Value as JsonValue};
use std::path::PathBuf;

use crate::document::KIND_AGENT;

/// How a target derives its output filename from the agent identifier.
#[derive(Debug, Clone, Copy)]
pub enum OutputName {
    /// `{id}{suffix}`, identifier kept kebab-case.
    Kebab(&'static str),
    /// `{id with - as _}{suffix}`, for language identifiers.
    Snake(&'static str),
}

/// Declaration of one render target.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSpec {
    pub name: &'static str,
    /// Specification kind this template consumes.
    pub kind: &'static str,
    pub source: &'static str,
    /// Documented defaults overlaid under the specification fields.
    pub defaults: &'static str,
    /// Per-item defaults for sequence fields, as (path, defaults) pairs.
    pub item_defaults: &'static [(&'static str, &'static str)],
    pub output: OutputName,
}

impl TemplateSpec {
    pub fn output_path(&self, id: &str) -> PathBuf {
        match self.output {
            OutputName::Kebab(suffix) => PathBuf::from(format!("{id}{suffix}")),
            OutputName::Snake(suffix) => PathBuf::from(format!("{}{suffix}", snake_case(id))),
        }
    }
}

/// The built-in target set.
pub const BUILTIN_TARGETS: &[TemplateSpec] = &[
    TemplateSpec {
        name: "claude",
        kind: KIND_AGENT,
        source: include_str!("../../templates/claude_subagent.md.hbs"),
        defaults: r#"{
            "tools": [],
            "constraints": { "pii_policy": "mask", "pii_justification": "" },
            "evaluation": { "acceptance": [] }
        }"#,
        item_defaults: &[("tools", r#"{ "description": "" }"#)],
        output: OutputName::Kebab(".md"),
    },
    TemplateSpec {
        name: "langgraph",
        kind: KIND_AGENT,
        source: include_str!("../../templates/langgraph_agent.py.hbs"),
        defaults: r#"{
            "model": { "params": { "temperature": 0.2 } },
            "constraints": { "max_tokens": 4096 }
        }"#,
        item_defaults: &[],
        output: OutputName::Snake("_agent.py"),
    },
    TemplateSpec {
        name: "assistants",
        kind: KIND_AGENT,
        source: include_str!("../../templates/assistant_config.json.hbs"),
        defaults: r#"{ "tools": [] }"#,
        item_defaults: &[],
        output: OutputName::Kebab("_assistant.json"),
    },
];

pub fn snake_case(id: &str) -> String {
    id.replace('-', "_")
}

pub fn pascal_case(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Register the helpers the built-in templates depend on.
pub fn register_helpers(hb: &mut Handlebars) {
    hb.register_helper("if_eq", Box::new(if_eq_helper));
    hb.register_helper("snake_case", Box::new(snake_case_helper));
    hb.register_helper("pascal_case", Box::new(pascal_case_helper));
    hb.register_helper("json", Box::new(json_helper));
    hb.register_helper("openai_model", Box::new(openai_model_helper));
    hb.register_helper("openai_tools", Box::new(openai_tools_helper));
}

fn if_eq_helper<'reg, 'rc>(
    h: &Helper<'rc>,
    hb: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let a = h.param(0).map(|v| v.value());
    let b = h.param(1).map(|v| v.value());

    let template = if a == b { h.template() } else { h.inverse() };
    if let Some(t) = template {
        t.render(hb, ctx, rc, out)?;
    }
    Ok(())
}

fn snake_case_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&snake_case(text))?;
    Ok(())
}

fn pascal_case_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&pascal_case(text))?;
    Ok(())
}

/// Serialize a value as a JSON literal, for templates producing JSON.
fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h.param(0).map(|v| v.value()).unwrap_or(&JsonValue::Null);
    out.write(&serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()))?;
    Ok(())
}

/// Map a model descriptor to an OpenAI assistant model name.
fn openai_model_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let model = h.param(0).map(|v| v.value()).unwrap_or(&JsonValue::Null);
    let provider = model.get("provider").and_then(JsonValue::as_str).unwrap_or("openai");
    let tier = model.get("tier").and_then(JsonValue::as_str).unwrap_or("gpt-4");

    let name = if provider == "openai" {
        match tier {
            "gpt-3.5" => "gpt-3.5-turbo",
            "gpt-4" => "gpt-4",
            "gpt-4o" => "gpt-4o",
            _ => "gpt-4",
        }
    } else {
        // Non-OpenAI specs fall back to the strongest generic model.
        "gpt-4"
    };

    out.write(name)?;
    Ok(())
}

/// Map tool descriptors to the OpenAI assistant tools format.
fn openai_tools_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let empty = Vec::new();
    let tools = h
        .param(0)
        .and_then(|v| v.value().as_array())
        .unwrap_or(&empty);

    let mut mapped = Vec::new();
    for tool in tools {
        let tool_type = tool.get("type").and_then(JsonValue::as_str);
        let tool_id = tool.get("id").and_then(JsonValue::as_str).unwrap_or("");
        match tool_type {
            Some("builtin") => {
                if tool_id == "code_interpreter" || tool_id == "file_search" {
                    mapped.push(json!({ "type": tool_id }));
                }
            }
            Some("http") => {
                let description = tool
                    .get("description")
                    .and_then(JsonValue::as_str)
                    .unwrap_or("");
                mapped.push(json!({
                    "type": "function",
                    "function": {
                        "name": tool_id,
                        "description": description,
                        "parameters": {
                            "type": "object",
                            "properties": {},
                            "required": []
                        }
                    }
                }));
            }
            _ => {}
        }
    }

    out.write(&serde_json::to_string(&mapped).unwrap_or_else(|_| "[]".to_string()))?;
    Ok(())
}
