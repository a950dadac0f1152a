//! The renderer: binds validated specifications into registered templates.

use super::template::{self, TemplateSpec, BUILTIN_TARGETS};
use super::RenderedArtifact;
use crate::error::{AgentsmithError, Result};
use crate::validation::Validated;
use handlebars::Handlebars;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::PathBuf;

struct RegisteredTarget {
    spec: TemplateSpec,
    defaults: JsonValue,
    item_defaults: Vec<(String, JsonValue)>,
}

/// Renders validated specifications for registered targets.
///
/// All templates are registered and checked at construction; a malformed
/// template or defaults declaration fails here, before any document is
/// processed. Read-only afterwards, so rendering is deterministic: the same
/// (specification, target) pair always produces byte-identical output.
pub struct Renderer {
    handlebars: Handlebars<'static>,
    targets: BTreeMap<String, RegisteredTarget>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        // Strict mode turns any unbound template field into a render error
        // instead of a silent blank.
        handlebars.set_strict_mode(true);
        // Artifacts are markdown, Python, and JSON; HTML escaping would
        // corrupt them.
        handlebars.register_escape_fn(handlebars::no_escape);
        template::register_helpers(&mut handlebars);

        let mut targets = BTreeMap::new();
        for spec in BUILTIN_TARGETS {
            handlebars.register_template_string(spec.name, spec.source)?;
            targets.insert(spec.name.to_string(), register(*spec)?);
        }

        Ok(Self {
            handlebars,
            targets,
        })
    }

    /// Registered target names, sorted.
    pub fn targets(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.targets.contains_key(target)
    }

    /// Specification kind a registered target consumes.
    pub fn target_kind(&self, target: &str) -> Option<&str> {
        self.targets.get(target).map(|t| t.spec.kind)
    }

    /// Render one validated specification for one target.
    pub fn render(&self, spec: Validated<'_>, target: &str) -> Result<RenderedArtifact> {
        let registered = self
            .targets
            .get(target)
            .ok_or_else(|| AgentsmithError::UnknownTarget(target.to_string()))?;

        let document = spec.document();
        if document.kind != registered.spec.kind {
            return Err(AgentsmithError::Render {
                target: target.to_string(),
                message: format!(
                    "target consumes '{}' specifications, got '{}'",
                    registered.spec.kind, document.kind
                ),
            });
        }

        let bound = bind(document, registered).map_err(|message| AgentsmithError::Render {
            target: target.to_string(),
            message,
        })?;
        let content = self
            .handlebars
            .render(target, &bound)
            .map_err(|e| AgentsmithError::Render {
                target: target.to_string(),
                message: e.to_string(),
            })?;

        Ok(RenderedArtifact {
            target: target.to_string(),
            path: registered.spec.output_path(&document.id()),
            content,
        })
    }
}

fn register(spec: TemplateSpec) -> Result<RegisteredTarget> {
    let defaults = serde_json::from_str(spec.defaults).map_err(|e| {
        AgentsmithError::InvalidConfig(format!("defaults of target '{}': {e}", spec.name))
    })?;
    let mut item_defaults = Vec::new();
    for (path, item) in spec.item_defaults {
        let value = serde_json::from_str(item).map_err(|e| {
            AgentsmithError::InvalidConfig(format!(
                "item defaults '{path}' of target '{}': {e}",
                spec.name
            ))
        })?;
        item_defaults.push((path.to_string(), value));
    }
    Ok(RegisteredTarget {
        spec,
        defaults,
        item_defaults,
    })
}

/// Overlay the specification onto the target's documented defaults.
fn bind(
    document: &crate::document::Document,
    registered: &RegisteredTarget,
) -> std::result::Result<JsonValue, String> {
    let fields = serde_json::to_value(&document.body).map_err(|e| e.to_string())?;
    let mut bound = deep_merge(registered.defaults.clone(), fields);

    for (path, item_default) in &registered.item_defaults {
        if let Some(JsonValue::Array(items)) = bound.get_mut(path.as_str()) {
            for item in items.iter_mut() {
                let merged = deep_merge(item_default.clone(), item.take());
                *item = merged;
            }
        }
    }

    Ok(bound)
}

/// Recursive merge: the overlay wins, except that nested objects merge
/// key-by-key so defaults inside partially specified mappings survive.
fn deep_merge(base: JsonValue, overlay: JsonValue) -> JsonValue {
    match (base, overlay) {
        (JsonValue::Object(mut base), JsonValue::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            JsonValue::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Collection-level supporting artifacts for the langgraph target:
/// `requirements.txt` and an `app.py` API server wiring all agents
/// together. Deterministic: requirements sorted, agents in input order.
pub fn langgraph_support(specs: &[Validated<'_>]) -> Vec<RenderedArtifact> {
    let mut requirements: std::collections::BTreeSet<String> = [
        "langgraph>=0.0.60",
        "langchain>=0.1.0",
        "langchain-core>=0.1.0",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    for spec in specs {
        let provider = spec
            .document()
            .body
            .get("model")
            .and_then(|m| m.get("provider"))
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or("anthropic");
        match provider {
            "anthropic" => {
                requirements.insert("langchain-anthropic>=0.1.0".to_string());
            }
            "openai" => {
                requirements.insert("langchain-openai>=0.1.0".to_string());
            }
            _ => {}
        }
    }

    let requirements_txt = requirements
        .iter()
        .map(|r| format!("{r}\n"))
        .collect::<String>();

    let mut app = String::from(
        "\"\"\"Generated agent collection with FastAPI server.\"\"\"\n\n\
         from fastapi import FastAPI, HTTPException\n\
         from pydantic import BaseModel\n\
         import uvicorn\n\n",
    );
    for spec in specs {
        let id = spec.document().id();
        let module = template::snake_case(&id);
        app.push_str(&format!(
            "from {module}_agent import create_{module}_agent\n"
        ));
    }
    app.push_str(
        "\n\napp = FastAPI(title=\"LangGraph Agents API\", version=\"1.0.0\")\n\n\
         agents = {}\n\n\n\
         class AgentRequest(BaseModel):\n    message: str\n\n\n\
         class AgentResponse(BaseModel):\n    success: bool\n    response: str = None\n    error: str = None\n    agent_id: str\n\n\n\
         @app.on_event(\"startup\")\nasync def startup_event():\n",
    );
    for spec in specs {
        let id = spec.document().id();
        let module = template::snake_case(&id);
        app.push_str(&format!(
            "    agents[\"{id}\"] = create_{module}_agent()\n"
        ));
    }
    app.push_str(
        "\n\n@app.get(\"/agents\")\nasync def list_agents():\n    \
         return {\"agents\": [\n        {\"id\": agent_id, \"name\": agent.name, \"description\": agent.description}\n        \
         for agent_id, agent in agents.items()\n    ]}\n\n\n\
         @app.post(\"/agents/{agent_id}/invoke\", response_model=AgentResponse)\n\
         async def invoke_agent(agent_id: str, request: AgentRequest):\n    \
         if agent_id not in agents:\n        \
         raise HTTPException(status_code=404, detail=f\"Agent {agent_id} not found\")\n    \
         result = await agents[agent_id].ainvoke(request.message)\n    \
         return AgentResponse(\n        success=result[\"success\"],\n        response=result.get(\"response\"),\n        error=result.get(\"error\"),\n        agent_id=agent_id,\n    )\n\n\n\
         if __name__ == \"__main__\":\n    uvicorn.run(app, host=\"0.0.0.0\", port=8000)\n",
    );

    vec![
        RenderedArtifact {
            target: "langgraph".to_string(),
            path: PathBuf::from("requirements.txt"),
            content: requirements_txt,
        },
        RenderedArtifact {
            target: "langgraph".to_string(),
            path: PathBuf::from("app.py"),
            content: app,
        },
    ]
}
