use crate::config::Config;
use crate::document::KIND_AGENT;
use crate::error::{AgentsmithError, Result};
use crate::loader;
use crate::pipeline::{Pipeline, RenderOutcome};
use crate::project::Project;
use crate::render::RenderedArtifact;
use crate::schema::SchemaStore;
use std::path::{Path, PathBuf};

pub fn execute(
    project: &Project,
    config: &Config,
    target: &str,
    agent_id: Option<&str>,
    install: bool,
) -> Result<()> {
    let schemas = SchemaStore::load(&project.schemas_dir(config))?;
    let pipeline = Pipeline::new(schemas)?;

    if !pipeline.renderer().has_target(target) {
        return Err(AgentsmithError::UnknownTarget(format!(
            "{} (available: {})",
            target,
            pipeline.renderer().targets().join(", ")
        )));
    }

    let mut documents = loader::load_workspace(
        &project.agents_dir(config),
        &project.recipes_dir(config),
    )?;

    if let Some(id) = agent_id {
        documents.retain(|d| d.kind == KIND_AGENT && d.id() == id);
        if documents.is_empty() {
            return Err(AgentsmithError::AgentNotFound(id.to_string()));
        }
    }

    if documents.is_empty() {
        println!("No specification files found.");
        return Ok(());
    }

    let outcomes = pipeline.process(&documents, &[target]);
    let output_dir = project.output_dir(config, target);

    let mut rendered = 0;
    let mut failed = 0;
    for outcome in &outcomes {
        if !outcome.is_valid() {
            failed += 1;
            eprintln!(
                "✗ {} skipped: {} validation error(s)",
                outcome.id,
                outcome.error_count()
            );
            if config.verbose {
                for issue in outcome.structural.issues() {
                    eprintln!("    {}", issue);
                }
                if let Some(result) = &outcome.semantic {
                    for issue in result.issues() {
                        eprintln!("    {}", issue);
                    }
                }
            }
            continue;
        }
        for render in &outcome.renders {
            match render {
                RenderOutcome::Rendered(artifact) => {
                    let path = write_artifact(&output_dir, artifact)?;
                    rendered += 1;
                    println!("✓ {} -> {}", outcome.id, path.display());
                    if install && target == "claude" {
                        install_claude_artifact(artifact)?;
                    }
                }
                RenderOutcome::Failed { target, message } => {
                    failed += 1;
                    eprintln!("✗ {} ({}): {}", outcome.id, target, message);
                }
            }
        }
    }

    // Per-collection scaffolding, only rendered when the whole workspace
    // (not a single agent) is in play.
    if agent_id.is_none() {
        for artifact in pipeline.support_artifacts(&outcomes, &documents, target) {
            let path = write_artifact(&output_dir, &artifact)?;
            println!("✓ {}", path.display());
        }
    }

    println!();
    println!("Rendered {} artifact(s) for target '{}'", rendered, target);
    if failed > 0 {
        return Err(AgentsmithError::ValidationFailed {
            invalid: failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

fn write_artifact(output_dir: &Path, artifact: &RenderedArtifact) -> Result<PathBuf> {
    let path = output_dir.join(&artifact.path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &artifact.content)?;
    Ok(path)
}

/// Copy a rendered claude subagent into ~/.claude/agents so Claude Code
/// picks it up.
fn install_claude_artifact(artifact: &RenderedArtifact) -> Result<()> {
    let home = std::env::var("HOME").map_err(|_| {
        AgentsmithError::InvalidConfig("HOME is not set, cannot install".to_string())
    })?;
    let install_dir = PathBuf::from(home).join(".claude/agents");
    std::fs::create_dir_all(&install_dir)?;
    let dest = install_dir.join(&artifact.path);
    std::fs::write(&dest, &artifact.content)?;
    println!("  installed {}", dest.display());
    Ok(())
}
