use crate::config::Config;
use crate::document::{KIND_AGENT, KIND_RECIPE};
use crate::error::{AgentsmithError, Result};
use crate::loader;
use crate::pipeline::{DocumentOutcome, Pipeline};
use crate::project::Project;
use crate::schema::SchemaStore;
use crate::validation::Severity;
use std::path::Path;

pub fn execute(project: &Project, config: &Config, path: Option<&Path>) -> Result<()> {
    let schemas = SchemaStore::load(&project.schemas_dir(config))?;
    let pipeline = Pipeline::new(schemas)?;

    let documents = match path {
        Some(path) => vec![loader::load_file(path, kind_hint(path))?],
        None => loader::load_workspace(
            &project.agents_dir(config),
            &project.recipes_dir(config),
        )?,
    };

    if documents.is_empty() {
        println!("No specification files found.");
        return Ok(());
    }

    let outcomes = pipeline.process(&documents, &[]);

    for outcome in &outcomes {
        report(outcome, config.verbose);
    }

    let total = outcomes.len();
    let invalid = outcomes.iter().filter(|o| !o.is_valid()).count();
    let warnings: usize = outcomes
        .iter()
        .flat_map(|o| o.structural.issues().iter().chain(
            o.semantic.iter().flat_map(|r| r.issues().iter()),
        ))
        .filter(|i| i.severity == Severity::Warning)
        .count();

    println!();
    println!("Validated {} file(s): {} passed, {} failed", total, total - invalid, invalid);
    if warnings > 0 {
        println!("{} warning(s)", warnings);
    }

    if invalid > 0 {
        return Err(AgentsmithError::ValidationFailed { invalid, total });
    }
    Ok(())
}

fn report(outcome: &DocumentOutcome, verbose: bool) {
    let marker = if outcome.is_valid() { "✓" } else { "✗" };
    println!(
        "{} {} ({}: {})",
        marker,
        outcome.source.display(),
        outcome.kind,
        outcome.id
    );

    let issues = outcome
        .structural
        .issues()
        .iter()
        .chain(outcome.semantic.iter().flat_map(|r| r.issues().iter()));
    for issue in issues {
        if issue.severity == Severity::Warning && !verbose && outcome.is_valid() {
            continue;
        }
        let label = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!("    {}: {}", label, issue);
    }
}

/// Derive a kind hint from the directory a standalone file sits in.
fn kind_hint(path: &Path) -> Option<&'static str> {
    let components: Vec<&str> = path
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    if components.contains(&"agents") {
        Some(KIND_AGENT)
    } else if components.contains(&"recipes") {
        Some(KIND_RECIPE)
    } else {
        None
    }
}
