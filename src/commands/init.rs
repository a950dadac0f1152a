use crate::config::Config;
use crate::error::{AgentsmithError, Result};
use crate::project::Project;

const STARTER: &str = include_str!("../../templates/agent-starter.yaml");

pub fn execute(
    project: &Project,
    config: &Config,
    agent_id: &str,
    name: Option<&str>,
    owner: Option<&str>,
) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => title_case(agent_id),
    };
    let owner = owner
        .map(str::to_string)
        .or_else(|| (!config.init.owner.is_empty()).then(|| config.init.owner.clone()))
        .unwrap_or_else(|| "team@company.com".to_string());

    let content = STARTER
        .replace("my-agent-id", agent_id)
        .replace("My Agent Name", &name)
        .replace("team@company.com", &owner);

    let dir = project.agents_dir(config).join(&config.init.domain);
    let path = dir.join(format!("{}.yaml", agent_id));
    if path.exists() {
        return Err(AgentsmithError::AlreadyExists(path));
    }
    std::fs::create_dir_all(&dir)?;
    std::fs::write(&path, content)?;

    println!("✓ Created {}", path.display());
    println!("  Edit the file, then run 'agentsmith validate' to check it.");
    Ok(())
}

/// "code-reviewer" -> "Code Reviewer"
fn title_case(id: &str) -> String {
    id.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
