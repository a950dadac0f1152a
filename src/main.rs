#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;

use agentsmith::cli::{Cli, Commands};
use agentsmith::commands;
use agentsmith::config::Config;
use agentsmith::error::AgentsmithError;
use agentsmith::project::Project;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let project = Project::detect()?;
    let config = Config::load(project.root())?.with_cli_overrides(&cli);

    let result = match &cli.command {
        Commands::Validate { path } => {
            commands::validate::execute(&project, &config, path.as_deref())
        }
        Commands::Render {
            target,
            agent_id,
            install,
            ..
        } => commands::render::execute(
            &project,
            &config,
            target,
            agent_id.as_deref(),
            *install,
        ),
        Commands::List { domain, tag } => {
            commands::list::execute(&project, &config, domain.as_deref(), tag.as_deref())
        }
        Commands::Init {
            agent_id,
            name,
            owner,
            ..
        } => commands::init::execute(
            &project,
            &config,
            agent_id,
            name.as_deref(),
            owner.as_deref(),
        ),
    };

    match result {
        Ok(()) => Ok(()),
        // Validation failures are already reported per file; exit non-zero
        // without an anyhow backtrace wrapper.
        Err(e @ AgentsmithError::ValidationFailed { .. }) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
