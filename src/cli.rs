use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "agentsmith",
    about = "Validate declarative agent specifications and render them for runtime targets",
    version = env!("AGENTSMITH_VERSION")
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output including per-field validation details
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate agent and recipe specifications
    Validate {
        /// Validate a single file instead of the whole workspace
        path: Option<PathBuf>,
    },

    /// Render validated specifications for a runtime target
    Render {
        /// Target to render for (claude, langgraph, assistants)
        target: String,

        /// Render a single agent by identifier
        #[arg(long)]
        agent_id: Option<String>,

        /// Directory to write artifacts to (default: generated/<target>)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also install claude artifacts into ~/.claude/agents
        #[arg(long)]
        install: bool,
    },

    /// List the specifications in the workspace
    List {
        /// Only show specifications from this domain
        #[arg(long)]
        domain: Option<String>,

        /// Only show specifications carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Scaffold a new agent specification
    Init {
        /// Identifier for the new agent (kebab-case)
        agent_id: String,

        /// Domain directory to place the agent under
        #[arg(long)]
        domain: Option<String>,

        /// Human readable name
        #[arg(long)]
        name: Option<String>,

        /// Owning contact (email)
        #[arg(long)]
        owner: Option<String>,
    },
}
