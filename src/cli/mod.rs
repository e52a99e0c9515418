pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::PortalConfig;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Pickleball portal CLI - sign in, check page access and call the admin API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and inspect the stored session")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Evaluate page access for the stored session")]
    Guard {
        #[command(subcommand)]
        cmd: commands::guard::GuardCommands,
    },

    #[command(about = "Compose API request URLs")]
    Url {
        #[command(subcommand)]
        cmd: commands::url::UrlCommands,
    },

    #[command(about = "Call the portal API")]
    Api {
        #[command(subcommand)]
        cmd: commands::api::ApiCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: &PortalConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, config, output_format).await,
        Commands::Guard { cmd } => commands::guard::handle(cmd, config, output_format).await,
        Commands::Url { cmd } => commands::url::handle(cmd, config, output_format).await,
        Commands::Api { cmd } => commands::api::handle(cmd, config, output_format).await,
    }
}
