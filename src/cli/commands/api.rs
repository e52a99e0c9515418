use clap::Subcommand;
use std::sync::Arc;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::{ApiClient, ClientError, Resource};
use crate::config::PortalConfig;
use crate::session::FileSessionStore;

#[derive(Subcommand)]
pub enum ApiCommands {
    #[command(about = "List records of a resource (users, coaches, courses, credentials, payments)")]
    List {
        #[arg(help = "Resource name")]
        resource: Resource,
        #[arg(long = "param", help = "Query parameter KEY=VALUE (repeatable)")]
        params: Vec<String>,
    },

    #[command(about = "Show one record of a resource")]
    Show {
        #[arg(help = "Resource name")]
        resource: Resource,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "GET an arbitrary endpoint")]
    Get {
        endpoint: String,
        #[arg(long = "param", help = "Query parameter KEY=VALUE (repeatable)")]
        params: Vec<String>,
    },

    #[command(about = "POST a JSON body (from --data or stdin)")]
    Post {
        endpoint: String,
        #[arg(long, help = "JSON body")]
        data: Option<String>,
    },

    #[command(about = "PUT a JSON body (from --data or stdin)")]
    Put {
        endpoint: String,
        #[arg(long, help = "JSON body")]
        data: Option<String>,
    },

    #[command(about = "DELETE an endpoint")]
    Delete {
        endpoint: String,
        #[arg(long = "param", help = "Query parameter KEY=VALUE (repeatable)")]
        params: Vec<String>,
    },
}

pub async fn handle(
    cmd: ApiCommands,
    config: &PortalConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = ApiClient::new(config.api.clone(), Arc::new(FileSessionStore::from_env()))?;

    let result = match cmd {
        ApiCommands::List { resource, params } => {
            client.list(resource, &params_from_args(&params)?).await
        }
        ApiCommands::Show { resource, id } => client.fetch(resource, &id).await,
        ApiCommands::Get { endpoint, params } => {
            client.get(&endpoint, &params_from_args(&params)?).await
        }
        ApiCommands::Post { endpoint, data } => {
            client.post(&endpoint, &read_json_body(data)?).await
        }
        ApiCommands::Put { endpoint, data } => {
            client.put(&endpoint, &read_json_body(data)?).await
        }
        ApiCommands::Delete { endpoint, params } => {
            client.delete(&endpoint, &params_from_args(&params)?).await
        }
    };

    match result {
        Ok(value) => output_value(&output_format, &value),
        Err(ClientError::Status { status, body }) => {
            output_value(&OutputFormat::Json, &body)?;
            anyhow::bail!("request failed with status {}", status)
        }
        Err(ClientError::Unauthorized) => {
            output_error(&output_format, "Session rejected by the API; sign in again", Some("UNAUTHORIZED"))?;
            anyhow::bail!("unauthorized")
        }
        Err(e) => Err(e.into()),
    }
}
