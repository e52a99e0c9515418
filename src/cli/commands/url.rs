use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::PortalConfig;
use crate::url_builder::build_url;

#[derive(Subcommand)]
pub enum UrlCommands {
    #[command(about = "Print the absolute URL for an API endpoint")]
    Build {
        #[arg(help = "Endpoint path, optionally with a query string (e.g. 'courses?level=2')")]
        endpoint: String,
        #[arg(long = "param", help = "Extra query parameter KEY=VALUE (repeat a key for lists)")]
        params: Vec<String>,
    },
}

pub async fn handle(
    cmd: UrlCommands,
    config: &PortalConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        UrlCommands::Build { endpoint, params } => {
            let params = params_from_args(&params)?;
            let url = build_url(&config.api, &endpoint, &params);
            match output_format {
                OutputFormat::Json => output_value(&output_format, &json!({ "url": url.as_str() })),
                OutputFormat::Text => {
                    println!("{}", url);
                    Ok(())
                }
            }
        }
    }
}
