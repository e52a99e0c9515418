use clap::Parser;
use pickleball_portal::cli::Cli;
use pickleball_portal::config::{self, PortalConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match PortalConfig::from_env() {
        Ok(portal_config) => match config::init(portal_config) {
            Ok(portal_config) => pickleball_portal::cli::run(cli, portal_config).await,
            Err(e) => Err(e.into()),
        },
        Err(e) => Err(anyhow::anyhow!("invalid configuration: {}", e)),
    };

    if let Err(e) = result {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
