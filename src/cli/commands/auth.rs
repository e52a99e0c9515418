use clap::Subcommand;
use serde_json::json;
use std::io::BufRead;
use std::sync::Arc;

use crate::auth;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config::PortalConfig;
use crate::session::{self, FileSessionStore, Role, SessionRead};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Clear the stored session")]
    Logout,

    #[command(about = "Show the stored session")]
    Status,

    #[command(about = "Mint a gateway token signed with PORTAL_JWT_SECRET")]
    Token {
        #[arg(help = "Subject (user id) the token is issued for")]
        sub: String,
        #[arg(long, help = "Role claim (ADMIN, COACH, LEARNER)")]
        role: String,
    },
}

pub async fn handle(
    cmd: AuthCommands,
    config: &PortalConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let store = Arc::new(FileSessionStore::from_env());

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password_line()?,
            };
            let client = ApiClient::new(config.api.clone(), store)?;
            let session = auth::sign_in(&client, &email, &password).await?;
            let role = session
                .role
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "none".to_string());
            output_success(
                &output_format,
                &format!("Signed in as {} (role: {})", email, role),
                Some(json!({ "user": session })),
            )
        }
        AuthCommands::Logout => {
            auth::sign_out(store.as_ref())?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => match session::read_session(store.as_ref()) {
            SessionRead::Present(session) => {
                let role = session.role.as_ref().map(|r| r.to_string()).unwrap_or_default();
                output_success(
                    &output_format,
                    &format!("Signed in (role: {})", role),
                    Some(json!({ "user": session })),
                )
            }
            SessionRead::Missing => output_success(
                &output_format,
                "Not signed in",
                Some(json!({ "user": null })),
            ),
            SessionRead::Malformed(reason) => {
                output_error(&output_format, &format!("Stored session is invalid: {}", reason), Some("MALFORMED_SESSION"))
            }
            SessionRead::Unavailable => output_error(
                &output_format,
                "No session store available (set PORTAL_CONFIG_DIR or HOME)",
                Some("STORE_UNAVAILABLE"),
            ),
        },
        AuthCommands::Token { sub, role } => {
            let role = Role::from(role.as_str());
            if role.is_blank() {
                anyhow::bail!("--role must not be empty");
            }
            let token = auth::issue_session_token(&config.security, &sub, role.clone())?;
            match output_format {
                OutputFormat::Json => output_value(
                    &output_format,
                    &json!({
                        "token": token,
                        "sub": sub,
                        "role": role,
                        "expiresInHours": config.security.jwt_expiry_hours,
                    }),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}

fn read_password_line() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(&['\r', '\n'][..]).to_string();
    if password.is_empty() {
        anyhow::bail!("password is required");
    }
    Ok(password)
}
