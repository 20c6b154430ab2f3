//! Session commands: login, logout, whoami and permission checks.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use apqp_core::permissions::{PermissionSets, PolicyDecision};
use apqp_core::ApqpClient;
use clap::Args;
use tracing::debug;

use crate::commands::config::{self, SessionFile};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct LoginArgs {
    /// Account name
    pub username: String,

    /// Password (prompted for when omitted)
    #[arg(long, env = "APQP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct CanArgs {
    /// Action: create, read, update or delete
    pub action: String,

    /// Entity type (e.g. project, ppap, todo)
    pub entity: String,

    /// Specific entity ID
    #[arg(long)]
    pub id: Option<u64>,
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(args: LoginArgs, client: &ApqpClient, format: OutputFormat) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password()?,
    };

    client.auth.login(&args.username, &password).await?;

    config::save_session(&SessionFile {
        base_url: client.client().base_url().to_string(),
        cookies: client.client().cookies(),
    })?;
    debug!("Session saved");

    match format {
        OutputFormat::Table => output::print_success(&format!("Logged in as {}", args.username)),
        _ => output::print_item(
            &serde_json::json!({
                "username": args.username,
                "authenticated": client.auth.is_authenticated(),
            }),
            format,
        )?,
    }
    Ok(())
}

pub async fn logout(client: &ApqpClient, format: OutputFormat) -> Result<()> {
    client.auth.logout().await?;
    config::clear_session()?;

    match format {
        OutputFormat::Table => output::print_success("Logged out"),
        _ => output::print_item(&serde_json::json!({ "authenticated": false }), format)?,
    }
    Ok(())
}

fn join(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "-".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn print_permission_sets(permissions: &PermissionSets) {
    output::print_detail("can_create", &join(&permissions.can_create));
    output::print_detail("can_read", &join(&permissions.can_read));
    output::print_detail("can_update", &join(&permissions.can_update));
    output::print_detail("can_delete", &join(&permissions.can_delete));
}

pub async fn whoami(client: &ApqpClient, format: OutputFormat) -> Result<()> {
    client.auth.check_auth_status().await;

    let Some(user) = client.auth.current_user() else {
        match format {
            OutputFormat::Table => output::print_info("Not logged in."),
            _ => output::print_item(&serde_json::json!({ "authenticated": false }), format)?,
        }
        return Ok(());
    };

    match format {
        OutputFormat::Table => {
            output::print_header("Current user");
            output::print_detail(
                "authorization_level",
                &format!("{:?}", user.authorization.authorization_level).to_lowercase(),
            );
            print_permission_sets(&user.authorization.permissions);
        }
        _ => output::print_item(&user, format)?,
    }
    Ok(())
}

pub async fn can(args: CanArgs, client: &ApqpClient, format: OutputFormat) -> Result<()> {
    client.auth.check_auth_status().await;
    let decision = client.auth.decide(&args.action, &args.entity, args.id);

    match format {
        OutputFormat::Table => match &decision {
            PolicyDecision::Allow => {
                output::print_success(&format!("{} {}: allowed", args.action, args.entity))
            }
            PolicyDecision::Deny(reason) => output::print_error(
                &format!("{} {}: denied ({})", args.action, args.entity, reason),
            ),
        },
        _ => output::print_item(
            &serde_json::json!({
                "action": args.action,
                "entity": args.entity,
                "id": args.id,
                "allowed": decision.is_allowed(),
            }),
            format,
        )?,
    }
    Ok(())
}
