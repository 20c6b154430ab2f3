//! APQP CLI - Command-line client for the APQP/PPAP quality-management backend.
//!
//! Provides session, resource, relationship-action and configuration commands.

mod commands;
mod output;

use anyhow::Result;
use apqp_core::config::ClientConfig;
use apqp_core::resources::{
    Authorizations, Clients, Contacts, Departments, Documents, Elements, History,
    OutputTemplates, Outputs, Persons, PhaseTemplates, Phases, Ppaps, Projects, Teams, Todos,
    Users,
};
use apqp_core::telemetry::init_logging;
use apqp_core::ApqpClient;
use clap::{Parser, Subcommand};
use tracing::debug;

use commands::resource::{execute_full, execute_mutable, execute_read_only, ResourceCommands};
use commands::{action, auth, config};
use output::OutputFormat;

/// APQP - quality-management backend CLI
#[derive(Parser)]
#[command(
    name = "apqp",
    version,
    about = "APQP - quality-management backend CLI",
    long_about = "Work with APQP projects, PPAP submissions, teams and to-dos on a quality-management backend.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Backend URL
    #[arg(long, global = true, env = "APQP_API_URL")]
    api_url: Option<String>,

    /// Client settings file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "APQP_CONFIG")]
    config: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the backend
    Login(auth::LoginArgs),

    /// Log out and forget the saved session
    Logout,

    /// Show the current user's authorization profile
    Whoami,

    /// Check whether the current user may perform an action
    Can(auth::CanArgs),

    /// APQP projects
    #[command(subcommand)]
    Projects(ResourceCommands),

    /// PPAP submissions
    #[command(subcommand)]
    Ppaps(ResourceCommands),

    /// Project phases
    #[command(subcommand)]
    Phases(ResourceCommands),

    /// Phase outputs
    #[command(subcommand)]
    Outputs(ResourceCommands),

    /// Documents
    #[command(subcommand)]
    Documents(ResourceCommands),

    /// Teams
    #[command(subcommand)]
    Teams(ResourceCommands),

    /// Persons
    #[command(subcommand)]
    Persons(ResourceCommands),

    /// Departments
    #[command(subcommand)]
    Departments(ResourceCommands),

    /// Client contacts
    #[command(subcommand)]
    Contacts(ResourceCommands),

    /// Clients
    #[command(subcommand)]
    Clients(ResourceCommands),

    /// Phase templates
    #[command(subcommand)]
    PhaseTemplates(ResourceCommands),

    /// Output templates
    #[command(subcommand)]
    OutputTemplates(ResourceCommands),

    /// PPAP elements
    #[command(subcommand)]
    Elements(ResourceCommands),

    /// To-dos
    #[command(subcommand)]
    Todos(ResourceCommands),

    /// Change history (read-only)
    #[command(subcommand)]
    History(ResourceCommands),

    /// User accounts
    #[command(subcommand)]
    Users(ResourceCommands),

    /// Authorization profiles
    #[command(subcommand)]
    Authorizations(ResourceCommands),

    /// Relationship actions (team membership, reassignment, cloning)
    #[command(subcommand)]
    Action(action::ActionCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

/// Resolve client settings. The backend URL comes from `--api-url`, then the
/// settings file when one is given, then the saved CLI config, then the environment.
fn load_settings(config_path: Option<&str>, api_url: Option<String>) -> Result<ClientConfig> {
    let (mut settings, saved_url) = match config_path {
        Some(path) => (ClientConfig::from_file(path)?, None),
        None => (ClientConfig::load()?, config::load_api_url()),
    };
    if let Some(url) = api_url.or(saved_url) {
        settings.api.base_url = url;
    }
    Ok(settings)
}

fn build_client(
    config_path: Option<&str>,
    api_url: Option<String>,
    verbose: bool,
) -> Result<ApqpClient> {
    let mut settings = load_settings(config_path, api_url)?;
    if verbose {
        settings.logging.level = "debug".to_string();
    }
    init_logging(&settings.logging)?;

    let client = ApqpClient::from_config(&settings)?;

    let cookies = config::load_session(client.client().base_url());
    debug!(count = cookies.len(), "Restoring saved session cookies");
    for cookie in &cookies {
        client.client().add_cookie(cookie);
    }

    Ok(client)
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.output;

    // Config commands work without a reachable backend.
    let command = match cli.command {
        Commands::Config(cmd) => return config::execute(cmd, format).await,
        command => command,
    };

    let client = build_client(cli.config.as_deref(), cli.api_url, cli.verbose)?;
    let api = &client.api;

    match command {
        Commands::Login(args) => auth::login(args, &client, format).await,
        Commands::Logout => auth::logout(&client, format).await,
        Commands::Whoami => auth::whoami(&client, format).await,
        Commands::Can(args) => auth::can(args, &client, format).await,
        Commands::Projects(cmd) => execute_full::<Projects>(cmd, api, format).await,
        Commands::Ppaps(cmd) => execute_full::<Ppaps>(cmd, api, format).await,
        Commands::Phases(cmd) => execute_full::<Phases>(cmd, api, format).await,
        Commands::Outputs(cmd) => execute_full::<Outputs>(cmd, api, format).await,
        Commands::Documents(cmd) => execute_full::<Documents>(cmd, api, format).await,
        Commands::Teams(cmd) => execute_full::<Teams>(cmd, api, format).await,
        Commands::Persons(cmd) => execute_full::<Persons>(cmd, api, format).await,
        Commands::Departments(cmd) => execute_full::<Departments>(cmd, api, format).await,
        Commands::Contacts(cmd) => execute_full::<Contacts>(cmd, api, format).await,
        Commands::Clients(cmd) => execute_full::<Clients>(cmd, api, format).await,
        Commands::PhaseTemplates(cmd) => execute_full::<PhaseTemplates>(cmd, api, format).await,
        Commands::OutputTemplates(cmd) => execute_full::<OutputTemplates>(cmd, api, format).await,
        Commands::Elements(cmd) => execute_full::<Elements>(cmd, api, format).await,
        Commands::Todos(cmd) => execute_full::<Todos>(cmd, api, format).await,
        Commands::History(cmd) => execute_read_only::<History>(cmd, api, format).await,
        Commands::Users(cmd) => execute_mutable::<Users>(cmd, api, format).await,
        Commands::Authorizations(cmd) => execute_full::<Authorizations>(cmd, api, format).await,
        Commands::Action(cmd) => action::execute(cmd, api, format).await,
        Commands::Config(_) => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://quality.example.com"

[auth]
permissions_path = "/api/me/permissions/"
"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_config_flag_parses_globally() {
        let cli = Cli::try_parse_from(["apqp", "projects", "list", "--config", "apqp.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("apqp.toml"));
    }

    #[test]
    fn test_settings_file_is_loaded() {
        let file = settings_file();
        let settings = load_settings(file.path().to_str(), None).unwrap();
        assert_eq!(settings.api.base_url, "https://quality.example.com");
        assert_eq!(settings.auth.permissions_path, "/api/me/permissions/");
    }

    #[test]
    fn test_api_url_flag_overrides_settings_file() {
        let file = settings_file();
        let settings =
            load_settings(file.path().to_str(), Some("http://localhost:9000".to_string())).unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:9000");
        assert_eq!(settings.auth.permissions_path, "/api/me/permissions/");
    }

    #[test]
    fn test_missing_settings_file_fails() {
        assert!(load_settings(Some("/nonexistent/apqp.toml"), None).is_err());
    }
}
