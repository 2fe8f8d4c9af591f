//! CLI administration tool for redirect-manager.
//!
//! Manages redirect rules and API tokens and runs database diagnostics
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # List rules whose source contains "blog"
//! cargo run --bin admin -- rule list --from blog
//!
//! # Add a rule
//! cargo run --bin admin -- rule add --from /old-page/ --to /new-page/
//!
//! # Show where a path currently redirects
//! cargo run --bin admin -- rule check /old-page/
//!
//! # Create a new API token
//! cargo run --bin admin -- token create
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server, see [`redirect_manager::config`]. `TOKEN_SIGNING_SECRET`
//! must match the server's or created tokens will not authenticate.
//!
//! Rule changes go through the same validation as the API and drop the
//! shared Redis table, so running servers pick them up on their next refresh.

use redirect_manager::application::services::{RedirectSummary, generate_token, hash_token};
use redirect_manager::config::{self, Config};
use redirect_manager::domain::entities::{
    EndpointChange, NewToken, NodeId, Permission, RedirectType, RuleChanges, RuleId, TokenKey,
};
use redirect_manager::domain::repositories::{RuleFilter, TokenRepository};
use redirect_manager::error::AppError;
use redirect_manager::infrastructure::persistence::PgTokenRepository;
use redirect_manager::server::connect_table_cache;
use redirect_manager::state::AppState;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::{Confirm, Input};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing redirect-manager.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage redirect rules
    Rule {
        #[command(subcommand)]
        action: RuleAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Permanent,
    Vanity,
}

impl From<TypeArg> for RedirectType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Permanent => RedirectType::Permanent,
            TypeArg::Vanity => RedirectType::Vanity,
        }
    }
}

/// Redirect rule subcommands.
#[derive(Subcommand)]
enum RuleAction {
    /// List rules
    List {
        /// Only rules whose source contains this text
        #[arg(long)]
        from: Option<String>,

        /// Only rules whose target contains this text
        #[arg(long)]
        to: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 50)]
        page_size: u32,
    },

    /// Add a rule
    Add {
        /// Source path, e.g. /old-page/
        #[arg(long, required_unless_present = "from_node")]
        from: Option<String>,

        /// Source content node id
        #[arg(long)]
        from_node: Option<i64>,

        /// Target path or absolute URL
        #[arg(long, required_unless_present = "to_node")]
        to: Option<String>,

        /// Target content node id
        #[arg(long)]
        to_node: Option<i64>,

        #[arg(long = "type", value_enum, default_value_t = TypeArg::Permanent)]
        redirect_type: TypeArg,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Remove a rule by ID
    Remove {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show where a request path redirects with the current rules
    Check { path: String },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "CMS backend", "Deploy pipeline")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Permission to grant; repeatable
        #[arg(short, long = "permission", default_value = "MANAGE_REDIRECTS")]
        permissions: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        #[arg(value_name = "NAME_OR_ID")]
        key: TokenKey,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;

    let pool = PgPool::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Rule { action } => handle_rule_action(action, pool, &config).await?,
        Commands::Token { action } => handle_token_action(action, &pool, &config).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches rule management commands.
async fn handle_rule_action(action: RuleAction, pool: PgPool, config: &Config) -> Result<()> {
    let table_cache = connect_table_cache(config).await;
    let state = AppState::new(
        Arc::new(pool),
        table_cache,
        config.token_signing_secret.clone(),
        config.table.rebuild_retry_attempts,
    );

    match action {
        RuleAction::List {
            from,
            to,
            page,
            page_size,
        } => list_rules(&state, RuleFilter { from, to, redirect_type: None }, page, page_size).await,
        RuleAction::Add {
            from,
            from_node,
            to,
            to_node,
            redirect_type,
            yes,
        } => {
            let changes = RuleChanges {
                from: EndpointChange {
                    path: from,
                    node: from_node.map(|id| Some(NodeId(id))),
                },
                to: EndpointChange {
                    path: to,
                    node: to_node.map(|id| Some(NodeId(id))),
                },
                redirect_type: Some(redirect_type.into()),
            };
            add_rule(&state, changes, yes).await
        }
        RuleAction::Remove { id, yes } => remove_rule(&state, RuleId(id), yes).await,
        RuleAction::Check { path } => check_path(&state, &path).await,
    }
}

async fn list_rules(state: &AppState, filter: RuleFilter, page: u32, page_size: u32) -> Result<()> {
    println!("{}", "Redirect rules".bright_blue().bold());
    println!();

    let (rules, total) = state
        .redirect_service
        .list(&filter, page.max(1) as i64, page_size.max(1) as i64)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list rules: {}", e))?;

    if rules.is_empty() {
        println!("{}", "  No rules found".yellow());
        return Ok(());
    }

    println!(
        "  {:<6} {:<40} {:<40} {:<6}",
        "ID".bright_white().bold(),
        "From".bright_white().bold(),
        "To".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(95).bright_black());

    for summary in &rules {
        print_rule_row(summary);
    }

    println!();
    println!("  Total: {}", total.to_string().bright_white().bold());
    println!();

    Ok(())
}

fn print_rule_row(summary: &RedirectSummary) {
    let from = summary
        .from_link
        .clone()
        .unwrap_or_else(|| "(unresolvable)".to_string());
    let to = summary
        .to_link
        .clone()
        .unwrap_or_else(|| "(unresolvable)".to_string());

    println!(
        "  {:<6} {:<40} {:<40} {}",
        summary.rule.id.to_string().bright_black(),
        from.cyan(),
        to,
        summary.status_code.to_string().bright_green()
    );
}

async fn add_rule(state: &AppState, changes: RuleChanges, skip_confirm: bool) -> Result<()> {
    println!("{}", "Add redirect rule".bright_blue().bold());
    println!();

    let dry_run = state
        .redirect_service
        .validate(None, changes.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    println!("  From:   {}", dry_run.draft.from.path.cyan());
    println!("  To:     {}", dry_run.draft.to.path.cyan());
    println!("  Type:   {}", dry_run.draft.redirect_type);
    println!();

    if !dry_run.result.is_valid() {
        println!("{}", "Rule would be rejected:".red().bold());
        for finding in &dry_run.result.findings {
            println!("  - {}", serde_json::to_string(finding)?);
        }
        return Ok(());
    }

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this rule?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    match state.redirect_service.create(changes).await {
        Ok(summary) => {
            println!(
                "{} {}",
                "Rule created with ID".green().bold(),
                summary.rule.id.to_string().bright_white().bold()
            );
            Ok(())
        }
        Err(AppError::Validation { message, details }) => {
            println!("{}", message.red().bold());
            print_findings(&details);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Failed to create rule: {}", e)),
    }
}

fn print_findings(details: &Value) {
    if let Some(findings) = details.get("findings").and_then(Value::as_array) {
        for finding in findings {
            println!("  - {}", finding);
        }
    }
}

async fn remove_rule(state: &AppState, id: RuleId, skip_confirm: bool) -> Result<()> {
    println!("{}", "Remove redirect rule".bright_blue().bold());
    println!();

    let summary = state
        .redirect_service
        .get(id)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    print_rule_row(&summary);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Remove this rule?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    state
        .redirect_service
        .delete(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to remove rule: {}", e))?;

    println!("{}", "Rule removed".green().bold());
    Ok(())
}

async fn check_path(state: &AppState, path: &str) -> Result<()> {
    state
        .resolution_cache
        .rebuild()
        .await
        .context("Failed to build redirect table")?;

    match state.resolution_cache.resolve(path) {
        Some(resolved) => println!(
            "  {} -> {} ({}, rule {})",
            path.cyan(),
            resolved.target_path.bright_white().bold(),
            resolved.status_code.to_string().bright_green(),
            resolved.rule_id
        ),
        None => println!("  {} {}", path.cyan(), "has no redirect".yellow()),
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool, config: &Config) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            name,
            token,
            permissions,
            yes,
        } => {
            create_token(repo, &config.token_signing_secret, name, token, permissions, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { key } => {
            revoke_token(repo, key).await?;
        }
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// Only the HMAC of the token is stored; the raw value is displayed once.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    signing_secret: &str,
    name: Option<String>,
    token: Option<String>,
    permissions: Vec<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("CMS backend")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "Using provided token value".yellow());
            t
        }
        None => generate_token(),
    };

    let manage = Permission::ManageRedirects;
    if !permissions.iter().any(|p| p == manage.as_str()) {
        println!(
            "{}",
            format!("Token will not carry {manage} and cannot use the API")
            .yellow()
        );
    }

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:        {}", token_name.cyan());
    println!("  Permissions: {}", permissions.join(", ").cyan());
    println!("  Token:       {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(signing_secret, &token_value);

    repo.create(NewToken {
        name: token_name,
        token_hash,
        permissions,
    })
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/redirects",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<30} {:<20} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(90).bright_black());

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<30} {:<20} {:<20} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", tokens.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
async fn revoke_token(repo: Arc<PgTokenRepository>, key: TokenKey) -> Result<()> {
    println!("{}", "Revoke API Token".bright_blue().bold());
    println!();

    let token = repo
        .find(&key)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Token {key} not found"))?;

    if token.is_revoked() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!("{}", "Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let rules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM redirect_rules")
                .fetch_one(pool)
                .await?;

            let tokens: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!("  Rules:         {}", rules.to_string().bright_green().bold());
            println!("  Active tokens: {}", tokens.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}
