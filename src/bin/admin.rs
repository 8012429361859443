//! CLI administration tool for shortlink-engine.
//!
//! Provides commands for managing owners and API tokens, running an
//! expiration sweep on demand, viewing statistics, and performing database
//! checks without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Register an owner (prints the owner id)
//! cargo run --bin admin -- user add alice@example.com
//!
//! # Create a new API token for that owner
//! cargo run --bin admin -- token create --owner <owner-id>
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "Production API"
//!
//! # Deactivate expired links and notify their owners now
//! cargo run --bin admin -- sweep
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Uses the same configuration as the server (see `shortlink_engine::config`).
//! `DATABASE_URL` (or `DB_*`) and `TOKEN_SIGNING_SECRET` are required.

use shortlink_engine::application::services::auth_service::hash_token;
use shortlink_engine::application::workers::ExpirationSweeper;
use shortlink_engine::config::{self, Config};
use shortlink_engine::domain::repositories::{TokenRepository, UserRepository};
use shortlink_engine::infrastructure::notifier::build_notifier;
use shortlink_engine::infrastructure::persistence::{
    PgLinkRepository, PgTokenRepository, PgUserRepository,
};
use shortlink_engine::server::connect_pool;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// CLI tool for managing shortlink-engine.
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
    /// Manage link owners
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Run one expiration sweep now
    Sweep,

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register an owner by email
    Add {
        /// Notification address for expiry mails
        email: String,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Owner the token authenticates as
        #[arg(short, long)]
        owner: Uuid,

        /// Token name (e.g., "Production API", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
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
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool, &config).await?,
        Commands::Sweep => handle_sweep(&pool, &config).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Add { email } => {
            let owner = repo
                .create(email.trim())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create owner: {}", e))?;

            println!("{}", "✅ Owner created".green().bold());
            println!("  Email: {}", owner.email.cyan());
            println!("  ID:    {}", owner.id.to_string().bright_yellow());
            println!();
            println!(
                "  Next: {} admin -- token create --owner {}",
                "cargo run --bin".bright_cyan(),
                owner.id
            );
        }
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool, config: &Config) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let repo = Arc::new(PgTokenRepository::new(pool.clone()));

    match action {
        TokenAction::Create {
            owner,
            name,
            token,
            yes,
        } => {
            let users = PgUserRepository::new(pool);
            let owner = users
                .find_by_id(owner)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .with_context(|| format!("Owner {owner} not found, create it with `user add`"))?;

            create_token(repo, owner.id, &owner.email, name, token, yes, config).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { name_or_id } => {
            revoke_token(repo, name_or_id).await?;
        }
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for token name (or use provided)
/// 2. Generate random token or use provided value
/// 3. Display token details with warning
/// 4. Confirm creation (unless `--yes` flag)
/// 5. Hash token with HMAC-SHA256 under `TOKEN_SIGNING_SECRET`
/// 6. Store in database
///
/// # Security
///
/// - Only the HMAC hash is stored in the database
/// - Raw token is displayed once and cannot be retrieved later
/// - Tokens are 48 characters (alphanumeric) for high entropy
async fn create_token(
    repo: Arc<PgTokenRepository>,
    owner_id: Uuid,
    owner_email: &str,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
    config: &Config,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            let generated = generate_token();
            println!("{}", "✨ Generated new token".green());
            generated
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Owner: {} ({})", owner_email.cyan(), owner_id);
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
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
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&config.token_signing_secret, &token_value)
        .map_err(|e| anyhow::anyhow!("Failed to hash token: {}", e))?;

    repo.create_token(&token_name, &token_hash, owner_id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Add this to your requests:".bright_white());
    println!(
        "  {}: Bearer {}",
        "Authorization".bright_cyan(),
        token_value.bright_yellow()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://{}/api/links",
        token_value.bright_yellow(),
        config.listen_addr
    );
    println!();

    Ok(())
}

/// Lists all API tokens with status indicators.
///
/// # Output Format
///
/// ```text
/// 📋 API Tokens
///
///   ID  Name                           Owner                                 Created              Status
///   1   Production API                 0f6e...                               2026-01-15 10:30     ACTIVE
/// ```
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin -- token create --owner <id>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<30} {:<37} {:<17} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(100).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<4} {:<30} {:<37} {:<17} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.owner_id.to_string(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is looked up by ID, anything else by exact name.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo
            .find_by_id(id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
        Err(_) => repo
            .find_by_name(&name_or_id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
    };

    let token = token.context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "⚠️  This token is already revoked".yellow());
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
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "✅ Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Runs a single expiration sweep with the server's notifier settings.
async fn handle_sweep(pool: &PgPool, config: &Config) -> Result<()> {
    println!("{}", "🧹 Expiration sweep".bright_blue().bold());
    println!();

    let pool = Arc::new(pool.clone());
    let notifier =
        build_notifier(config.smtp.as_ref()).context("Failed to set up SMTP notifier")?;

    let sweeper = ExpirationSweeper::new(
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
        notifier,
        config.sweep_interval(),
    );

    let report = sweeper
        .sweep_once(Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("Sweep failed: {}", e))?;

    println!(
        "  Expired:        {}",
        report.expired.to_string().bright_white().bold()
    );
    println!(
        "  Deactivated:    {}",
        report.deactivated.to_string().bright_green().bold()
    );
    println!(
        "  Notified:       {}",
        report.notified.to_string().bright_green().bold()
    );
    if report.notify_failed > 0 {
        println!(
            "  Notify failed:  {}",
            report.notify_failed.to_string().red().bold()
        );
    }
    if report.owner_missing > 0 {
        println!(
            "  Owner missing:  {}",
            report.owner_missing.to_string().yellow()
        );
    }
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows link, click, owner and active token counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let active_links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE is_active")
        .fetch_one(pool)
        .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool)
        .await?;

    let bot_clicks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE is_bot")
        .fetch_one(pool)
        .await?;

    let owners_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Links:         {} ({} active)",
        links_count.to_string().bright_green().bold(),
        active_links
    );
    println!(
        "  Clicks:        {} ({} bots)",
        clicks_count.to_string().bright_green().bold(),
        bot_clicks
    );
    println!(
        "  Owners:        {}",
        owners_count.to_string().bright_green().bold()
    );
    println!(
        "  Active tokens: {}",
        tokens_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a cryptographically random token.
///
/// # Format
///
/// - Length: 48 characters
/// - Character set: A-Z, a-z, 0-9
/// - Entropy: ~286 bits
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
