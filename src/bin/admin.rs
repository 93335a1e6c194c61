//! CLI administration tool for snaplink.
//!
//! Provides commands for managing user accounts, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # List all users
//! cargo run --bin admin -- user list
//!
//! # Delete a user and every short URL they own
//! cargo run --bin admin -- user delete ada@example.com
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
//! - `DATABASE_URL` (required): PostgreSQL connection string

use snaplink::domain::repositories::UserRepository;
use snaplink::infrastructure::persistence::PgUserRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing snaplink.
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
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,

    /// Delete a user together with their short URLs
    Delete {
        /// E-mail address of the account
        email: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
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

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::List => list_users(&repo).await?,
        UserAction::Delete { email, yes } => delete_user(&repo, &email, yes).await?,
    }

    Ok(())
}

/// Lists all accounts, oldest first.
///
/// # Output Format
///
/// ```text
/// Users
///
///   ID   Email                          Username             Sign-in  Created
///   ───────────────────────────────────────────────────────────────────────────────
///   1    ada@example.com                ada                  local    2025-01-15 10:30
///   2    grace@example.com              Grace Hopper         google   2025-01-16 14:20
/// ```
async fn list_users(repo: &PgUserRepository) -> Result<()> {
    println!("{}", "Users".bright_blue().bold());
    println!();

    let users = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<30} {:<20} {:<8} {}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Username".bright_white().bold(),
        "Sign-in".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(85).bright_black());

    for user in &users {
        let sign_in = match (user.has_password(), user.is_external()) {
            (true, true) => "both".green(),
            (false, true) => "google".cyan(),
            _ => "local".normal(),
        };

        println!(
            "  {:<4} {:<30} {:<20} {:<8} {}",
            user.id.to_string().bright_black(),
            user.email.cyan(),
            user.username.as_deref().unwrap_or("-"),
            sign_in,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes an account by e-mail after confirmation (default: No).
async fn delete_user(repo: &PgUserRepository, email: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "Delete User".bright_blue().bold());
    println!();

    let email = email.trim().to_lowercase();
    let user = repo
        .find_by_email(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("User not found")?;

    println!("  Email: {}", user.email.cyan());
    println!("  ID:    {}", user.id.to_string().bright_black());
    println!();
    println!(
        "{}",
        "All short URLs owned by this user will be deleted as well."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this user?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .delete(user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete user: {}", e))?;

    if deleted {
        println!("{}", "User deleted".green().bold());
    } else {
        println!("{}", "User was already deleted".yellow());
    }
    println!();

    Ok(())
}

/// Displays totals of users, short URLs and recorded redirects.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let urls_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_urls")
        .fetch_one(pool)
        .await?;

    let redirects: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(access_count), 0)::BIGINT FROM short_urls")
            .fetch_one(pool)
            .await?;

    println!(
        "  Users:      {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Short URLs: {}",
        urls_count.to_string().bright_green().bold()
    );
    println!(
        "  Redirects:  {}",
        redirects.to_string().bright_green().bold()
    );
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

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
