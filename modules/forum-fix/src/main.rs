use std::process::ExitCode;

use anyhow::Result;
use tracing::error;

use forum_common::{cli, telemetry, DbConfig};
use forum_fix::{users, Cli, Commands, UserRow};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    if let Err(e) = telemetry::init() {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }

    let cli = match cli::parse::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    if let Err(e) = run(cli).await {
        error!("Error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    let config = DbConfig::from_env()?;
    config.log_redacted();

    let pool = forum_common::connect(&config).await?;
    let result = dispatch(&pool, cli.command).await;
    pool.close().await;
    result
}

async fn dispatch(pool: &sqlx::MySqlPool, command: Commands) -> Result<()> {
    match command {
        Commands::ResetPassword {
            email,
            new_password,
        } => {
            let user = users::reset_password(pool, &email, &new_password).await?;
            println!("Password updated for {} <{}>.", user.username, user.email);
        }
        Commands::SetRole { email, role } => {
            let change = users::set_role(pool, &email, role).await?;
            if change.changed {
                println!(
                    "{} <{}>: {} -> {}",
                    change.user.username, change.user.email, change.previous, role
                );
            } else {
                println!(
                    "{} <{}> is already {role}; nothing to do.",
                    change.user.username, change.user.email
                );
            }
        }
        Commands::VerifyEmail { email, all } => {
            let updated = match email {
                Some(email) if !all => users::verify_email(pool, &email).await?,
                _ => users::verify_all(pool).await?,
            };
            println!("Marked {updated} account(s) as verified.");
        }
        Commands::ListUsers { limit, unverified } => {
            let rows = users::list(pool, limit, unverified).await?;
            print_users(&rows);
        }
    }
    Ok(())
}

fn print_users(rows: &[UserRow]) {
    if rows.is_empty() {
        println!("No users found.");
        return;
    }

    println!(
        "{:>6}  {:<20} {:<32} {:<8} {:<8} {}",
        "ID", "USERNAME", "EMAIL", "ROLE", "VERIFIED", "CREATED"
    );
    for u in rows {
        println!(
            "{:>6}  {:<20} {:<32} {:<8} {:<8} {}",
            u.id,
            u.username,
            u.email,
            u.role,
            if u.email_verified { "yes" } else { "no" },
            u.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!("\n{} user(s).", rows.len());
}
