use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use forum_common::{cli, telemetry, DbConfig};
use forum_migrate::{catalog, run_all, Migration, MigrationOutcome, MIGRATIONS};

#[derive(Parser, Debug)]
#[command(name = "forum-migrate")]
#[command(about = "Apply idempotent schema migrations to the school forum database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every known migration
    List,

    /// Print the SQL a migration would run
    Show {
        name: String,
    },

    /// Run the named migrations (in catalog order)
    Run {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Run every migration
    All,
}

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
    match cli.command {
        Commands::List => {
            for m in MIGRATIONS {
                println!("{:<30} {:<32} {}", m.name, m.origin(), m.description);
            }
            Ok(())
        }
        Commands::Show { name } => {
            let selected = catalog::resolve(std::slice::from_ref(&name))?;
            for m in selected {
                println!("-- {} ({})", m.name, m.origin());
                for statement in m.statements() {
                    println!("{statement};\n");
                }
            }
            Ok(())
        }
        Commands::Run { names } => {
            let selected = catalog::resolve(&names)?;
            apply(&selected).await
        }
        Commands::All => {
            let selected: Vec<&Migration> = MIGRATIONS.iter().collect();
            apply(&selected).await
        }
    }
}

async fn apply(migrations: &[&Migration]) -> Result<()> {
    let config = DbConfig::from_env()?;
    config.log_redacted();

    let pool = forum_common::connect(&config).await?;
    let result = run_all(&pool, migrations).await;
    pool.close().await;

    match result {
        Ok(outcomes) => {
            print_outcomes(&outcomes);
            println!("\n{} migration(s) complete.", outcomes.len());
            Ok(())
        }
        Err(e) => {
            print_outcomes(&e.completed);
            println!(
                "\n{} of {} migration(s) completed before the failure.",
                e.completed.len(),
                migrations.len()
            );
            Err(e.into())
        }
    }
}

fn print_outcomes(outcomes: &[(&str, MigrationOutcome)]) {
    println!();
    for (name, outcome) in outcomes {
        println!("  {name:<30} {outcome}");
    }
}
