use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use forum_common::{cli, telemetry, EmailConfig};
use forum_smoke::email::{self, SmtpMailer, TestMessage};
use forum_smoke::http::{self, SmokeClient};

#[derive(Parser, Debug)]
#[command(name = "forum-smoke")]
#[command(about = "Smoke-test a running forum server and its email settings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hit the core API endpoints and fail on any 5xx or unreachable endpoint
    Http {
        #[arg(long, env = "FORUM_BASE_URL", default_value = http::DEFAULT_BASE_URL)]
        base_url: String,

        /// Address used for the resend-verification probe
        #[arg(long, env = "SMOKE_EMAIL", default_value = http::DEFAULT_PROBE_EMAIL)]
        email: String,
    },

    /// Ask the server to resend a verification email and print its answer
    ResendVerification {
        email: String,

        #[arg(long, env = "FORUM_BASE_URL", default_value = http::DEFAULT_BASE_URL)]
        base_url: String,
    },

    /// Verify SMTP settings and send one test message
    Email {
        /// Recipient (defaults to EMAIL_TEST_TO, then EMAIL_USER)
        #[arg(long)]
        to: Option<String>,
    },
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

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Http { base_url, email } => {
            let client = SmokeClient::new(&base_url)?;
            info!(base_url = client.base_url(), "Running HTTP smoke test");

            let report = client.run_all(&http::default_checks(&email)).await;
            println!("\nSmoke test against {}\n", client.base_url());
            println!("{report}");
            Ok(report.exit_code())
        }
        Commands::ResendVerification { email, base_url } => {
            let client = SmokeClient::new(&base_url)?;
            let (status, body) = client.resend_verification(&email).await?;
            println!("Status: {status}");
            println!("Body:   {body}");
            Ok(if status >= 500 { 1 } else { 0 })
        }
        Commands::Email { to } => {
            let config = EmailConfig::from_env()?;
            config.log_redacted();

            let recipient =
                email::resolve_recipient(to, std::env::var("EMAIL_TEST_TO").ok(), &config);
            let message = TestMessage::for_config(&config, &recipient);
            let mailer = SmtpMailer::from_config(&config)?;

            email::run_email_test(&mailer, &message).await?;
            println!("Test email sent to {recipient}.");
            Ok(0)
        }
    }
}
