use std::env;

use sqlx::mysql::MySqlConnectOptions;
use tracing::info;

use crate::error::{ForumAdminError, Result};

/// Database connection settings loaded from environment variables.
///
/// Every field has a fallback so the tools work against a stock local
/// MySQL install without any configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Load from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("DB_PORT") {
            Some(raw) => parse_port("DB_PORT", &raw)?,
            None => 3306,
        };

        Ok(Self {
            host: lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port,
            user: lookup("DB_USER").unwrap_or_else(|| "root".to_string()),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            database: lookup("DB_NAME").unwrap_or_else(|| "school_forum".to_string()),
        })
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        let opts = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        if self.password.is_empty() {
            opts
        } else {
            opts.password(&self.password)
        }
    }

    /// Log the connection target. The password is never printed.
    pub fn log_redacted(&self) {
        info!(
            host = self.host.as_str(),
            port = self.port,
            user = self.user.as_str(),
            database = self.database.as_str(),
            password_set = !self.password.is_empty(),
            "Database config loaded"
        );
    }
}

/// SMTP settings for the email configuration test.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS (SMTPS). When false the transport upgrades with STARTTLS.
    pub secure: bool,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl EmailConfig {
    /// Load from `EMAIL_HOST`, `EMAIL_PORT`, `EMAIL_SECURE`, `EMAIL_USER`,
    /// `EMAIL_PASS`, `EMAIL_FROM`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = required(&lookup, "EMAIL_USER")?;
        let pass = required(&lookup, "EMAIL_PASS")?;
        let port = match lookup("EMAIL_PORT") {
            Some(raw) => parse_port("EMAIL_PORT", &raw)?,
            None => 587,
        };
        let secure = lookup("EMAIL_SECURE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            host: lookup("EMAIL_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port,
            secure,
            from: lookup("EMAIL_FROM").unwrap_or_else(|| user.clone()),
            user,
            pass,
        })
    }

    pub fn log_redacted(&self) {
        info!(
            host = self.host.as_str(),
            port = self.port,
            secure = self.secure,
            user = self.user.as_str(),
            from = self.from.as_str(),
            "Email config loaded"
        );
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ForumAdminError::Config(format!(
            "{key} environment variable is required"
        ))),
    }
}

fn parse_port(key: &str, raw: &str) -> Result<u16> {
    raw.trim()
        .parse()
        .map_err(|_| ForumAdminError::Config(format!("{key} must be a port number, got {raw:?}")))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
