use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForumAdminError>;

#[derive(Error, Debug)]
pub enum ForumAdminError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
