//! One-off data fixes against the forum's `users` table.

pub mod cli;
pub mod password;
pub mod role;
pub mod users;

pub use cli::{Cli, Commands};
pub use role::Role;
pub use users::UserRow;
