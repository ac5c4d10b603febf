use clap::{ArgGroup, Parser, Subcommand};

use crate::role::Role;

#[derive(Parser, Debug)]
#[command(name = "forum-fix")]
#[command(about = "One-off data fixes for the school forum database")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reset a user's password (stored as a bcrypt hash)
    ResetPassword {
        /// Account email
        email: String,
        /// New password (at least 6 characters)
        new_password: String,
    },

    /// Change a user's role
    SetRole {
        email: String,
        #[arg(value_enum)]
        role: Role,
    },

    /// Mark email addresses as verified
    #[command(group(ArgGroup::new("target").required(true).args(["email", "all"])))]
    VerifyEmail {
        /// Verify a single account
        email: Option<String>,
        /// Verify every unverified account
        #[arg(long)]
        all: bool,
    },

    /// List users, newest first
    ListUsers {
        /// Rows to show (capped at 500)
        #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
        /// Only accounts that have not verified their email
        #[arg(long)]
        unverified: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;
    use crate::users::{effective_limit, MAX_LIST_LIMIT};
    use forum_common::cli::usage_exit_code;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reset_password_requires_two_arguments() {
        let err = Cli::try_parse_from(["forum-fix", "reset-password"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err =
            Cli::try_parse_from(["forum-fix", "reset-password", "ada@school.edu"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(usage_exit_code(&err), 1);
    }

    #[test]
    fn help_exits_zero() {
        let err = Cli::try_parse_from(["forum-fix", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
        let err = Cli::try_parse_from(["forum-fix", "list-users", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 0);
    }

    #[test]
    fn reset_password_parses_both_arguments() {
        let cli =
            Cli::try_parse_from(["forum-fix", "reset-password", "ada@school.edu", "hunter22"])
                .unwrap();
        match cli.command {
            Commands::ResetPassword {
                email,
                new_password,
            } => {
                assert_eq!(email, "ada@school.edu");
                assert_eq!(new_password, "hunter22");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn set_role_rejects_unknown_roles() {
        assert!(Cli::try_parse_from(["forum-fix", "set-role", "a@b.c", "admin"]).is_ok());
        assert!(Cli::try_parse_from(["forum-fix", "set-role", "a@b.c", "janitor"]).is_err());
    }

    #[test]
    fn verify_email_needs_exactly_one_target() {
        assert!(Cli::try_parse_from(["forum-fix", "verify-email"]).is_err());
        assert!(Cli::try_parse_from(["forum-fix", "verify-email", "a@b.c", "--all"]).is_err());
        assert!(Cli::try_parse_from(["forum-fix", "verify-email", "a@b.c"]).is_ok());
        assert!(Cli::try_parse_from(["forum-fix", "verify-email", "--all"]).is_ok());
    }

    #[test]
    fn list_users_limit_is_bounded() {
        let err = Cli::try_parse_from(["forum-fix", "list-users", "--limit", "0"]).unwrap_err();
        assert_eq!(usage_exit_code(&err), 1);

        // Large limits parse; the query caps them.
        let cli = Cli::try_parse_from(["forum-fix", "list-users", "--limit", "1000"]).unwrap();
        match cli.command {
            Commands::ListUsers { limit, .. } => {
                assert_eq!(limit, 1000);
                assert_eq!(effective_limit(limit), MAX_LIST_LIMIT);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["forum-fix", "list-users"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::ListUsers {
                limit: 50,
                unverified: false
            }
        ));
    }
}
