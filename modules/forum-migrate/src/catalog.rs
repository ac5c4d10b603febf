use forum_common::ForumAdminError;

use crate::split::split_statements;

/// Where a migration's SQL comes from.
#[derive(Debug, Clone, Copy)]
pub enum MigrationSource {
    /// Companion `.sql` file, embedded at compile time.
    File { path: &'static str, sql: &'static str },
    /// Single statement carried in the catalog itself.
    Inline(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub description: &'static str,
    pub source: MigrationSource,
}

impl Migration {
    pub fn sql(&self) -> &'static str {
        match self.source {
            MigrationSource::File { sql, .. } => sql,
            MigrationSource::Inline(sql) => sql,
        }
    }

    pub fn statements(&self) -> Vec<String> {
        split_statements(self.sql())
    }

    pub fn origin(&self) -> &'static str {
        match self.source {
            MigrationSource::File { path, .. } => path,
            MigrationSource::Inline(_) => "inline",
        }
    }
}

macro_rules! sql_file {
    ($file:literal) => {
        MigrationSource::File {
            path: concat!("sql/", $file),
            sql: include_str!(concat!("../sql/", $file)),
        }
    };
}

/// Every known migration, in apply order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "add-user-roles",
        description: "Add users.role (student, teacher, admin)",
        source: MigrationSource::Inline(
            "ALTER TABLE users ADD COLUMN role VARCHAR(20) NOT NULL DEFAULT 'student'",
        ),
    },
    Migration {
        name: "add-email-verification",
        description: "Add email verification columns to users",
        source: sql_file!("add_email_verification.sql"),
    },
    Migration {
        name: "add-user-profile",
        description: "Add users.bio and users.avatar_url",
        source: MigrationSource::Inline(
            "ALTER TABLE users ADD COLUMN bio TEXT NULL;\n\
             ALTER TABLE users ADD COLUMN avatar_url VARCHAR(500) NULL;",
        ),
    },
    Migration {
        name: "create-notifications",
        description: "Create the notifications table",
        source: sql_file!("create_notifications.sql"),
    },
    Migration {
        name: "create-follows",
        description: "Create the follows table",
        source: sql_file!("create_follows.sql"),
    },
    Migration {
        name: "create-chat-messages",
        description: "Create the chat_messages table",
        source: sql_file!("create_chat_messages.sql"),
    },
    Migration {
        name: "create-reactions",
        description: "Create the reactions table",
        source: sql_file!("create_reactions.sql"),
    },
    Migration {
        name: "create-bookmarks",
        description: "Create the bookmarks table",
        source: sql_file!("create_bookmarks.sql"),
    },
    Migration {
        name: "create-password-reset-codes",
        description: "Create the password_reset_codes table",
        source: sql_file!("create_password_reset_codes.sql"),
    },
    Migration {
        name: "create-email-change-codes",
        description: "Create the email_change_codes table",
        source: sql_file!("create_email_change_codes.sql"),
    },
    Migration {
        name: "create-post-views",
        description: "Create post_views and add posts.view_count",
        source: sql_file!("create_post_views.sql"),
    },
    Migration {
        name: "add-reply-threading",
        description: "Add replies.parent_reply_id for nested replies",
        source: sql_file!("add_reply_threading.sql"),
    },
];

pub fn find(name: &str) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.name == name)
}

pub fn names() -> Vec<&'static str> {
    MIGRATIONS.iter().map(|m| m.name).collect()
}

/// Look up requested migrations, keeping catalog order and dropping repeats.
pub fn resolve(requested: &[String]) -> Result<Vec<&'static Migration>, ForumAdminError> {
    let unknown: Vec<&str> = requested
        .iter()
        .map(String::as_str)
        .filter(|name| find(name).is_none())
        .collect();

    if !unknown.is_empty() {
        return Err(ForumAdminError::Validation(format!(
            "unknown migration(s): {}. Known: {}",
            unknown.join(", "),
            names().join(", ")
        )));
    }

    Ok(MIGRATIONS
        .iter()
        .filter(|m| requested.iter().any(|r| r == m.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = MIGRATIONS.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), MIGRATIONS.len());
    }

    #[test]
    fn every_migration_has_statements() {
        for m in MIGRATIONS {
            assert!(!m.statements().is_empty(), "{} has no statements", m.name);
        }
    }

    #[test]
    fn schema_changes_only() {
        for m in MIGRATIONS {
            for stmt in m.statements() {
                let upper = stmt.to_ascii_uppercase();
                assert!(
                    upper.starts_with("ALTER TABLE")
                        || upper.starts_with("CREATE TABLE")
                        || upper.starts_with("CREATE INDEX"),
                    "{}: unexpected statement {stmt}",
                    m.name
                );
            }
        }
    }

    #[test]
    fn alter_statements_add_one_column_each() {
        // One column per ALTER keeps ER_DUP_FIELDNAME from masking sibling columns.
        for m in MIGRATIONS {
            for stmt in m.statements() {
                if stmt.to_ascii_uppercase().starts_with("ALTER TABLE") {
                    assert_eq!(
                        stmt.to_ascii_uppercase().matches("ADD COLUMN").count(),
                        1,
                        "{}: {stmt}",
                        m.name
                    );
                }
            }
        }
    }

    #[test]
    fn find_by_name() {
        assert_eq!(find("create-follows").map(|m| m.origin()), Some("sql/create_follows.sql"));
        assert_eq!(find("add-user-roles").map(|m| m.origin()), Some("inline"));
        assert!(find("drop-everything").is_none());
    }

    #[test]
    fn resolve_keeps_catalog_order() {
        let requested = vec![
            "create-follows".to_string(),
            "add-user-roles".to_string(),
            "create-follows".to_string(),
        ];
        let resolved: Vec<_> = resolve(&requested).unwrap().iter().map(|m| m.name).collect();
        assert_eq!(resolved, vec!["add-user-roles", "create-follows"]);
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let err = resolve(&["create-follows".to_string(), "nope".to_string()]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("create-follows"));
    }

    #[test]
    fn post_views_file_has_table_and_counter() {
        let stmts = find("create-post-views").unwrap().statements();
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].starts_with("CREATE TABLE post_views"));
        assert!(stmts[1].contains("view_count"));
    }
}
