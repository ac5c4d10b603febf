/// Split a SQL file into individual statements.
///
/// Statements end at `;` outside of quotes. `--` and `#` line comments and
/// `/* */` block comments are dropped; blank statements are skipped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' && q != '`' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                let mut lookahead = chars.clone();
                lookahead.next();
                match lookahead.peek() {
                    None => skip_line(&mut chars),
                    Some(n) if n.is_whitespace() => skip_line(&mut chars),
                    Some(_) => current.push(c),
                }
            }
            '#' => skip_line(&mut chars),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                current.push(' ');
            }
            ';' => push_statement(&mut statements, &mut current),
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &mut current);

    statements
}

fn skip_line<I: Iterator<Item = char>>(chars: &mut I) {
    for n in chars {
        if n == '\n' {
            break;
        }
    }
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// First line of a statement, truncated, for log output.
pub fn preview(statement: &str) -> String {
    let line = statement.lines().next().unwrap_or_default().trim();
    if line.chars().count() > 80 {
        format!("{}...", line.chars().take(80).collect::<String>())
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons() {
        let sql = "ALTER TABLE users ADD COLUMN a INT;\nALTER TABLE users ADD COLUMN b INT;";
        assert_eq!(
            split_statements(sql),
            vec![
                "ALTER TABLE users ADD COLUMN a INT",
                "ALTER TABLE users ADD COLUMN b INT",
            ]
        );
    }

    #[test]
    fn trailing_statement_without_semicolon() {
        let sql = "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT)\n";
        assert_eq!(split_statements(sql).len(), 2);
    }

    #[test]
    fn drops_comments_and_blank_statements() {
        let sql = "-- header comment\n# hash comment\n;;\n/* block\n; still block */ SELECT 1;\n";
        assert_eq!(split_statements(sql), vec!["SELECT 1"]);
    }

    #[test]
    fn semicolon_inside_string_is_kept() {
        let sql = "UPDATE posts SET body = 'a; b' WHERE id = 1; SELECT 2;";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "UPDATE posts SET body = 'a; b' WHERE id = 1");
    }

    #[test]
    fn escaped_quote_inside_string() {
        let sql = r"INSERT INTO t VALUES ('it\'s; fine'); SELECT 1;";
        let stmts = split_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].ends_with(r"'it\'s; fine')"));
    }

    #[test]
    fn double_dash_without_space_is_not_a_comment() {
        let sql = "SELECT 5--3;";
        assert_eq!(split_statements(sql), vec!["SELECT 5--3"]);
    }

    #[test]
    fn comment_markers_inside_strings_are_kept() {
        let sql = "INSERT INTO t VALUES ('-- not a comment', '# nor this');";
        assert_eq!(
            split_statements(sql),
            vec!["INSERT INTO t VALUES ('-- not a comment', '# nor this')"]
        );
    }

    #[test]
    fn preview_truncates_long_lines() {
        let long = format!("CREATE TABLE {} (id INT)", "x".repeat(100));
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 83);
        assert_eq!(preview("SELECT 1\nFROM dual"), "SELECT 1");
    }
}
