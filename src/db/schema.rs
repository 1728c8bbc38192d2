pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Splits a script on `;` outside quoted sections and strips `--` comment lines.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for raw_line in sql.lines() {
        if raw_line.trim_start().starts_with("--") && !in_single_quote && !in_double_quote {
            continue;
        }
        for ch in raw_line.chars() {
            match ch {
                '\'' if !in_double_quote => in_single_quote = !in_single_quote,
                '"' if !in_single_quote => in_double_quote = !in_double_quote,
                ';' if !in_single_quote && !in_double_quote => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }
        current.push('\n');
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons_outside_quotes() {
        let sql = "-- header; ignored\n\
                   CREATE TABLE a (x TEXT DEFAULT ';');\n\
                   INSERT INTO a VALUES ('b');";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert!(statements[0].contains("';'"));
        assert_eq!(statements[1], "INSERT INTO a VALUES ('b')");
    }

    #[test]
    fn bundled_schema_has_every_table() {
        let statements = split_sql_statements(SCHEMA_SQL);
        for table in ["words", "user_progress", "user_word_strings", "user_vocabulary"] {
            assert!(
                statements
                    .iter()
                    .any(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS \"{table}\""))),
                "missing {table}"
            );
        }
    }
}
