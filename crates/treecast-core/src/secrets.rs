//! Secrets loading — process environment plus an optional override file.
//!
//! The override file is simple `KEY=VALUE` lines: blanks and `#` comments are
//! skipped, values lose one matching pair of surrounding quotes, malformed
//! lines are ignored. Loading is best-effort and happens once per session.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

/// Load secrets from the process environment, then apply the override file.
/// File entries win over environment variables of the same name.
pub fn load(env_file: Option<&Path>) -> HashMap<String, String> {
    let mut secrets: HashMap<String, String> = std::env::vars().collect();

    if let Some(path) = env_file {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                for line in raw.lines() {
                    if let Some((key, value)) = parse_line(line) {
                        secrets.insert(key, value);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                debug!(path = %path.display(), %e, "Could not read secrets file");
            }
        }
    }

    secrets
}

fn parse_line(raw: &str) -> Option<(String, String)> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), strip_quotes(value.trim()).to_string()))
}

fn strip_quotes(s: &str) -> &str {
    let s = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s);
    s.strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_line() {
        assert_eq!(
            parse_line("API_KEY=abc123"),
            Some(("API_KEY".into(), "abc123".into()))
        );
    }

    #[test]
    fn test_quotes_stripped() {
        assert_eq!(
            parse_line(r#"TOKEN="quoted value""#),
            Some(("TOKEN".into(), "quoted value".into()))
        );
        assert_eq!(
            parse_line("TOKEN='single'"),
            Some(("TOKEN".into(), "single".into()))
        );
        // An unmatched quote stays.
        assert_eq!(
            parse_line(r#"TOKEN="dangling"#),
            Some(("TOKEN".into(), "\"dangling".into()))
        );
    }

    #[test]
    fn test_comments_blanks_and_malformed_ignored() {
        assert_eq!(parse_line("# a comment"), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("no-equals-sign"), None);
        assert_eq!(parse_line("=value-without-key"), None);
    }

    #[test]
    fn test_value_may_contain_equals() {
        assert_eq!(
            parse_line("URL=postgres://u:p@host?sslmode=on"),
            Some(("URL".into(), "postgres://u:p@host?sslmode=on".into()))
        );
    }

    #[test]
    fn test_file_overrides_environment() {
        // SAFETY: test-only, single-threaded test runner
        unsafe { std::env::set_var("TREECAST_TEST_SECRET", "from-env") };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# local overrides\nTREECAST_TEST_SECRET=from-file\nEXTRA='added'\nbroken line\n",
        )
        .unwrap();

        let secrets = load(Some(&path));
        assert_eq!(
            secrets.get("TREECAST_TEST_SECRET").map(String::as_str),
            Some("from-file")
        );
        assert_eq!(secrets.get("EXTRA").map(String::as_str), Some("added"));

        unsafe { std::env::remove_var("TREECAST_TEST_SECRET") };
    }

    #[test]
    fn test_missing_file_yields_environment_only() {
        let secrets = load(Some(Path::new("/definitely/not/here/.env")));
        // Whatever the environment holds, the call must not fail.
        assert!(secrets.len() >= std::env::vars().count().saturating_sub(1));
    }
}
