//! Module-path discovery from the project's go.mod manifest.

use std::fs;
use std::path::Path;

/// Read the module path from `<root>/go.mod`, if there is one.
pub fn module_path(root: &Path) -> Option<String> {
    let contents = fs::read_to_string(root.join("go.mod")).ok()?;
    parse_module_path(&contents)
}

/// Extract the path from the first `module` directive.
fn parse_module_path(contents: &str) -> Option<String> {
    for line in contents.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();
        let Some(rest) = line.strip_prefix("module") else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }

        let path = rest.trim().trim_matches('"');
        if !path.is_empty() {
            return Some(path.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_parse_module_path() {
        let contents = "module github.com/acme/proj\n\ngo 1.21\n";
        assert_eq!(
            parse_module_path(contents),
            Some("github.com/acme/proj".to_string())
        );
    }

    #[test]
    fn test_parse_quoted_module_path() {
        assert_eq!(
            parse_module_path("module \"example.com/quoted\"\n"),
            Some("example.com/quoted".to_string())
        );
    }

    #[test]
    fn test_parse_ignores_comments_and_lookalikes() {
        let contents = "// module commented.example.com\nmodulex nope\n\nmodule\texample.com/tabbed\n";
        assert_eq!(
            parse_module_path(contents),
            Some("example.com/tabbed".to_string())
        );
    }

    #[test]
    fn test_parse_no_module_directive() {
        assert_eq!(parse_module_path("go 1.21\n"), None);
        assert_eq!(parse_module_path(""), None);
    }

    #[test]
    fn test_module_path_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("go.mod")).unwrap();
        writeln!(file, "module example.com/tmp/mod").unwrap();

        assert_eq!(
            module_path(dir.path()),
            Some("example.com/tmp/mod".to_string())
        );
        assert_eq!(module_path(&dir.path().join("missing")), None);
    }
}
