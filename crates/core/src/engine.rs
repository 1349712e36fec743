use crate::classifier::ImportClassifier;
use crate::config::{CategoryOrder, IgnoreFilter, SortConfig};
use crate::manifest;
use crate::parser::{GoParser, ParseError};
use crate::render::{render_import_block, splice};
use crate::stdlib::{StdlibIndex, StdlibLoadError};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("failed to load standard-library index: {0}")]
    StdlibLoad(#[from] StdlibLoadError),
}

/// Result of running one file through the pipeline
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Full rewritten buffer (equal to the input when unchanged)
    pub output: Vec<u8>,
    /// Whether output differs from the input bytes
    pub changed: bool,
}

/// Combined multi-error for a directory run
#[derive(Debug)]
pub struct BatchError {
    pub failures: Vec<(PathBuf, SortError)>,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} file(s) failed:", self.failures.len())?;
        for (path, err) in &self.failures {
            writeln!(f, "  {}: {err}", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

/// Outcomes and failures of a directory run, in traversal order.
///
/// Failures never abort sibling files; successful outcomes are always
/// reported alongside them.
#[derive(Debug)]
pub struct BatchResult {
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<(PathBuf, SortError)>,
}

impl BatchResult {
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_error(self) -> Option<BatchError> {
        if self.failures.is_empty() {
            None
        } else {
            Some(BatchError {
                failures: self.failures,
            })
        }
    }
}

/// Run one source buffer through the full pipeline: parse, classify, sort,
/// and splice. A buffer without imports is returned unchanged.
pub fn process(
    src: &[u8],
    classifier: &ImportClassifier,
    order: CategoryOrder,
) -> Result<Vec<u8>, SortError> {
    let source = std::str::from_utf8(src).map_err(ParseError::from)?;

    let mut parser = GoParser::new()?;
    let parsed = parser.parse(source)?;
    if parsed.imports.is_empty() {
        return Ok(src.to_vec());
    }

    let buckets = classifier.partition(&parsed.imports);
    let groups = buckets.into_ordered(order);
    let block = render_import_block(&groups);

    Ok(splice(source, &parsed, &block).into_bytes())
}

/// Sorts Go files, one rayon task per file in directory mode.
pub struct ImportSorter {
    config: SortConfig,
    classifier: Arc<ImportClassifier>,
    ignore_filter: IgnoreFilter,
}

impl ImportSorter {
    /// Build a sorter for `config`: loads the standard-library index and,
    /// when no local prefix is configured, falls back to the module path
    /// from go.mod. Without either, local classification is disabled.
    pub fn new(config: SortConfig) -> Result<Self, SortError> {
        let stdlib = StdlibIndex::load()?;

        let mut prefixes = config.local_prefixes.clone();
        if prefixes.is_empty() {
            match manifest::module_path(&config.root) {
                Some(module) => {
                    log::info!("no local prefix configured, using module path {module:?}");
                    prefixes.push(module);
                }
                None => {
                    log::info!(
                        "no local prefix configured and no module path found, \
                         local classification disabled"
                    );
                }
            }
        }

        let classifier = Arc::new(ImportClassifier::new(stdlib, prefixes));
        Self::with_classifier(config, classifier)
    }

    /// Build a sorter around an existing classifier, skipping toolchain and
    /// go.mod lookups.
    pub fn with_classifier(
        config: SortConfig,
        classifier: Arc<ImportClassifier>,
    ) -> Result<Self, SortError> {
        let ignore_filter = IgnoreFilter::new(&config)?;

        Ok(Self {
            config,
            classifier,
            ignore_filter,
        })
    }

    pub fn classifier(&self) -> &ImportClassifier {
        &self.classifier
    }

    /// Sort one in-memory buffer.
    pub fn sort_source(&self, src: &[u8]) -> Result<Vec<u8>, SortError> {
        process(src, &self.classifier, self.config.order)
    }

    /// Sort one file. Reads only; writing is the caller's decision.
    pub fn sort_file(&self, path: &Path) -> Result<FileOutcome, SortError> {
        log::info!("processing {}", path.display());

        let src = fs::read(path)?;
        let output = self.sort_source(&src)?;
        let changed = output != src;
        if changed {
            log::info!("file {} needs reordering", path.display());
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            output,
            changed,
        })
    }

    /// Sort every Go file under `path`, one parallel task per file.
    /// Per-file failures are collected, never propagated mid-run.
    pub fn sort_dir(&self, path: &Path) -> Result<BatchResult, SortError> {
        let files = self.find_go_files(path)?;
        log::debug!("found {} Go files under {}", files.len(), path.display());

        let run = || {
            files
                .par_iter()
                .map(|file| self.sort_file(file).map_err(|err| (file.clone(), err)))
                .collect::<Vec<_>>()
        };

        let pool = if self.config.threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .ok()
        } else {
            None
        };
        let results = match pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(failure) => failures.push(failure),
            }
        }

        Ok(BatchResult { outcomes, failures })
    }

    fn find_go_files(&self, path: &Path) -> Result<Vec<PathBuf>, SortError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_dir() {
                continue;
            }
            if self.ignore_filter.should_ignore(entry.path(), false) {
                continue;
            }
            if is_go_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        Ok(files)
    }
}

/// A Go source file: `.go` suffix, not hidden
fn is_go_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| !name.starts_with('.') && name.ends_with(".go"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LOCAL_PREFIX: &str = "github.com/acme/proj";

    fn test_classifier() -> Arc<ImportClassifier> {
        Arc::new(ImportClassifier::new(
            StdlibIndex::from_packages([
                "database/sql/driver",
                "fmt",
                "log",
                "net/http/httptest",
                "os",
                "strings",
            ]),
            vec![LOCAL_PREFIX.to_string()],
        ))
    }

    fn run(src: &str) -> String {
        let output = process(
            src.as_bytes(),
            &test_classifier(),
            CategoryOrder::default(),
        )
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn run_with_order(src: &str, order: &str) -> String {
        let output = process(
            src.as_bytes(),
            &test_classifier(),
            CategoryOrder::parse_lenient(order),
        )
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_process_scattered_imports_with_comments() {
        let src = concat!(
            "package main\n",
            "\n",
            "// builtin\n",
            "// external\n",
            "// local\n",
            "import (\n",
            "\t\"fmt\"\n",
            "\t\"log\"\n",
            "\t\n",
            "\tAPA \"bitbucket.org/example/package/name\"\n",
            "\tAPZ \"bitbucket.org/example/package/name\"\n",
            "\t\"bitbucket.org/example/package/name2\"\n",
            "\t\"bitbucket.org/example/package/name3\" // foopsie\n",
            "\t\"bitbucket.org/example/package/name4\"\n",
            "\t\n",
            "\t\"github.com/acme/proj/package1\"\n",
            "\t// a\n",
            "\t\"github.com/acme/proj/package2\"\n",
            "\t\n",
            "\t/*\n",
            "\t\tblock comment\n",
            "\t*/\n",
            "\t\"net/http/httptest\"\n",
            "\t\"database/sql/driver\"\n",
            ")\n",
            "// stray trailing comment\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"database/sql/driver\"\n",
            "\t\"fmt\"\n",
            "\t\"log\"\n",
            "\t\"net/http/httptest\"\n",
            "\n",
            "\tAPA \"bitbucket.org/example/package/name\"\n",
            "\tAPZ \"bitbucket.org/example/package/name\"\n",
            "\t\"bitbucket.org/example/package/name2\"\n",
            "\t\"bitbucket.org/example/package/name3\"\n",
            "\t\"bitbucket.org/example/package/name4\"\n",
            "\n",
            "\t\"github.com/acme/proj/package1\"\n",
            "\t\"github.com/acme/proj/package2\"\n",
            ")\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}\n",
        );

        assert_eq!(run(src), want);
    }

    #[test]
    fn test_process_custom_order() {
        let src = concat!(
            "package main\n",
            "\n",
            "import \"fmt\"\n",
            "\n",
            "import \"github.com/example/external\"\n",
            "\n",
            "import \"github.com/acme/proj/package1\"\n",
            "\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"github.com/acme/proj/package1\"\n",
            "\n",
            "\t\"github.com/example/external\"\n",
            "\n",
            "\t\"fmt\"\n",
            ")\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}\n",
        );

        assert_eq!(run_with_order(src, "lei"), want);
    }

    #[test]
    fn test_process_malformed_order_equals_default() {
        let src = "package main\n\nimport \"fmt\"\n\nfunc main() {}\n";

        assert_eq!(run_with_order(src, "iii"), run_with_order(src, "iel"));
        assert_eq!(run_with_order(src, "ii e"), run_with_order(src, "iel"));
    }

    #[test]
    fn test_process_single_import() {
        let src = concat!(
            "package main\n",
            "\n",
            "\n",
            "import \"github.com/acme/proj/package1\"\n",
            "\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"github.com/acme/proj/package1\"\n",
            ")\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}\n",
        );

        assert_eq!(run(src), want);
    }

    #[test]
    fn test_process_missing_separators() {
        let src = concat!(
            "package main\n",
            "import \"github.com/acme/proj/package1\"\n",
            "\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"github.com/acme/proj/package1\"\n",
            ")\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}\n",
        );

        assert_eq!(run(src), want);
    }

    #[test]
    fn test_process_merges_multiple_declarations() {
        let src = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"fmt\"\n",
            "\t\"log\"\n",
            "\tAPZ \"bitbucket.org/example/package/name\"\n",
            "\tAPA \"bitbucket.org/example/package/name\"\n",
            "\t\"github.com/acme/proj/package2\"\n",
            "\t\"github.com/acme/proj/package1\"\n",
            ")\n",
            "import (\n",
            "\t\"net/http/httptest\"\n",
            ")\n",
            "\n",
            "import \"bitbucket.org/example/package/name2\"\n",
            "import \"bitbucket.org/example/package/name3\"\n",
            "import \"bitbucket.org/example/package/name4\"",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"fmt\"\n",
            "\t\"log\"\n",
            "\t\"net/http/httptest\"\n",
            "\n",
            "\tAPA \"bitbucket.org/example/package/name\"\n",
            "\tAPZ \"bitbucket.org/example/package/name\"\n",
            "\t\"bitbucket.org/example/package/name2\"\n",
            "\t\"bitbucket.org/example/package/name3\"\n",
            "\t\"bitbucket.org/example/package/name4\"\n",
            "\n",
            "\t\"github.com/acme/proj/package1\"\n",
            "\t\"github.com/acme/proj/package2\"\n",
            ")\n",
        );

        assert_eq!(run(src), want);
    }

    #[test]
    fn test_process_import_on_package_clause_line() {
        let src = concat!(
            "package main;import \"fmt\"\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"fmt\"\n",
            ")\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"Hello!\")\n",
            "}\n",
        );

        assert_eq!(run(src), want);
    }

    #[test]
    fn test_process_no_imports_is_a_noop() {
        let src = "package main\n\nfunc main() {\n\tfmt.Println(\"Hello!\")\n}";
        assert_eq!(run(src), src);
    }

    #[test]
    fn test_process_is_idempotent() {
        let src = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"log\"\n",
            "\t\"fmt\"\n",
            ")\n",
            "\n",
            "import \"github.com/example/external\"\n",
            "\n",
            "func main() {}\n",
        );

        let once = run(src);
        let twice = run(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_process_noop_on_canonical_input() {
        let canonical = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"fmt\"\n",
            "\t\"log\"\n",
            "\n",
            "\t\"github.com/example/external\"\n",
            "\n",
            "\t\"github.com/acme/proj/package1\"\n",
            ")\n",
            "\n",
            "func main() {}\n",
        );

        assert_eq!(run(canonical), canonical);
    }

    #[test]
    fn test_process_generic_code_passes_through() {
        let src = concat!(
            "package main\n",
            "\n",
            "import \"github.com/acme/proj/package1\"\n",
            "\n",
            "func filter[T any](ss []T, test func(T) bool) (ret []T) {\n",
            "\tfor _, s := range ss {\n",
            "\t\tif test(s) {\n",
            "\t\t\tret = append(ret, s)\n",
            "\t\t}\n",
            "\t}\n",
            "\treturn\n",
            "}\n",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"github.com/acme/proj/package1\"\n",
            ")\n",
            "\n",
            "func filter[T any](ss []T, test func(T) bool) (ret []T) {\n",
            "\tfor _, s := range ss {\n",
            "\t\tif test(s) {\n",
            "\t\t\tret = append(ret, s)\n",
            "\t\t}\n",
            "\t}\n",
            "\treturn\n",
            "}\n",
        );

        assert_eq!(run(src), want);
    }

    #[test]
    fn test_process_package_name_inside_string_literal() {
        let src = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"log\"\n",
            "\t\"fmt\"\n",
            ")\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"package main\")\n",
            "}\n",
        );
        let want = concat!(
            "package main\n",
            "\n",
            "import (\n",
            "\t\"fmt\"\n",
            "\t\"log\"\n",
            ")\n",
            "\n",
            "func main() {\n",
            "\tfmt.Println(\"package main\")\n",
            "}\n",
        );

        assert_eq!(run(src), want);
    }

    #[test]
    fn test_process_rejects_invalid_source() {
        let err = process(
            b"package main\n\nfunc main( {\n",
            &test_classifier(),
            CategoryOrder::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SortError::Parse(_)));
    }

    #[test]
    fn test_is_go_file() {
        assert!(is_go_file(Path::new("main.go")));
        assert!(is_go_file(Path::new("dir/handler_test.go")));
        assert!(!is_go_file(Path::new(".hidden.go")));
        assert!(!is_go_file(Path::new("README.md")));
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn test_sorter(root: PathBuf) -> ImportSorter {
        ImportSorter::with_classifier(SortConfig::new(root), test_classifier()).unwrap()
    }

    #[test]
    fn test_sort_file_reports_changed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "main.go",
            "package main\n\nimport (\n\t\"log\"\n\t\"fmt\"\n)\n\nfunc main() {}\n",
        );

        let sorter = test_sorter(dir.path().to_path_buf());
        let outcome = sorter.sort_file(&path).unwrap();

        assert!(outcome.changed);
        assert!(String::from_utf8(outcome.output)
            .unwrap()
            .contains("\t\"fmt\"\n\t\"log\"\n"));
        // the file itself is untouched
        let on_disk = fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("\t\"log\"\n\t\"fmt\"\n"));
    }

    #[test]
    fn test_sort_dir_collects_failures_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "a.go",
            "package a\n\nimport (\n\t\"log\"\n\t\"fmt\"\n)\n",
        );
        write_file(dir.path(), "broken.go", "package b\n\nfunc main( {\n");
        write_file(dir.path(), "c.go", "package c\n\nfunc C() {}\n");

        let sorter = test_sorter(dir.path().to_path_buf());
        let result = sorter.sort_dir(dir.path()).unwrap();

        assert_eq!(result.outcomes.len(), 2);
        assert_eq!(result.failures.len(), 1);
        assert!(!result.ok());
        assert!(result.failures[0].0.ends_with("broken.go"));

        let batch_err = result.into_error().unwrap();
        assert!(batch_err.to_string().contains("broken.go"));
    }

    #[test]
    fn test_sort_dir_skips_vendor_and_non_go() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "main.go", "package main\n\nfunc main() {}\n");
        write_file(dir.path(), "notes.txt", "not go\n");
        fs::create_dir_all(dir.path().join("vendor/lib")).unwrap();
        write_file(
            &dir.path().join("vendor/lib"),
            "lib.go",
            "package lib\n\nimport (\n\t\"log\"\n\t\"fmt\"\n)\n",
        );

        let sorter = test_sorter(dir.path().to_path_buf());
        let result = sorter.sort_dir(dir.path()).unwrap();

        assert!(result.ok());
        assert_eq!(result.outcomes.len(), 1);
        assert!(result.outcomes[0].path.ends_with("main.go"));
        assert!(!result.outcomes[0].changed);
    }

    #[test]
    fn test_sort_dir_threads_option() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..8 {
            write_file(
                dir.path(),
                &format!("f{i}.go"),
                "package p\n\nimport (\n\t\"log\"\n\t\"fmt\"\n)\n",
            );
        }

        let sorter = ImportSorter::with_classifier(
            SortConfig::new(dir.path().to_path_buf()).with_threads(2),
            test_classifier(),
        )
        .unwrap();
        let result = sorter.sort_dir(dir.path()).unwrap();

        assert!(result.ok());
        assert_eq!(result.outcomes.len(), 8);
        assert!(result.outcomes.iter().all(|o| o.changed));
    }
}
