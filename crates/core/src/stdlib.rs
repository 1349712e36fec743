use std::collections::HashSet;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StdlibLoadError {
    #[error("failed to invoke `go list std`: {0}")]
    Io(#[from] std::io::Error),
    #[error("`go list std` failed ({status}): {stderr}")]
    GoList { status: String, stderr: String },
}

/// The resolved set of standard-library import paths.
///
/// Built once per run, immutable afterwards, and shared read-only across
/// file tasks; classification never takes a lock.
#[derive(Debug, Clone)]
pub struct StdlibIndex {
    packages: HashSet<String>,
}

impl StdlibIndex {
    /// Resolve the package list against the host Go toolchain. Blocking.
    pub fn load() -> Result<Self, StdlibLoadError> {
        let output = Command::new("go").args(["list", "std"]).output()?;

        if !output.status.success() {
            return Err(StdlibLoadError::GoList {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let index = Self::from_packages(stdout.lines().map(str::trim).filter(|l| !l.is_empty()));
        log::debug!("loaded {} standard-library packages", index.len());

        Ok(index)
    }

    /// Build an index from a fixed package list, bypassing the toolchain.
    pub fn from_packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    /// Check an unquoted import path for standard-library membership
    pub fn contains(&self, import_path: &str) -> bool {
        self.packages.contains(import_path)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_packages() {
        let index = StdlibIndex::from_packages(["fmt", "net/http", "database/sql/driver"]);

        assert_eq!(index.len(), 3);
        assert!(index.contains("fmt"));
        assert!(index.contains("database/sql/driver"));
        assert!(!index.contains("github.com/x/y"));
        assert!(!index.contains("net"));
    }

    #[test]
    fn test_empty_index() {
        let index = StdlibIndex::from_packages(Vec::<String>::new());
        assert!(index.is_empty());
        assert!(!index.contains("fmt"));
    }
}
