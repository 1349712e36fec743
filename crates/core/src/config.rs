use crate::models::ImportCategory;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default category order: inbuilt, external, local
pub const DEFAULT_ORDER: &str = "iel";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid category order {0:?}: must be a permutation of {DEFAULT_ORDER:?}")]
    InvalidOrder(String),
    #[error("failed to build glob pattern: {0}")]
    Glob(#[from] globset::Error),
    #[error("failed to parse gitignore: {0}")]
    Gitignore(#[from] ignore::Error),
}

/// A validated permutation of the three import categories, parsed from a
/// 3-character order string over `i`, `e`, and `l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOrder([ImportCategory; 3]);

impl Default for CategoryOrder {
    fn default() -> Self {
        Self([
            ImportCategory::Standard,
            ImportCategory::ThirdParty,
            ImportCategory::Local,
        ])
    }
}

impl FromStr for CategoryOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 {
            return Err(ConfigError::InvalidOrder(s.to_string()));
        }

        let mut categories = [ImportCategory::Standard; 3];
        let mut seen = [false; 3];
        for (slot, &c) in categories.iter_mut().zip(&chars) {
            let category = ImportCategory::from_order_char(c)
                .ok_or_else(|| ConfigError::InvalidOrder(s.to_string()))?;
            if seen[category as usize] {
                return Err(ConfigError::InvalidOrder(s.to_string()));
            }
            seen[category as usize] = true;
            *slot = category;
        }

        Ok(Self(categories))
    }
}

impl CategoryOrder {
    /// Parse an order string, falling back to the default order with a
    /// warning when the string is malformed. Never fails.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|err| {
            log::warn!("{err}; using default order {DEFAULT_ORDER:?}");
            Self::default()
        })
    }

    /// Categories in rendering order
    pub fn iter(&self) -> impl Iterator<Item = ImportCategory> + '_ {
        self.0.iter().copied()
    }
}

/// Split a comma-separated local-prefix flag into its non-empty parts.
pub fn parse_prefix_list(prefixes: &str) -> Vec<String> {
    prefixes
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Configuration for one sorting run
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Project root, used for go.mod and .gitignore discovery
    pub root: PathBuf,
    /// Category order for the regenerated import block
    pub order: CategoryOrder,
    /// Prefixes marking an import as project-local; empty means "derive
    /// from the module path in go.mod"
    pub local_prefixes: Vec<String>,
    /// Additional ignore patterns (glob style)
    pub ignore_patterns: Vec<String>,
    /// Custom ignore file path
    pub ignore_file: Option<PathBuf>,
    /// Process files under vendor/ and testdata/
    pub include_vendor: bool,
    /// Number of threads (0 = auto)
    pub threads: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            order: CategoryOrder::default(),
            local_prefixes: vec![],
            ignore_patterns: vec![],
            ignore_file: None,
            include_vendor: false,
            threads: 0,
        }
    }
}

impl SortConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: CategoryOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_local_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.local_prefixes = prefixes;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_ignore_file(mut self, path: PathBuf) -> Self {
        self.ignore_file = Some(path);
        self
    }

    pub fn with_include_vendor(mut self, include: bool) -> Self {
        self.include_vendor = include;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

/// Filter for skipping files and directories during traversal
pub struct IgnoreFilter {
    gitignore: Option<Gitignore>,
    custom_globs: GlobSet,
    default_ignores: GlobSet,
}

impl IgnoreFilter {
    pub fn new(config: &SortConfig) -> Result<Self, ConfigError> {
        // Load .gitignore if present
        let gitignore = if let Some(ref ignore_file) = config.ignore_file {
            let mut builder = GitignoreBuilder::new(&config.root);
            builder.add(ignore_file);
            Some(builder.build()?)
        } else {
            let gitignore_path = config.root.join(".gitignore");
            if gitignore_path.exists() {
                let mut builder = GitignoreBuilder::new(&config.root);
                builder.add(&gitignore_path);
                Some(builder.build()?)
            } else {
                None
            }
        };

        // Build custom ignore globs
        let mut custom_builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            custom_builder.add(Glob::new(pattern)?);
        }
        let custom_globs = custom_builder.build()?;

        // Default ignores (unless include_vendor is set)
        let mut default_builder = GlobSetBuilder::new();
        default_builder.add(Glob::new("**/.git/**")?);
        if !config.include_vendor {
            default_builder.add(Glob::new("**/vendor/**")?);
            default_builder.add(Glob::new("**/testdata/**")?);
        }
        let default_ignores = default_builder.build()?;

        Ok(Self {
            gitignore,
            custom_globs,
            default_ignores,
        })
    }

    /// Check if a path should be skipped
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let path_str = path.to_string_lossy();

        if self.default_ignores.is_match(&*path_str) {
            return true;
        }

        if self.custom_globs.is_match(&*path_str) {
            return true;
        }

        if let Some(ref gi) = self.gitignore {
            if gi.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }
}
