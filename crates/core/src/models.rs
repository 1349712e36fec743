use crate::config::CategoryOrder;

/// Category an import is sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportCategory {
    /// Standard-library package ("inbuilt"), order char `i`
    Standard,
    /// Third-party package ("external"), order char `e`
    ThirdParty,
    /// Project-local package, order char `l`
    Local,
}

impl ImportCategory {
    /// Map an order-string character to its category.
    pub fn from_order_char(c: char) -> Option<Self> {
        match c {
            'i' => Some(ImportCategory::Standard),
            'e' => Some(ImportCategory::ThirdParty),
            'l' => Some(ImportCategory::Local),
            _ => None,
        }
    }

    pub fn order_char(self) -> char {
        match self {
            ImportCategory::Standard => 'i',
            ImportCategory::ThirdParty => 'e',
            ImportCategory::Local => 'l',
        }
    }
}

/// A single import declaration as found in source.
///
/// The derived ordering is the rendering order: path ascending, then alias
/// ascending with unaliased imports first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportRecord {
    /// Quoted import path, quotes kept exactly as written
    pub path: String,
    /// Local binding name if the import was renamed (`m "lib/math"`, `.`, `_`)
    pub alias: Option<String>,
}

impl ImportRecord {
    pub fn new(path: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            path: path.into(),
            alias,
        }
    }

    /// Import path with the surrounding quote characters removed
    pub fn unquoted_path(&self) -> &str {
        self.path.trim_matches(|c| c == '"' || c == '`')
    }

    /// One canonical import line, without leading indentation
    pub fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias} {}", self.path),
            None => self.path.clone(),
        }
    }
}

/// The three category buckets an import set is partitioned into.
///
/// Insertion order inside a bucket is irrelevant; buckets are sorted when
/// they are sequenced for rendering.
#[derive(Debug, Clone, Default)]
pub struct CategoryBuckets {
    standard: Vec<ImportRecord>,
    third_party: Vec<ImportRecord>,
    local: Vec<ImportRecord>,
}

impl CategoryBuckets {
    pub fn push(&mut self, category: ImportCategory, record: ImportRecord) {
        self.bucket_mut(category).push(record);
    }

    pub fn get(&self, category: ImportCategory) -> &[ImportRecord] {
        match category {
            ImportCategory::Standard => &self.standard,
            ImportCategory::ThirdParty => &self.third_party,
            ImportCategory::Local => &self.local,
        }
    }

    /// Total number of records across all three buckets
    pub fn total(&self) -> usize {
        self.standard.len() + self.third_party.len() + self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Sequence the buckets according to `order`, sorting each one into the
    /// `ImportRecord` total order. Empty buckets are kept in the sequence so
    /// positions stay aligned with the order; rendering skips them.
    pub fn into_ordered(mut self, order: CategoryOrder) -> Vec<Vec<ImportRecord>> {
        order
            .iter()
            .map(|category| {
                let mut records = std::mem::take(self.bucket_mut(category));
                records.sort();
                records
            })
            .collect()
    }

    fn bucket_mut(&mut self, category: ImportCategory) -> &mut Vec<ImportRecord> {
        match category {
            ImportCategory::Standard => &mut self.standard,
            ImportCategory::ThirdParty => &mut self.third_party,
            ImportCategory::Local => &mut self.local,
        }
    }
}
