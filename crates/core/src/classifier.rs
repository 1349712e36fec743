use crate::models::{CategoryBuckets, ImportCategory, ImportRecord};
use crate::stdlib::StdlibIndex;

/// Assigns every import to exactly one category.
///
/// Immutable after construction; one instance is shared read-only across
/// concurrent file tasks.
pub struct ImportClassifier {
    stdlib: StdlibIndex,
    local_prefixes: Vec<String>,
}

impl ImportClassifier {
    pub fn new(stdlib: StdlibIndex, local_prefixes: Vec<String>) -> Self {
        let local_prefixes = local_prefixes
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();

        Self {
            stdlib,
            local_prefixes,
        }
    }

    pub fn local_prefixes(&self) -> &[String] {
        &self.local_prefixes
    }

    /// Classify one record. Precedence: local prefix, then standard library,
    /// then third-party. Prefixes match as plain substrings so nested module
    /// paths underneath a prefix are caught too.
    pub fn classify(&self, record: &ImportRecord) -> ImportCategory {
        if self
            .local_prefixes
            .iter()
            .any(|prefix| record.path.contains(prefix.as_str()))
        {
            ImportCategory::Local
        } else if self.stdlib.contains(record.unquoted_path()) {
            ImportCategory::Standard
        } else {
            ImportCategory::ThirdParty
        }
    }

    /// Partition records into the three category buckets.
    pub fn partition(&self, records: &[ImportRecord]) -> CategoryBuckets {
        let mut buckets = CategoryBuckets::default();
        for record in records {
            buckets.push(self.classify(record), record.clone());
        }

        buckets
    }
}
