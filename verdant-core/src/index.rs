//! The read-only location table.
//!
//! A [`LocationIndex`] is built once at startup (from the bundled dataset or a
//! JSON file) and shared by reference for the rest of the process. Cloning is
//! an `Arc` bump, so every consumer can hold its own handle without locking.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, VerdantError};
use crate::location::{Category, LocationRecord};

/// Bay Area dataset compiled into the binary.
const BUNDLED_DATASET: &str = include_str!("../data/locations.json");

/// Immutable, ordered table of facility records.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    records: Arc<[LocationRecord]>,
}

impl LocationIndex {
    /// An index with no records.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the dataset shipped with the crate.
    ///
    /// # Errors
    /// Returns an error only if the bundled JSON is corrupt.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_DATASET)
    }

    /// Parse a JSON array of records.
    ///
    /// # Errors
    /// Returns `VerdantError::Serialization` for malformed JSON and
    /// `VerdantError::Dataset` for duplicate ids.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<LocationRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Load a JSON dataset from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let index = Self::from_json(&content)?;
        debug!(path = %path.display(), records = index.len(), "Location dataset loaded");
        Ok(index)
    }

    /// Build an index from records, keeping their order.
    ///
    /// # Errors
    /// Returns `VerdantError::Dataset` if two records share an id.
    pub fn from_records(records: Vec<LocationRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for rec in &records {
            if !seen.insert(rec.id) {
                return Err(VerdantError::Dataset(format!(
                    "duplicate location id {}",
                    rec.id
                )));
            }
        }
        Ok(Self {
            records: records.into(),
        })
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in dataset order.
    pub fn iter(&self) -> std::slice::Iter<'_, LocationRecord> {
        self.records.iter()
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&LocationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// All records in a category, in dataset order.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<&LocationRecord> {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Map-page filter.
    ///
    /// A record passes when its category matches (`None` means every
    /// category) and the search text is a case-insensitive substring of its
    /// name or city. An empty search matches everything.
    #[must_use]
    pub fn filter(&self, category: Option<Category>, search: &str) -> Vec<&LocationRecord> {
        let needle = search.to_lowercase();
        self.records
            .iter()
            .filter(|r| category.is_none_or(|c| r.category == c))
            .filter(|r| {
                r.name.to_lowercase().contains(&needle) || r.city.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a LocationIndex {
    type Item = &'a LocationRecord;
    type IntoIter = std::slice::Iter<'a, LocationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
