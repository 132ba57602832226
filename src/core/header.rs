use std::collections::HashMap;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::core::field::FieldList;

/// Maps column names to zero based column positions.
///
/// A header is either supplied by the caller, read from the first row of a
/// CSV source, or derived from a record type's field order. Columns that are
/// not named in the header are invisible to the reader, which makes it
/// possible to pick a subset of a wider CSV's columns:
///
/// ```
/// use csv_record::core::header::Header;
///
/// let header: Header = [("Name", 0), ("Balance", 2)].into_iter().collect();
/// assert_eq!(header.position("Balance"), Some(2));
/// assert_eq!(header.position("Age"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header {
    columns: HashMap<String, usize>,
}

impl Header {
    pub fn new() -> Self {
        Header::default()
    }

    /// Derives a header from a field list: the i-th field maps to column i.
    /// When a name appears more than once the last position wins.
    pub fn derive<T>(fields: &FieldList<T>) -> Self {
        fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name(), position))
            .collect()
    }

    /// Builds a header from a CSV header row.
    pub fn from_record(record: &StringRecord) -> Self {
        record
            .iter()
            .enumerate()
            .map(|(position, name)| (name, position))
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, position: usize) -> Option<usize> {
        self.columns.insert(name.into(), position)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.columns.iter().map(|(name, position)| (name.as_str(), *position))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for Header {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut header = Header::new();
        for (name, position) in iter {
            header.insert(name, position);
        }
        header
    }
}
