// probity-core/src/domain/dataset.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical marker standing in for an absent value in the string-typed
/// column model. The loader normalizes NULLs to this sentinel; an empty
/// string denotes a present-but-blank value.
pub const NULL_SENTINEL: &str = "(Null)";

pub fn is_blank_or_null(value: &str) -> bool {
    value.is_empty() || value == NULL_SENTINEL
}

/// Column-oriented table: attribute name -> ordered sequence of cells.
/// Row `i` across all referenced columns denotes the same logical record;
/// row alignment is an invariant the loader guarantees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    columns: BTreeMap<String, Vec<String>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<I, N, C, V>(columns: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut dataset = Self::new();
        for (name, values) in columns {
            dataset.insert_column(name, values);
        }
        dataset
    }

    pub fn insert_column<N, C, V>(&mut self, name: N, values: C)
    where
        N: Into<String>,
        C: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.columns
            .insert(name.into(), values.into_iter().map(Into::into).collect());
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of rows in a column, 0 when the column is absent.
    pub fn column_len(&self, name: &str) -> usize {
        self.columns.get(name).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
