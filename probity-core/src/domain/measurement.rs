// probity-core/src/domain/measurement.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed data-quality taxonomy. Closed set: the scorecard relies on
/// `ALL` to stay rectangular, so new dimensions are a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    MandatoryCompleteness,
    OptionalCompleteness,
    MetaSize,
    MetaType,
    MetaRangeMin,
    MetaRangeMax,
    MetaEnum,
    FormatConsistency,
    FormatPrefix,
    Uniqueness,
    UniquenessComposite,
    BusinessRuleCompliance,
    MetadataConformance,
}

impl Dimension {
    pub const ALL: [Dimension; 13] = [
        Self::MandatoryCompleteness,
        Self::OptionalCompleteness,
        Self::MetaSize,
        Self::MetaType,
        Self::MetaRangeMin,
        Self::MetaRangeMax,
        Self::MetaEnum,
        Self::FormatConsistency,
        Self::FormatPrefix,
        Self::Uniqueness,
        Self::UniquenessComposite,
        Self::BusinessRuleCompliance,
        Self::MetadataConformance,
    ];

    /// Stable human-readable label, used by external reporters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MandatoryCompleteness => "Completeness of Mandatory Attributes",
            Self::OptionalCompleteness => "Completeness of Optional Attributes",
            Self::MetaSize => "Metadata Compliance (Size)",
            Self::MetaType => "Metadata Compliance (Type)",
            Self::MetaRangeMin => "Metadata Compliance (Min)",
            Self::MetaRangeMax => "Metadata Compliance (Max)",
            Self::MetaEnum => "Metadata Compliance (Enumeration)",
            Self::FormatConsistency => "Format Consistency",
            Self::FormatPrefix => "Format Consistency (Prefix)",
            Self::Uniqueness => "Uniqueness",
            Self::UniquenessComposite => "Uniqueness (Composite Key)",
            Self::BusinessRuleCompliance => "Business Rule Compliance",
            Self::MetadataConformance => "Metadata Conformance",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded violation instance tied to an attribute and dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub attribute: String,
    pub dimension: Dimension,
    pub description: String,
}

impl Measurement {
    pub fn new(
        attribute: impl Into<String>,
        dimension: Dimension,
        description: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            dimension,
            description: description.into(),
        }
    }
}

/// Append-only ordered sequence of every measurement emitted during a
/// run. Writers append; the scorecard is a derived view, never shared
/// mutable counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementLog {
    entries: Vec<Measurement>,
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, measurement: Measurement) {
        self.entries.push(measurement);
    }

    pub fn merge(&mut self, other: MeasurementLog) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count_for(&self, attribute: &str, dimension: Dimension) -> usize {
        self.entries
            .iter()
            .filter(|m| m.attribute == attribute && m.dimension == dimension)
            .count()
    }
}

// --- UNIT TESTS ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_is_closed_and_distinct() {
        assert_eq!(Dimension::ALL.len(), 13);
        for (i, a) in Dimension::ALL.iter().enumerate() {
            for b in &Dimension::ALL[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
    }

    #[test]
    fn test_log_append_order_and_counts() {
        let mut log = MeasurementLog::new();
        log.add(Measurement::new("A", Dimension::Uniqueness, "dup 1"));
        log.add(Measurement::new("A", Dimension::Uniqueness, "dup 2"));
        log.add(Measurement::new("B", Dimension::MetaType, "bad type"));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_for("A", Dimension::Uniqueness), 2);
        assert_eq!(log.count_for("A", Dimension::MetaType), 0);

        let first = log.iter().next().unwrap();
        assert_eq!(first.description, "dup 1");
    }
}
