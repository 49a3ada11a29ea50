// probity-core/src/application/profiler.rs

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::domain::dataset::{Dataset, NULL_SENTINEL};
use crate::domain::metadata::{AttributeRule, MetadataCatalog, ValueType};

/// Descriptive statistics for one attribute over the full dataset.
/// Numeric aggregates are only meaningful when the declared type is
/// numeric; they stay `None` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRecord {
    pub attribute: String,
    /// 1-based position in metadata declaration order.
    pub position: usize,
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    pub count: usize,
    pub typed_count: usize,
    pub sum: f64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub stddev: Option<f64>,
    pub variance: Option<f64>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub null_count: usize,
    pub blank_count: usize,
    pub default_count: usize,
    pub default_value: Option<String>,
    pub most_frequent_value: Option<String>,
    pub most_frequent_count: usize,
    pub distinct_pattern_count: usize,
    pub patterns: Vec<String>,
    pub approx_memory_bytes: usize,
}

impl ProfileRecord {
    fn empty(rule: &AttributeRule, position: usize) -> Self {
        Self {
            attribute: rule.name.clone(),
            position,
            value_type: rule.value_type,
            count: 0,
            typed_count: 0,
            sum: 0.0,
            mean: None,
            median: None,
            stddev: None,
            variance: None,
            min_value: None,
            max_value: None,
            min_len: None,
            max_len: None,
            null_count: 0,
            blank_count: 0,
            default_count: 0,
            default_value: rule.default.clone(),
            most_frequent_value: None,
            most_frequent_count: 0,
            distinct_pattern_count: 0,
            patterns: Vec::new(),
            approx_memory_bytes: 0,
        }
    }
}

/// One record per declared attribute, in metadata declaration order.
/// Profiling never aborts: a declared attribute absent from the dataset
/// yields an empty record, mirroring the validator's non-fatal handling.
pub fn profile(dataset: &Dataset, catalog: &MetadataCatalog) -> Vec<ProfileRecord> {
    catalog
        .iter()
        .enumerate()
        .map(|(index, rule)| match dataset.column(&rule.name) {
            Some(values) => profile_column(rule, values, index + 1),
            None => {
                debug!(attribute = %rule.name, "profiling absent attribute as empty");
                ProfileRecord::empty(rule, index + 1)
            }
        })
        .collect()
}

fn profile_column(rule: &AttributeRule, values: &[String], position: usize) -> ProfileRecord {
    let mut record = ProfileRecord::empty(rule, position);
    record.count = values.len();

    let mut numeric: Vec<f64> = Vec::new();
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (index, value) in values.iter().enumerate() {
        record.approx_memory_bytes += value.len();

        let len = value.chars().count();
        record.min_len = Some(record.min_len.map_or(len, |m| m.min(len)));
        record.max_len = Some(record.max_len.map_or(len, |m| m.max(len)));

        if value == NULL_SENTINEL {
            record.null_count += 1;
        } else if value.is_empty() {
            record.blank_count += 1;
        }

        if rule.default.as_deref() == Some(value.as_str()) {
            record.default_count += 1;
        }

        *occurrences.entry(value).or_insert(0) += 1;
        first_seen.entry(value).or_insert(index);

        match rule.value_type {
            Some(ty) if ty.coerces(value) => {
                record.typed_count += 1;
                if ty.is_numeric() {
                    if let Ok(val) = value.trim().parse::<f64>() {
                        numeric.push(val);
                    }
                }
            }
            Some(_) => {}
            None => record.typed_count += 1,
        }
    }

    // Most frequent value; ties break on first appearance.
    if let Some((value, count)) = occurrences
        .iter()
        .min_by_key(|(value, count)| (std::cmp::Reverse(**count), first_seen[*value]))
    {
        record.most_frequent_value = Some((*value).to_string());
        record.most_frequent_count = *count;
    }

    // Distinct non-empty values, sorted, as the pattern inventory.
    let patterns: BTreeSet<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect();
    record.distinct_pattern_count = patterns.len();
    record.patterns = patterns.into_iter().map(str::to_string).collect();

    if !numeric.is_empty() {
        let n = numeric.len() as f64;
        record.sum = numeric.iter().sum();
        let mean = record.sum / n;
        record.mean = Some(mean);
        record.median = Some(median(&mut numeric.clone()));
        record.min_value = numeric.iter().copied().reduce(f64::min);
        record.max_value = numeric.iter().copied().reduce(f64::max);

        // Sample statistics, so at least two numeric values are needed.
        if numeric.len() >= 2 {
            let variance =
                numeric.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            record.variance = Some(variance);
            record.stddev = Some(variance.sqrt());
        }
    }

    record
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

// --- UNIT TESTS ---
#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn int_rule(name: &str) -> AttributeRule {
        let mut rule = AttributeRule::named(name);
        rule.value_type = Some(ValueType::Int);
        rule
    }

    #[test]
    fn test_int_column_statistics() {
        let catalog = MetadataCatalog::new(vec![int_rule("A")]);
        let dataset = Dataset::from_columns([("A", vec!["1", "2", "3"])]);

        let records = profile(&dataset, &catalog);
        assert_eq!(records.len(), 1);
        let record = &records[0];

        assert_eq!(record.position, 1);
        assert_eq!(record.count, 3);
        assert_eq!(record.typed_count, 3);
        assert_eq!(record.sum, 6.0);
        assert_eq!(record.mean, Some(2.0));
        assert_eq!(record.median, Some(2.0));
        assert_eq!(record.min_value, Some(1.0));
        assert_eq!(record.max_value, Some(3.0));
        assert_eq!(record.null_count, 0);
        assert_eq!(record.blank_count, 0);
        // sample variance of [1,2,3] is 1
        assert_eq!(record.variance, Some(1.0));
        assert_eq!(record.stddev, Some(1.0));
    }

    #[test]
    fn test_null_blank_and_default_counts() {
        let mut rule = int_rule("A");
        rule.default = Some("-1".to_string());
        let catalog = MetadataCatalog::new(vec![rule]);
        let dataset = Dataset::from_columns([("A", vec!["(Null)", "", "-1", "-1", "7"])]);

        let record = &profile(&dataset, &catalog)[0];
        assert_eq!(record.null_count, 1);
        assert_eq!(record.blank_count, 1);
        assert_eq!(record.default_count, 2);
        // "(Null)" and "" do not coerce to int
        assert_eq!(record.typed_count, 3);
    }

    #[test]
    fn test_most_frequent_tie_breaks_on_first_encounter() {
        let catalog = MetadataCatalog::new(vec![AttributeRule::named("A")]);
        let dataset = Dataset::from_columns([("A", vec!["b", "a", "b", "a"])]);

        let record = &profile(&dataset, &catalog)[0];
        assert_eq!(record.most_frequent_value.as_deref(), Some("b"));
        assert_eq!(record.most_frequent_count, 2);
    }

    #[test]
    fn test_patterns_are_sorted_distinct_non_empty() {
        let catalog = MetadataCatalog::new(vec![AttributeRule::named("A")]);
        let dataset = Dataset::from_columns([("A", vec!["c", "", "a", "c", "(Null)"])]);

        let record = &profile(&dataset, &catalog)[0];
        assert_eq!(record.patterns, vec!["(Null)", "a", "c"]);
        assert_eq!(record.distinct_pattern_count, 3);
    }

    #[test]
    fn test_single_numeric_value_has_no_dispersion() {
        let catalog = MetadataCatalog::new(vec![int_rule("A")]);
        let dataset = Dataset::from_columns([("A", vec!["5"])]);

        let record = &profile(&dataset, &catalog)[0];
        assert_eq!(record.mean, Some(5.0));
        assert_eq!(record.stddev, None);
        assert_eq!(record.variance, None);
    }

    #[test]
    fn test_absent_attribute_yields_empty_record() {
        let catalog =
            MetadataCatalog::new(vec![AttributeRule::named("Ghost"), AttributeRule::named("A")]);
        let dataset = Dataset::from_columns([("A", vec!["x"])]);

        let records = profile(&dataset, &catalog);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].attribute, "Ghost");
        assert_eq!(records[0].count, 0);
        assert_eq!(records[0].position, 1);
        assert_eq!(records[1].position, 2);
    }

    #[test]
    fn test_memory_estimate_sums_byte_lengths() {
        let catalog = MetadataCatalog::new(vec![AttributeRule::named("A")]);
        let dataset = Dataset::from_columns([("A", vec!["ab", "cde"])]);

        let record = &profile(&dataset, &catalog)[0];
        assert_eq!(record.approx_memory_bytes, 5);
    }
}
