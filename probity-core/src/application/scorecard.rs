// probity-core/src/application/scorecard.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::dataset::Dataset;
use crate::domain::measurement::{Dimension, MeasurementLog};
use crate::domain::metadata::MetadataCatalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub count: usize,
    /// Violations per value: `count / totalValuesForAttribute`, rounded
    /// to 6 decimal places. 0.0 when the column is absent or empty.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorecardRow {
    pub attribute: String,
    pub cells: Vec<DimensionScore>,
}

/// Per-attribute, per-dimension violation summary. Always rectangular:
/// every declared attribute carries a cell for every taxonomy dimension,
/// zero-filled where nothing fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scorecard {
    pub rows: Vec<ScorecardRow>,
}

impl Scorecard {
    pub fn get(&self, attribute: &str, dimension: Dimension) -> Option<&DimensionScore> {
        self.rows
            .iter()
            .find(|row| row.attribute == attribute)?
            .cells
            .iter()
            .find(|cell| cell.dimension == dimension)
    }
}

/// Derives the scorecard from the measurement log. A pure view: the log
/// stays the single source of truth and no counter is mutated in place.
pub fn summarize(
    log: &MeasurementLog,
    catalog: &MetadataCatalog,
    dataset: &Dataset,
) -> Scorecard {
    let mut counts: HashMap<(&str, Dimension), usize> = HashMap::new();
    for measurement in log.iter() {
        *counts
            .entry((measurement.attribute.as_str(), measurement.dimension))
            .or_insert(0) += 1;
    }

    let rows = catalog
        .iter()
        .map(|rule| {
            let total = dataset.column_len(&rule.name);
            let cells = Dimension::ALL
                .iter()
                .map(|&dimension| {
                    let count = counts
                        .get(&(rule.name.as_str(), dimension))
                        .copied()
                        .unwrap_or(0);
                    let score = if total > 0 {
                        round6(count as f64 / total as f64)
                    } else {
                        0.0
                    };
                    DimensionScore {
                        dimension,
                        count,
                        score,
                    }
                })
                .collect();
            ScorecardRow {
                attribute: rule.name.clone(),
                cells,
            }
        })
        .collect();

    Scorecard { rows }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
