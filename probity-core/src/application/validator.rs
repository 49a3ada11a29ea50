// probity-core/src/application/validator.rs

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use regex::Regex;
use tracing::{debug, info};

use crate::domain::dataset::{Dataset, is_blank_or_null};
use crate::domain::error::DomainError;
use crate::domain::expression::{self, CompiledExpression, ExprError, RowScope};
use crate::domain::measurement::{Dimension, Measurement, MeasurementLog};
use crate::domain::metadata::{AttributeRule, MetadataCatalog, ValueType};
use crate::ports::validator::DatasetValidator;

/// The canonical rule dispatcher: applies every rule kind declared in
/// the catalog to the matching dataset column and funnels violations
/// into a measurement log. Rule failures never abort the run; only
/// structural problems (unknown referenced column, invalid regex) do.
#[derive(Debug, Default)]
pub struct RuleValidator {
    cancel: Option<Arc<AtomicBool>>,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cooperative cancellation: the flag is polled between attribute
    /// iterations, so a fired flag aborts before the next column starts.
    pub fn with_cancel_flag(flag: Arc<AtomicBool>) -> Self {
        Self { cancel: Some(flag) }
    }

    pub fn validate(
        &self,
        dataset: &Dataset,
        catalog: &MetadataCatalog,
    ) -> Result<MeasurementLog, DomainError> {
        if catalog.is_empty() {
            return Err(DomainError::MissingInput("metadata catalog"));
        }
        if dataset.is_empty() {
            return Err(DomainError::MissingInput("dataset"));
        }

        let mut log = MeasurementLog::new();

        for rule in catalog.iter() {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(DomainError::Cancelled);
                }
            }

            match dataset.column(&rule.name) {
                Some(values) => {
                    info!(attribute = %rule.name, rows = values.len(), "validating attribute");
                    self.validate_column(dataset, rule, values, &mut log)?;
                }
                None => {
                    debug!(attribute = %rule.name, "declared attribute absent from dataset");
                    log.add(Measurement::new(
                        &rule.name,
                        Dimension::MetadataConformance,
                        format!("Attribute '{}' not found in the dataset", rule.name),
                    ));
                }
            }
        }

        Ok(log)
    }

    fn validate_column(
        &self,
        dataset: &Dataset,
        rule: &AttributeRule,
        values: &[String],
        log: &mut MeasurementLog,
    ) -> Result<(), DomainError> {
        for value in values {
            self.check_mandatory(rule, value, log);
            self.check_size(rule, value, log);
            self.check_type(rule, value, log);
            self.check_enum(rule, value, log);
            self.check_starts_with(rule, value, log);
        }

        self.check_format(rule, values, log)?;
        self.check_unique(rule, values, log);
        self.check_composite(dataset, rule, log)?;
        self.check_expression(dataset, rule, log)?;

        Ok(())
    }

    fn check_mandatory(&self, rule: &AttributeRule, value: &str, log: &mut MeasurementLog) {
        if !is_blank_or_null(value) || rule.allow_blank {
            return;
        }
        // Every field, mandatory or not, should carry a meaningful
        // default; only the dimension differs.
        if rule.mandatory {
            log.add(Measurement::new(
                &rule.name,
                Dimension::MandatoryCompleteness,
                "Mandatory field is blank or null. A value is required",
            ));
        } else {
            log.add(Measurement::new(
                &rule.name,
                Dimension::OptionalCompleteness,
                "Optional field is blank or null. A default value is required",
            ));
        }
    }

    fn check_size(&self, rule: &AttributeRule, value: &str, log: &mut MeasurementLog) {
        let Some(size) = rule.size else { return };
        if !is_blank_or_null(value) && value.chars().count() > size {
            log.add(Measurement::new(
                &rule.name,
                Dimension::MetaSize,
                format!("Value '{value}' is longer than the declared size {size}"),
            ));
        }
    }

    fn check_type(&self, rule: &AttributeRule, value: &str, log: &mut MeasurementLog) {
        let Some(value_type) = rule.value_type else {
            return;
        };
        // A value equal to the declared default is exempt from type and
        // range checking.
        if rule.default.as_deref() == Some(value) {
            return;
        }
        match value_type {
            ValueType::Int | ValueType::Float | ValueType::Bool => {
                if is_blank_or_null(value) || !value_type.coerces(value) {
                    if !rule.allow_blank {
                        log.add(Measurement::new(
                            &rule.name,
                            Dimension::MetaType,
                            format!("Value '{value}' is not a valid {value_type:?}"),
                        ));
                    }
                } else if value_type.is_numeric() {
                    // Successful numeric coercion unlocks range checking.
                    self.check_min_max(rule, value, log);
                }
            }
            ValueType::String | ValueType::Date => {}
        }
    }

    fn check_min_max(&self, rule: &AttributeRule, value: &str, log: &mut MeasurementLog) {
        let Ok(val) = value.trim().parse::<f64>() else {
            return;
        };
        // Defaults bypass range checks even when they fall outside the
        // declared bounds.
        if let Some(default) = rule.default.as_deref().and_then(|d| d.trim().parse::<f64>().ok()) {
            if val == default {
                return;
            }
        }
        if let Some(min) = rule.min {
            if val < min {
                log.add(Measurement::new(
                    &rule.name,
                    Dimension::MetaRangeMin,
                    format!("Value '{value}' must be >= {min}"),
                ));
            }
        }
        if let Some(max) = rule.max {
            if val > max {
                log.add(Measurement::new(
                    &rule.name,
                    Dimension::MetaRangeMax,
                    format!("Value '{value}' must be <= {max}"),
                ));
            }
        }
    }

    fn check_enum(&self, rule: &AttributeRule, value: &str, log: &mut MeasurementLog) {
        let Some(allowed) = &rule.enum_values else {
            return;
        };
        // Blank and null values are the completeness checks' business.
        if is_blank_or_null(value) {
            return;
        }
        if !allowed.iter().any(|candidate| candidate == value) {
            log.add(Measurement::new(
                &rule.name,
                Dimension::MetaEnum,
                format!("Value '{value}' is outside the enumeration set {allowed:?}"),
            ));
        }
    }

    fn check_starts_with(&self, rule: &AttributeRule, value: &str, log: &mut MeasurementLog) {
        let Some(prefixes) = &rule.starts_with else {
            return;
        };
        if is_blank_or_null(value) {
            return;
        }
        if !prefixes.iter().any(|prefix| value.starts_with(prefix)) {
            log.add(Measurement::new(
                &rule.name,
                Dimension::FormatPrefix,
                format!("Value '{value}' does not begin with any of {prefixes:?}"),
            ));
        }
    }

    // Matching is anchored at the start of the string only; the pattern
    // decides whether it also pins the end (e.g. with `$`).
    fn check_format(
        &self,
        rule: &AttributeRule,
        values: &[String],
        log: &mut MeasurementLog,
    ) -> Result<(), DomainError> {
        let Some(pattern) = &rule.format else {
            return Ok(());
        };
        if rule.allow_blank {
            return Ok(());
        }

        // One compiled regex per column per run.
        let regex =
            Regex::new(&format!(r"\A(?:{pattern})")).map_err(|e| DomainError::InvalidRegex {
                attribute: rule.name.clone(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

        for value in values {
            if is_blank_or_null(value) {
                continue;
            }
            if !regex.is_match(value) {
                log.add(Measurement::new(
                    &rule.name,
                    Dimension::FormatConsistency,
                    format!("Value '{value}' does not match the format '{pattern}'"),
                ));
            }
        }
        Ok(())
    }

    // One measurement per duplicate occurrence beyond the first, so a
    // value appearing k times yields k-1 measurements. Sorting first
    // makes the result invariant under row permutation.
    fn check_unique(&self, rule: &AttributeRule, values: &[String], log: &mut MeasurementLog) {
        if !rule.unique {
            return;
        }
        let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        let mut i = 0;
        while i < sorted.len() {
            let value = sorted[i];
            let mut run = 1;
            while i + run < sorted.len() && sorted[i + run] == value {
                run += 1;
            }
            for _ in 1..run {
                log.add(Measurement::new(
                    &rule.name,
                    Dimension::Uniqueness,
                    format!("Value '{value}' is not unique ({run} occurrences)"),
                ));
            }
            i += run;
        }
    }

    fn check_composite(
        &self,
        dataset: &Dataset,
        rule: &AttributeRule,
        log: &mut MeasurementLog,
    ) -> Result<(), DomainError> {
        let Some(parts) = rule.resolved_composite() else {
            return Ok(());
        };

        let mut columns = Vec::with_capacity(parts.len());
        for name in &parts {
            let column = dataset
                .column(name)
                .ok_or_else(|| DomainError::UnknownColumn {
                    column: name.clone(),
                    context: format!("composite key of attribute '{}'", rule.name),
                })?;
            columns.push(column);
        }

        let key_name = parts.join("+");
        let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut seen = HashSet::with_capacity(rows);

        for row in 0..rows {
            // Synthetic key: concatenated values, no delimiter.
            let key: String = columns.iter().map(|c| c[row].as_str()).collect();
            if !seen.insert(key.clone()) {
                log.add(Measurement::new(
                    &rule.name,
                    Dimension::UniquenessComposite,
                    format!("Duplicate composite key '{key_name}' with value '{key}'"),
                ));
            }
        }
        Ok(())
    }

    fn check_expression(
        &self,
        dataset: &Dataset,
        rule: &AttributeRule,
        log: &mut MeasurementLog,
    ) -> Result<(), DomainError> {
        let Some(source) = rule.resolved_expression() else {
            return Ok(());
        };

        // Resolve every referenced column up front: an unknown column is
        // a configuration problem, not a per-row violation.
        let names = expression::referenced_columns(&source);
        let mut columns = Vec::with_capacity(names.len());
        for name in &names {
            let column = dataset
                .column(name)
                .ok_or_else(|| DomainError::UnknownColumn {
                    column: name.clone(),
                    context: format!("expression of attribute '{}'", rule.name),
                })?;
            columns.push(column);
        }

        let compiled: Result<CompiledExpression, ExprError> =
            CompiledExpression::compile(&source);
        let rows = columns.iter().map(|c| c.len()).min().unwrap_or(0);

        for row in 0..rows {
            let mut scope = RowScope::new();
            for (name, column) in names.iter().zip(&columns) {
                scope.bind(name, &column[row]);
            }

            let outcome = match &compiled {
                Ok(expr) => expr.evaluate(&scope),
                Err(e) => Err(e.clone()),
            };

            match outcome {
                Ok(true) => {}
                Ok(false) => log.add(Measurement::new(
                    &rule.name,
                    Dimension::BusinessRuleCompliance,
                    format!(
                        "Expression '{}' returned FALSE",
                        expression::render(&source, &scope)
                    ),
                )),
                // An evaluation error never propagates; it is folded
                // into a business-rule violation for that row.
                Err(e) => log.add(Measurement::new(
                    &rule.name,
                    Dimension::BusinessRuleCompliance,
                    format!(
                        "Expression '{}' returned an error: {e}",
                        expression::render(&source, &scope)
                    ),
                )),
            }
        }
        Ok(())
    }
}

impl DatasetValidator for RuleValidator {
    fn name(&self) -> &str {
        "rules"
    }

    fn validate(
        &self,
        dataset: &Dataset,
        catalog: &MetadataCatalog,
    ) -> Result<MeasurementLog, DomainError> {
        RuleValidator::validate(self, dataset, catalog)
    }
}
