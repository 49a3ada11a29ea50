// probity-core/src/ports/validator.rs

use crate::domain::dataset::Dataset;
use crate::domain::error::DomainError;
use crate::domain::measurement::MeasurementLog;
use crate::domain::metadata::MetadataCatalog;

/// Contract for anything that can validate a dataset against a catalog.
/// Custom validators implement this and are selected via explicit
/// registration, never via dynamic class loading.
pub trait DatasetValidator {
    fn name(&self) -> &str;

    fn validate(
        &self,
        dataset: &Dataset,
        catalog: &MetadataCatalog,
    ) -> Result<MeasurementLog, DomainError>;
}

/// Ordered registry of validators. `run_all` concatenates the logs in
/// registration order; the first fatal error aborts the whole pass.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn DatasetValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, validator: Box<dyn DatasetValidator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn run_all(
        &self,
        dataset: &Dataset,
        catalog: &MetadataCatalog,
    ) -> Result<MeasurementLog, DomainError> {
        let mut log = MeasurementLog::new();
        for validator in &self.validators {
            tracing::debug!(validator = validator.name(), "running registered validator");
            log.merge(validator.validate(dataset, catalog)?);
        }
        Ok(log)
    }
}

// --- UNIT TESTS ---
#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::validator::RuleValidator;
    use crate::domain::measurement::{Dimension, Measurement};
    use crate::domain::metadata::AttributeRule;

    struct StubValidator;

    impl DatasetValidator for StubValidator {
        fn name(&self) -> &str {
            "stub"
        }

        fn validate(
            &self,
            _dataset: &Dataset,
            _catalog: &MetadataCatalog,
        ) -> Result<MeasurementLog, DomainError> {
            let mut log = MeasurementLog::new();
            log.add(Measurement::new(
                "A",
                Dimension::BusinessRuleCompliance,
                "stub finding",
            ));
            Ok(log)
        }
    }

    #[test]
    fn test_registry_concatenates_logs_in_registration_order() {
        let mut registry = ValidatorRegistry::new();
        registry.register(Box::new(RuleValidator::new()));
        registry.register(Box::new(StubValidator));
        assert_eq!(registry.len(), 2);

        let catalog = MetadataCatalog::new(vec![AttributeRule::named("A")]);
        let dataset = Dataset::from_columns([("A", vec![""])]);

        let log = registry.run_all(&dataset, &catalog).unwrap();
        // RuleValidator's optional-completeness hit first, stub last
        assert_eq!(log.len(), 2);
        let last = log.iter().last().unwrap();
        assert_eq!(last.description, "stub finding");
    }
}
