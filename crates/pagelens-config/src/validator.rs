//! Configuration validation.

use std::collections::HashSet;

use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_serializer(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_serializer(config: &Config, result: &mut ValidationResult) {
        let serializer = &config.serializer;

        // NaN fails both comparisons
        let threshold = serializer.containment_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            result.add_error(ValidationError::new(
                "serializer.containment_threshold",
                format!("containment_threshold must be in (0, 1], got {}", threshold),
            ));
        } else if threshold < 0.5 {
            result.add_warning(ValidationWarning::new(
                "serializer.containment_threshold",
                "containment_threshold below 0.5 collapses elements that barely overlap their container",
            ));
        }

        if serializer.include_attributes.is_empty() {
            result.add_warning(ValidationWarning::new(
                "serializer.include_attributes",
                "include_attributes is empty, element lines will carry no attributes",
            ));
        }

        let mut seen = HashSet::new();
        for name in &serializer.include_attributes {
            if name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "serializer.include_attributes",
                    "attribute names cannot be empty",
                ));
            } else if !seen.insert(name.as_str()) {
                result.add_warning(ValidationWarning::new(
                    "serializer.include_attributes",
                    format!("attribute '{}' is listed more than once", name),
                ));
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
