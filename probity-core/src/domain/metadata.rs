// probity-core/src/domain/metadata.rs

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Placeholder resolved to the owning attribute's name inside Composite
/// entries and Expression sources.
pub const SELF_PLACEHOLDER: &str = "%1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "number")]
    Float,
    #[serde(alias = "boolean")]
    Bool,
    String,
    Date,
}

impl ValueType {
    /// Whether a cell value coerces to this scalar type.
    pub fn coerces(&self, value: &str) -> bool {
        match self {
            Self::Int => value.trim().parse::<i64>().is_ok(),
            Self::Float => value.trim().parse::<f64>().is_ok(),
            Self::Bool => matches!(
                value.to_ascii_lowercase().as_str(),
                "true" | "false" | "yes" | "no" | "0" | "1"
            ),
            Self::String | Self::Date => true,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

/// One rule definition per declared attribute. Absent optional fields
/// disable the corresponding check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AttributeRule {
    #[validate(length(min = 1, message = "attribute name cannot be empty"))]
    pub name: String,

    #[serde(default)]
    pub mandatory: bool,

    #[serde(default)]
    pub allow_blank: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<Vec<String>>,

    #[validate(length(min = 1, message = "Format regex cannot be empty"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default)]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<Vec<String>>,

    #[validate(length(min = 1, message = "Expression cannot be empty"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl AttributeRule {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Composite key entries with `%1` resolved to the owning attribute.
    pub fn resolved_composite(&self) -> Option<Vec<String>> {
        self.composite.as_ref().map(|parts| {
            parts
                .iter()
                .map(|part| part.replace(SELF_PLACEHOLDER, &self.name))
                .collect()
        })
    }

    /// Expression source with `%1` resolved to the owning attribute's
    /// bracketed column reference.
    pub fn resolved_expression(&self) -> Option<String> {
        self.expression
            .as_ref()
            .map(|expr| expr.replace(SELF_PLACEHOLDER, &format!("[{}]", self.name)))
    }
}

/// Ordered set of attribute rules. Declaration order drives validation
/// and profiling order, so the catalog is a list rather than a map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MetadataCatalog {
    #[validate(nested)]
    #[serde(default)]
    pub attributes: Vec<AttributeRule>,
}

impl MetadataCatalog {
    pub fn new(attributes: Vec<AttributeRule>) -> Self {
        Self { attributes }
    }

    /// Loads a catalog from its declarative YAML form and runs the
    /// structural sanity pass.
    pub fn from_yaml_str(source: &str) -> Result<Self, DomainError> {
        let catalog: Self = serde_yaml::from_str(source)
            .map_err(|e| DomainError::MetadataError(e.to_string()))?;
        Validate::validate(&catalog).map_err(|e| DomainError::MetadataError(e.to_string()))?;
        Ok(catalog)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeRule> {
        self.attributes.iter()
    }

    pub fn rule(&self, name: &str) -> Option<&AttributeRule> {
        self.attributes.iter().find(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
