//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Attributes rendered for each element, in priority order.
///
/// Order matters: when two attributes carry the same long value, only the
/// earlier one is kept.
pub const DEFAULT_INCLUDE_ATTRIBUTES: &[&str] = &[
    "title",
    "type",
    "checked",
    "name",
    "role",
    "value",
    "placeholder",
    "data-date-format",
    "alt",
    "aria-label",
    "aria-expanded",
    "data-state",
    "aria-checked",
    "aria-valuemin",
    "aria-valuemax",
    "aria-valuenow",
    "aria-placeholder",
    "pattern",
    "min",
    "max",
    "minlength",
    "maxlength",
    "step",
    "selected",
    "expanded",
    "pressed",
    "disabled",
    "required",
    "valuetext",
    "ax_name",
];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub serializer: SerializerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// DOM serializer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Collapse decorative markup nested inside clickable containers.
    #[serde(default = "default_true")]
    pub enable_bbox_filtering: bool,

    /// Fraction of a child's area that must overlap its container's bounds
    /// for the child to be collapsed.
    #[serde(default = "default_containment_threshold")]
    pub containment_threshold: f64,

    /// Ordered attribute allow-list used when rendering element lines.
    #[serde(default = "default_include_attributes")]
    pub include_attributes: Vec<String>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            enable_bbox_filtering: default_true(),
            containment_threshold: default_containment_threshold(),
            include_attributes: default_include_attributes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_containment_threshold() -> f64 {
    0.99
}

fn default_include_attributes() -> Vec<String> {
    DEFAULT_INCLUDE_ATTRIBUTES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
