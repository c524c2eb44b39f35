//! Engine configuration.
//!
//! Widths are fixed when a token/process set is defined. Changing them
//! invalidates previously encoded records, so every record is checked
//! against the configured widths instead of being truncated or padded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::metadata::{MetadataKey, MetadataValue};
use crate::process::ProcessId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    pub metadata_key_width: usize,
    pub metadata_value_literal_width: usize,
    pub process_identifier_width: usize,
    /// Deepest `BooleanBinary` nesting the evaluator will walk.
    pub max_restriction_depth: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            metadata_key_width: 32,
            metadata_value_literal_width: 32,
            process_identifier_width: 32,
            max_restriction_depth: 8,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON. Missing fields take their defaults; unknown fields
    /// are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let widths = [
            ("metadata_key_width", self.metadata_key_width),
            (
                "metadata_value_literal_width",
                self.metadata_value_literal_width,
            ),
            ("process_identifier_width", self.process_identifier_width),
        ];
        for (name, width) in widths {
            if width == 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }

    // ── Convenience constructors at the configured widths ──────────

    pub fn metadata_key(&self, name: &[u8]) -> Result<MetadataKey, EngineError> {
        MetadataKey::padded(name, self.metadata_key_width)
    }

    pub fn literal(&self, value: &[u8]) -> Result<MetadataValue, EngineError> {
        MetadataValue::padded_literal(value, self.metadata_value_literal_width)
    }

    pub fn process_id(&self, name: &[u8]) -> Result<ProcessId, EngineError> {
        ProcessId::padded(name, self.process_identifier_width)
    }
}
