//! Ledger configuration: engine widths plus the bounds the ledger enforces
//! on every submitted transaction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use restriction_engine::{BlockNumber, EngineConfig};

use crate::error::LedgerError;

/// Seven days of six-second blocks.
pub const DEFAULT_TOMBSTONE_DURATION: BlockNumber = 7 * 24 * 60 * 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LedgerConfig {
    pub engine: EngineConfig,
    pub max_process_restrictions: usize,
    pub max_inputs: usize,
    pub max_outputs: usize,
    pub max_roles: usize,
    pub max_metadata: usize,
    /// Blocks a burnt token is kept before it may be deleted.
    pub tombstone_duration: BlockNumber,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            max_process_restrictions: 100,
            max_inputs: 64,
            max_outputs: 64,
            max_roles: 16,
            max_metadata: 64,
            tombstone_duration: DEFAULT_TOMBSTONE_DURATION,
        }
    }
}

impl LedgerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LedgerError> {
        let config: LedgerConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, LedgerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        self.engine.validate()?;
        if self.max_roles == 0 {
            // every output needs at least an owner
            return Err(LedgerError::InvalidConfig(
                "max_roles must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
