//! Process definitions.
//!
//! A process is addressed by `(id, version)`. Versions never change once
//! created; the only transition is Enabled -> Disabled.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, WidthField};
use crate::fixed::FixedBytes;
use crate::restriction::Restriction;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(FixedBytes);

impl ProcessId {
    pub fn new(bytes: impl Into<Vec<u8>>, width: usize) -> Result<Self, EngineError> {
        FixedBytes::new(bytes, width, WidthField::ProcessIdentifier).map(Self)
    }

    /// Build an identifier from a short name, zero-padded to `width`.
    pub fn padded(name: &[u8], width: usize) -> Result<Self, EngineError> {
        FixedBytes::right_padded(name, width, WidthField::ProcessIdentifier).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn ensure_width(&self, width: usize) -> Result<(), EngineError> {
        self.0.ensure_width(width, WidthField::ProcessIdentifier)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub type ProcessVersion = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProcessStatus {
    #[default]
    Disabled,
    Enabled,
}

/// `(id, version)` address of a process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessFullyQualifiedId {
    pub id: ProcessId,
    pub version: ProcessVersion,
}

impl fmt::Display for ProcessFullyQualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.id, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessDefinition {
    pub id: ProcessId,
    pub version: ProcessVersion,
    pub status: ProcessStatus,
    pub restrictions: Vec<Restriction>,
}

impl ProcessDefinition {
    /// A new, enabled process version.
    pub fn new(id: ProcessId, version: ProcessVersion, restrictions: Vec<Restriction>) -> Self {
        Self {
            id,
            version,
            status: ProcessStatus::Enabled,
            restrictions,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == ProcessStatus::Enabled
    }

    /// The same version with its status set to `Disabled`.
    pub fn disabled(self) -> Self {
        Self {
            status: ProcessStatus::Disabled,
            ..self
        }
    }

    pub fn qualified_id(&self) -> ProcessFullyQualifiedId {
        ProcessFullyQualifiedId {
            id: self.id.clone(),
            version: self.version,
        }
    }

    /// Deepest restriction tree in the definition, 0 if there are none.
    pub fn max_depth(&self) -> usize {
        self.restrictions
            .iter()
            .map(Restriction::depth)
            .max()
            .unwrap_or(0)
    }
}
