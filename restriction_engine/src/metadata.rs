//! Token metadata: fixed-width keys and tagged values.
//!
//! Equality is structural and variant-sensitive. A `Literal` never equals
//! a `TokenReference`, whatever bytes the literal holds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::TokenId;
use crate::error::{EngineError, WidthField};
use crate::fixed::FixedBytes;

/// Key under which a metadata value is stored on a token or output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataKey(FixedBytes);

impl MetadataKey {
    pub fn new(bytes: impl Into<Vec<u8>>, width: usize) -> Result<Self, EngineError> {
        FixedBytes::new(bytes, width, WidthField::MetadataKey).map(Self)
    }

    /// Build a key from a short name, zero-padded to `width`.
    pub fn padded(name: &[u8], width: usize) -> Result<Self, EngineError> {
        FixedBytes::right_padded(name, width, WidthField::MetadataKey).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn ensure_width(&self, width: usize) -> Result<(), EngineError> {
        self.0.ensure_width(width, WidthField::MetadataKey)
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Content hash of an off-ledger file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetadataValue {
    File(ContentHash),
    Literal(FixedBytes),
    TokenReference(TokenId),
    #[default]
    None,
}

impl MetadataValue {
    /// A literal of exactly `width` bytes.
    pub fn literal(bytes: impl Into<Vec<u8>>, width: usize) -> Result<Self, EngineError> {
        FixedBytes::new(bytes, width, WidthField::MetadataLiteral).map(MetadataValue::Literal)
    }

    /// A literal built from a short value, zero-padded to `width`.
    pub fn padded_literal(bytes: &[u8], width: usize) -> Result<Self, EngineError> {
        FixedBytes::right_padded(bytes, width, WidthField::MetadataLiteral)
            .map(MetadataValue::Literal)
    }

    pub fn value_type(&self) -> MetadataValueType {
        MetadataValueType::from(self)
    }

    /// Only literals carry a configurable width; other variants always pass.
    pub fn ensure_width(&self, literal_width: usize) -> Result<(), EngineError> {
        match self {
            MetadataValue::Literal(bytes) => {
                bytes.ensure_width(literal_width, WidthField::MetadataLiteral)
            }
            _ => Ok(()),
        }
    }
}

/// Variant tag of a `MetadataValue`, ignoring its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum MetadataValueType {
    File,
    Literal,
    TokenReference,
    #[default]
    None,
}

impl From<&MetadataValue> for MetadataValueType {
    fn from(value: &MetadataValue) -> Self {
        match value {
            MetadataValue::File(_) => MetadataValueType::File,
            MetadataValue::Literal(_) => MetadataValueType::Literal,
            MetadataValue::TokenReference(_) => MetadataValueType::TokenReference,
            MetadataValue::None => MetadataValueType::None,
        }
    }
}

/// Metadata attached to a token or proposed output.
pub type Metadata = BTreeMap<MetadataKey, MetadataValue>;

/// Check every key and literal in `metadata` against the configured widths.
pub fn ensure_metadata_widths(
    metadata: &Metadata,
    key_width: usize,
    literal_width: usize,
) -> Result<(), EngineError> {
    for (key, value) in metadata {
        key.ensure_width(key_width)?;
        value.ensure_width(literal_width)?;
    }
    Ok(())
}
