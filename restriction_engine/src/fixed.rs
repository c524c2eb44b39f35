//! Fixed-width byte strings.
//!
//! Metadata keys, literal metadata values and process identifiers are all
//! fixed-width. The width is supplied by `EngineConfig`; values of any
//! other length are rejected, never truncated or padded implicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, WidthField};

/// Serialized as a lowercase hex string so it can key a JSON map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FixedBytes(Vec<u8>);

impl FixedBytes {
    /// Accept `bytes` only if it is exactly `width` long.
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        width: usize,
        field: WidthField,
    ) -> Result<Self, EngineError> {
        let bytes = bytes.into();
        check_width(bytes.len(), width, field)?;
        Ok(Self(bytes))
    }

    /// Zero-fill `bytes` on the right up to `width`. Longer input is an
    /// error.
    pub fn right_padded(
        bytes: &[u8],
        width: usize,
        field: WidthField,
    ) -> Result<Self, EngineError> {
        if bytes.len() > width {
            return Err(EngineError::InvalidLength {
                field,
                expected: width,
                actual: bytes.len(),
            });
        }
        let mut buf = vec![0u8; width];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Re-check the width of an already-built value, e.g. one that came
    /// through deserialization.
    pub fn ensure_width(&self, width: usize, field: WidthField) -> Result<(), EngineError> {
        check_width(self.0.len(), width, field)
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<FixedBytes> for String {
    fn from(value: FixedBytes) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for FixedBytes {
    type Error = String;

    /// Width is not known here; callers re-check with `ensure_width`.
    fn try_from(hex: String) -> Result<Self, Self::Error> {
        hex::decode(&hex).map(FixedBytes).map_err(|e| e.to_string())
    }
}

impl fmt::Display for FixedBytes {
    /// Printable ASCII with trailing zero padding stripped, hex otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .0
            .iter()
            .rposition(|b| *b != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        let trimmed = &self.0[..end];
        if !trimmed.is_empty() && trimmed.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            f.write_str(&String::from_utf8_lossy(trimmed))
        } else {
            write!(f, "0x{}", self.to_hex())
        }
    }
}

pub fn check_width(actual: usize, expected: usize, field: WidthField) -> Result<(), EngineError> {
    if actual != expected {
        return Err(EngineError::InvalidLength {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_width_is_accepted() {
        let b = FixedBytes::new(vec![7u8; 32], 32, WidthField::MetadataKey).unwrap();
        assert_eq!(b.len(), 32);
    }

    #[test]
    fn wrong_width_is_rejected() {
        let err = FixedBytes::new(vec![7u8; 31], 32, WidthField::MetadataLiteral).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidLength {
                field: WidthField::MetadataLiteral,
                expected: 32,
                actual: 31,
            }
        );
    }

    #[test]
    fn right_padding_fills_with_zeros() {
        let b = FixedBytes::right_padded(b"type", 8, WidthField::MetadataKey).unwrap();
        assert_eq!(b.as_bytes(), b"type\0\0\0\0");
        assert_eq!(b.to_string(), "type");
    }

    #[test]
    fn right_padding_never_truncates() {
        let err = FixedBytes::right_padded(b"much-too-long", 4, WidthField::ProcessIdentifier);
        assert!(matches!(
            err,
            Err(EngineError::InvalidLength { expected: 4, actual: 13, .. })
        ));
    }

    #[test]
    fn non_printable_displays_as_hex() {
        let b = FixedBytes::new(vec![0x01, 0xff], 2, WidthField::MetadataLiteral).unwrap();
        assert_eq!(b.to_string(), "0x01ff");
    }

    #[test]
    fn serializes_as_hex_string() {
        let b = FixedBytes::right_padded(b"ab", 4, WidthField::MetadataKey).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, r#""61620000""#);
        let back: FixedBytes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
        assert!(serde_json::from_str::<FixedBytes>(r#""6g""#).is_err());
        assert!(serde_json::from_str::<FixedBytes>(r#""+f""#).is_err());
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(FixedBytes::try_from("abc".to_string()).is_err());
        assert!(FixedBytes::try_from("zz".to_string()).is_err());
        assert!(FixedBytes::try_from("\u{e9}\u{e9}".to_string()).is_err());
        assert_eq!(
            FixedBytes::try_from("00ff".to_string()).unwrap().as_bytes(),
            &[0x00, 0xff]
        );
    }
}
