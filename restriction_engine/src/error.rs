//! Error taxonomy for the restriction engine.
//!
//! A denied transaction is not an error: it is returned as
//! `Verdict::Denied`. Everything here is either a malformed process
//! definition, a malformed record, or a failed precondition.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::TokenId;
use crate::process::ProcessId;

/// Which side of a transaction an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoSide {
    Input,
    Output,
}

impl fmt::Display for IoSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoSide::Input => f.write_str("input"),
            IoSide::Output => f.write_str("output"),
        }
    }
}

/// Fixed-width fields whose length is governed by `EngineConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidthField {
    MetadataKey,
    MetadataLiteral,
    ProcessIdentifier,
}

impl fmt::Display for WidthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidthField::MetadataKey => f.write_str("metadata key"),
            WidthField::MetadataLiteral => f.write_str("metadata literal"),
            WidthField::ProcessIdentifier => f.write_str("process identifier"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{side} index {index} is out of range for {len} {side}s")]
    IndexError { side: IoSide, index: u32, len: usize },

    #[error("{field} must be {expected} bytes, got {actual}")]
    InvalidLength {
        field: WidthField,
        expected: usize,
        actual: usize,
    },

    #[error("restriction tree depth {depth} exceeds the maximum of {max}")]
    RestrictionTooDeep { depth: usize, max: u8 },

    #[error("restriction {restriction_index} is malformed: {source}")]
    MalformedRestriction {
        restriction_index: usize,
        #[source]
        source: Box<EngineError>,
    },

    #[error("process {id} version {version} is disabled")]
    ProcessDisabled { id: ProcessId, version: u32 },

    #[error("output {output_index} names parent input {parent_index}, but only {input_count} inputs were supplied")]
    InvalidParentIndex {
        output_index: usize,
        parent_index: u32,
        input_count: usize,
    },

    #[error("input {parent_index} is carried forward by both output {first_output} and output {second_output}")]
    ParentReused {
        parent_index: u32,
        first_output: usize,
        second_output: usize,
    },

    #[error("token {0} appears more than once in the inputs")]
    DuplicateInput(TokenId),

    #[error("token {0} has already been consumed")]
    InputAlreadyConsumed(TokenId),

    #[error("token {id} is inconsistent: {reason}")]
    InvalidToken { id: TokenId, reason: &'static str },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    /// Attach the position of the top-level restriction that raised a
    /// structural error.
    pub fn malformed(restriction_index: usize, source: EngineError) -> Self {
        EngineError::MalformedRestriction {
            restriction_index,
            source: Box::new(source),
        }
    }

    /// True for errors caused by a broken process definition rather than
    /// by the transaction or its records.
    pub fn is_malformation(&self) -> bool {
        matches!(self, EngineError::MalformedRestriction { .. })
    }

    /// True for precondition failures: a disabled process or invalid
    /// lineage in the proposed transaction.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            EngineError::ProcessDisabled { .. }
                | EngineError::InvalidParentIndex { .. }
                | EngineError::ParentReused { .. }
                | EngineError::DuplicateInput(_)
                | EngineError::InputAlreadyConsumed(_)
        )
    }
}
