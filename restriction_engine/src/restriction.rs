//! Restriction catalogue.
//!
//! A closed sum type: every process definition is statically auditable and
//! the evaluator's match is exhaustive. New kinds are a schema change
//! (`RESTRICTION_SCHEMA_VERSION`), never a runtime extension point.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::RoleKey;
use crate::metadata::{MetadataKey, MetadataValue, MetadataValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    And,
    Or,
    Xor,
    Nand,
    Nor,
}

impl BinaryOperator {
    pub fn eval(&self, a: bool, b: bool) -> bool {
        match self {
            BinaryOperator::And => a & b,
            BinaryOperator::Or => a | b,
            BinaryOperator::Xor => a ^ b,
            BinaryOperator::Nand => !(a & b),
            BinaryOperator::Nor => !(a | b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Restriction {
    #[default]
    None,
    SenderOwnsAllInputs,
    SenderHasInputRole {
        index: u32,
        role_key: RoleKey,
    },
    SenderHasOutputRole {
        index: u32,
        role_key: RoleKey,
    },
    OutputHasRole {
        index: u32,
        role_key: RoleKey,
    },
    MatchInputOutputRole {
        input_index: u32,
        input_role_key: RoleKey,
        output_index: u32,
        output_role_key: RoleKey,
    },
    MatchInputOutputMetadataValue {
        input_index: u32,
        input_metadata_key: MetadataKey,
        output_index: u32,
        output_metadata_key: MetadataKey,
    },
    FixedNumberOfInputs {
        num_inputs: u32,
    },
    FixedNumberOfOutputs {
        num_outputs: u32,
    },
    FixedInputMetadataValue {
        index: u32,
        metadata_key: MetadataKey,
        metadata_value: MetadataValue,
    },
    FixedOutputMetadataValue {
        index: u32,
        metadata_key: MetadataKey,
        metadata_value: MetadataValue,
    },
    FixedOutputMetadataValueType {
        index: u32,
        metadata_key: MetadataKey,
        metadata_value_type: MetadataValueType,
    },
    BooleanBinary {
        operator: BinaryOperator,
        restriction_a: Box<Restriction>,
        restriction_b: Box<Restriction>,
    },
}

impl Restriction {
    /// Compose two restrictions under `operator`.
    pub fn combine(operator: BinaryOperator, a: Restriction, b: Restriction) -> Self {
        Restriction::BooleanBinary {
            operator,
            restriction_a: Box::new(a),
            restriction_b: Box::new(b),
        }
    }

    pub fn kind(&self) -> RestrictionKind {
        match self {
            Restriction::None => RestrictionKind::None,
            Restriction::SenderOwnsAllInputs => RestrictionKind::SenderOwnsAllInputs,
            Restriction::SenderHasInputRole { .. } => RestrictionKind::SenderHasInputRole,
            Restriction::SenderHasOutputRole { .. } => RestrictionKind::SenderHasOutputRole,
            Restriction::OutputHasRole { .. } => RestrictionKind::OutputHasRole,
            Restriction::MatchInputOutputRole { .. } => RestrictionKind::MatchInputOutputRole,
            Restriction::MatchInputOutputMetadataValue { .. } => {
                RestrictionKind::MatchInputOutputMetadataValue
            }
            Restriction::FixedNumberOfInputs { .. } => RestrictionKind::FixedNumberOfInputs,
            Restriction::FixedNumberOfOutputs { .. } => RestrictionKind::FixedNumberOfOutputs,
            Restriction::FixedInputMetadataValue { .. } => RestrictionKind::FixedInputMetadataValue,
            Restriction::FixedOutputMetadataValue { .. } => {
                RestrictionKind::FixedOutputMetadataValue
            }
            Restriction::FixedOutputMetadataValueType { .. } => {
                RestrictionKind::FixedOutputMetadataValueType
            }
            Restriction::BooleanBinary { .. } => RestrictionKind::BooleanBinary,
        }
    }

    /// Nesting depth: 0 for a leaf, one more than the deeper branch for a
    /// `BooleanBinary`.
    pub fn depth(&self) -> usize {
        match self {
            Restriction::BooleanBinary {
                restriction_a,
                restriction_b,
                ..
            } => 1 + restriction_a.depth().max(restriction_b.depth()),
            _ => 0,
        }
    }
}

/// Variant tag of a `Restriction`, reported in denials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionKind {
    None,
    SenderOwnsAllInputs,
    SenderHasInputRole,
    SenderHasOutputRole,
    OutputHasRole,
    MatchInputOutputRole,
    MatchInputOutputMetadataValue,
    FixedNumberOfInputs,
    FixedNumberOfOutputs,
    FixedInputMetadataValue,
    FixedOutputMetadataValue,
    FixedOutputMetadataValueType,
    BooleanBinary,
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
