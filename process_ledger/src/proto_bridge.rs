//! Proto <-> engine conversion bridge.
//!
//! Encoding is total. Decoding is strict: a missing oneof, an unknown enum
//! value, a byte field of the wrong width or an unsupported schema version
//! is an error, never a default.

use prost::Message;

use restriction_engine::{
    BinaryOperator, ContentHash, EngineConfig, MetadataKey, MetadataValue, MetadataValueType,
    ProcessDefinition, ProcessId, ProcessStatus, Restriction, RoleKey, TokenId,
    RESTRICTION_SCHEMA_VERSION,
};

use crate::error::CodecError;
use crate::proto_types::*;

/// Protobuf bytes of a process definition.
pub fn encode_process(process: &ProcessDefinition) -> Vec<u8> {
    process_to_proto(process).encode_to_vec()
}

/// Decode and validate against the widths in `config`.
pub fn decode_process(bytes: &[u8], config: &EngineConfig) -> Result<ProcessDefinition, CodecError> {
    let proto =
        ProtoProcessDefinition::decode(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;
    proto_to_process(&proto, config)
}

// ── Engine -> Proto ────────────────────────────────────────────

pub fn process_to_proto(process: &ProcessDefinition) -> ProtoProcessDefinition {
    let status = match process.status {
        ProcessStatus::Enabled => ProtoProcessStatus::Enabled,
        ProcessStatus::Disabled => ProtoProcessStatus::Disabled,
    };
    ProtoProcessDefinition {
        schema_version: RESTRICTION_SCHEMA_VERSION,
        id: process.id.as_bytes().to_vec(),
        version: process.version,
        status: status as i32,
        restrictions: process.restrictions.iter().map(restriction_to_proto).collect(),
    }
}

pub fn restriction_to_proto(restriction: &Restriction) -> ProtoRestriction {
    let kind = match restriction {
        Restriction::None => RestrictionKind::None(Empty {}),
        Restriction::SenderOwnsAllInputs => RestrictionKind::SenderOwnsAllInputs(Empty {}),
        Restriction::SenderHasInputRole { index, role_key } => {
            RestrictionKind::SenderHasInputRole(indexed_role(*index, role_key))
        }
        Restriction::SenderHasOutputRole { index, role_key } => {
            RestrictionKind::SenderHasOutputRole(indexed_role(*index, role_key))
        }
        Restriction::OutputHasRole { index, role_key } => {
            RestrictionKind::OutputHasRole(indexed_role(*index, role_key))
        }
        Restriction::MatchInputOutputRole {
            input_index,
            input_role_key,
            output_index,
            output_role_key,
        } => RestrictionKind::MatchInputOutputRole(MatchInputOutputRole {
            input_index: *input_index,
            input_role_key: role_to_proto(input_role_key) as i32,
            output_index: *output_index,
            output_role_key: role_to_proto(output_role_key) as i32,
        }),
        Restriction::MatchInputOutputMetadataValue {
            input_index,
            input_metadata_key,
            output_index,
            output_metadata_key,
        } => RestrictionKind::MatchInputOutputMetadataValue(MatchInputOutputMetadataValue {
            input_index: *input_index,
            input_metadata_key: input_metadata_key.as_bytes().to_vec(),
            output_index: *output_index,
            output_metadata_key: output_metadata_key.as_bytes().to_vec(),
        }),
        Restriction::FixedNumberOfInputs { num_inputs } => {
            RestrictionKind::FixedNumberOfInputs(*num_inputs)
        }
        Restriction::FixedNumberOfOutputs { num_outputs } => {
            RestrictionKind::FixedNumberOfOutputs(*num_outputs)
        }
        Restriction::FixedInputMetadataValue {
            index,
            metadata_key,
            metadata_value,
        } => RestrictionKind::FixedInputMetadataValue(fixed_value(*index, metadata_key, metadata_value)),
        Restriction::FixedOutputMetadataValue {
            index,
            metadata_key,
            metadata_value,
        } => RestrictionKind::FixedOutputMetadataValue(fixed_value(*index, metadata_key, metadata_value)),
        Restriction::FixedOutputMetadataValueType {
            index,
            metadata_key,
            metadata_value_type,
        } => RestrictionKind::FixedOutputMetadataValueType(FixedMetadataValueType {
            index: *index,
            metadata_key: metadata_key.as_bytes().to_vec(),
            metadata_value_type: value_type_to_proto(*metadata_value_type) as i32,
        }),
        Restriction::BooleanBinary {
            operator,
            restriction_a,
            restriction_b,
        } => RestrictionKind::BooleanBinary(BooleanBinary {
            operator: operator_to_proto(*operator) as i32,
            restriction_a: Some(Box::new(restriction_to_proto(restriction_a))),
            restriction_b: Some(Box::new(restriction_to_proto(restriction_b))),
        }),
    };
    ProtoRestriction { kind: Some(kind) }
}

fn indexed_role(index: u32, role_key: &RoleKey) -> IndexedRole {
    IndexedRole {
        index,
        role_key: role_to_proto(role_key) as i32,
    }
}

fn fixed_value(index: u32, key: &MetadataKey, value: &MetadataValue) -> FixedMetadataValue {
    FixedMetadataValue {
        index,
        metadata_key: key.as_bytes().to_vec(),
        metadata_value: Some(metadata_value_to_proto(value)),
    }
}

fn metadata_value_to_proto(value: &MetadataValue) -> ProtoMetadataValue {
    let kind = match value {
        MetadataValue::File(hash) => MetadataValueKind::File(hash.as_bytes().to_vec()),
        MetadataValue::Literal(bytes) => MetadataValueKind::Literal(bytes.as_bytes().to_vec()),
        MetadataValue::TokenReference(id) => {
            MetadataValueKind::TokenReference(id.0.to_be_bytes().to_vec())
        }
        MetadataValue::None => MetadataValueKind::None(Empty {}),
    };
    ProtoMetadataValue { kind: Some(kind) }
}

fn role_to_proto(role: &RoleKey) -> ProtoRoleKey {
    match role {
        RoleKey::Owner => ProtoRoleKey::Owner,
        RoleKey::Customer => ProtoRoleKey::Customer,
        RoleKey::AdditiveManufacturer => ProtoRoleKey::AdditiveManufacturer,
        RoleKey::Laboratory => ProtoRoleKey::Laboratory,
        RoleKey::Buyer => ProtoRoleKey::Buyer,
        RoleKey::Supplier => ProtoRoleKey::Supplier,
        RoleKey::Reviewer => ProtoRoleKey::Reviewer,
    }
}

fn operator_to_proto(operator: BinaryOperator) -> ProtoBinaryOperator {
    match operator {
        BinaryOperator::And => ProtoBinaryOperator::And,
        BinaryOperator::Or => ProtoBinaryOperator::Or,
        BinaryOperator::Xor => ProtoBinaryOperator::Xor,
        BinaryOperator::Nand => ProtoBinaryOperator::Nand,
        BinaryOperator::Nor => ProtoBinaryOperator::Nor,
    }
}

fn value_type_to_proto(value_type: MetadataValueType) -> ProtoMetadataValueType {
    match value_type {
        MetadataValueType::File => ProtoMetadataValueType::File,
        MetadataValueType::Literal => ProtoMetadataValueType::Literal,
        MetadataValueType::TokenReference => ProtoMetadataValueType::TokenReference,
        MetadataValueType::None => ProtoMetadataValueType::None,
    }
}

// ── Proto -> Engine ────────────────────────────────────────────

pub fn proto_to_process(
    proto: &ProtoProcessDefinition,
    config: &EngineConfig,
) -> Result<ProcessDefinition, CodecError> {
    if proto.schema_version != RESTRICTION_SCHEMA_VERSION {
        return Err(CodecError::UnsupportedSchema(proto.schema_version));
    }
    let id = ProcessId::new(proto.id.clone(), config.process_identifier_width)?;
    let status = match ProtoProcessStatus::try_from(proto.status) {
        Ok(ProtoProcessStatus::Enabled) => ProcessStatus::Enabled,
        Ok(ProtoProcessStatus::Disabled) => ProcessStatus::Disabled,
        Err(_) => return Err(unknown("status", proto.status)),
    };
    let restrictions = proto
        .restrictions
        .iter()
        .map(|r| proto_to_restriction(r, config, 0))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ProcessDefinition {
        id,
        version: proto.version,
        status,
        restrictions,
    })
}

pub fn proto_to_restriction(
    proto: &ProtoRestriction,
    config: &EngineConfig,
    depth: u8,
) -> Result<Restriction, CodecError> {
    if depth > config.max_restriction_depth {
        return Err(CodecError::TooDeep(config.max_restriction_depth));
    }
    let kind = proto
        .kind
        .as_ref()
        .ok_or(CodecError::MissingField("restriction.kind"))?;
    let restriction = match kind {
        RestrictionKind::None(_) => Restriction::None,
        RestrictionKind::SenderOwnsAllInputs(_) => Restriction::SenderOwnsAllInputs,
        RestrictionKind::SenderHasInputRole(r) => Restriction::SenderHasInputRole {
            index: r.index,
            role_key: proto_to_role(r.role_key)?,
        },
        RestrictionKind::SenderHasOutputRole(r) => Restriction::SenderHasOutputRole {
            index: r.index,
            role_key: proto_to_role(r.role_key)?,
        },
        RestrictionKind::OutputHasRole(r) => Restriction::OutputHasRole {
            index: r.index,
            role_key: proto_to_role(r.role_key)?,
        },
        RestrictionKind::MatchInputOutputRole(r) => Restriction::MatchInputOutputRole {
            input_index: r.input_index,
            input_role_key: proto_to_role(r.input_role_key)?,
            output_index: r.output_index,
            output_role_key: proto_to_role(r.output_role_key)?,
        },
        RestrictionKind::MatchInputOutputMetadataValue(r) => {
            Restriction::MatchInputOutputMetadataValue {
                input_index: r.input_index,
                input_metadata_key: proto_to_key(&r.input_metadata_key, config)?,
                output_index: r.output_index,
                output_metadata_key: proto_to_key(&r.output_metadata_key, config)?,
            }
        }
        RestrictionKind::FixedNumberOfInputs(n) => {
            Restriction::FixedNumberOfInputs { num_inputs: *n }
        }
        RestrictionKind::FixedNumberOfOutputs(n) => {
            Restriction::FixedNumberOfOutputs { num_outputs: *n }
        }
        RestrictionKind::FixedInputMetadataValue(r) => Restriction::FixedInputMetadataValue {
            index: r.index,
            metadata_key: proto_to_key(&r.metadata_key, config)?,
            metadata_value: proto_to_fixed_value(r, config)?,
        },
        RestrictionKind::FixedOutputMetadataValue(r) => Restriction::FixedOutputMetadataValue {
            index: r.index,
            metadata_key: proto_to_key(&r.metadata_key, config)?,
            metadata_value: proto_to_fixed_value(r, config)?,
        },
        RestrictionKind::FixedOutputMetadataValueType(r) => {
            Restriction::FixedOutputMetadataValueType {
                index: r.index,
                metadata_key: proto_to_key(&r.metadata_key, config)?,
                metadata_value_type: proto_to_value_type(r.metadata_value_type)?,
            }
        }
        RestrictionKind::BooleanBinary(b) => {
            let operator = proto_to_operator(b.operator)?;
            let a = b
                .restriction_a
                .as_deref()
                .ok_or(CodecError::MissingField("boolean_binary.restriction_a"))?;
            let c = b
                .restriction_b
                .as_deref()
                .ok_or(CodecError::MissingField("boolean_binary.restriction_b"))?;
            Restriction::combine(
                operator,
                proto_to_restriction(a, config, depth + 1)?,
                proto_to_restriction(c, config, depth + 1)?,
            )
        }
    };
    Ok(restriction)
}

fn proto_to_key(bytes: &[u8], config: &EngineConfig) -> Result<MetadataKey, CodecError> {
    Ok(MetadataKey::new(bytes.to_vec(), config.metadata_key_width)?)
}

fn proto_to_fixed_value(
    proto: &FixedMetadataValue,
    config: &EngineConfig,
) -> Result<MetadataValue, CodecError> {
    let value = proto
        .metadata_value
        .as_ref()
        .ok_or(CodecError::MissingField("metadata_value"))?;
    proto_to_metadata_value(value, config)
}

pub fn proto_to_metadata_value(
    proto: &ProtoMetadataValue,
    config: &EngineConfig,
) -> Result<MetadataValue, CodecError> {
    let kind = proto
        .kind
        .as_ref()
        .ok_or(CodecError::MissingField("metadata_value.kind"))?;
    match kind {
        MetadataValueKind::File(bytes) => {
            let hash: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| CodecError::InvalidFileHash(bytes.len()))?;
            Ok(MetadataValue::File(ContentHash(hash)))
        }
        MetadataValueKind::Literal(bytes) => Ok(MetadataValue::literal(
            bytes.clone(),
            config.metadata_value_literal_width,
        )?),
        MetadataValueKind::TokenReference(bytes) => {
            let raw: [u8; 16] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| CodecError::InvalidTokenReference(bytes.len()))?;
            Ok(MetadataValue::TokenReference(TokenId(u128::from_be_bytes(raw))))
        }
        MetadataValueKind::None(_) => Ok(MetadataValue::None),
    }
}

fn unknown(field: &'static str, value: i32) -> CodecError {
    CodecError::UnknownEnumValue { field, value }
}

fn proto_to_role(value: i32) -> Result<RoleKey, CodecError> {
    let role = match ProtoRoleKey::try_from(value).map_err(|_| unknown("role_key", value))? {
        ProtoRoleKey::Owner => RoleKey::Owner,
        ProtoRoleKey::Customer => RoleKey::Customer,
        ProtoRoleKey::AdditiveManufacturer => RoleKey::AdditiveManufacturer,
        ProtoRoleKey::Laboratory => RoleKey::Laboratory,
        ProtoRoleKey::Buyer => RoleKey::Buyer,
        ProtoRoleKey::Supplier => RoleKey::Supplier,
        ProtoRoleKey::Reviewer => RoleKey::Reviewer,
    };
    Ok(role)
}

fn proto_to_operator(value: i32) -> Result<BinaryOperator, CodecError> {
    let operator =
        match ProtoBinaryOperator::try_from(value).map_err(|_| unknown("operator", value))? {
            ProtoBinaryOperator::And => BinaryOperator::And,
            ProtoBinaryOperator::Or => BinaryOperator::Or,
            ProtoBinaryOperator::Xor => BinaryOperator::Xor,
            ProtoBinaryOperator::Nand => BinaryOperator::Nand,
            ProtoBinaryOperator::Nor => BinaryOperator::Nor,
        };
    Ok(operator)
}

fn proto_to_value_type(value: i32) -> Result<MetadataValueType, CodecError> {
    let value_type = match ProtoMetadataValueType::try_from(value)
        .map_err(|_| unknown("metadata_value_type", value))?
    {
        ProtoMetadataValueType::File => MetadataValueType::File,
        ProtoMetadataValueType::Literal => MetadataValueType::Literal,
        ProtoMetadataValueType::TokenReference => MetadataValueType::TokenReference,
        ProtoMetadataValueType::None => MetadataValueType::None,
    };
    Ok(value_type)
}
