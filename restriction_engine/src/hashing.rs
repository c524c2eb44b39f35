//! Canonical hashing of process definitions.
//!
//! Deterministic serialization + SHA-256, so independent nodes can agree
//! that they hold the same definition before evaluating against it.
//!
//! Rules:
//!   - `schema_version` is the first field
//!   - fixed-width byte fields are lowercase hex
//!   - restriction fields in declaration order, the variant under `"kind"`
//!   - restriction order is preserved (it is semantically significant)
//!   - UTF-8 JSON, no whitespace

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::EngineError;
use crate::metadata::{MetadataKey, MetadataValue};
use crate::process::{ProcessDefinition, ProcessStatus};
use crate::restriction::Restriction;
use crate::RESTRICTION_SCHEMA_VERSION;

/// Canonical UTF-8 JSON bytes of a process definition.
pub fn canonical_serialize(process: &ProcessDefinition) -> Result<Vec<u8>, EngineError> {
    let value = build_canonical_value(process);
    serde_json::to_vec(&value).map_err(|e| EngineError::Serialization(e.to_string()))
}

/// SHA-256 of `canonical_serialize`, lowercase hex.
pub fn canonical_hash(process: &ProcessDefinition) -> Result<String, EngineError> {
    let bytes = canonical_serialize(process)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn build_canonical_value(process: &ProcessDefinition) -> Value {
    let mut root = Map::new();
    root.insert(
        "schema_version".to_string(),
        Value::Number(RESTRICTION_SCHEMA_VERSION.into()),
    );
    root.insert("id".to_string(), Value::String(hex::encode(process.id.as_bytes())));
    root.insert("version".to_string(), Value::Number(process.version.into()));
    let status = match process.status {
        ProcessStatus::Enabled => "enabled",
        ProcessStatus::Disabled => "disabled",
    };
    root.insert("status".to_string(), Value::String(status.to_string()));
    root.insert(
        "restrictions".to_string(),
        Value::Array(process.restrictions.iter().map(restriction_value).collect()),
    );
    Value::Object(root)
}

fn restriction_value(restriction: &Restriction) -> Value {
    let mut map = Map::new();
    map.insert(
        "kind".to_string(),
        Value::String(restriction.kind().to_string()),
    );
    match restriction {
        Restriction::None | Restriction::SenderOwnsAllInputs => {}
        Restriction::SenderHasInputRole { index, role_key }
        | Restriction::SenderHasOutputRole { index, role_key }
        | Restriction::OutputHasRole { index, role_key } => {
            map.insert("index".to_string(), Value::Number((*index).into()));
            map.insert("role_key".to_string(), Value::String(format!("{:?}", role_key)));
        }
        Restriction::MatchInputOutputRole {
            input_index,
            input_role_key,
            output_index,
            output_role_key,
        } => {
            map.insert("input_index".to_string(), Value::Number((*input_index).into()));
            map.insert(
                "input_role_key".to_string(),
                Value::String(format!("{:?}", input_role_key)),
            );
            map.insert("output_index".to_string(), Value::Number((*output_index).into()));
            map.insert(
                "output_role_key".to_string(),
                Value::String(format!("{:?}", output_role_key)),
            );
        }
        Restriction::MatchInputOutputMetadataValue {
            input_index,
            input_metadata_key,
            output_index,
            output_metadata_key,
        } => {
            map.insert("input_index".to_string(), Value::Number((*input_index).into()));
            map.insert("input_metadata_key".to_string(), key_value(input_metadata_key));
            map.insert("output_index".to_string(), Value::Number((*output_index).into()));
            map.insert("output_metadata_key".to_string(), key_value(output_metadata_key));
        }
        Restriction::FixedNumberOfInputs { num_inputs } => {
            map.insert("num_inputs".to_string(), Value::Number((*num_inputs).into()));
        }
        Restriction::FixedNumberOfOutputs { num_outputs } => {
            map.insert("num_outputs".to_string(), Value::Number((*num_outputs).into()));
        }
        Restriction::FixedInputMetadataValue {
            index,
            metadata_key,
            metadata_value,
        }
        | Restriction::FixedOutputMetadataValue {
            index,
            metadata_key,
            metadata_value,
        } => {
            map.insert("index".to_string(), Value::Number((*index).into()));
            map.insert("metadata_key".to_string(), key_value(metadata_key));
            map.insert("metadata_value".to_string(), metadata_value_value(metadata_value));
        }
        Restriction::FixedOutputMetadataValueType {
            index,
            metadata_key,
            metadata_value_type,
        } => {
            map.insert("index".to_string(), Value::Number((*index).into()));
            map.insert("metadata_key".to_string(), key_value(metadata_key));
            map.insert(
                "metadata_value_type".to_string(),
                Value::String(format!("{:?}", metadata_value_type)),
            );
        }
        Restriction::BooleanBinary {
            operator,
            restriction_a,
            restriction_b,
        } => {
            map.insert("operator".to_string(), Value::String(format!("{:?}", operator)));
            map.insert("restriction_a".to_string(), restriction_value(restriction_a));
            map.insert("restriction_b".to_string(), restriction_value(restriction_b));
        }
    }
    Value::Object(map)
}

fn key_value(key: &MetadataKey) -> Value {
    Value::String(hex::encode(key.as_bytes()))
}

fn metadata_value_value(value: &MetadataValue) -> Value {
    let mut map = Map::new();
    map.insert(
        "type".to_string(),
        Value::String(format!("{:?}", value.value_type())),
    );
    match value {
        MetadataValue::File(hash) => {
            map.insert("value".to_string(), Value::String(hex::encode(hash.as_bytes())));
        }
        MetadataValue::Literal(bytes) => {
            map.insert("value".to_string(), Value::String(bytes.to_hex()));
        }
        // Decimal string: u128 does not fit a JSON number portably.
        MetadataValue::TokenReference(id) => {
            map.insert("value".to_string(), Value::String(id.0.to_string()));
        }
        MetadataValue::None => {}
    }
    Value::Object(map)
}
