/// Golden canonical-hash test for restriction schema v1.
///
/// The digest below is permanent. If it changes, the canonical encoding
/// of process definitions has changed and every published digest is void.

use restriction_engine::hashing::{canonical_hash, canonical_serialize};
use restriction_engine::{
    BinaryOperator, EngineConfig, MetadataValue, ProcessDefinition, Restriction, RoleKey,
    TokenId, RESTRICTION_SCHEMA_VERSION,
};

const GOLDEN_HASH: &str = "3f5a6e4d8882a524d8db6e83d4d11c20cae7a54c9f2b08167764bbb6d26a4874";

fn golden_process() -> ProcessDefinition {
    let cfg = EngineConfig::default();
    ProcessDefinition::new(
        cfg.process_id(b"golden").unwrap(),
        1,
        vec![
            Restriction::SenderOwnsAllInputs,
            Restriction::FixedNumberOfInputs { num_inputs: 1 },
            Restriction::combine(
                BinaryOperator::Or,
                Restriction::OutputHasRole {
                    index: 0,
                    role_key: RoleKey::Buyer,
                },
                Restriction::FixedOutputMetadataValue {
                    index: 0,
                    metadata_key: cfg.metadata_key(b"type").unwrap(),
                    metadata_value: cfg.literal(b"part").unwrap(),
                },
            ),
            Restriction::FixedInputMetadataValue {
                index: 0,
                metadata_key: cfg.metadata_key(b"ref").unwrap(),
                metadata_value: MetadataValue::TokenReference(TokenId(42)),
            },
        ],
    )
}

#[test]
fn golden_hash_matches() {
    let hash = canonical_hash(&golden_process()).unwrap();
    assert_eq!(
        hash, GOLDEN_HASH,
        "GOLDEN TEST FAILED: canonical encoding of schema v1 has changed.\n\
         Got:      {}\n\
         Expected: {}",
        hash, GOLDEN_HASH
    );
}

#[test]
fn golden_encoding_shape() {
    let text = String::from_utf8(canonical_serialize(&golden_process()).unwrap()).unwrap();
    assert!(text.starts_with(
        r#"{"schema_version":1,"id":"676f6c64656e0000000000000000000000000000000000000000000000000000","version":1,"status":"enabled","#
    ));
    assert!(text.contains(r#"{"kind":"OutputHasRole","index":0,"role_key":"Buyer"}"#));
    assert!(text.ends_with(r#""metadata_value":{"type":"TokenReference","value":"42"}}]}"#));
}

#[test]
fn schema_version_is_one() {
    assert_eq!(RESTRICTION_SCHEMA_VERSION, 1);
}
