//! End-to-end evaluation scenarios for restriction_engine.

use std::fs;
use std::path::PathBuf;

use restriction_engine::hashing::canonical_hash;
use restriction_engine::{
    evaluate, BinaryOperator, ContentHash, EngineConfig, EngineError, EvaluateRequest, Identity,
    IoSide, MetadataValue, ProcessDefinition, ProcessIO, Restriction, RestrictionEvaluator,
    RestrictionKind, RoleKey, Token, TokenId, TransactionContext, Verdict, Violation,
};

fn cfg() -> EngineConfig {
    EngineConfig::default()
}

fn process(restrictions: Vec<Restriction>) -> ProcessDefinition {
    ProcessDefinition::new(cfg().process_id(b"scenario").unwrap(), 1, restrictions)
}

fn sender() -> Identity {
    Identity::new("5GrwvaEF-sender")
}

fn input(id: u128) -> Token {
    Token::minted(TokenId(id), sender(), 10).with_role(RoleKey::Owner, sender())
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("restriction_engine_tests")
        .join(name);
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

// ─────────────────────────────────────────────────────────────
// Scenario A: zero inputs, one output against count restrictions
// ─────────────────────────────────────────────────────────────

#[test]
fn scenario_a_counts_admit() {
    let p = process(vec![
        Restriction::FixedNumberOfInputs { num_inputs: 0 },
        Restriction::FixedNumberOfOutputs { num_outputs: 1 },
    ]);
    let ctx = TransactionContext::new(sender(), vec![], vec![ProcessIO::new()]);
    assert_eq!(evaluate(&p, &ctx), Ok(Verdict::Admit));
}

// ─────────────────────────────────────────────────────────────
// Scenario B: same process, one input, denied at index 0
// ─────────────────────────────────────────────────────────────

#[test]
fn scenario_b_extra_input_denied() {
    let p = process(vec![
        Restriction::FixedNumberOfInputs { num_inputs: 0 },
        Restriction::FixedNumberOfOutputs { num_outputs: 1 },
    ]);
    let ctx = TransactionContext::new(sender(), vec![input(1)], vec![ProcessIO::new()]);
    assert_eq!(
        evaluate(&p, &ctx),
        Ok(Verdict::Denied(Violation {
            restriction_index: 0,
            kind: RestrictionKind::FixedNumberOfInputs,
        }))
    );
}

// ─────────────────────────────────────────────────────────────
// Scenario C: out-of-range input index is an error, not a denial
// ─────────────────────────────────────────────────────────────

#[test]
fn scenario_c_bad_index_is_error() {
    let p = process(vec![Restriction::SenderHasInputRole {
        index: 5,
        role_key: RoleKey::Owner,
    }]);
    let ctx = TransactionContext::new(sender(), vec![input(1), input(2)], vec![]);
    let err = evaluate(&p, &ctx).unwrap_err();
    match err {
        EngineError::MalformedRestriction {
            restriction_index,
            source,
        } => {
            assert_eq!(restriction_index, 0);
            assert_eq!(
                *source,
                EngineError::IndexError {
                    side: IoSide::Input,
                    index: 5,
                    len: 2,
                }
            );
        }
        other => panic!("Expected MalformedRestriction, got: {:?}", other),
    }
}

// ─────────────────────────────────────────────────────────────
// Scenario D: disabled process fails regardless of restrictions
// ─────────────────────────────────────────────────────────────

#[test]
fn scenario_d_disabled_process() {
    let ctx = TransactionContext::new(sender(), vec![], vec![]);
    for restrictions in [
        vec![],
        vec![Restriction::None],
        vec![Restriction::SenderHasInputRole {
            index: 9,
            role_key: RoleKey::Owner,
        }],
    ] {
        let p = process(restrictions).disabled();
        assert!(matches!(
            evaluate(&p, &ctx),
            Err(EngineError::ProcessDisabled { .. })
        ));
    }
}

// ─────────────────────────────────────────────────────────────
// Scenario E: missing role on a matched input is a denial
// ─────────────────────────────────────────────────────────────

#[test]
fn scenario_e_missing_role_denies() {
    let p = process(vec![Restriction::MatchInputOutputRole {
        input_index: 0,
        input_role_key: RoleKey::Laboratory,
        output_index: 0,
        output_role_key: RoleKey::Laboratory,
    }]);
    let output = ProcessIO::new().with_role(RoleKey::Laboratory, Identity::new("lab"));
    let ctx = TransactionContext::new(sender(), vec![input(1)], vec![output]);
    let verdict = evaluate(&p, &ctx).unwrap();
    assert_eq!(
        verdict.violation().map(|v| v.kind),
        Some(RestrictionKind::MatchInputOutputRole)
    );
}

// ─────────────────────────────────────────────────────────────
// Composite behaviour
// ─────────────────────────────────────────────────────────────

#[test]
fn and_of_none_always_admits() {
    let p = process(vec![Restriction::combine(
        BinaryOperator::And,
        Restriction::None,
        Restriction::None,
    )]);
    let ctx = TransactionContext::new(sender(), vec![input(1)], vec![ProcessIO::new()]);
    assert_eq!(evaluate(&p, &ctx), Ok(Verdict::Admit));
}

#[test]
fn xor_of_identical_branches_never_admits() {
    let ctx = TransactionContext::new(sender(), vec![input(1)], vec![ProcessIO::new()]);
    for r in [
        Restriction::None,
        Restriction::SenderOwnsAllInputs,
        Restriction::FixedNumberOfInputs { num_inputs: 2 },
    ] {
        let p = process(vec![Restriction::combine(BinaryOperator::Xor, r.clone(), r)]);
        assert!(!evaluate(&p, &ctx).unwrap().is_admit());
    }
}

#[test]
fn malformed_branch_surfaces_under_decided_operator() {
    // NOR with a true left branch is already false, the right branch is
    // still walked and its bad output index reported.
    let p = process(vec![Restriction::combine(
        BinaryOperator::Nor,
        Restriction::None,
        Restriction::OutputHasRole {
            index: 4,
            role_key: RoleKey::Owner,
        },
    )]);
    let ctx = TransactionContext::new(sender(), vec![], vec![ProcessIO::new()]);
    let err = evaluate(&p, &ctx).unwrap_err();
    assert!(err.is_malformation());
}

#[test]
fn literal_never_equals_token_reference() {
    let id: u128 = 42;
    let mut encoded = vec![0u8; 16];
    encoded.extend_from_slice(&id.to_be_bytes());
    let key = cfg().metadata_key(b"subject").unwrap();
    let p = process(vec![Restriction::FixedInputMetadataValue {
        index: 0,
        metadata_key: key.clone(),
        metadata_value: MetadataValue::literal(encoded, 32).unwrap(),
    }]);
    let token = input(1).with_metadata(key, MetadataValue::TokenReference(TokenId(id)));
    let ctx = TransactionContext::new(sender(), vec![token], vec![]);
    assert!(!evaluate(&p, &ctx).unwrap().is_admit());
}

// ─────────────────────────────────────────────────────────────
// Determinism and hashing
// ─────────────────────────────────────────────────────────────

#[test]
fn evaluation_is_deterministic() {
    let key = cfg().metadata_key(b"grade").unwrap();
    let p = process(vec![
        Restriction::SenderOwnsAllInputs,
        Restriction::combine(
            BinaryOperator::Or,
            Restriction::FixedOutputMetadataValue {
                index: 0,
                metadata_key: key.clone(),
                metadata_value: cfg().literal(b"A").unwrap(),
            },
            Restriction::OutputHasRole {
                index: 0,
                role_key: RoleKey::Reviewer,
            },
        ),
    ]);
    let output = ProcessIO::new().with_metadata(key, cfg().literal(b"B").unwrap());
    let ctx = TransactionContext::new(sender(), vec![input(1)], vec![output]);
    let first = evaluate(&p, &ctx);
    for _ in 0..10 {
        assert_eq!(evaluate(&p, &ctx), first);
    }
    assert_eq!(canonical_hash(&p).unwrap(), canonical_hash(&p.clone()).unwrap());
}

#[test]
fn request_round_trips_through_json() {
    let p = process(vec![
        Restriction::SenderOwnsAllInputs,
        Restriction::FixedOutputMetadataValueType {
            index: 0,
            metadata_key: cfg().metadata_key(b"report").unwrap(),
            metadata_value_type: restriction_engine::MetadataValueType::File,
        },
    ]);
    let request = EvaluateRequest {
        process: p,
        sender: sender(),
        inputs: vec![input(1)],
        outputs: vec![ProcessIO::new().with_parent(0).with_metadata(
            cfg().metadata_key(b"report").unwrap(),
            MetadataValue::File(ContentHash([9u8; 32])),
        )],
    };
    let json = serde_json::to_string(&request).unwrap();
    let decoded: EvaluateRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, request);

    let evaluator = RestrictionEvaluator::default();
    assert_eq!(evaluator.evaluate_request(decoded), Ok(Verdict::Admit));
}

// ─────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────

#[test]
fn config_from_file_changes_accepted_widths() {
    let dir = temp_dir("config_from_file");
    let path = dir.join("engine.json");
    fs::write(
        &path,
        r#"{"metadata_key_width": 8, "metadata_value_literal_width": 8, "process_identifier_width": 8}"#,
    )
    .unwrap();
    let config = EngineConfig::from_file(&path).unwrap();
    let evaluator = RestrictionEvaluator::new(config.clone()).unwrap();

    let narrow = ProcessDefinition::new(config.process_id(b"p").unwrap(), 1, vec![]);
    let ctx = TransactionContext::new(sender(), vec![], vec![]);
    assert_eq!(evaluator.evaluate(&narrow, &ctx), Ok(Verdict::Admit));

    // A definition encoded at the default width is rejected, not truncated.
    let wide = process(vec![]);
    assert!(matches!(
        evaluator.evaluate(&wide, &ctx),
        Err(EngineError::InvalidLength { expected: 8, actual: 32, .. })
    ));
}
