//! Property tests for restriction evaluation.

use proptest::prelude::*;

use restriction_engine::{
    BinaryOperator, ContentHash, EngineConfig, Identity, MetadataKey, MetadataValue,
    MetadataValueType, ProcessDefinition, ProcessIO, Restriction, RestrictionEvaluator, RoleKey,
    Token, TokenId, TransactionContext, Verdict,
};

const WIDTH: usize = 32;

fn role_strategy() -> impl Strategy<Value = RoleKey> {
    prop::sample::select(RoleKey::ALL.to_vec())
}

fn operator_strategy() -> impl Strategy<Value = BinaryOperator> {
    prop_oneof![
        Just(BinaryOperator::And),
        Just(BinaryOperator::Or),
        Just(BinaryOperator::Xor),
        Just(BinaryOperator::Nand),
        Just(BinaryOperator::Nor),
    ]
}

/// A small key pool so restrictions and records actually collide.
fn key_strategy() -> impl Strategy<Value = MetadataKey> {
    prop::sample::select(vec!["type", "grade", "ref"])
        .prop_map(|name| MetadataKey::padded(name.as_bytes(), WIDTH).unwrap())
}

/// Keys as written in restrictions: occasionally of the wrong width.
fn restriction_key_strategy() -> impl Strategy<Value = MetadataKey> {
    prop_oneof![
        9 => key_strategy(),
        1 => Just(MetadataKey::padded(b"type", 8).unwrap()),
    ]
}

fn value_strategy() -> impl Strategy<Value = MetadataValue> {
    prop_oneof![
        (0u8..2).prop_map(|b| MetadataValue::File(ContentHash([b; 32]))),
        prop::sample::select(vec!["steel", "copper"])
            .prop_map(|lit| MetadataValue::padded_literal(lit.as_bytes(), WIDTH).unwrap()),
        (1u128..3).prop_map(|id| MetadataValue::TokenReference(TokenId(id))),
        Just(MetadataValue::None),
    ]
}

fn value_type_strategy() -> impl Strategy<Value = MetadataValueType> {
    prop_oneof![
        Just(MetadataValueType::File),
        Just(MetadataValueType::Literal),
        Just(MetadataValueType::TokenReference),
        Just(MetadataValueType::None),
    ]
}

fn metadata_strategy() -> impl Strategy<Value = Vec<(MetadataKey, MetadataValue)>> {
    prop::collection::vec((key_strategy(), value_strategy()), 0..3)
}

/// Restriction trees over every variant. Indices range past the
/// generated context so malformations are exercised too.
fn restriction_strategy() -> impl Strategy<Value = Restriction> {
    let leaf = prop_oneof![
        Just(Restriction::None),
        Just(Restriction::SenderOwnsAllInputs),
        (0u32..4, role_strategy())
            .prop_map(|(index, role_key)| Restriction::SenderHasInputRole { index, role_key }),
        (0u32..4, role_strategy())
            .prop_map(|(index, role_key)| Restriction::SenderHasOutputRole { index, role_key }),
        (0u32..4, role_strategy())
            .prop_map(|(index, role_key)| Restriction::OutputHasRole { index, role_key }),
        (0u32..4, role_strategy(), 0u32..4, role_strategy()).prop_map(
            |(input_index, input_role_key, output_index, output_role_key)| {
                Restriction::MatchInputOutputRole {
                    input_index,
                    input_role_key,
                    output_index,
                    output_role_key,
                }
            }
        ),
        (0u32..4, restriction_key_strategy(), 0u32..4, restriction_key_strategy()).prop_map(
            |(input_index, input_metadata_key, output_index, output_metadata_key)| {
                Restriction::MatchInputOutputMetadataValue {
                    input_index,
                    input_metadata_key,
                    output_index,
                    output_metadata_key,
                }
            }
        ),
        (0u32..4).prop_map(|num_inputs| Restriction::FixedNumberOfInputs { num_inputs }),
        (0u32..4).prop_map(|num_outputs| Restriction::FixedNumberOfOutputs { num_outputs }),
        (0u32..4, restriction_key_strategy(), value_strategy()).prop_map(
            |(index, metadata_key, metadata_value)| Restriction::FixedInputMetadataValue {
                index,
                metadata_key,
                metadata_value,
            }
        ),
        (0u32..4, restriction_key_strategy(), value_strategy()).prop_map(
            |(index, metadata_key, metadata_value)| Restriction::FixedOutputMetadataValue {
                index,
                metadata_key,
                metadata_value,
            }
        ),
        (0u32..4, restriction_key_strategy(), value_type_strategy()).prop_map(
            |(index, metadata_key, metadata_value_type)| {
                Restriction::FixedOutputMetadataValueType {
                    index,
                    metadata_key,
                    metadata_value_type,
                }
            }
        ),
    ];
    leaf.prop_recursive(4, 16, 2, |inner| {
        (operator_strategy(), inner.clone(), inner)
            .prop_map(|(op, a, b)| Restriction::combine(op, a, b))
    })
}

fn context_strategy() -> impl Strategy<Value = TransactionContext> {
    let holder = prop::sample::select(vec!["alice", "bob"]);
    (
        prop::collection::vec((role_strategy(), holder.clone(), metadata_strategy()), 0..3),
        prop::collection::vec((role_strategy(), holder, metadata_strategy()), 0..3),
    )
        .prop_map(|(input_specs, output_specs)| {
            let inputs = input_specs
                .into_iter()
                .enumerate()
                .map(|(i, (role, who, metadata))| {
                    metadata.into_iter().fold(
                        Token::minted(TokenId(i as u128 + 1), Identity::new("alice"), 0)
                            .with_role(role, Identity::new(who)),
                        |token, (key, value)| token.with_metadata(key, value),
                    )
                })
                .collect();
            let outputs = output_specs
                .into_iter()
                .map(|(role, who, metadata)| {
                    metadata.into_iter().fold(
                        ProcessIO::new().with_role(role, Identity::new(who)),
                        |output, (key, value)| output.with_metadata(key, value),
                    )
                })
                .collect();
            TransactionContext::new(Identity::new("alice"), inputs, outputs)
        })
}

fn process(restrictions: Vec<Restriction>) -> ProcessDefinition {
    let id = EngineConfig::default().process_id(b"prop").unwrap();
    ProcessDefinition::new(id, 1, restrictions)
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(
        restrictions in prop::collection::vec(restriction_strategy(), 0..4),
        ctx in context_strategy(),
    ) {
        let evaluator = RestrictionEvaluator::default();
        let p = process(restrictions);
        prop_assert_eq!(evaluator.evaluate(&p, &ctx), evaluator.evaluate(&p, &ctx.clone()));
    }

    #[test]
    fn fixed_number_of_inputs_admits_iff_count_matches(
        n in 0u32..5,
        ctx in context_strategy(),
    ) {
        let p = process(vec![Restriction::FixedNumberOfInputs { num_inputs: n }]);
        let admitted = RestrictionEvaluator::default().evaluate(&p, &ctx).unwrap().is_admit();
        prop_assert_eq!(admitted, ctx.inputs.len() == n as usize);
    }

    #[test]
    fn xor_with_itself_is_never_true(
        r in restriction_strategy(),
        ctx in context_strategy(),
    ) {
        let evaluator = RestrictionEvaluator::default();
        let xor = Restriction::combine(BinaryOperator::Xor, r.clone(), r);
        prop_assert_ne!(evaluator.check_restriction(&xor, &ctx), Ok(true));
    }

    #[test]
    fn process_of_self_xor_never_admits(
        r in restriction_strategy(),
        ctx in context_strategy(),
    ) {
        let p = process(vec![Restriction::combine(BinaryOperator::Xor, r.clone(), r)]);
        let verdict = RestrictionEvaluator::default().evaluate(&p, &ctx);
        prop_assert!(!matches!(verdict, Ok(Verdict::Admit)));
    }

    #[test]
    fn output_value_type_restriction_matches_record(
        key in key_strategy(),
        value in value_strategy(),
        expected in value_type_strategy(),
    ) {
        let ctx = TransactionContext::new(
            Identity::new("alice"),
            vec![],
            vec![ProcessIO::new().with_metadata(key.clone(), value.clone())],
        );
        let r = Restriction::FixedOutputMetadataValueType {
            index: 0,
            metadata_key: key,
            metadata_value_type: expected,
        };
        let holds = RestrictionEvaluator::default().check_restriction(&r, &ctx);
        prop_assert_eq!(holds, Ok(value.value_type() == expected));
    }

    #[test]
    fn and_of_none_admits_any_context(ctx in context_strategy()) {
        let p = process(vec![Restriction::combine(
            BinaryOperator::And,
            Restriction::None,
            Restriction::None,
        )]);
        prop_assert_eq!(RestrictionEvaluator::default().evaluate(&p, &ctx), Ok(Verdict::Admit));
    }

    #[test]
    fn restriction_round_trips_through_json(r in restriction_strategy()) {
        let json = serde_json::to_string(&r).unwrap();
        let decoded: Restriction = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, r);
    }
}
