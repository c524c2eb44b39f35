//! Restriction evaluator.
//!
//! Stateless per call: a fold over an immutable restriction list against an
//! immutable context. No retries, no partial application.
//!
//! Order of evaluation:
//!   1. the process must be enabled
//!   2. the process identifier and every context record must match the
//!      configured widths
//!   3. lineage preconditions (`lineage::check_lineage`)
//!   4. top-level restrictions in order, AND-ed, stopping at the first
//!      denial or structural error
//!
//! Inside `BooleanBinary` both branches are always evaluated, so a
//! malformed branch surfaces even when the other branch already decides
//! the outcome.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::context::{EvaluateRequest, TransactionContext};
use crate::domain::RoleKey;
use crate::error::EngineError;
use crate::lineage::check_lineage;
use crate::metadata::{ensure_metadata_widths, MetadataKey, MetadataValue};
use crate::process::ProcessDefinition;
use crate::restriction::{Restriction, RestrictionKind};

/// Outcome of a well-formed evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Admit,
    Denied(Violation),
}

impl Verdict {
    pub fn is_admit(&self) -> bool {
        matches!(self, Verdict::Admit)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Verdict::Admit => None,
            Verdict::Denied(v) => Some(v),
        }
    }
}

/// The first top-level restriction the transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub restriction_index: usize,
    pub kind: RestrictionKind,
}

#[derive(Debug, Clone, Default)]
pub struct RestrictionEvaluator {
    config: EngineConfig,
}

impl RestrictionEvaluator {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide whether `ctx` is admissible under `process`.
    pub fn evaluate(
        &self,
        process: &ProcessDefinition,
        ctx: &TransactionContext,
    ) -> Result<Verdict, EngineError> {
        if !process.is_enabled() {
            warn!(process = %process.qualified_id(), "Process is disabled");
            return Err(EngineError::ProcessDisabled {
                id: process.id.clone(),
                version: process.version,
            });
        }

        process
            .id
            .ensure_width(self.config.process_identifier_width)?;
        self.check_record_widths(ctx)?;
        check_lineage(ctx)?;

        for (index, restriction) in process.restrictions.iter().enumerate() {
            match self.check_top_level(restriction, ctx) {
                Ok(true) => {
                    debug!(
                        process = %process.qualified_id(),
                        restriction_index = index,
                        kind = %restriction.kind(),
                        "Restriction satisfied"
                    );
                }
                Ok(false) => {
                    let violation = Violation {
                        restriction_index: index,
                        kind: restriction.kind(),
                    };
                    warn!(
                        process = %process.qualified_id(),
                        restriction_index = index,
                        kind = %violation.kind,
                        "Transaction denied"
                    );
                    return Ok(Verdict::Denied(violation));
                }
                Err(source) => {
                    warn!(
                        process = %process.qualified_id(),
                        restriction_index = index,
                        error = %source,
                        "Malformed restriction"
                    );
                    return Err(EngineError::malformed(index, source));
                }
            }
        }

        info!(
            process = %process.qualified_id(),
            inputs = ctx.inputs.len(),
            outputs = ctx.outputs.len(),
            "Transaction admitted"
        );
        Ok(Verdict::Admit)
    }

    /// `evaluate` over a request as handed in by the submission layer.
    pub fn evaluate_request(&self, request: EvaluateRequest) -> Result<Verdict, EngineError> {
        let (process, ctx) = request.into_parts();
        self.evaluate(&process, &ctx)
    }

    /// Evaluate a single restriction tree as a predicate.
    ///
    /// An index outside the context or a key/literal of the wrong width is
    /// an error, never `false`. A missing role or metadata entry is `false`.
    pub fn check_restriction(
        &self,
        restriction: &Restriction,
        ctx: &TransactionContext,
    ) -> Result<bool, EngineError> {
        match restriction {
            Restriction::None => Ok(true),
            Restriction::SenderOwnsAllInputs => Ok(ctx
                .inputs
                .iter()
                .all(|input| input.roles.holds(&RoleKey::Owner, &ctx.sender))),
            Restriction::SenderHasInputRole { index, role_key } => {
                let input = ctx.input(*index)?;
                Ok(input.roles.holds(role_key, &ctx.sender))
            }
            Restriction::SenderHasOutputRole { index, role_key } => {
                let output = ctx.output(*index)?;
                Ok(output.roles.holds(role_key, &ctx.sender))
            }
            Restriction::OutputHasRole { index, role_key } => {
                let output = ctx.output(*index)?;
                Ok(output.roles.contains(role_key))
            }
            Restriction::MatchInputOutputRole {
                input_index,
                input_role_key,
                output_index,
                output_role_key,
            } => {
                let input = ctx.input(*input_index)?;
                let output = ctx.output(*output_index)?;
                match (input.roles.get(input_role_key), output.roles.get(output_role_key)) {
                    (Some(input_holder), Some(output_holder)) => Ok(input_holder == output_holder),
                    _ => Ok(false),
                }
            }
            Restriction::MatchInputOutputMetadataValue {
                input_index,
                input_metadata_key,
                output_index,
                output_metadata_key,
            } => {
                self.check_key(input_metadata_key)?;
                self.check_key(output_metadata_key)?;
                let input = ctx.input(*input_index)?;
                let output = ctx.output(*output_index)?;
                match (
                    input.metadata.get(input_metadata_key),
                    output.metadata.get(output_metadata_key),
                ) {
                    (Some(input_value), Some(output_value)) => Ok(input_value == output_value),
                    _ => Ok(false),
                }
            }
            Restriction::FixedNumberOfInputs { num_inputs } => {
                Ok(ctx.inputs.len() == *num_inputs as usize)
            }
            Restriction::FixedNumberOfOutputs { num_outputs } => {
                Ok(ctx.outputs.len() == *num_outputs as usize)
            }
            Restriction::FixedInputMetadataValue {
                index,
                metadata_key,
                metadata_value,
            } => {
                self.check_key(metadata_key)?;
                self.check_value(metadata_value)?;
                let input = ctx.input(*index)?;
                Ok(input.metadata.get(metadata_key) == Some(metadata_value))
            }
            Restriction::FixedOutputMetadataValue {
                index,
                metadata_key,
                metadata_value,
            } => {
                self.check_key(metadata_key)?;
                self.check_value(metadata_value)?;
                let output = ctx.output(*index)?;
                Ok(output.metadata.get(metadata_key) == Some(metadata_value))
            }
            Restriction::FixedOutputMetadataValueType {
                index,
                metadata_key,
                metadata_value_type,
            } => {
                self.check_key(metadata_key)?;
                let output = ctx.output(*index)?;
                Ok(output.metadata.get(metadata_key).map(MetadataValue::value_type)
                    == Some(*metadata_value_type))
            }
            Restriction::BooleanBinary {
                operator,
                restriction_a,
                restriction_b,
            } => {
                let a = self.check_restriction(restriction_a, ctx)?;
                let b = self.check_restriction(restriction_b, ctx)?;
                Ok(operator.eval(a, b))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Structural checks (private)
    // -----------------------------------------------------------------------

    fn check_top_level(
        &self,
        restriction: &Restriction,
        ctx: &TransactionContext,
    ) -> Result<bool, EngineError> {
        let depth = restriction.depth();
        let max = self.config.max_restriction_depth;
        if depth > max as usize {
            return Err(EngineError::RestrictionTooDeep { depth, max });
        }
        self.check_restriction(restriction, ctx)
    }

    fn check_record_widths(&self, ctx: &TransactionContext) -> Result<(), EngineError> {
        let key_width = self.config.metadata_key_width;
        let literal_width = self.config.metadata_value_literal_width;
        for input in &ctx.inputs {
            ensure_metadata_widths(&input.metadata, key_width, literal_width)?;
        }
        for output in &ctx.outputs {
            ensure_metadata_widths(&output.metadata, key_width, literal_width)?;
        }
        Ok(())
    }

    fn check_key(&self, key: &MetadataKey) -> Result<(), EngineError> {
        key.ensure_width(self.config.metadata_key_width)
    }

    fn check_value(&self, value: &MetadataValue) -> Result<(), EngineError> {
        value.ensure_width(self.config.metadata_value_literal_width)
    }
}

/// Evaluate with the default configuration.
pub fn evaluate(
    process: &ProcessDefinition,
    ctx: &TransactionContext,
) -> Result<Verdict, EngineError> {
    RestrictionEvaluator::default().evaluate(process, ctx)
}
