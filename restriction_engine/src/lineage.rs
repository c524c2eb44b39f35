//! Lineage checks.
//!
//! Structural preconditions that run before any restriction is evaluated.
//! A failure here is an error, never a denial.

use std::collections::{BTreeMap, BTreeSet};

use crate::context::TransactionContext;
use crate::domain::{Token, TokenId};
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every lineage check against `ctx`. Returns the first failure.
pub fn check_lineage(ctx: &TransactionContext) -> Result<(), EngineError> {
    for token in &ctx.inputs {
        check_token(token)?;
    }
    check_inputs_unconsumed(ctx)?;
    check_no_duplicate_inputs(ctx)?;
    check_parent_indices(ctx)?;
    Ok(())
}

/// Invariants every stored token must satisfy on its own.
pub fn check_token(token: &Token) -> Result<(), EngineError> {
    if token.children.is_some() && token.destroyed_at.is_none() {
        return Err(EngineError::InvalidToken {
            id: token.id,
            reason: "children recorded on a token that was never destroyed",
        });
    }
    if token.parents.contains(&token.id) {
        return Err(EngineError::InvalidToken {
            id: token.id,
            reason: "token lists itself as a parent",
        });
    }
    if let Some(children) = &token.children {
        if children.contains(&token.id) {
            return Err(EngineError::InvalidToken {
                id: token.id,
                reason: "token lists itself as a child",
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_inputs_unconsumed(ctx: &TransactionContext) -> Result<(), EngineError> {
    match ctx.inputs.iter().find(|t| t.is_burnt()) {
        Some(token) => Err(EngineError::InputAlreadyConsumed(token.id)),
        None => Ok(()),
    }
}

fn check_no_duplicate_inputs(ctx: &TransactionContext) -> Result<(), EngineError> {
    let mut seen: BTreeSet<TokenId> = BTreeSet::new();
    for token in &ctx.inputs {
        if !seen.insert(token.id) {
            return Err(EngineError::DuplicateInput(token.id));
        }
    }
    Ok(())
}

/// Every `parent_index` must name an input, and no input may be carried
/// forward by more than one output.
fn check_parent_indices(ctx: &TransactionContext) -> Result<(), EngineError> {
    let mut claimed: BTreeMap<u32, usize> = BTreeMap::new();
    for (output_index, output) in ctx.outputs.iter().enumerate() {
        let Some(parent_index) = output.parent_index else {
            continue;
        };
        if parent_index as usize >= ctx.inputs.len() {
            return Err(EngineError::InvalidParentIndex {
                output_index,
                parent_index,
                input_count: ctx.inputs.len(),
            });
        }
        if let Some(first_output) = claimed.insert(parent_index, output_index) {
            return Err(EngineError::ParentReused {
                parent_index,
                first_output,
                second_output: output_index,
            });
        }
    }
    Ok(())
}
