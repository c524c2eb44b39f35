//! In-memory token ledger.
//!
//! Applies admitted transactions: burns the inputs and mints the outputs.
//! Every check (bounds, input resolution, evaluation, id allocation) runs
//! before the first mutation, so a failed `run_process` leaves the ledger
//! untouched.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use restriction_engine::{
    BlockNumber, Identity, ProcessFullyQualifiedId, ProcessIO, RestrictionEvaluator, Token,
    TokenId, TransactionContext, Verdict,
};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::registry::ProcessRegistry;

/// Record of a successful `run_process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRan {
    pub sender: Identity,
    pub process: ProcessFullyQualifiedId,
    pub inputs: Vec<TokenId>,
    pub outputs: Vec<TokenId>,
    pub block: BlockNumber,
}

#[derive(Debug, Clone)]
pub struct TokenLedger {
    config: LedgerConfig,
    evaluator: RestrictionEvaluator,
    tokens: BTreeMap<TokenId, Token>,
    last_token: TokenId,
    current_block: BlockNumber,
    /// Burnt tokens awaiting deletion, in burn order.
    graveyard: VecDeque<TokenId>,
}

impl TokenLedger {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        let evaluator = RestrictionEvaluator::new(config.engine.clone())?;
        Ok(Self {
            config,
            evaluator,
            tokens: BTreeMap::new(),
            last_token: TokenId(0),
            current_block: 0,
            graveyard: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn current_block(&self) -> BlockNumber {
        self.current_block
    }

    pub fn advance_block(&mut self, blocks: BlockNumber) -> BlockNumber {
        self.current_block = self.current_block.saturating_add(blocks);
        self.current_block
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    /// Highest id minted so far, `TokenId(0)` before the first mint.
    pub fn last_token(&self) -> TokenId {
        self.last_token
    }

    pub fn graveyard_len(&self) -> usize {
        self.graveyard.len()
    }

    /// Evaluate `outputs` against process `process` with the tokens named
    /// by `input_ids` and, if admitted, apply the transaction.
    pub fn run_process(
        &mut self,
        registry: &ProcessRegistry,
        sender: &Identity,
        process: &ProcessFullyQualifiedId,
        input_ids: &[TokenId],
        outputs: Vec<ProcessIO>,
    ) -> Result<ProcessRan, LedgerError> {
        self.check_bounds(input_ids, &outputs)?;
        let definition = registry.get(&process.id, process.version)?;
        let inputs = self.resolve_inputs(input_ids)?;
        let ctx = TransactionContext::new(sender.clone(), inputs, outputs);

        if let Verdict::Denied(violation) = self.evaluator.evaluate(definition, &ctx)? {
            return Err(LedgerError::ProcessInvalid {
                process: process.clone(),
                violation,
            });
        }

        let minted_ids = self.allocate_ids(ctx.outputs.len())?;
        let now = self.current_block;

        // Burn inputs
        for id in input_ids {
            if let Some(token) = self.tokens.get_mut(id) {
                token.destroyed_at = Some(now);
                token.children = Some(minted_ids.clone());
            }
            self.graveyard.push_back(*id);
        }

        // Mint outputs
        for (id, output) in minted_ids.iter().zip(ctx.outputs) {
            let original_id = output
                .parent_index
                .and_then(|i| ctx.inputs.get(i as usize))
                .map(|parent| parent.original_id)
                .unwrap_or(*id);
            let token = Token {
                id: *id,
                original_id,
                roles: output.roles,
                creator: sender.clone(),
                created_at: now,
                destroyed_at: None,
                metadata: output.metadata,
                parents: input_ids.to_vec(),
                children: None,
            };
            debug!(token = %id, original = %original_id, "Token minted");
            self.tokens.insert(*id, token);
        }
        if let Some(last) = minted_ids.last() {
            self.last_token = *last;
        }

        info!(
            process = %process,
            sender = %sender,
            burnt = input_ids.len(),
            minted = minted_ids.len(),
            block = now,
            "Process ran"
        );
        Ok(ProcessRan {
            sender: sender.clone(),
            process: process.clone(),
            inputs: input_ids.to_vec(),
            outputs: minted_ids,
            block: now,
        })
    }

    /// Permanently remove a burnt token once its tombstone window has
    /// passed. Returns whether a token was removed; an unknown id is a
    /// no-op.
    pub fn delete_token(&mut self, id: TokenId) -> Result<bool, LedgerError> {
        let Some(token) = self.tokens.get(&id) else {
            return Ok(false);
        };
        let destroyed_at = token.destroyed_at.ok_or(LedgerError::NotBurnt(id))?;
        let deletable_at = destroyed_at.saturating_add(self.config.tombstone_duration);
        if self.current_block < deletable_at {
            return Err(LedgerError::BurntTooRecently {
                id,
                destroyed_at,
                deletable_at,
            });
        }
        self.tokens.remove(&id);
        info!(token = %id, block = self.current_block, "Token deleted");
        Ok(true)
    }

    /// Delete up to `limit` expired tokens from the front of the graveyard.
    /// Stops at the first token still inside its tombstone window.
    pub fn sweep_graveyard(&mut self, limit: usize) -> Result<Vec<TokenId>, LedgerError> {
        let mut deleted = Vec::new();
        while deleted.len() < limit {
            let Some(&id) = self.graveyard.front() else {
                break;
            };
            match self.delete_token(id) {
                Ok(removed) => {
                    self.graveyard.pop_front();
                    if removed {
                        deleted.push(id);
                    }
                }
                Err(LedgerError::BurntTooRecently { .. }) => break,
                Err(e) => {
                    warn!(token = %id, error = %e, "Graveyard sweep aborted");
                    return Err(e);
                }
            }
        }
        if !deleted.is_empty() {
            info!(deleted = deleted.len(), remaining = self.graveyard.len(), "Graveyard swept");
        }
        Ok(deleted)
    }

    // -----------------------------------------------------------------------
    // Pre-mutation checks (private)
    // -----------------------------------------------------------------------

    fn check_bounds(&self, input_ids: &[TokenId], outputs: &[ProcessIO]) -> Result<(), LedgerError> {
        if input_ids.len() > self.config.max_inputs {
            return Err(LedgerError::TooManyInputs {
                count: input_ids.len(),
                max: self.config.max_inputs,
            });
        }
        if outputs.len() > self.config.max_outputs {
            return Err(LedgerError::TooManyOutputs {
                count: outputs.len(),
                max: self.config.max_outputs,
            });
        }
        for (output_index, output) in outputs.iter().enumerate() {
            if output.roles.len() > self.config.max_roles {
                return Err(LedgerError::TooManyRoles {
                    output_index,
                    count: output.roles.len(),
                    max: self.config.max_roles,
                });
            }
            if output.metadata.len() > self.config.max_metadata {
                return Err(LedgerError::TooManyMetadata {
                    output_index,
                    count: output.metadata.len(),
                    max: self.config.max_metadata,
                });
            }
        }
        Ok(())
    }

    fn resolve_inputs(&self, input_ids: &[TokenId]) -> Result<Vec<Token>, LedgerError> {
        input_ids
            .iter()
            .map(|id| {
                let token = self.tokens.get(id).ok_or(LedgerError::InvalidInput(*id))?;
                if token.is_burnt() {
                    return Err(LedgerError::AlreadyBurnt(*id));
                }
                Ok(token.clone())
            })
            .collect()
    }

    fn allocate_ids(&self, count: usize) -> Result<Vec<TokenId>, LedgerError> {
        let mut ids = Vec::with_capacity(count);
        let mut last = self.last_token;
        for _ in 0..count {
            last = last.checked_next().ok_or(LedgerError::TokenIdOverflow)?;
            ids.push(last);
        }
        Ok(ids)
    }
}
