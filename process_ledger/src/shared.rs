//! Thread-safe ledger handle.
//!
//! Registry and token ledger live behind one `Mutex`, so a process run
//! always sees a registry consistent with the tokens it consumes. The
//! engine itself is lock-free; only the ledger state is serialized.

use std::sync::{Mutex, MutexGuard, PoisonError};

use restriction_engine::{
    BlockNumber, Identity, ProcessDefinition, ProcessFullyQualifiedId, ProcessIO, ProcessId,
    ProcessVersion, Restriction, Token, TokenId,
};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, RegistryError};
use crate::ledger::{ProcessRan, TokenLedger};
use crate::registry::{ProcessCreated, ProcessRegistry};

/// Registry plus token ledger, mutated together.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub registry: ProcessRegistry,
    pub tokens: TokenLedger,
}

impl LedgerState {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self {
            tokens: TokenLedger::new(config.clone())?,
            registry: ProcessRegistry::new(config),
        })
    }

    pub fn run_process(
        &mut self,
        sender: &Identity,
        process: &ProcessFullyQualifiedId,
        input_ids: &[TokenId],
        outputs: Vec<ProcessIO>,
    ) -> Result<ProcessRan, LedgerError> {
        self.tokens
            .run_process(&self.registry, sender, process, input_ids, outputs)
    }
}

pub struct SharedLedger {
    inner: Mutex<LedgerState>,
}

impl SharedLedger {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        Ok(Self {
            inner: Mutex::new(LedgerState::new(config)?),
        })
    }

    // Every mutation validates before it writes, so state behind a
    // poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_process(
        &self,
        id: ProcessId,
        restrictions: Vec<Restriction>,
    ) -> Result<ProcessCreated, RegistryError> {
        self.lock().registry.create_process(id, restrictions)
    }

    pub fn disable_process(
        &self,
        id: &ProcessId,
        version: ProcessVersion,
    ) -> Result<ProcessFullyQualifiedId, RegistryError> {
        self.lock().registry.disable_process(id, version)
    }

    pub fn process(
        &self,
        id: &ProcessId,
        version: ProcessVersion,
    ) -> Result<ProcessDefinition, RegistryError> {
        self.lock().registry.get(id, version).cloned()
    }

    pub fn run_process(
        &self,
        sender: &Identity,
        process: &ProcessFullyQualifiedId,
        input_ids: &[TokenId],
        outputs: Vec<ProcessIO>,
    ) -> Result<ProcessRan, LedgerError> {
        self.lock().run_process(sender, process, input_ids, outputs)
    }

    pub fn delete_token(&self, id: TokenId) -> Result<bool, LedgerError> {
        self.lock().tokens.delete_token(id)
    }

    pub fn sweep_graveyard(&self, limit: usize) -> Result<Vec<TokenId>, LedgerError> {
        self.lock().tokens.sweep_graveyard(limit)
    }

    pub fn advance_block(&self, blocks: BlockNumber) -> BlockNumber {
        self.lock().tokens.advance_block(blocks)
    }

    pub fn token(&self, id: TokenId) -> Option<Token> {
        self.lock().tokens.token(id).cloned()
    }

    pub fn last_token(&self) -> TokenId {
        self.lock().tokens.last_token()
    }

    /// Copy of the whole state, e.g. for provenance queries without
    /// holding the lock.
    pub fn snapshot(&self) -> LedgerState {
        self.lock().clone()
    }
}
