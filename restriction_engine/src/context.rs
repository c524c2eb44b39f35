//! Transaction context and evaluation request.
//!
//! Already-decoded records handed in by the caller. The engine never
//! fetches or caches state; each call gets a fresh, consistent snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::{Identity, ProcessIO, Token};
use crate::error::{EngineError, IoSide};
use crate::process::ProcessDefinition;

/// The `(sender, inputs, outputs)` tuple restrictions are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionContext {
    pub sender: Identity,
    pub inputs: Vec<Token>,
    pub outputs: Vec<ProcessIO>,
}

impl TransactionContext {
    pub fn new(sender: Identity, inputs: Vec<Token>, outputs: Vec<ProcessIO>) -> Self {
        Self {
            sender,
            inputs,
            outputs,
        }
    }

    pub fn input(&self, index: u32) -> Result<&Token, EngineError> {
        self.inputs
            .get(index as usize)
            .ok_or(EngineError::IndexError {
                side: IoSide::Input,
                index,
                len: self.inputs.len(),
            })
    }

    pub fn output(&self, index: u32) -> Result<&ProcessIO, EngineError> {
        self.outputs
            .get(index as usize)
            .ok_or(EngineError::IndexError {
                side: IoSide::Output,
                index,
                len: self.outputs.len(),
            })
    }
}

/// Everything needed for one evaluation, as supplied by the submission layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluateRequest {
    pub process: ProcessDefinition,
    pub sender: Identity,
    pub inputs: Vec<Token>,
    pub outputs: Vec<ProcessIO>,
}

impl EvaluateRequest {
    pub fn into_parts(self) -> (ProcessDefinition, TransactionContext) {
        (
            self.process,
            TransactionContext::new(self.sender, self.inputs, self.outputs),
        )
    }
}
