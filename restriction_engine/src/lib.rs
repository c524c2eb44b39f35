#![forbid(unsafe_code)]

//! Restriction evaluation for a provenance token ledger.
//!
//! Pure and deterministic: given a process definition and an already
//! decoded transaction context, decide whether the transaction is admitted.
//! No I/O, no clocks, no randomness. Storage lives in `process_ledger`.

/// Restriction schema v1. Adding or changing a restriction kind is a new
/// schema version, never a silent change to this one.
pub const RESTRICTION_SCHEMA_VERSION: u32 = 1;

pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod fixed;
pub mod hashing;
pub mod lineage;
pub mod metadata;
pub mod process;
pub mod restriction;

pub use config::EngineConfig;
pub use context::{EvaluateRequest, TransactionContext};
pub use domain::{BlockNumber, Identity, ProcessIO, RoleKey, RoleMap, Token, TokenId};
pub use error::{EngineError, IoSide, WidthField};
pub use evaluator::{evaluate, RestrictionEvaluator, Verdict, Violation};
pub use fixed::FixedBytes;
pub use metadata::{ContentHash, Metadata, MetadataKey, MetadataValue, MetadataValueType};
pub use process::{
    ProcessDefinition, ProcessFullyQualifiedId, ProcessId, ProcessStatus, ProcessVersion,
};
pub use restriction::{BinaryOperator, Restriction, RestrictionKind};
