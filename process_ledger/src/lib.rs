#![forbid(unsafe_code)]

//! In-memory process ledger.
//!
//! Wraps the pure restriction engine with the state it is evaluated
//! against: a versioned process registry, a token ledger that applies
//! admitted transactions, provenance queries, and a protobuf codec for
//! process definitions.
//!
//! No admission logic lives here. Every run is decided by
//! `restriction_engine::RestrictionEvaluator`.

pub mod config;
pub mod error;
pub mod ledger;
pub mod proto_bridge;
pub mod proto_types;
pub mod provenance;
pub mod registry;
pub mod shared;

pub use config::LedgerConfig;
pub use error::{CodecError, LedgerError, RegistryError};
pub use ledger::{ProcessRan, TokenLedger};
pub use proto_bridge::{decode_process, encode_process};
pub use registry::{ProcessCreated, ProcessRegistry};
pub use shared::{LedgerState, SharedLedger};
