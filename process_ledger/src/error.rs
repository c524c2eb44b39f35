//! Errors raised by the registry, the ledger and the protobuf codec.

use thiserror::Error;

use restriction_engine::{
    BlockNumber, EngineError, ProcessFullyQualifiedId, ProcessId, ProcessVersion, TokenId,
    Violation,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("process {0} already exists")]
    AlreadyExists(ProcessFullyQualifiedId),

    #[error("process {0} does not exist")]
    NonExistingProcess(ProcessId),

    #[error("process {id} has no version {version}")]
    InvalidVersion { id: ProcessId, version: ProcessVersion },

    #[error("process {0} is already disabled")]
    AlreadyDisabled(ProcessFullyQualifiedId),

    #[error("{count} restrictions exceed the limit of {max}")]
    TooManyRestrictions { count: usize, max: usize },

    #[error("restriction {restriction_index} nests {depth} levels deep, the limit is {max}")]
    RestrictionsTooDeep {
        restriction_index: usize,
        depth: usize,
        max: u8,
    },

    #[error("version counter for process {0} is exhausted")]
    VersionOverflow(ProcessId),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("input token {0} does not exist")]
    InvalidInput(TokenId),

    #[error("input token {0} has already been burnt")]
    AlreadyBurnt(TokenId),

    #[error("{count} inputs exceed the limit of {max}")]
    TooManyInputs { count: usize, max: usize },

    #[error("{count} outputs exceed the limit of {max}")]
    TooManyOutputs { count: usize, max: usize },

    #[error("output {output_index} carries {count} roles, the limit is {max}")]
    TooManyRoles {
        output_index: usize,
        count: usize,
        max: usize,
    },

    #[error("output {output_index} carries {count} metadata entries, the limit is {max}")]
    TooManyMetadata {
        output_index: usize,
        count: usize,
        max: usize,
    },

    #[error("process {process} denied the transaction at restriction {}", .violation.restriction_index)]
    ProcessInvalid {
        process: ProcessFullyQualifiedId,
        violation: Violation,
    },

    #[error("token {0} cannot be deleted before it is burnt")]
    NotBurnt(TokenId),

    #[error("token {id} was burnt at block {destroyed_at} and cannot be deleted before block {deletable_at}")]
    BurntTooRecently {
        id: TokenId,
        destroyed_at: BlockNumber,
        deletable_at: BlockNumber,
    },

    #[error("token id space is exhausted")]
    TokenIdOverflow,

    #[error("invalid ledger configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("protobuf decode failed: {0}")]
    Decode(String),

    #[error("unsupported restriction schema version {0}")]
    UnsupportedSchema(u32),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("unknown {field} value {value}")]
    UnknownEnumValue { field: &'static str, value: i32 },

    #[error("token reference must be 16 bytes, got {0}")]
    InvalidTokenReference(usize),

    #[error("file hash must be 32 bytes, got {0}")]
    InvalidFileHash(usize),

    #[error("restriction nesting exceeds {0} levels")]
    TooDeep(u8),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use restriction_engine::{EngineConfig, RestrictionKind};

    #[test]
    fn engine_errors_convert_into_ledger_errors() {
        let err: LedgerError = EngineError::DuplicateInput(TokenId(3)).into();
        assert_eq!(err, LedgerError::Engine(EngineError::DuplicateInput(TokenId(3))));
        assert_eq!(err.to_string(), "token #3 appears more than once in the inputs");
    }

    #[test]
    fn process_invalid_names_the_restriction() {
        let id = EngineConfig::default().process_id(b"ship").unwrap();
        let err = LedgerError::ProcessInvalid {
            process: ProcessFullyQualifiedId { id, version: 2 },
            violation: Violation {
                restriction_index: 4,
                kind: RestrictionKind::OutputHasRole,
            },
        };
        assert_eq!(
            err.to_string(),
            "process ship@v2 denied the transaction at restriction 4"
        );
    }
}
