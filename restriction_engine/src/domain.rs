//! Core domain types: identities, roles, tokens and proposed outputs.
//!
//! Pure data. Evaluation lives in `evaluator`, lineage checks in `lineage`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metadata::{Metadata, MetadataKey, MetadataValue};

// ── Identities and roles ───────────────────────────────────────────

/// Account identity of a role holder or transaction sender.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of capacities in which an identity can hold a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RoleKey {
    #[default]
    Owner,
    Customer,
    AdditiveManufacturer,
    Laboratory,
    Buyer,
    Supplier,
    Reviewer,
}

impl RoleKey {
    pub const ALL: [RoleKey; 7] = [
        RoleKey::Owner,
        RoleKey::Customer,
        RoleKey::AdditiveManufacturer,
        RoleKey::Laboratory,
        RoleKey::Buyer,
        RoleKey::Supplier,
        RoleKey::Reviewer,
    ];
}

/// Ordered role -> holder association.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMap(BTreeMap<RoleKey, Identity>);

impl RoleMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, role: RoleKey, holder: Identity) -> Self {
        self.0.insert(role, holder);
        self
    }

    pub fn insert(&mut self, role: RoleKey, holder: Identity) -> Option<Identity> {
        self.0.insert(role, holder)
    }

    pub fn get(&self, role: &RoleKey) -> Option<&Identity> {
        self.0.get(role)
    }

    pub fn contains(&self, role: &RoleKey) -> bool {
        self.0.contains_key(role)
    }

    /// True iff `role` is bound to exactly `identity`.
    pub fn holds(&self, role: &RoleKey, identity: &Identity) -> bool {
        self.0.get(role) == Some(identity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(RoleKey, Identity)> for RoleMap {
    fn from_iter<I: IntoIterator<Item = (RoleKey, Identity)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Tokens ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u128);

impl TokenId {
    /// Successor id, `None` on exhaustion.
    pub fn checked_next(self) -> Option<TokenId> {
        self.0.checked_add(1).map(TokenId)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type BlockNumber = u64;

/// Immutable provenance record. Only `destroyed_at` and `children` change,
/// once, when the token is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Token {
    pub id: TokenId,
    /// First token of the chain this token carries forward.
    pub original_id: TokenId,
    pub roles: RoleMap,
    pub creator: Identity,
    pub created_at: BlockNumber,
    pub destroyed_at: Option<BlockNumber>,
    pub metadata: Metadata,
    pub parents: Vec<TokenId>,
    pub children: Option<Vec<TokenId>>,
}

impl Token {
    /// A freshly minted token with no lineage.
    pub fn minted(id: TokenId, creator: Identity, created_at: BlockNumber) -> Self {
        Self {
            id,
            original_id: id,
            roles: RoleMap::new(),
            creator,
            created_at,
            destroyed_at: None,
            metadata: Metadata::new(),
            parents: Vec::new(),
            children: None,
        }
    }

    pub fn with_role(mut self, role: RoleKey, holder: Identity) -> Self {
        self.roles.insert(role, holder);
        self
    }

    pub fn with_metadata(mut self, key: MetadataKey, value: MetadataValue) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn with_parents(mut self, parents: Vec<TokenId>) -> Self {
        self.parents = parents;
        self
    }

    pub fn owner(&self) -> Option<&Identity> {
        self.roles.get(&RoleKey::Owner)
    }

    pub fn is_burnt(&self) -> bool {
        self.destroyed_at.is_some()
    }
}

/// Descriptor of a token to be minted by a process run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessIO {
    pub roles: RoleMap,
    pub metadata: Metadata,
    /// Index into the inputs of the token this output carries forward.
    pub parent_index: Option<u32>,
}

impl ProcessIO {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: RoleKey, holder: Identity) -> Self {
        self.roles.insert(role, holder);
        self
    }

    pub fn with_metadata(mut self, key: MetadataKey, value: MetadataValue) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn with_parent(mut self, parent_index: u32) -> Self {
        self.parent_index = Some(parent_index);
        self
    }
}
