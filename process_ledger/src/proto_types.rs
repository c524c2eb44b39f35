//! Hand-written protobuf types for process definitions.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Field numbers are part of the wire format; never renumber.

use prost::Message;

// ── Enumerations ───────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ProtoProcessStatus {
    Disabled = 0,
    Enabled = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ProtoRoleKey {
    Owner = 0,
    Customer = 1,
    AdditiveManufacturer = 2,
    Laboratory = 3,
    Buyer = 4,
    Supplier = 5,
    Reviewer = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ProtoBinaryOperator {
    And = 0,
    Or = 1,
    Xor = 2,
    Nand = 3,
    Nor = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ProtoMetadataValueType {
    File = 0,
    Literal = 1,
    TokenReference = 2,
    None = 3,
}

// ── Process Definition ─────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoProcessDefinition {
    #[prost(uint32, tag = "1")]
    pub schema_version: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub id: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub version: u32,
    #[prost(enumeration = "ProtoProcessStatus", tag = "4")]
    pub status: i32,
    #[prost(message, repeated, tag = "5")]
    pub restrictions: Vec<ProtoRestriction>,
}

// ── Metadata Value ─────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoMetadataValue {
    #[prost(oneof = "MetadataValueKind", tags = "1, 2, 3, 4")]
    pub kind: Option<MetadataValueKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum MetadataValueKind {
    /// 32-byte content hash.
    #[prost(bytes, tag = "1")]
    File(Vec<u8>),
    #[prost(bytes, tag = "2")]
    Literal(Vec<u8>),
    /// Token id as 16 big-endian bytes.
    #[prost(bytes, tag = "3")]
    TokenReference(Vec<u8>),
    #[prost(message, tag = "4")]
    None(Empty),
}

#[derive(Clone, PartialEq, Message)]
pub struct Empty {}

// ── Restriction ────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoRestriction {
    #[prost(
        oneof = "RestrictionKind",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13"
    )]
    pub kind: Option<RestrictionKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum RestrictionKind {
    #[prost(message, tag = "1")]
    None(Empty),
    #[prost(message, tag = "2")]
    SenderOwnsAllInputs(Empty),
    #[prost(message, tag = "3")]
    SenderHasInputRole(IndexedRole),
    #[prost(message, tag = "4")]
    SenderHasOutputRole(IndexedRole),
    #[prost(message, tag = "5")]
    OutputHasRole(IndexedRole),
    #[prost(message, tag = "6")]
    MatchInputOutputRole(MatchInputOutputRole),
    #[prost(message, tag = "7")]
    MatchInputOutputMetadataValue(MatchInputOutputMetadataValue),
    #[prost(uint32, tag = "8")]
    FixedNumberOfInputs(u32),
    #[prost(uint32, tag = "9")]
    FixedNumberOfOutputs(u32),
    #[prost(message, tag = "10")]
    FixedInputMetadataValue(FixedMetadataValue),
    #[prost(message, tag = "11")]
    FixedOutputMetadataValue(FixedMetadataValue),
    #[prost(message, tag = "12")]
    FixedOutputMetadataValueType(FixedMetadataValueType),
    #[prost(message, tag = "13")]
    BooleanBinary(BooleanBinary),
}

#[derive(Clone, PartialEq, Message)]
pub struct IndexedRole {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(enumeration = "ProtoRoleKey", tag = "2")]
    pub role_key: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct MatchInputOutputRole {
    #[prost(uint32, tag = "1")]
    pub input_index: u32,
    #[prost(enumeration = "ProtoRoleKey", tag = "2")]
    pub input_role_key: i32,
    #[prost(uint32, tag = "3")]
    pub output_index: u32,
    #[prost(enumeration = "ProtoRoleKey", tag = "4")]
    pub output_role_key: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct MatchInputOutputMetadataValue {
    #[prost(uint32, tag = "1")]
    pub input_index: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub input_metadata_key: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub output_index: u32,
    #[prost(bytes = "vec", tag = "4")]
    pub output_metadata_key: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FixedMetadataValue {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub metadata_key: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub metadata_value: Option<ProtoMetadataValue>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FixedMetadataValueType {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub metadata_key: Vec<u8>,
    #[prost(enumeration = "ProtoMetadataValueType", tag = "3")]
    pub metadata_value_type: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct BooleanBinary {
    #[prost(enumeration = "ProtoBinaryOperator", tag = "1")]
    pub operator: i32,
    #[prost(message, optional, boxed, tag = "2")]
    pub restriction_a: Option<Box<ProtoRestriction>>,
    #[prost(message, optional, boxed, tag = "3")]
    pub restriction_b: Option<Box<ProtoRestriction>>,
}
