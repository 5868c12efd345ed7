//! Errors raised by the metadata universe.

/// Errors from defining, parsing, or querying types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("type `{0}` is already defined")]
    DuplicateType(String),

    #[error("`{type_name}` already declares a member named `{member}`")]
    DuplicateMember { type_name: String, member: String },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("unknown type id {0}")]
    UnknownTypeId(u32),

    #[error("`{0}` has no generic parameters")]
    NotGeneric(String),

    #[error("`{name}` expects {expected} type arguments, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed type name `{name}` at byte {offset}: {reason}")]
    MalformedTypeName {
        name: String,
        offset: usize,
        reason: &'static str,
    },

    /// Direct member queries are not supported on types that depend on a
    /// definition under construction.
    #[error("`{0}` is an open instantiation; resolve its members through the generic definition")]
    OpenInstantiation(String),

    #[error("`{0}` mixes parameters of different generic contexts")]
    MixedContexts(String),

    #[error("`{0}` does not declare members")]
    NoMembers(String),

    #[error("invalid manifest: {0}")]
    Manifest(String),
}
