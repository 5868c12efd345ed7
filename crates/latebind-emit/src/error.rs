//! Errors raised while emitting call sites.

use latebind_bytecode::SinkError;
use latebind_core::UniverseError;

use crate::flags::FlagError;

pub type EmitResult<T = ()> = Result<T, EmitError>;

/// Member resolution faults. Always fatal to the current emission: a
/// required member missing from the universe is a configuration bug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("`{type_name}` has no member `{member}`")]
    MemberNotFound { type_name: String, member: String },

    #[error("`{type_name}` has {candidates} overloads of `{member}`; pass parameter types")]
    AmbiguousMethod {
        type_name: String,
        member: String,
        candidates: usize,
    },

    /// Open references that do not name a definition (`T`, `T[]`) have no
    /// members to look up.
    #[error("`{0}` does not name a type definition")]
    NoDefinition(String),

    #[error(transparent)]
    Universe(#[from] UniverseError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("member resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("sink rejected instruction: {0}")]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Flags(#[from] FlagError),

    /// An array-slot emitter left other than exactly one value.
    #[error("emitter for array slot {slot} moved the stack from {before} to {after}")]
    StackImbalance { slot: usize, before: u32, after: u32 },

    #[error("array of {0} elements is too large")]
    TooManyElements(usize),
}

impl From<UniverseError> for EmitError {
    fn from(err: UniverseError) -> Self {
        Self::Resolve(ResolveError::Universe(err))
    }
}
