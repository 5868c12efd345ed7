#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Emission of late-bound ("dynamic") call sites.
//!
//! Everything here appends to an [`InstructionSink`]:
//! - `writer`: compact/general instruction selection (`EmitExt`)
//! - `branch`: the scoped branch-if-true block (`ScopedBranch`)
//! - `resolve`: member lookup that works inside generic types under
//!   construction (`MemberResolver`)
//! - `array`: array building from per-slot emitter callbacks (`emit_array`)
//! - `callsite`: binder-construction sequences for every dynamic operation
//!   (`CallSiteEmitter`)
//!
//! The binder facility the emitted code talks to is described by a
//! [`BinderProfile`] and resolved once into a [`BinderRuntime`].
//!
//! [`InstructionSink`]: latebind_bytecode::InstructionSink

mod array;
mod branch;
mod callsite;
mod error;
mod flags;
mod profile;
mod resolve;
mod runtime;
mod writer;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod array_tests;
#[cfg(test)]
mod resolve_tests;

pub use array::emit_array;
pub use branch::{ScopedBranch, begin_branch_if_true};
pub use callsite::CallSiteEmitter;
pub use error::{EmitError, EmitResult, ResolveError};
pub use flags::{ArgumentFlags, BinderFlags, FlagError};
pub use profile::{BinderProfile, FactoryNames, ProfileError};
pub use resolve::{GenericBinding, LookupScope, MemberResolver};
pub use runtime::{BinderFactories, BinderRuntime, stock_universe};
pub use writer::EmitExt;
