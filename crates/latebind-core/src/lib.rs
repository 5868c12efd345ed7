#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core metadata for latebind.
//!
//! This crate holds everything the emitters need to *talk about* code without
//! emitting any:
//! - **Metadata universe** (`TypeUniverse`): type definitions, fields, methods,
//!   and generic contexts for type definitions still under construction
//! - **References** (`TypeRef`, `FieldRef`, `MethodRef`): the operands that
//!   instructions carry
//! - **Manifests**: JSON descriptions of a universe, loaded through serde
//! - **User-string heap** (`StringHeap`): literal storage for `ldstr`

mod invariants;
pub mod metadata;
mod strings;


pub use metadata::{
    FieldDef, FieldRef, GenericContext, GenericContextId, GenericParam, Manifest, MethodDef,
    MethodRef, ParamInfo, Passing, TypeDef, TypeDisplay, TypeId, TypeKind, TypeRef, TypeUniverse,
    UniverseError, parse_manifest,
};
pub use strings::{StringHeap, StringToken};
