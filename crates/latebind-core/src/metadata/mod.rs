//! Metadata universe: type definitions and the references instructions carry.
//!
//! # Open generic contexts
//!
//! A generic definition that is still being built (for example a nested
//! `Sites<T>` holder whose static fields cache call sites) is registered with
//! [`TypeUniverse::begin_generic_type`], which opens a [`GenericContextId`].
//! Its parameters are [`TypeRef::Param`]s tagged with that context. Any type
//! mentioning them is *open*: the universe refuses direct member queries on
//! it, and members must be reached through the generic definition instead.

mod error;
mod manifest;
mod member;
mod name;
mod types;
mod universe;


pub use error::UniverseError;
pub use manifest::{
    Manifest, ManifestField, ManifestMethod, ManifestParam, ManifestType, parse_manifest,
};
pub use member::{FieldRef, MethodRef};
pub use types::{GenericContextId, GenericParam, ParamInfo, Passing, TypeId, TypeRef};
pub use universe::{
    FieldDef, GenericContext, MethodDef, TypeDef, TypeDisplay, TypeKind,
    TypeUniverse,
};
