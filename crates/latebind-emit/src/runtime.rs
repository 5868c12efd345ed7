//! The binder facility, resolved once before any call site is emitted.

use latebind_core::{MethodRef, TypeId, TypeRef, TypeUniverse, UniverseError};

use crate::error::ResolveError;
use crate::profile::BinderProfile;
use crate::resolve::MemberResolver;

const STOCK_MANIFEST: &str = include_str!("binder_runtime.json");

/// Universe holding the stock runtime types: `System.Type`, `CallSite<T>`,
/// `Func`/`Action` delegates and the C# runtime binder.
///
/// Proxy and target types are added to it by the caller.
pub fn stock_universe() -> Result<TypeUniverse, UniverseError> {
    TypeUniverse::from_manifest_json(STOCK_MANIFEST)
}

/// One factory method per dynamic operation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BinderFactories {
    pub get_member: MethodRef,
    pub set_member: MethodRef,
    pub get_index: MethodRef,
    pub set_index: MethodRef,
    pub invoke_member: MethodRef,
    pub invoke: MethodRef,
    pub convert: MethodRef,
    pub is_event: MethodRef,
}

/// Resolved handles of the binder facility.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BinderRuntime {
    /// `System.Type`, element type of type-argument arrays.
    pub type_type: TypeRef,
    /// `Type.GetTypeFromHandle(RuntimeTypeHandle)`.
    pub type_from_handle: MethodRef,
    pub argument_info_type: TypeRef,
    pub argument_info_create: MethodRef,
    pub factories: BinderFactories,
    /// Generic definition of `CallSite<T>`.
    pub call_site: TypeId,
    pub call_site_factory: String,
    pub call_site_target: String,
    pub delegate_invoke: String,
}

impl BinderRuntime {
    /// Resolve every member the emitters call. A missing member means the
    /// universe does not describe the binder the profile names.
    pub fn resolve(universe: &TypeUniverse, profile: &BinderProfile) -> Result<Self, ResolveError> {
        let resolver = MemberResolver::new(universe);

        let type_type = universe.named(&profile.type_type)?;
        let handle = universe.named(&profile.runtime_handle_type)?;
        let type_from_handle = resolver.resolve_method(
            &type_type,
            &profile.type_from_handle,
            Some(std::slice::from_ref(&handle)),
        )?;

        let argument_info_type = universe.named(&profile.argument_info_type)?;
        let argument_info_create =
            resolver.resolve_method(&argument_info_type, &profile.argument_info_factory, None)?;

        let binder = universe.named(&profile.binder_type)?;
        let factory = |name: &str| resolver.resolve_method(&binder, name, None);
        let names = &profile.factories;
        let factories = BinderFactories {
            get_member: factory(&names.get_member)?,
            set_member: factory(&names.set_member)?,
            get_index: factory(&names.get_index)?,
            set_index: factory(&names.set_index)?,
            invoke_member: factory(&names.invoke_member)?,
            invoke: factory(&names.invoke)?,
            convert: factory(&names.convert)?,
            is_event: factory(&names.is_event)?,
        };

        let call_site = universe
            .find(&profile.call_site_type)
            .ok_or_else(|| UniverseError::UnknownType(profile.call_site_type.clone()))?;
        let missing = |member: &str| ResolveError::MemberNotFound {
            type_name: profile.call_site_type.clone(),
            member: member.to_owned(),
        };
        if universe
            .definition_methods(call_site, &profile.call_site_factory)
            .is_empty()
        {
            return Err(missing(&profile.call_site_factory));
        }
        if universe
            .definition_field(call_site, &profile.call_site_target)
            .is_none()
        {
            return Err(missing(&profile.call_site_target));
        }

        log::debug!(
            "binder runtime resolved: factories on `{}`, call sites `{}`",
            profile.binder_type,
            profile.call_site_type
        );

        Ok(Self {
            type_type,
            type_from_handle,
            argument_info_type,
            argument_info_create,
            factories,
            call_site,
            call_site_factory: profile.call_site_factory.clone(),
            call_site_target: profile.call_site_target.clone(),
            delegate_invoke: profile.delegate_invoke.clone(),
        })
    }

    /// `CallSite<delegate>`.
    pub fn call_site_of(&self, delegate: TypeRef) -> TypeRef {
        TypeRef::generic(self.call_site, [delegate])
    }
}
