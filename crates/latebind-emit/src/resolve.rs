//! Member lookup that also works inside generic types under construction.
//!
//! A type that mentions parameters of a definition still being built (for
//! example `CallSite<Func<CallSite, T, object>>` inside `Sites<T>`) cannot
//! answer member queries directly. Such a type is classified as
//! [`LookupScope::OpenGeneric`]: the member is found on the generic
//! definition and then bound to the open instantiation, yielding a deferred
//! reference tagged with the open context.

use latebind_core::{
    FieldRef, GenericContextId, MethodRef, TypeId, TypeRef, TypeUniverse,
};

use crate::error::ResolveError;

/// Arguments of an open instantiation and the context they belong to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GenericBinding {
    pub context: GenericContextId,
    pub args: Vec<TypeRef>,
}

/// Where a member lookup happens.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum LookupScope {
    /// Closed type: look the member up directly.
    Closed(TypeRef),
    /// Open instantiation: look up on `definition`, then bind.
    OpenGeneric {
        definition: TypeId,
        binding: GenericBinding,
    },
}

impl LookupScope {
    pub fn classify(universe: &TypeUniverse, ty: &TypeRef) -> Result<Self, ResolveError> {
        let Some(context) = universe.open_context(ty)? else {
            return Ok(Self::Closed(ty.clone()));
        };
        let definition = ty
            .definition()
            .ok_or_else(|| ResolveError::NoDefinition(universe.display(ty).to_string()))?;

        // A bare definition under construction stands for its own open
        // instantiation.
        let args = match ty {
            TypeRef::Def(id) => universe
                .open_instantiation(*id)
                .map(|inst| inst.type_args().to_vec())
                .unwrap_or_default(),
            _ => ty.type_args().to_vec(),
        };
        Ok(Self::OpenGeneric {
            definition,
            binding: GenericBinding { context, args },
        })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::OpenGeneric { .. })
    }
}

/// Field and method resolution against a [`TypeUniverse`].
#[derive(Clone, Copy)]
pub struct MemberResolver<'u> {
    universe: &'u TypeUniverse,
}

impl<'u> MemberResolver<'u> {
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self { universe }
    }

    pub fn universe(&self) -> &'u TypeUniverse {
        self.universe
    }

    pub fn resolve_field(&self, ty: &TypeRef, name: &str) -> Result<FieldRef, ResolveError> {
        let field = match LookupScope::classify(self.universe, ty)? {
            LookupScope::Closed(closed) => self.universe.lookup_field(&closed, name)?,
            LookupScope::OpenGeneric {
                definition,
                binding,
            } => self
                .universe
                .definition_field(definition, name)
                .map(|(owner, def)| FieldRef::bind(&owner, def, &binding.args, Some(binding.context))),
        };
        field.ok_or_else(|| self.not_found(ty, name.to_owned()))
    }

    /// Resolve a method by name.
    ///
    /// With `param_types`, the overload whose instantiated parameter types
    /// match exactly. Without, the single method of that name.
    pub fn resolve_method(
        &self,
        ty: &TypeRef,
        name: &str,
        param_types: Option<&[TypeRef]>,
    ) -> Result<MethodRef, ResolveError> {
        let candidates = match LookupScope::classify(self.universe, ty)? {
            LookupScope::Closed(closed) => self.universe.lookup_methods(&closed, name)?,
            LookupScope::OpenGeneric {
                definition,
                binding,
            } => self
                .universe
                .definition_methods(definition, name)
                .into_iter()
                .map(|(owner, def)| MethodRef::bind(&owner, def, &binding.args, Some(binding.context)))
                .collect(),
        };

        match param_types {
            Some(wanted) => candidates
                .into_iter()
                .find(|m| m.params == wanted)
                .ok_or_else(|| self.not_found(ty, self.signature(name, wanted))),
            None => {
                let count = candidates.len();
                let mut candidates = candidates.into_iter();
                match (candidates.next(), count) {
                    (Some(method), 1) => Ok(method),
                    (None, _) => Err(self.not_found(ty, name.to_owned())),
                    (Some(_), _) => Err(ResolveError::AmbiguousMethod {
                        type_name: self.universe.display(ty).to_string(),
                        member: name.to_owned(),
                        candidates: count,
                    }),
                }
            }
        }
    }

    fn signature(&self, name: &str, params: &[TypeRef]) -> String {
        let params: Vec<String> = params
            .iter()
            .map(|p| self.universe.display(p).to_string())
            .collect();
        format!("{name}({})", params.join(", "))
    }

    fn not_found(&self, ty: &TypeRef, member: String) -> ResolveError {
        ResolveError::MemberNotFound {
            type_name: self.universe.display(ty).to_string(),
            member,
        }
    }
}
