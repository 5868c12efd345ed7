//! Type definitions and the universe that owns them.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use super::error::UniverseError;
use super::member::{FieldRef, MethodRef};
use super::name::parse_type_name;
use super::types::{GenericContextId, GenericParam, ParamInfo, TypeId, TypeRef};

/// Category of a type definition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl TypeKind {
    pub fn is_value_type(self) -> bool {
        matches!(self, Self::Struct | Self::Enum)
    }
}

/// Field declared on a type. Signature types use `!n` for the declaring
/// definition's own parameters.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
}

impl FieldDef {
    pub fn instance(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
        }
    }

    pub fn static_field(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            is_static: true,
            ..Self::instance(name, ty)
        }
    }
}

/// Method declared on a type.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub ret: Option<TypeRef>,
    pub is_static: bool,
    pub is_virtual: bool,
}

impl MethodDef {
    pub fn instance(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            ret: None,
            is_static: false,
            is_virtual: false,
        }
    }

    pub fn static_method(name: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::instance(name)
        }
    }

    pub fn param(mut self, ty: TypeRef) -> Self {
        self.params.push(ParamInfo::new(ty));
        self
    }

    pub fn param_info(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.ret = Some(ty);
        self
    }

    pub fn with_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Signature types, with `ref`/`out` parameters as `T&`.
    pub fn signature(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.params.iter().map(ParamInfo::signature_type)
    }
}

/// A type definition.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeDef {
    name: String,
    kind: TypeKind,
    generic_params: Vec<String>,
    base: Option<TypeRef>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    /// Set while the definition is under construction.
    context: Option<GenericContextId>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            generic_params: Vec::new(),
            base: None,
            fields: Vec::new(),
            methods: Vec::new(),
            context: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn value_type(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    pub fn with_generic_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace: `System.Func`2` -> `Func`2`.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn arity(&self) -> usize {
        self.generic_params.len()
    }

    pub fn generic_params(&self) -> &[String] {
        &self.generic_params
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    /// Generic context of a definition under construction.
    pub fn context(&self) -> Option<GenericContextId> {
        self.context
    }

    pub fn is_under_construction(&self) -> bool {
        self.context.is_some()
    }
}

/// Parameters of a generic definition under construction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GenericContext {
    owner: TypeId,
    params: Vec<String>,
}

impl GenericContext {
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// All known type definitions.
///
/// Definitions are addressed by [`TypeId`] and by full name. Generic
/// definitions that are still being built get a [`GenericContextId`]; their
/// parameters and anything mentioning them are *open*, and open types do not
/// answer direct member queries.
#[derive(Clone, Debug, Default)]
pub struct TypeUniverse {
    types: Vec<TypeDef>,
    by_name: IndexMap<String, TypeId>,
    contexts: Vec<GenericContext>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a finished type.
    pub fn define(&mut self, def: TypeDef) -> Result<TypeId, UniverseError> {
        if self.by_name.contains_key(&def.name) {
            return Err(UniverseError::DuplicateType(def.name));
        }
        let id = TypeId(self.types.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.types.push(TypeDef { context: None, ..def });
        Ok(id)
    }

    /// Define a generic type that is still under construction and open a
    /// generic context for its parameters.
    pub fn begin_generic_type(
        &mut self,
        def: TypeDef,
    ) -> Result<(TypeId, GenericContextId), UniverseError> {
        if def.generic_params.is_empty() {
            return Err(UniverseError::NotGeneric(def.name));
        }
        let params = def.generic_params.clone();
        let id = self.define(def)?;
        let ctx = GenericContextId(self.contexts.len() as u32);
        self.contexts.push(GenericContext { owner: id, params });
        self.types[id.index()].context = Some(ctx);
        Ok((id, ctx))
    }

    /// Mark a definition under construction as finished. Its instantiations
    /// become closed and answer direct member queries.
    pub fn finish_type(&mut self, id: TypeId) {
        if let Some(def) = self.types.get_mut(id.index()) {
            def.context = None;
        }
    }

    pub fn add_field(&mut self, id: TypeId, field: FieldDef) -> Result<(), UniverseError> {
        let def = self.def_mut(id)?;
        if def.fields.iter().any(|f| f.name == field.name) {
            return Err(UniverseError::DuplicateMember {
                type_name: def.name.clone(),
                member: field.name,
            });
        }
        def.fields.push(field);
        Ok(())
    }

    pub fn add_method(&mut self, id: TypeId, method: MethodDef) -> Result<(), UniverseError> {
        self.def_mut(id)?.methods.push(method);
        Ok(())
    }

    pub(crate) fn set_base(&mut self, id: TypeId, base: TypeRef) -> Result<(), UniverseError> {
        self.def_mut(id)?.base = Some(base);
        Ok(())
    }

    fn def_mut(&mut self, id: TypeId) -> Result<&mut TypeDef, UniverseError> {
        self.types
            .get_mut(id.index())
            .ok_or(UniverseError::UnknownTypeId(id.as_u32()))
    }

    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Reference to a named type (`Def`), failing for unknown names.
    pub fn named(&self, name: &str) -> Result<TypeRef, UniverseError> {
        self.find(name)
            .map(TypeRef::Def)
            .ok_or_else(|| UniverseError::UnknownType(name.to_owned()))
    }

    /// Parse a type name such as `System.Func`2<System.Object, !0>[]`.
    pub fn parse(&self, name: &str) -> Result<TypeRef, UniverseError> {
        parse_type_name(name, self)
    }

    /// Definition by id.
    ///
    /// # Panics
    /// Panics if the id was not issued by this universe.
    pub fn get(&self, id: TypeId) -> &TypeDef {
        self.ensure_type(id)
    }

    pub fn try_get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.index())
    }

    pub fn context(&self, id: GenericContextId) -> Option<&GenericContext> {
        self.contexts.get(id.0 as usize)
    }

    /// The `index`-th parameter of an open context, as a type reference.
    pub fn param(&self, ctx: GenericContextId, index: u16) -> TypeRef {
        let context = self.ensure_context(ctx);
        assert!(
            (index as usize) < context.params.len(),
            "generic context {} has no parameter {index}",
            ctx.0
        );
        TypeRef::Param(GenericParam {
            context: ctx,
            index,
        })
    }

    /// The open instantiation of a definition under construction:
    /// `Def<T0, T1, ..>` with its own context parameters as arguments.
    pub fn open_instantiation(&self, id: TypeId) -> Option<TypeRef> {
        let ctx = self.get(id).context?;
        let arity = self.ensure_context(ctx).params.len() as u16;
        Some(TypeRef::generic(
            id,
            (0..arity).map(|index| TypeRef::Param(GenericParam { context: ctx, index })),
        ))
    }

    /// A definition in definition form: `Def<!0, !1, ..>` for generic
    /// definitions, plain `Def` otherwise.
    pub fn definition_form(&self, id: TypeId) -> TypeRef {
        let arity = self.get(id).arity() as u16;
        if arity == 0 {
            TypeRef::Def(id)
        } else {
            TypeRef::generic(id, (0..arity).map(TypeRef::Var))
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, d)| (TypeId(i as u32), d))
    }

    pub fn is_value_type(&self, ty: &TypeRef) -> bool {
        ty.definition()
            .and_then(|id| self.try_get(id))
            .is_some_and(|d| d.kind.is_value_type())
    }

    /// Open generic contexts a reference depends on: contexts of parameters
    /// it mentions plus contexts of definitions under construction it names.
    pub fn contexts_of(&self, ty: &TypeRef) -> BTreeSet<GenericContextId> {
        let mut out = BTreeSet::new();
        ty.visit(&mut |t| match t {
            TypeRef::Param(p) => {
                out.insert(p.context);
            }
            TypeRef::Def(id) | TypeRef::Generic { def: id, .. } => {
                if let Some(ctx) = self.try_get(*id).and_then(|d| d.context) {
                    out.insert(ctx);
                }
            }
            _ => {}
        });
        out
    }

    /// Capability check: does this reference still depend on a definition
    /// under construction?
    pub fn is_open(&self, ty: &TypeRef) -> bool {
        !self.contexts_of(ty).is_empty()
    }

    /// The single open context of a reference, `None` for closed references.
    pub fn open_context(&self, ty: &TypeRef) -> Result<Option<GenericContextId>, UniverseError> {
        let contexts = self.contexts_of(ty);
        match contexts.len() {
            0 => Ok(None),
            1 => Ok(contexts.into_iter().next()),
            _ => Err(UniverseError::MixedContexts(self.display(ty).to_string())),
        }
    }

    /// Supertype chain of a definition in definition form, starting with the
    /// definition itself. Base references are substituted along the way, so
    /// every entry is expressed in the starting definition's `!n`.
    pub fn definition_hierarchy(&self, id: TypeId) -> Vec<TypeRef> {
        let mut chain = vec![self.definition_form(id)];
        while chain.len() <= self.types.len() {
            let Some(current) = chain.last() else { break };
            let Some(def) = current.definition().and_then(|d| self.try_get(d)) else {
                break;
            };
            let Some(base) = def.base.as_ref() else { break };
            let next = base.substitute(current.type_args());
            chain.push(next);
        }
        chain
    }

    /// First field named `name` on a definition or its supertypes.
    pub fn definition_field(&self, id: TypeId, name: &str) -> Option<(TypeRef, &FieldDef)> {
        self.definition_hierarchy(id).into_iter().find_map(|owner| {
            let def = self.try_get(owner.definition()?)?;
            let field = def.fields.iter().find(|f| f.name == name)?;
            Some((owner, field))
        })
    }

    /// All methods named `name` on a definition and its supertypes. Methods
    /// on a derived type hide same-signature methods further up.
    pub fn definition_methods(&self, id: TypeId, name: &str) -> Vec<(TypeRef, &MethodDef)> {
        let mut out: Vec<(TypeRef, &MethodDef)> = Vec::new();
        // Signatures in the starting definition's `!n`, parallel to `out`.
        let mut seen: Vec<Vec<TypeRef>> = Vec::new();
        for owner in self.definition_hierarchy(id) {
            let Some(def) = owner.definition().and_then(|d| self.try_get(d)) else {
                continue;
            };
            for method in def.methods.iter().filter(|m| m.name == name) {
                let signature: Vec<TypeRef> = method
                    .signature()
                    .map(|t| t.substitute(owner.type_args()))
                    .collect();
                if !seen.contains(&signature) {
                    seen.push(signature);
                    out.push((owner.clone(), method));
                }
            }
        }
        out
    }

    /// Direct field lookup on a closed type.
    ///
    /// Refuses open types: members of a definition under construction can
    /// only be reached through its generic definition.
    pub fn lookup_field(&self, ty: &TypeRef, name: &str) -> Result<Option<FieldRef>, UniverseError> {
        let id = self.closed_definition(ty)?;
        Ok(self
            .definition_field(id, name)
            .map(|(owner, field)| FieldRef::bind(&owner, field, ty.type_args(), None)))
    }

    /// Direct method lookup on a closed type: every overload named `name`.
    pub fn lookup_methods(&self, ty: &TypeRef, name: &str) -> Result<Vec<MethodRef>, UniverseError> {
        let id = self.closed_definition(ty)?;
        Ok(self
            .definition_methods(id, name)
            .into_iter()
            .map(|(owner, method)| MethodRef::bind(&owner, method, ty.type_args(), None))
            .collect())
    }

    fn closed_definition(&self, ty: &TypeRef) -> Result<TypeId, UniverseError> {
        if self.is_open(ty) {
            return Err(UniverseError::OpenInstantiation(self.display(ty).to_string()));
        }
        ty.definition()
            .ok_or_else(|| UniverseError::NoMembers(self.display(ty).to_string()))
    }

    /// Displays a reference with full type names.
    pub fn display<'a>(&'a self, ty: &'a TypeRef) -> TypeDisplay<'a> {
        TypeDisplay {
            universe: self,
            ty,
            short: false,
        }
    }

    /// Displays a reference with namespaces stripped.
    pub fn display_short<'a>(&'a self, ty: &'a TypeRef) -> TypeDisplay<'a> {
        TypeDisplay {
            universe: self,
            ty,
            short: true,
        }
    }
}

/// [`fmt::Display`] adapter for [`TypeRef`].
pub struct TypeDisplay<'a> {
    universe: &'a TypeUniverse,
    ty: &'a TypeRef,
    short: bool,
}

impl TypeDisplay<'_> {
    fn nested<'b>(&'b self, ty: &'b TypeRef) -> TypeDisplay<'b> {
        TypeDisplay {
            universe: self.universe,
            ty,
            short: self.short,
        }
    }

    fn write_def(&self, f: &mut fmt::Formatter<'_>, id: TypeId) -> fmt::Result {
        match self.universe.try_get(id) {
            Some(def) if self.short => f.write_str(def.short_name()),
            Some(def) => f.write_str(def.name()),
            None => write!(f, "<type#{}>", id.0),
        }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            TypeRef::Def(id) => self.write_def(f, *id),
            TypeRef::Generic { def, args } => {
                self.write_def(f, *def)?;
                f.write_str("<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.nested(arg))?;
                }
                f.write_str(">")
            }
            TypeRef::Var(n) => write!(f, "!{n}"),
            TypeRef::Param(p) => {
                let name = self
                    .universe
                    .context(p.context)
                    .and_then(|c| c.params.get(p.index as usize));
                match name {
                    Some(name) => f.write_str(name),
                    None => write!(f, "!!{}@{}", p.index, p.context.0),
                }
            }
            TypeRef::Array(e) => write!(f, "{}[]", self.nested(e)),
            TypeRef::ByRef(e) => write!(f, "{}&", self.nested(e)),
        }
    }
}
