//! Type references, generic parameters, and parameter metadata.

use std::collections::BTreeSet;

use serde::Deserialize;

/// Index of a type definition inside a [`TypeUniverse`](super::TypeUniverse).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a generic type definition that is still under construction.
///
/// Every [`GenericParam`] carries the context it belongs to, so a reference
/// built inside one open definition can never silently be used in another.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GenericContextId(pub(crate) u32);

impl GenericContextId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Type parameter of a definition under construction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GenericParam {
    pub context: GenericContextId,
    pub index: u16,
}

/// Reference to a type, as carried by instruction operands and signatures.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeRef {
    /// Non-generic type, or a generic definition left uninstantiated.
    Def(TypeId),
    /// Instantiation `def<args..>`.
    Generic { def: TypeId, args: Vec<TypeRef> },
    /// `!n`: n-th type parameter of the declaring definition.
    /// Only meaningful inside member signatures.
    Var(u16),
    /// Type parameter of a definition under construction.
    Param(GenericParam),
    /// Single-dimension, zero-based array.
    Array(Box<TypeRef>),
    /// Managed reference (`T&`).
    ByRef(Box<TypeRef>),
}

impl TypeRef {
    pub fn generic(def: TypeId, args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self::Generic {
            def,
            args: args.into_iter().collect(),
        }
    }

    pub fn array_of(element: TypeRef) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn by_ref(inner: TypeRef) -> Self {
        Self::ByRef(Box::new(inner))
    }

    /// Definition this reference names, if it names one.
    pub fn definition(&self) -> Option<TypeId> {
        match self {
            Self::Def(id) | Self::Generic { def: id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Type arguments of an instantiation; empty for everything else.
    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            Self::Generic { args, .. } => args,
            _ => &[],
        }
    }

    /// Replace every `!n` with `args[n]`. Variables without a matching
    /// argument are left in place.
    pub fn substitute(&self, args: &[TypeRef]) -> TypeRef {
        match self {
            Self::Var(n) => args.get(*n as usize).cloned().unwrap_or(Self::Var(*n)),
            Self::Generic { def, args: inner } => Self::Generic {
                def: *def,
                args: inner.iter().map(|a| a.substitute(args)).collect(),
            },
            Self::Array(e) => Self::array_of(e.substitute(args)),
            Self::ByRef(e) => Self::by_ref(e.substitute(args)),
            Self::Def(_) | Self::Param(_) => self.clone(),
        }
    }

    /// Whether any [`GenericParam`] occurs in this reference.
    pub fn has_params(&self) -> bool {
        !self.param_contexts().is_empty()
    }

    /// Generic contexts of all [`GenericParam`]s occurring in this reference.
    pub fn param_contexts(&self) -> BTreeSet<GenericContextId> {
        let mut out = BTreeSet::new();
        self.visit(&mut |t| {
            if let Self::Param(p) = t {
                out.insert(p.context);
            }
        });
        out
    }

    /// Pre-order walk over this reference and all nested references.
    pub(crate) fn visit(&self, f: &mut impl FnMut(&TypeRef)) {
        f(self);
        match self {
            Self::Generic { args, .. } => args.iter().for_each(|a| a.visit(f)),
            Self::Array(e) | Self::ByRef(e) => e.visit(f),
            Self::Def(_) | Self::Var(_) | Self::Param(_) => {}
        }
    }
}

/// How an argument is passed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Passing {
    #[default]
    Value,
    /// By reference (`ref`).
    Ref,
    /// Output-only by reference (`out`).
    Out,
}

/// Parameter metadata: what a proxy caller knows about one formal parameter.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ParamInfo {
    pub name: Option<String>,
    /// Declared type, without the by-reference wrapper.
    pub ty: TypeRef,
    pub passing: Passing,
}

impl ParamInfo {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            name: None,
            ty,
            passing: Passing::Value,
        }
    }

    pub fn named(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(ty)
        }
    }

    pub fn with_passing(mut self, passing: Passing) -> Self {
        self.passing = passing;
        self
    }

    pub fn is_out(&self) -> bool {
        self.passing == Passing::Out
    }

    /// True for both `ref` and `out` parameters.
    pub fn is_by_ref(&self) -> bool {
        self.passing != Passing::Value
    }

    /// Type as it appears in a method signature (`T&` for `ref`/`out`).
    pub fn signature_type(&self) -> TypeRef {
        if self.is_by_ref() {
            TypeRef::by_ref(self.ty.clone())
        } else {
            self.ty.clone()
        }
    }
}
