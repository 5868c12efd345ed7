//! Member references: fields and methods bound to a declaring type.

use super::types::{GenericContextId, TypeRef};
use super::universe::{FieldDef, MethodDef};

/// A field, bound to the (possibly instantiated) type that declares it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FieldRef {
    pub declaring: TypeRef,
    pub name: String,
    /// Field type with the declaring type's arguments substituted.
    pub field_type: TypeRef,
    pub is_static: bool,
    /// Set for deferred references obtained through an open generic context.
    pub context: Option<GenericContextId>,
}

impl FieldRef {
    /// Bind a field definition found on `owner` (in definition form, where the
    /// owner's own parameters appear as `!n`) to the instantiation `args`.
    pub fn bind(
        owner: &TypeRef,
        def: &FieldDef,
        args: &[TypeRef],
        context: Option<GenericContextId>,
    ) -> Self {
        let declaring = owner.substitute(args);
        let field_type = def.ty.substitute(declaring.type_args());
        Self {
            declaring,
            name: def.name.clone(),
            field_type,
            is_static: def.is_static,
            context,
        }
    }

    pub fn is_deferred(&self) -> bool {
        self.context.is_some()
    }
}

/// A method, bound to the (possibly instantiated) type that declares it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MethodRef {
    pub declaring: TypeRef,
    pub name: String,
    /// Parameter types as they appear in the signature, instantiated.
    pub params: Vec<TypeRef>,
    pub ret: Option<TypeRef>,
    pub has_this: bool,
    pub is_virtual: bool,
    /// Set for deferred references obtained through an open generic context.
    pub context: Option<GenericContextId>,
}

impl MethodRef {
    /// Bind a method definition found on `owner` to the instantiation `args`.
    /// See [`FieldRef::bind`].
    pub fn bind(
        owner: &TypeRef,
        def: &MethodDef,
        args: &[TypeRef],
        context: Option<GenericContextId>,
    ) -> Self {
        let declaring = owner.substitute(args);
        let inst = declaring.type_args();
        Self {
            params: def
                .params
                .iter()
                .map(|p| p.signature_type().substitute(inst))
                .collect(),
            ret: def.ret.as_ref().map(|r| r.substitute(inst)),
            declaring,
            name: def.name.clone(),
            has_this: !def.is_static,
            is_virtual: def.is_virtual,
            context,
        }
    }

    /// Operand-stack slots consumed by a call: arguments plus `this`.
    pub fn pops(&self) -> u32 {
        self.params.len() as u32 + u32::from(self.has_this)
    }

    /// Operand-stack slots produced by a call.
    pub fn pushes(&self) -> u32 {
        u32::from(self.ret.is_some())
    }

    pub fn is_deferred(&self) -> bool {
        self.context.is_some()
    }
}
