//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::metadata::{GenericContext, GenericContextId, TypeDef, TypeId, TypeUniverse};

impl TypeUniverse {
    pub(crate) fn ensure_type(&self, id: TypeId) -> &TypeDef {
        self.try_get(id).unwrap_or_else(|| {
            panic!(
                "TypeUniverse: type id {} not found \
                 (ids are only valid for the universe that issued them)",
                id.as_u32()
            )
        })
    }

    pub(crate) fn ensure_context(&self, id: GenericContextId) -> &GenericContext {
        self.context(id).unwrap_or_else(|| {
            panic!(
                "TypeUniverse: generic context {} not found \
                 (contexts are only valid for the universe that opened them)",
                id.as_u32()
            )
        })
    }
}
