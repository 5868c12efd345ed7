//! Scoped branch-if-true block.
//!
//! ```text
//!     <condition>
//!     brtrue Lskip        ; begin_branch_if_true
//!     <guarded block>     ; runs only when the condition is false/null
//! Lskip:                  ; release / drop
//! ```
//!
//! The guarded block is the *false* path. Callers use it for one-time lazy
//! initialization: load a cache slot, skip the fill when it is already set.

use std::ops::{Deref, DerefMut};

use latebind_bytecode::{InstructionSink, Label, SinkError};

use crate::writer::EmitExt;

/// Open branch-if-true scope over a sink.
///
/// Emits into the sink go through the scope (it derefs to the sink). The
/// skip label is marked exactly once: by [`release`](Self::release) or,
/// on early exit, when the scope is dropped.
///
/// Drop can only log a failed mark. Callers that need the error call
/// `release`, which returns it.
#[must_use = "the guarded block ends where the scope is released"]
pub struct ScopedBranch<'s, S: InstructionSink + ?Sized> {
    sink: &'s mut S,
    label: Option<Label>,
}

/// Pop the condition and branch past the following block when it is true.
pub fn begin_branch_if_true<S>(sink: &mut S) -> Result<ScopedBranch<'_, S>, SinkError>
where
    S: InstructionSink + ?Sized,
{
    let label = sink.define_label();
    if let Err(err) = sink.branch_if_true(label) {
        // Nothing jumps here; marking keeps the body finishable.
        sink.mark_label(label)?;
        return Err(err);
    }
    Ok(ScopedBranch {
        sink,
        label: Some(label),
    })
}

impl<S: InstructionSink + ?Sized> ScopedBranch<'_, S> {
    /// Label the branch jumps to; unresolved until release.
    pub fn label(&self) -> Option<Label> {
        self.label
    }

    /// End the guarded block here.
    pub fn release(mut self) -> Result<(), SinkError> {
        self.resolve()
    }

    fn resolve(&mut self) -> Result<(), SinkError> {
        match self.label.take() {
            Some(label) => self.sink.mark_label(label),
            None => Ok(()),
        }
    }
}

impl<S: InstructionSink + ?Sized> Deref for ScopedBranch<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.sink
    }
}

impl<S: InstructionSink + ?Sized> DerefMut for ScopedBranch<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.sink
    }
}

impl<S: InstructionSink + ?Sized> Drop for ScopedBranch<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.resolve() {
            log::error!("scoped branch target left unresolved: {err}");
        }
    }
}
