//! Array building from per-slot emitters.

use latebind_bytecode::InstructionSink;
use latebind_core::TypeRef;

use crate::error::EmitError;
use crate::writer::EmitExt;

/// Emit an array of `element` with one slot per emitter and leave it on the
/// stack.
///
/// ```text
///     ldc.i4 N
///     newarr element
///     stloc tmp
///     ; for each slot i:
///     ldloc tmp
///     ldc.i4 i
///     <emitters[i]>       ; exactly one element value
///     stelem.ref
///     ; then:
///     ldloc tmp
/// ```
///
/// Slot `i` receives the value of `emitters[i]`. Debug builds check that
/// every emitter leaves exactly one value.
pub fn emit_array<S, I, F>(sink: &mut S, element: &TypeRef, emitters: I) -> Result<(), EmitError>
where
    S: InstructionSink + ?Sized,
    I: IntoIterator<Item = F>,
    I::IntoIter: ExactSizeIterator,
    F: FnOnce(&mut S) -> Result<(), EmitError>,
{
    let emitters = emitters.into_iter();
    let len = emitters.len();
    let count = i32::try_from(len).map_err(|_| EmitError::TooManyElements(len))?;

    sink.load_int(count)?;
    sink.new_array(element.clone())?;
    let array = sink.declare_local(TypeRef::array_of(element.clone()))?;
    sink.store_local(array)?;

    for (slot, emit) in emitters.enumerate() {
        sink.load_local(array)?;
        sink.load_int(slot as i32)?;
        let before = sink.stack_depth();
        emit(&mut *sink)?;
        check_single_value(sink, slot, before)?;
        sink.store_element_ref()?;
    }

    sink.load_local(array)?;
    Ok(())
}

#[cfg(debug_assertions)]
fn check_single_value<S>(sink: &S, slot: usize, before: u32) -> Result<(), EmitError>
where
    S: InstructionSink + ?Sized,
{
    let after = sink.stack_depth();
    if after != before + 1 {
        return Err(EmitError::StackImbalance {
            slot,
            before,
            after,
        });
    }
    Ok(())
}

#[cfg(not(debug_assertions))]
#[inline(always)]
fn check_single_value<S>(_: &S, _: usize, _: u32) -> Result<(), EmitError>
where
    S: InstructionSink + ?Sized,
{
    Ok(())
}
