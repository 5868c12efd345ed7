use latebind_core::TypeRef;

use crate::error::SinkError;
use crate::instruction::Instruction;
use crate::label::{Label, Local};

/// Append-only emission target for one method body.
///
/// Emitters only ever append: they never inspect or rewrite what was
/// emitted before. Labels and locals handed out by a sink are only valid
/// on that sink.
pub trait InstructionSink {
    fn emit(&mut self, instruction: Instruction) -> Result<(), SinkError>;

    fn declare_local(&mut self, ty: TypeRef) -> Result<Local, SinkError>;

    /// Create an unresolved label.
    fn define_label(&mut self) -> Label;

    /// Resolve `label` at the current position.
    fn mark_label(&mut self, label: Label) -> Result<(), SinkError>;

    /// Number of instructions emitted so far.
    fn position(&self) -> usize;

    /// Operand-stack depth at the current position.
    fn stack_depth(&self) -> u32;
}
