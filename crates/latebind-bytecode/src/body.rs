//! Concrete method-body sink with stack and label tracking.

use std::collections::BTreeSet;

use latebind_core::{GenericContextId, TypeRef};

use crate::error::SinkError;
use crate::instruction::{Instruction, Operand};
use crate::label::{BodyId, Label, Local};
use crate::opcode::{Flow, Opcode};
use crate::sink::InstructionSink;

#[derive(Clone, Copy, Debug, Default)]
struct LabelSlot {
    position: Option<usize>,
    /// Stack depth every path into the label must agree on.
    depth: Option<u32>,
}

/// An in-progress method body.
///
/// Tracks operand-stack depth across straight-line code and branches:
/// every branch into a label and the fall-through at its mark must agree on
/// the depth. After `br` or `ret` the stack is empty until the next mark.
#[derive(Debug)]
pub struct MethodBody {
    id: BodyId,
    name: String,
    /// Argument slots, including `this` for instance methods.
    arg_count: u16,
    returns: bool,
    context: Option<GenericContextId>,
    instructions: Vec<Instruction>,
    locals: Vec<TypeRef>,
    labels: Vec<LabelSlot>,
    depth: u32,
    max_depth: u32,
    reachable: bool,
}

/// Builder for [`MethodBody`].
pub struct MethodBodyBuilder {
    name: String,
    arg_count: u16,
    returns: bool,
    context: Option<GenericContextId>,
}

impl MethodBodyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_count: 0,
            returns: false,
            context: None,
        }
    }

    /// Number of argument slots, `this` included.
    pub fn args(mut self, count: u16) -> Self {
        self.arg_count = count;
        self
    }

    /// Whether `ret` pops a return value.
    pub fn returns(mut self, returns: bool) -> Self {
        self.returns = returns;
        self
    }

    /// Generic context of the type under construction that hosts this body.
    /// References mentioning any other open context are rejected.
    pub fn context(mut self, context: GenericContextId) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> MethodBody {
        MethodBody {
            id: BodyId::fresh(),
            name: self.name,
            arg_count: self.arg_count,
            returns: self.returns,
            context: self.context,
            instructions: Vec::new(),
            locals: Vec::new(),
            labels: Vec::new(),
            depth: 0,
            max_depth: 0,
            reachable: true,
        }
    }
}

impl MethodBody {
    pub fn builder(name: impl Into<String>) -> MethodBodyBuilder {
        MethodBodyBuilder::new(name)
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arg_count(&self) -> u16 {
        self.arg_count
    }

    pub fn returns_value(&self) -> bool {
        self.returns
    }

    pub fn context(&self) -> Option<GenericContextId> {
        self.context
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn locals(&self) -> &[TypeRef] {
        &self.locals
    }

    pub fn max_stack_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether control can reach the current position.
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Instruction index a label was marked at.
    pub fn label_position(&self, label: Label) -> Option<usize> {
        if label.body != self.id {
            return None;
        }
        self.labels.get(label.index as usize)?.position
    }

    pub(crate) fn marked_labels(&self) -> Vec<(usize, Label)> {
        let mut out: Vec<(usize, Label)> = self
            .labels
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let label = Label {
                    body: self.id,
                    index: i as u32,
                };
                slot.position.map(|pos| (pos, label))
            })
            .collect();
        out.sort_by_key(|(pos, label)| (*pos, label.index));
        out
    }

    /// Check that every label is marked and control never falls off the end.
    pub fn finish(self) -> Result<FinishedBody, SinkError> {
        if let Some(index) = self.labels.iter().position(|s| s.position.is_none()) {
            return Err(SinkError::UnresolvedLabel(Label {
                body: self.id,
                index: index as u32,
            }));
        }
        if self.reachable {
            return Err(SinkError::FallsThrough);
        }
        let max_stack =
            u16::try_from(self.max_depth).map_err(|_| SinkError::StackTooDeep(self.max_depth))?;

        log::debug!(
            "finished `{}`: {} instructions, {} locals, maxstack {}",
            self.name,
            self.instructions.len(),
            self.locals.len(),
            max_stack
        );

        let labels = self.marked_labels();
        Ok(FinishedBody {
            id: self.id,
            name: self.name,
            max_stack,
            locals: self.locals,
            instructions: self.instructions,
            labels,
        })
    }

    fn check_operand(&self, instruction: &Instruction) -> Result<(), SinkError> {
        let opcode = instruction.opcode;
        let mismatch = |expected: &'static str| SinkError::OperandMismatch {
            mnemonic: opcode.mnemonic(),
            expected,
        };
        let kind = opcode.operand_kind();
        if instruction.operand.kind() != kind {
            return Err(mismatch(kind.name()));
        }
        if let Some(implied) = opcode.implicit_operand()
            && instruction.operand.as_int() != Some(implied)
        {
            return Err(mismatch("its implied"));
        }

        match &instruction.operand {
            Operand::Int(n) if opcode == Opcode::LdcI4S && i8::try_from(*n).is_err() => {
                Err(mismatch("a signed 8-bit"))
            }
            Operand::Arg(index) if *index >= self.arg_count => Err(SinkError::UnknownArgument(*index)),
            Operand::Local(local) => self.check_local(*local),
            Operand::Label(label) => self.check_label(*label).map(|_| ()),
            Operand::Type(ty) => self.check_contexts(ty.param_contexts()),
            Operand::Field(field) => {
                let wants_static = matches!(opcode, Opcode::Ldsfld | Opcode::Stsfld);
                if field.is_static != wants_static {
                    return Err(mismatch(if wants_static {
                        "a static field"
                    } else {
                        "an instance field"
                    }));
                }
                let mut contexts = field.declaring.param_contexts();
                contexts.extend(field.context);
                self.check_contexts(contexts)
            }
            Operand::Method(method) => {
                if opcode == Opcode::Callvirt && !method.has_this {
                    return Err(mismatch("an instance method"));
                }
                let mut contexts = method.declaring.param_contexts();
                contexts.extend(method.context);
                for ty in method.params.iter().chain(&method.ret) {
                    contexts.extend(ty.param_contexts());
                }
                self.check_contexts(contexts)
            }
            _ => Ok(()),
        }
    }

    fn check_local(&self, local: Local) -> Result<(), SinkError> {
        if local.body != self.id {
            return Err(SinkError::ForeignLocal(local.index));
        }
        if usize::from(local.index) >= self.locals.len() {
            return Err(SinkError::UnknownLocal(local.index));
        }
        Ok(())
    }

    fn check_label(&self, label: Label) -> Result<usize, SinkError> {
        if label.body != self.id || label.index as usize >= self.labels.len() {
            return Err(SinkError::ForeignLabel(label));
        }
        Ok(label.index as usize)
    }

    fn check_contexts(&self, contexts: BTreeSet<GenericContextId>) -> Result<(), SinkError> {
        match contexts.into_iter().find(|c| Some(*c) != self.context) {
            Some(foreign) => Err(SinkError::ForeignContext(foreign.as_u32())),
            None => Ok(()),
        }
    }

    /// Record (or check) the depth a branch carries into its target.
    fn record_branch(&mut self, label: Label, depth: u32) -> Result<(), SinkError> {
        let index = self.check_label(label)?;
        let slot = &mut self.labels[index];
        match slot.depth {
            Some(expected) if expected != depth => Err(SinkError::StackMismatch {
                label,
                expected,
                found: depth,
            }),
            Some(_) => Ok(()),
            None => {
                slot.depth = Some(depth);
                Ok(())
            }
        }
    }
}

impl InstructionSink for MethodBody {
    fn emit(&mut self, instruction: Instruction) -> Result<(), SinkError> {
        self.check_operand(&instruction)?;

        // Code after an unconditional transfer starts with an empty stack.
        let before = if self.reachable { self.depth } else { 0 };
        let effect = instruction.stack_effect(self.returns);
        if before < effect.pops {
            return Err(SinkError::StackUnderflow {
                mnemonic: instruction.opcode.mnemonic(),
                needed: effect.pops,
                depth: before,
            });
        }
        let after = before - effect.pops + effect.pushes;

        let flow = instruction.opcode.flow();
        match (flow, &instruction.operand) {
            (Flow::Branch | Flow::CondBranch, Operand::Label(label)) => {
                self.record_branch(*label, after)?;
            }
            (Flow::Return, _) if after != 0 => {
                return Err(SinkError::StackNotEmptyAtReturn(after));
            }
            _ => {}
        }

        self.depth = after;
        self.max_depth = self.max_depth.max(after);
        self.reachable = !matches!(flow, Flow::Branch | Flow::Return);
        self.instructions.push(instruction);
        Ok(())
    }

    fn declare_local(&mut self, ty: TypeRef) -> Result<Local, SinkError> {
        self.check_contexts(ty.param_contexts())?;
        let index = u16::try_from(self.locals.len()).map_err(|_| SinkError::TooManyLocals)?;
        self.locals.push(ty);
        Ok(Local {
            body: self.id,
            index,
        })
    }

    fn define_label(&mut self) -> Label {
        self.labels.push(LabelSlot::default());
        Label {
            body: self.id,
            index: (self.labels.len() - 1) as u32,
        }
    }

    fn mark_label(&mut self, label: Label) -> Result<(), SinkError> {
        let index = self.check_label(label)?;
        let position = self.instructions.len();
        let reachable = self.reachable;
        let current = self.depth;
        let slot = &mut self.labels[index];
        if slot.position.is_some() {
            return Err(SinkError::LabelAlreadyMarked(label));
        }

        let depth = match (reachable, slot.depth) {
            (true, Some(expected)) if expected != current => {
                return Err(SinkError::StackMismatch {
                    label,
                    expected,
                    found: current,
                });
            }
            (true, _) => current,
            (false, recorded) => recorded.unwrap_or(0),
        };
        slot.position = Some(position);
        slot.depth = Some(depth);

        self.depth = depth;
        self.reachable = true;
        log::trace!("`{}`: {label} marked at {position}, depth {depth}", self.name);
        Ok(())
    }

    fn position(&self) -> usize {
        self.instructions.len()
    }

    fn stack_depth(&self) -> u32 {
        if self.reachable { self.depth } else { 0 }
    }
}

/// A method body that passed [`MethodBody::finish`]: every label is
/// marked and control never falls off the end.
#[derive(Debug, Clone)]
pub struct FinishedBody {
    id: BodyId,
    name: String,
    max_stack: u16,
    locals: Vec<TypeRef>,
    instructions: Vec<Instruction>,
    /// Marked labels by position.
    labels: Vec<(usize, Label)>,
}

impl FinishedBody {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }

    pub fn locals(&self) -> &[TypeRef] {
        &self.locals
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn label_position(&self, label: Label) -> Option<usize> {
        if label.body != self.id {
            return None;
        }
        self.labels
            .iter()
            .find(|(_, l)| *l == label)
            .map(|(pos, _)| *pos)
    }

    pub(crate) fn labels(&self) -> &[(usize, Label)] {
        &self.labels
    }
}
