//! Instructions and operands.

use latebind_core::{FieldRef, MethodRef, TypeRef};

use crate::label::{Label, Local};
use crate::opcode::{Opcode, OperandKind};

/// Instruction operand.
///
/// Compact opcodes (`ldarg.2`, `ldc.i4.5`) still carry the operand they
/// imply, so every argument, local and constant is visible to readers of an
/// instruction stream. The encoder omits it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Operand {
    None,
    Arg(u16),
    Local(Local),
    Int(i32),
    Str(String),
    Type(TypeRef),
    Field(FieldRef),
    Method(MethodRef),
    Label(Label),
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Self::None => OperandKind::None,
            Self::Arg(_) => OperandKind::Arg,
            Self::Local(_) => OperandKind::Local,
            Self::Int(_) => OperandKind::Int,
            Self::Str(_) => OperandKind::Str,
            Self::Type(_) => OperandKind::Type,
            Self::Field(_) => OperandKind::Field,
            Self::Method(_) => OperandKind::Method,
            Self::Label(_) => OperandKind::Label,
        }
    }

    /// Numeric value of index and constant operands.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Arg(i) => Some(i32::from(*i)),
            Self::Local(l) => Some(i32::from(l.index())),
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Operand-stack slots consumed and produced by one instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StackEffect {
    pub pops: u32,
    pub pushes: u32,
}

impl StackEffect {
    const fn new(pops: u32, pushes: u32) -> Self {
        Self { pops, pushes }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// Instruction without an operand.
    pub fn simple(opcode: Opcode) -> Self {
        Self::new(opcode, Operand::None)
    }

    /// Stack effect. `ret` pops the return value only when the enclosing
    /// body returns one.
    pub fn stack_effect(&self, body_returns: bool) -> StackEffect {
        use Opcode::*;
        match self.opcode {
            Nop | Br => StackEffect::new(0, 0),
            Ldarg0 | Ldarg1 | Ldarg2 | Ldarg3 | Ldarg | Ldloc0 | Ldloc1 | Ldloc2 | Ldloc3
            | Ldloc | Ldnull | LdcI4M1 | LdcI4_0 | LdcI4_1 | LdcI4_2 | LdcI4_3 | LdcI4_4
            | LdcI4_5 | LdcI4_6 | LdcI4_7 | LdcI4_8 | LdcI4S | LdcI4 | Ldstr | Ldtoken
            | Ldsfld => StackEffect::new(0, 1),
            Stloc0 | Stloc1 | Stloc2 | Stloc3 | Stloc | Pop | Brtrue | Brfalse | Stsfld => {
                StackEffect::new(1, 0)
            }
            Dup => StackEffect::new(1, 2),
            Ldfld | Newarr => StackEffect::new(1, 1),
            Stfld => StackEffect::new(2, 0),
            StelemRef => StackEffect::new(3, 0),
            Ret => StackEffect::new(u32::from(body_returns), 0),
            Call | Callvirt => match &self.operand {
                Operand::Method(m) => StackEffect::new(m.pops(), m.pushes()),
                _ => StackEffect::default(),
            },
        }
    }
}
