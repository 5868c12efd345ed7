//! Instruction writer: one helper per instruction the emitters use.
//!
//! Argument, local and constant loads pick the compact opcode when one
//! exists (`ldarg.0`..`ldarg.3`, `ldc.i4.m1`..`ldc.i4.8`) and the general
//! indexed form otherwise.

use latebind_bytecode::{Instruction, InstructionSink, Label, Local, Opcode, Operand, SinkError};
use latebind_core::{FieldRef, MethodRef, TypeRef};

/// Emission helpers available on every [`InstructionSink`].
pub trait EmitExt: InstructionSink {
    fn load_argument(&mut self, index: u16) -> Result<(), SinkError> {
        let opcode = Opcode::compact_ldarg(index).unwrap_or(Opcode::Ldarg);
        self.emit(Instruction::new(opcode, Operand::Arg(index)))
    }

    fn load_local(&mut self, local: Local) -> Result<(), SinkError> {
        let opcode = Opcode::compact_ldloc(local.index()).unwrap_or(Opcode::Ldloc);
        self.emit(Instruction::new(opcode, Operand::Local(local)))
    }

    fn store_local(&mut self, local: Local) -> Result<(), SinkError> {
        let opcode = Opcode::compact_stloc(local.index()).unwrap_or(Opcode::Stloc);
        self.emit(Instruction::new(opcode, Operand::Local(local)))
    }

    fn load_int(&mut self, value: i32) -> Result<(), SinkError> {
        let opcode = match Opcode::compact_ldc(value) {
            Some(op) => op,
            None if i8::try_from(value).is_ok() => Opcode::LdcI4S,
            None => Opcode::LdcI4,
        };
        self.emit(Instruction::new(opcode, Operand::Int(value)))
    }

    fn load_string(&mut self, value: &str) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Ldstr, Operand::Str(value.to_owned())))
    }

    fn load_null(&mut self) -> Result<(), SinkError> {
        self.emit(Instruction::simple(Opcode::Ldnull))
    }

    /// `ldtoken` of a type handle.
    fn load_token(&mut self, ty: TypeRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Ldtoken, Operand::Type(ty)))
    }

    fn call(&mut self, method: MethodRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Call, Operand::Method(method)))
    }

    fn call_virtual(&mut self, method: MethodRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Callvirt, Operand::Method(method)))
    }

    fn load_field(&mut self, field: FieldRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Ldfld, Operand::Field(field)))
    }

    fn store_field(&mut self, field: FieldRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Stfld, Operand::Field(field)))
    }

    fn load_static_field(&mut self, field: FieldRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Ldsfld, Operand::Field(field)))
    }

    fn store_static_field(&mut self, field: FieldRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Stsfld, Operand::Field(field)))
    }

    /// `newarr`: pops a length, pushes a zero-based array of `element`.
    fn new_array(&mut self, element: TypeRef) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Newarr, Operand::Type(element)))
    }

    fn store_element_ref(&mut self) -> Result<(), SinkError> {
        self.emit(Instruction::simple(Opcode::StelemRef))
    }

    fn branch(&mut self, target: Label) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Br, Operand::Label(target)))
    }

    fn branch_if_true(&mut self, target: Label) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Brtrue, Operand::Label(target)))
    }

    fn branch_if_false(&mut self, target: Label) -> Result<(), SinkError> {
        self.emit(Instruction::new(Opcode::Brfalse, Operand::Label(target)))
    }

    fn dup(&mut self) -> Result<(), SinkError> {
        self.emit(Instruction::simple(Opcode::Dup))
    }

    fn pop(&mut self) -> Result<(), SinkError> {
        self.emit(Instruction::simple(Opcode::Pop))
    }

    fn ret(&mut self) -> Result<(), SinkError> {
        self.emit(Instruction::simple(Opcode::Ret))
    }
}

impl<S: InstructionSink + ?Sized> EmitExt for S {}
