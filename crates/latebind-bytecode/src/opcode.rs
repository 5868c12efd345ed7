//! Opcode subset used by call-site stubs.
//!
//! Codes follow ECMA-335 Partition III. Two-byte opcodes carry the `0xFE`
//! prefix in their high byte.

use std::fmt;

/// Kind of operand an opcode takes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum OperandKind {
    None,
    /// Argument index.
    Arg,
    /// Local declared on the same body.
    Local,
    /// Integer constant.
    Int,
    /// String literal (`ldstr`).
    Str,
    Type,
    Field,
    Method,
    /// Branch target.
    Label,
}

impl OperandKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "no",
            Self::Arg => "an argument",
            Self::Local => "a local",
            Self::Int => "an integer",
            Self::Str => "a string",
            Self::Type => "a type",
            Self::Field => "a field",
            Self::Method => "a method",
            Self::Label => "a label",
        }
    }
}

/// How control leaves an instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    /// Falls through to the next instruction.
    Next,
    /// Always jumps.
    Branch,
    /// Jumps or falls through.
    CondBranch,
    Return,
}

macro_rules! opcodes {
    ($($variant:ident = $code:literal, $mnemonic:literal, $kind:ident;)*) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant,)*];

            /// Numeric code; two-byte opcodes include the `0xFE` prefix.
            pub fn code(self) -> u16 {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic,)*
                }
            }

            pub fn operand_kind(self) -> OperandKind {
                match self {
                    $(Self::$variant => OperandKind::$kind,)*
                }
            }
        }
    };
}

opcodes! {
    Nop = 0x00, "nop", None;
    Ldarg0 = 0x02, "ldarg.0", Arg;
    Ldarg1 = 0x03, "ldarg.1", Arg;
    Ldarg2 = 0x04, "ldarg.2", Arg;
    Ldarg3 = 0x05, "ldarg.3", Arg;
    Ldloc0 = 0x06, "ldloc.0", Local;
    Ldloc1 = 0x07, "ldloc.1", Local;
    Ldloc2 = 0x08, "ldloc.2", Local;
    Ldloc3 = 0x09, "ldloc.3", Local;
    Stloc0 = 0x0A, "stloc.0", Local;
    Stloc1 = 0x0B, "stloc.1", Local;
    Stloc2 = 0x0C, "stloc.2", Local;
    Stloc3 = 0x0D, "stloc.3", Local;
    Ldnull = 0x14, "ldnull", None;
    LdcI4M1 = 0x15, "ldc.i4.m1", Int;
    LdcI4_0 = 0x16, "ldc.i4.0", Int;
    LdcI4_1 = 0x17, "ldc.i4.1", Int;
    LdcI4_2 = 0x18, "ldc.i4.2", Int;
    LdcI4_3 = 0x19, "ldc.i4.3", Int;
    LdcI4_4 = 0x1A, "ldc.i4.4", Int;
    LdcI4_5 = 0x1B, "ldc.i4.5", Int;
    LdcI4_6 = 0x1C, "ldc.i4.6", Int;
    LdcI4_7 = 0x1D, "ldc.i4.7", Int;
    LdcI4_8 = 0x1E, "ldc.i4.8", Int;
    LdcI4S = 0x1F, "ldc.i4.s", Int;
    LdcI4 = 0x20, "ldc.i4", Int;
    Dup = 0x25, "dup", None;
    Pop = 0x26, "pop", None;
    Call = 0x28, "call", Method;
    Ret = 0x2A, "ret", None;
    Br = 0x38, "br", Label;
    Brfalse = 0x39, "brfalse", Label;
    Brtrue = 0x3A, "brtrue", Label;
    Callvirt = 0x6F, "callvirt", Method;
    Ldstr = 0x72, "ldstr", Str;
    Ldfld = 0x7B, "ldfld", Field;
    Stfld = 0x7D, "stfld", Field;
    Ldsfld = 0x7E, "ldsfld", Field;
    Stsfld = 0x80, "stsfld", Field;
    Newarr = 0x8D, "newarr", Type;
    StelemRef = 0xA2, "stelem.ref", None;
    Ldtoken = 0xD0, "ldtoken", Type;
    Ldarg = 0xFE09, "ldarg", Arg;
    Ldloc = 0xFE0C, "ldloc", Local;
    Stloc = 0xFE0E, "stloc", Local;
}

impl Opcode {
    /// Compact `ldarg.N` for indices 0-3.
    pub fn compact_ldarg(index: u16) -> Option<Self> {
        Some(match index {
            0 => Self::Ldarg0,
            1 => Self::Ldarg1,
            2 => Self::Ldarg2,
            3 => Self::Ldarg3,
            _ => return None,
        })
    }

    /// Compact `ldloc.N` for indices 0-3.
    pub fn compact_ldloc(index: u16) -> Option<Self> {
        Some(match index {
            0 => Self::Ldloc0,
            1 => Self::Ldloc1,
            2 => Self::Ldloc2,
            3 => Self::Ldloc3,
            _ => return None,
        })
    }

    /// Compact `stloc.N` for indices 0-3.
    pub fn compact_stloc(index: u16) -> Option<Self> {
        Some(match index {
            0 => Self::Stloc0,
            1 => Self::Stloc1,
            2 => Self::Stloc2,
            3 => Self::Stloc3,
            _ => return None,
        })
    }

    /// Compact `ldc.i4.N` for -1..=8.
    pub fn compact_ldc(value: i32) -> Option<Self> {
        Some(match value {
            -1 => Self::LdcI4M1,
            0 => Self::LdcI4_0,
            1 => Self::LdcI4_1,
            2 => Self::LdcI4_2,
            3 => Self::LdcI4_3,
            4 => Self::LdcI4_4,
            5 => Self::LdcI4_5,
            6 => Self::LdcI4_6,
            7 => Self::LdcI4_7,
            8 => Self::LdcI4_8,
            _ => return None,
        })
    }

    /// Operand value baked into a compact opcode, if this is one.
    pub fn implicit_operand(self) -> Option<i32> {
        Some(match self {
            Self::Ldarg0 | Self::Ldloc0 | Self::Stloc0 | Self::LdcI4_0 => 0,
            Self::Ldarg1 | Self::Ldloc1 | Self::Stloc1 | Self::LdcI4_1 => 1,
            Self::Ldarg2 | Self::Ldloc2 | Self::Stloc2 | Self::LdcI4_2 => 2,
            Self::Ldarg3 | Self::Ldloc3 | Self::Stloc3 | Self::LdcI4_3 => 3,
            Self::LdcI4_4 => 4,
            Self::LdcI4_5 => 5,
            Self::LdcI4_6 => 6,
            Self::LdcI4_7 => 7,
            Self::LdcI4_8 => 8,
            Self::LdcI4M1 => -1,
            _ => return None,
        })
    }

    pub fn is_two_byte(self) -> bool {
        self.code() > 0xFF
    }

    /// Encoded size of the operand in bytes.
    pub fn operand_size(self) -> usize {
        if self.implicit_operand().is_some() {
            return 0;
        }
        match self.operand_kind() {
            OperandKind::None => 0,
            OperandKind::Arg | OperandKind::Local => 2,
            OperandKind::Int if self == Self::LdcI4S => 1,
            OperandKind::Int
            | OperandKind::Str
            | OperandKind::Type
            | OperandKind::Field
            | OperandKind::Method
            | OperandKind::Label => 4,
        }
    }

    /// Encoded size of the whole instruction.
    pub fn size(self) -> usize {
        let opcode = if self.is_two_byte() { 2 } else { 1 };
        opcode + self.operand_size()
    }

    pub fn flow(self) -> Flow {
        match self {
            Self::Br => Flow::Branch,
            Self::Brtrue | Self::Brfalse => Flow::CondBranch,
            Self::Ret => Flow::Return,
            _ => Flow::Next,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
