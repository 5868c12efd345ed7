//! ECMA-335 method-body encoding.
//!
//! Metadata tokens are allocated by a [`TokenTable`] shared by all bodies of
//! one module: each distinct reference gets one row, numbered from 1 in
//! insertion order. Branches always use the long (4-byte offset) form.

use std::fmt;

use indexmap::IndexSet;
use latebind_core::{FieldRef, MethodRef, StringHeap, TypeRef};

use crate::body::FinishedBody;
use crate::instruction::Operand;

/// Metadata token: table number in the high byte, 1-based row below.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Token(u32);

impl Token {
    pub const TYPE_REF: u8 = 0x01;
    pub const MEMBER_REF: u8 = 0x0A;
    pub const STAND_ALONE_SIG: u8 = 0x11;
    pub const TYPE_SPEC: u8 = 0x1B;

    fn new(table: u8, index: usize) -> Self {
        Self((u32::from(table) << 24) | (index as u32 + 1))
    }

    pub fn table(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn row(self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum MemberKey {
    Field(FieldRef),
    Method(MethodRef),
}

/// Token allocation for the references a module's bodies use.
#[derive(Debug, Default)]
pub struct TokenTable {
    type_refs: IndexSet<TypeRef>,
    type_specs: IndexSet<TypeRef>,
    members: IndexSet<MemberKey>,
    signatures: IndexSet<Vec<TypeRef>>,
    strings: StringHeap,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `TypeRef` row for plain definitions, `TypeSpec` row for anything
    /// constructed (instantiations, arrays, parameters).
    pub fn type_token(&mut self, ty: &TypeRef) -> Token {
        match ty {
            TypeRef::Def(_) => Token::new(Token::TYPE_REF, insert(&mut self.type_refs, ty.clone())),
            _ => Token::new(Token::TYPE_SPEC, insert(&mut self.type_specs, ty.clone())),
        }
    }

    pub fn field_token(&mut self, field: &FieldRef) -> Token {
        let index = insert(&mut self.members, MemberKey::Field(field.clone()));
        Token::new(Token::MEMBER_REF, index)
    }

    pub fn method_token(&mut self, method: &MethodRef) -> Token {
        let index = insert(&mut self.members, MemberKey::Method(method.clone()));
        Token::new(Token::MEMBER_REF, index)
    }

    /// `StandAloneSig` row for a local-variable signature.
    pub fn locals_token(&mut self, locals: &[TypeRef]) -> Token {
        let index = insert(&mut self.signatures, locals.to_vec());
        Token::new(Token::STAND_ALONE_SIG, index)
    }

    pub fn strings(&self) -> &StringHeap {
        &self.strings
    }

    pub fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.type_refs.iter()
    }

    pub fn type_specs(&self) -> impl Iterator<Item = &TypeRef> {
        self.type_specs.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    fn operand_token(&mut self, operand: &Operand) -> Option<u32> {
        Some(match operand {
            Operand::Str(s) => self.strings.intern(s).token(),
            Operand::Type(ty) => self.type_token(ty).as_u32(),
            Operand::Field(f) => self.field_token(f).as_u32(),
            Operand::Method(m) => self.method_token(m).as_u32(),
            _ => return None,
        })
    }
}

fn insert<T: std::hash::Hash + Eq>(set: &mut IndexSet<T>, value: T) -> usize {
    set.insert_full(value).0
}

const TINY_FORMAT: u8 = 0x2;
const FAT_FORMAT: u16 = 0x3;
const INIT_LOCALS: u16 = 0x10;
/// Fat header size in 4-byte units, stored in the top nibble of the flags.
const FAT_HEADER_DWORDS: u16 = 3;

impl FinishedBody {
    /// Encode header and code bytes. Tokens are allocated in `tokens`.
    ///
    /// A tiny header is used when the code is shorter than 64 bytes, the
    /// stack never exceeds 8 slots and no locals are declared.
    pub fn encode(&self, tokens: &mut TokenTable) -> Vec<u8> {
        let code = self.encode_code(tokens);
        let max_stack = self.max_stack();

        let mut out = Vec::with_capacity(code.len() + 12);
        if code.len() < 64 && max_stack <= 8 && self.locals().is_empty() {
            out.push(((code.len() as u8) << 2) | TINY_FORMAT);
        } else {
            let mut flags = FAT_FORMAT | (FAT_HEADER_DWORDS << 12);
            let mut sig = 0;
            if !self.locals().is_empty() {
                flags |= INIT_LOCALS;
                sig = tokens.locals_token(self.locals()).as_u32();
            }
            out.extend_from_slice(&flags.to_le_bytes());
            out.extend_from_slice(&max_stack.to_le_bytes());
            out.extend_from_slice(&(code.len() as u32).to_le_bytes());
            out.extend_from_slice(&sig.to_le_bytes());
        }
        out.extend_from_slice(&code);
        out
    }

    fn encode_code(&self, tokens: &mut TokenTable) -> Vec<u8> {
        let instructions = self.instructions();

        let mut offsets = Vec::with_capacity(instructions.len() + 1);
        let mut offset = 0usize;
        for instr in instructions {
            offsets.push(offset);
            offset += instr.opcode.size();
        }
        offsets.push(offset);

        let mut code = Vec::with_capacity(offset);
        for (i, instr) in instructions.iter().enumerate() {
            let opcode = instr.opcode;
            let [prefix, byte] = opcode.code().to_be_bytes();
            if opcode.is_two_byte() {
                code.push(prefix);
            }
            code.push(byte);
            if opcode.operand_size() == 0 {
                continue;
            }

            match &instr.operand {
                Operand::Arg(index) => code.extend_from_slice(&index.to_le_bytes()),
                Operand::Local(local) => code.extend_from_slice(&local.index().to_le_bytes()),
                Operand::Int(n) if opcode.operand_size() == 1 => code.push(*n as i8 as u8),
                Operand::Int(n) => code.extend_from_slice(&n.to_le_bytes()),
                Operand::Label(label) => {
                    // Finished bodies have every label marked.
                    let target = self.label_position(*label).map_or(0, |pos| offsets[pos]);
                    let delta = target as i64 - offsets[i + 1] as i64;
                    code.extend_from_slice(&(delta as i32).to_le_bytes());
                }
                operand => {
                    if let Some(token) = tokens.operand_token(operand) {
                        code.extend_from_slice(&token.to_le_bytes());
                    }
                }
            }
        }
        code
    }
}
