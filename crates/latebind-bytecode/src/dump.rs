//! Human-readable listing of a method body.
//!
//! ```text
//! .method get_Name
//! .maxstack 3
//! .locals
//!   [0] Object[]
//!   00  ldarg.0
//!   01  brtrue L0
//!   02  ldstr "x"
//! L0:
//!   03  ret
//! ```
//!
//! Types print without namespaces. Compact opcodes print no operand.

use std::fmt::Write as _;

use latebind_core::{TypeRef, TypeUniverse};

use crate::body::{FinishedBody, MethodBody};
use crate::colors::Colors;
use crate::instruction::{Instruction, Operand};
use crate::label::Label;

struct Listing<'a> {
    name: &'a str,
    max_stack: u32,
    locals: &'a [TypeRef],
    instructions: &'a [Instruction],
    labels: &'a [(usize, Label)],
}

impl MethodBody {
    /// Dump the instructions emitted so far.
    pub fn dump(&self, universe: &TypeUniverse, colors: Colors) -> String {
        let labels = self.marked_labels();
        let listing = Listing {
            name: self.name(),
            max_stack: self.max_stack_depth(),
            locals: self.locals(),
            instructions: self.instructions(),
            labels: &labels,
        };
        write_listing(&listing, universe, colors)
    }
}

impl FinishedBody {
    pub fn dump(&self, universe: &TypeUniverse, colors: Colors) -> String {
        let listing = Listing {
            name: self.name(),
            max_stack: u32::from(self.max_stack()),
            locals: self.locals(),
            instructions: self.instructions(),
            labels: self.labels(),
        };
        write_listing(&listing, universe, colors)
    }
}

fn write_listing(listing: &Listing<'_>, universe: &TypeUniverse, c: Colors) -> String {
    let mut out = String::new();
    let _ = writeln!(out, ".method {}{}{}", c.label, listing.name, c.reset);
    let _ = writeln!(out, "{}.maxstack {}{}", c.muted, listing.max_stack, c.reset);

    if !listing.locals.is_empty() {
        out.push_str(".locals\n");
        for (i, ty) in listing.locals.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}[{i}]{} {}",
                c.muted,
                c.reset,
                universe.display_short(ty)
            );
        }
    }

    let mut labels = listing.labels.iter().peekable();
    for (idx, instr) in listing.instructions.iter().enumerate() {
        while let Some((_, label)) = labels.next_if(|(pos, _)| *pos == idx) {
            let _ = writeln!(out, "{}{label}:{}", c.label, c.reset);
        }
        let _ = write!(out, "  {}{idx:02}{}  {}", c.muted, c.reset, instr.opcode);
        write_operand(&mut out, instr, universe, c);
        out.push('\n');
    }
    // Labels marked at the very end.
    for (_, label) in labels {
        let _ = writeln!(out, "{}{label}:{}", c.label, c.reset);
    }
    out
}

fn write_operand(out: &mut String, instr: &Instruction, universe: &TypeUniverse, c: Colors) {
    if instr.opcode.implicit_operand().is_some() {
        return;
    }
    let _ = match &instr.operand {
        Operand::None => Ok(()),
        Operand::Arg(i) => write!(out, " {i}"),
        Operand::Local(l) => write!(out, " {}", l.index()),
        Operand::Int(n) => write!(out, " {n}"),
        Operand::Str(s) => write!(out, " {}{s:?}{}", c.string, c.reset),
        Operand::Type(ty) => write!(out, " {}", universe.display_short(ty)),
        Operand::Field(f) => write!(out, " {}::{}", universe.display_short(&f.declaring), f.name),
        Operand::Method(m) => write!(out, " {}::{}", universe.display_short(&m.declaring), m.name),
        Operand::Label(l) => write!(out, " {}{l}{}", c.label, c.reset),
    };
}
