#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Instruction set and method-body sink for latebind.
//!
//! This crate contains:
//! - The CIL-shaped opcode subset emitted by call-site stubs (`Opcode`)
//! - Instructions and their operands (`Instruction`, `Operand`)
//! - Labels and locals owned by one body (`Label`, `Local`)
//! - The sink capability emitters write into (`InstructionSink`)
//! - A concrete sink with stack tracking (`MethodBody`), its text dump and
//!   its ECMA-335 byte encoding (`TokenTable`)

mod body;
mod colors;
mod dump;
mod encode;
mod error;
mod instruction;
mod label;
mod opcode;
mod sink;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod body_tests;
#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod encode_tests;

pub use body::{FinishedBody, MethodBody, MethodBodyBuilder};
pub use colors::Colors;
pub use encode::{Token, TokenTable};
pub use error::SinkError;
pub use instruction::{Instruction, Operand, StackEffect};
pub use label::{BodyId, Label, Local};
pub use opcode::{Flow, Opcode, OperandKind};
pub use sink::InstructionSink;
