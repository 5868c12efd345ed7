//! Errors raised by instruction sinks.

use crate::label::Label;

/// Faults detected while appending to a method body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("`{mnemonic}` needs {needed} stack values but only {depth} are available")]
    StackUnderflow {
        mnemonic: &'static str,
        needed: u32,
        depth: u32,
    },

    #[error("stack depth at {label} is {expected} on one path and {found} on another")]
    StackMismatch {
        label: Label,
        expected: u32,
        found: u32,
    },

    #[error("`ret` leaves {0} extra values on the stack")]
    StackNotEmptyAtReturn(u32),

    #[error("{0} belongs to a different method body")]
    ForeignLabel(Label),

    #[error("local {0} belongs to a different method body")]
    ForeignLocal(u16),

    #[error("{0} is already marked")]
    LabelAlreadyMarked(Label),

    #[error("{0} was never marked")]
    UnresolvedLabel(Label),

    #[error("method body declares no local {0}")]
    UnknownLocal(u16),

    #[error("method body has no argument {0}")]
    UnknownArgument(u16),

    #[error("reference uses generic context #{0}, which this body is not part of")]
    ForeignContext(u32),

    #[error("`{mnemonic}` expects {expected} operand")]
    OperandMismatch {
        mnemonic: &'static str,
        expected: &'static str,
    },

    #[error("control falls off the end of the method body")]
    FallsThrough,

    #[error("method body declares more than {} locals", u16::MAX)]
    TooManyLocals,

    #[error("maximum stack depth {0} exceeds the encodable limit")]
    StackTooDeep(u32),
}
