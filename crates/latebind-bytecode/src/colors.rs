//! Terminal styling for [`dump`](crate::MethodBody::dump) listings.

/// ANSI escapes applied to each part of a listing. [`Colors::OFF`] makes the
/// listing plain text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Colors {
    /// Method names, labels and branch targets.
    pub label: &'static str,
    /// `ldstr` literals.
    pub string: &'static str,
    /// Instruction offsets, `.maxstack`, local slots.
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub const ON: Self = Self {
        label: "\x1b[34m",
        string: "\x1b[32m",
        muted: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        label: "",
        string: "",
        muted: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        *self != Self::OFF
    }
}
