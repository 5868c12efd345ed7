//! Labels and locals. Both are handles owned by the body that created them.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_BODY: AtomicU32 = AtomicU32::new(0);

/// Identity of one method body. Labels and locals carry it so a sink can
/// reject handles created by another sink.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BodyId(u32);

impl BodyId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_BODY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Forward-reference handle. Created unresolved, marked exactly once.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Label {
    pub(crate) body: BodyId,
    pub(crate) index: u32,
}

impl Label {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn body(self) -> BodyId {
        self.body
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.index)
    }
}

/// Local variable slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Local {
    pub(crate) body: BodyId,
    pub(crate) index: u16,
}

impl Local {
    pub fn index(self) -> u16 {
        self.index
    }

    pub fn body(self) -> BodyId {
        self.body
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V_{}", self.index)
    }
}
