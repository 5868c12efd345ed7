//! Binder and argument flag sets.
//!
//! Bit values match `CSharpBinderFlags` and `CSharpArgumentInfoFlags`, so a
//! set is emitted as a plain `ldc.i4` of its bits.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use latebind_core::ParamInfo;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlagError {
    #[error("{set} has no flag with bits {bits:#x}")]
    UnknownBits { set: &'static str, bits: u32 },

    #[error("{set} flags {first} and {second} cannot be combined")]
    Exclusive {
        set: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($(#[$flag_meta:meta])* const $flag:ident = $bit:expr;)*
        }
        exclusive [$(($a:ident, $b:ident)),* $(,)?]
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u32);

        impl $name {
            pub const NONE: Self = Self(0);
            $($(#[$flag_meta])* pub const $flag: Self = Self($bit);)*

            const NAMES: &'static [(&'static str, u32)] = &[$((stringify!($flag), $bit),)*];
            const KNOWN: u32 = 0 $(| $bit)*;
            const EXCLUSIVE: &'static [(&'static str, u32, &'static str, u32)] =
                &[$((stringify!($a), Self::$a.0, stringify!($b), Self::$b.0),)*];

            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Flag set from raw bits; fails on unknown bits or on
            /// combinations that exclude each other.
            pub fn from_bits(bits: u32) -> Result<Self, FlagError> {
                Self(bits).validate()
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn validate(self) -> Result<Self, FlagError> {
                let unknown = self.0 & !Self::KNOWN;
                if unknown != 0 {
                    return Err(FlagError::UnknownBits {
                        set: stringify!($name),
                        bits: unknown,
                    });
                }
                for &(first, a, second, b) in Self::EXCLUSIVE {
                    if self.0 & a != 0 && self.0 & b != 0 {
                        return Err(FlagError::Exclusive {
                            set: stringify!($name),
                            first,
                            second,
                        });
                    }
                }
                Ok(self)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                if self.0 == 0 {
                    f.write_str("NONE")?;
                }
                let mut sep = "";
                for &(name, bit) in Self::NAMES {
                    if self.0 & bit != 0 {
                        write!(f, "{sep}{name}")?;
                        sep = " | ";
                    }
                }
                let unknown = self.0 & !Self::KNOWN;
                if unknown != 0 {
                    write!(f, "{sep}{unknown:#x}")?;
                }
                f.write_str(")")
            }
        }
    };
}

flag_set! {
    /// Per-argument flags of a call-site argument descriptor.
    pub struct ArgumentFlags {
        /// Bind using the argument's static type instead of its runtime type.
        const USE_COMPILE_TIME_TYPE = 1;
        const CONSTANT = 2;
        const NAMED_ARGUMENT = 4;
        const IS_REF = 8;
        const IS_OUT = 16;
        const IS_STATIC_TYPE = 32;
    }
    exclusive [(IS_REF, IS_OUT)]
}

flag_set! {
    /// Operation-level flags passed to every binder factory.
    pub struct BinderFlags {
        const CHECKED_CONTEXT = 1;
        const INVOKE_SIMPLE_NAME = 2;
        const INVOKE_SPECIAL_NAME = 4;
        const BINARY_OPERATION_LOGICAL = 8;
        const CONVERT_EXPLICIT = 16;
        const CONVERT_ARRAY_INDEX = 32;
        const RESULT_INDEXED = 64;
        const VALUE_FROM_COMPOUND_ASSIGNMENT = 128;
        const RESULT_DISCARDED = 256;
    }
    exclusive []
}

impl ArgumentFlags {
    /// Descriptor flags for a formal parameter of an invoked member:
    /// compile-time typed, plus `IS_OUT` for `out` or `IS_REF` for `ref`.
    pub fn for_parameter(param: &ParamInfo) -> Self {
        let mut flags = Self::USE_COMPILE_TIME_TYPE;
        if param.is_out() {
            flags |= Self::IS_OUT;
        } else if param.is_by_ref() {
            flags |= Self::IS_REF;
        }
        flags
    }
}
