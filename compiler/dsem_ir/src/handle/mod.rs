//! Handles to data owned by collaborators.
//!
//! The declaration core never inspects or mutates types, expressions or
//! statements. It stores these 32-bit handles and hands them back to the
//! owning services (the match-level oracle, the type query interface,
//! the code generator).

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a handle from its raw index.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw index.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_handle!(
    /// A type owned by the type system.
    TypeRef,
    "ty#"
);
define_handle!(
    /// An expression owned by the expression arena.
    ExprRef,
    "expr#"
);
define_handle!(
    /// A statement owned by the statement arena.
    StmtRef,
    "stmt#"
);

#[cfg(test)]
mod tests;
