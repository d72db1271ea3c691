//! Interned string identifier.
//!
//! A `Name` is a dense index into a [`StringInterner`](crate::StringInterner).
//! The first few indices are reserved for identifiers the declaration core
//! has to recognise without a lookup (entry points, the `this` parameter).

use std::fmt;

/// Interned string identifier.
///
/// Equality and hashing are on the raw index, so two names compare equal
/// exactly when they were interned from the same string by the same
/// interner.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);
    /// `main`
    pub const MAIN: Name = Name(1);
    /// `WinMain`
    pub const WIN_MAIN: Name = Name(2);
    /// `DllMain`
    pub const DLL_MAIN: Name = Name(3);
    /// `this`
    pub const THIS: Name = Name(4);
    /// `__result`, the synthesized result variable of out-contracts.
    pub const RESULT: Name = Name(5);
    /// `__ctor`
    pub const CTOR: Name = Name(6);
    /// `__dtor`
    pub const DTOR: Name = Name(7);
    /// `__postblit`
    pub const POSTBLIT: Name = Name(8);
    /// `__invariant`
    pub const INVARIANT: Name = Name(9);

    /// Strings occupying the reserved indices, in index order.
    pub(crate) const WELL_KNOWN: [&'static str; 10] = [
        "",
        "main",
        "WinMain",
        "DllMain",
        "this",
        "__result",
        "__ctor",
        "__dtor",
        "__postblit",
        "__invariant",
    ];

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into interner storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this name is one of the reserved, pre-interned identifiers.
    #[inline]
    pub const fn is_well_known(self) -> bool {
        (self.0 as usize) < Self::WELL_KNOWN.len()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::WELL_KNOWN.get(self.index()) {
            Some(s) => write!(f, "Name({}={s:?})", self.0),
            None => write!(f, "Name({})", self.0),
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
