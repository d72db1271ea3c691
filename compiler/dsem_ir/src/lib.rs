//! dsem IR - shared leaf types for the declaration core.
//!
//! This crate holds the small, `Copy` building blocks every other dsem
//! crate passes around:
//! - [`Name`]: interned identifiers (32-bit handles)
//! - [`Span`]: byte ranges into the source file
//! - [`TypeRef`], [`ExprRef`], [`StmtRef`]: handles to data owned by the
//!   type system, expression and statement collaborators
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers are `Name(u32)`, compared in O(1)
//! - **Reference, Don't Own**: types, expressions and statements live in
//!   their owners' arenas; the declaration core only stores handles

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-stored types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod handle;
mod interner;
mod name;
mod span;

pub use handle::{ExprRef, StmtRef, TypeRef};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use span::Span;

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{Name, Span, TypeRef};
    crate::static_assert_size!(Name, 4);
    crate::static_assert_size!(Span, 8);
    crate::static_assert_size!(TypeRef, 4);
    crate::static_assert_size!(Option<TypeRef>, 8);
}
