//! The type-system collaborator.
//!
//! Types are owned by the type system. Layout and purity classification
//! only need a handful of facts about them, which callers supply through
//! [`TypeQuery`].

use dsem_ir::TypeRef;

/// Most permissive indirection reachable through a value of a type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Indirection {
    /// Plain data, no pointers.
    None,
    /// Only pointers to immutable data.
    Immutable,
    /// Pointers to const data.
    Const,
    /// Pointers to mutable data.
    Mutable,
}

/// Facts about types, answered by the type system.
pub trait TypeQuery {
    /// Size in bytes.
    fn size(&self, ty: TypeRef) -> u32;

    /// Natural alignment in bytes.
    fn alignment(&self, ty: TypeRef) -> u32;

    /// Whether values of the type contain pointers the collector must scan.
    fn has_pointers(&self, ty: TypeRef) -> bool;

    fn indirection(&self, ty: TypeRef) -> Indirection;
}
