//! Attribute inference.
//!
//! Functions whose attributes are not written out (templates, literals,
//! functions marked for inference) get `pure`, `@safe`, `nothrow` and
//! `@nogc` inferred from the effects semantic analysis recorded in their
//! bodies.
//!
//! # Cycles
//!
//! Inference walks the call graph depth-first, keeping every function it
//! has entered but not concluded on a stack. A call back into a function on
//! the stack is assumed to hold. A function that leaned on such an
//! assumption stays on the stack until the function it leaned on is done,
//! so each call cycle concludes as a whole: it holds if every member holds
//! and fails as soon as one member fails. Each function is visited at most
//! once per query, however dense the cycle.
//!
//! # Downgrades
//!
//! An effect reported after a function concluded can take an inferred
//! attribute away again. Every caller that holds the attribute through a
//! call to it loses the attribute too, transitively; a caller that wrote the
//! attribute out gets a violation instead.
//!
//! Concluded results are cached on the declaration: the storage-class bit is
//! set and the attribute is recorded in [`FuncDecl::concluded`](crate::FuncDecl).

mod engine;
mod purity;

pub use engine::AttributeInference;
pub use purity::PurityLevel;

use bitflags::bitflags;
use dsem_ir::Span;

use crate::ids::DeclId;
use crate::stc::StorageClass;

/// An inferable function attribute.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Attribute {
    Purity,
    Safety,
    Nothrow,
    Nogc,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Purity,
        Attribute::Safety,
        Attribute::Nothrow,
        Attribute::Nogc,
    ];

    pub const fn as_set(self) -> AttrSet {
        match self {
            Attribute::Purity => AttrSet::PURITY,
            Attribute::Safety => AttrSet::SAFETY,
            Attribute::Nothrow => AttrSet::NOTHROW,
            Attribute::Nogc => AttrSet::NOGC,
        }
    }

    /// Storage-class bit recording that the attribute holds.
    pub const fn stc(self) -> StorageClass {
        match self {
            Attribute::Purity => StorageClass::PURE,
            Attribute::Safety => StorageClass::SAFE,
            Attribute::Nothrow => StorageClass::NOTHROW,
            Attribute::Nogc => StorageClass::NOGC,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Attribute::Purity => "pure",
            Attribute::Safety => "@safe",
            Attribute::Nothrow => "nothrow",
            Attribute::Nogc => "@nogc",
        }
    }

    /// Whether `stc` guarantees the attribute. `@trusted` satisfies safety.
    pub fn holds_in(self, stc: StorageClass) -> bool {
        match self {
            Attribute::Safety => stc.intersects(StorageClass::SAFE | StorageClass::TRUSTED),
            _ => stc.intersects(self.stc()),
        }
    }
}

bitflags! {
    /// A set of [`Attribute`]s.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct AttrSet: u8 {
        const PURITY = 1 << 0;
        const SAFETY = 1 << 1;
        const NOTHROW = 1 << 2;
        const NOGC = 1 << 3;
    }
}

impl Default for AttrSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl AttrSet {
    pub fn attributes(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL.into_iter().filter(move |attr| self.contains(attr.as_set()))
    }

    /// Storage-class bits of every attribute in the set.
    pub fn stc(self) -> StorageClass {
        self.attributes().fold(StorageClass::empty(), |stc, attr| stc | attr.stc())
    }
}

/// Something a function body does that can break an attribute.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Effect {
    /// Direct call of a known function.
    Call { callee: DeclId, span: Span },
    /// Call through a function pointer or delegate whose type carries `attrs`.
    IndirectCall { attrs: StorageClass, span: Span },
    /// Read or write of a module-level or static variable.
    GlobalAccess { var: DeclId, write: bool, span: Span },
    /// Pointer arithmetic, unsafe casts and the like.
    UnsafeOperation { span: Span },
    /// Access to an aggregate field.
    FieldAccess { field: DeclId, span: Span },
    Throw { span: Span },
    GcAllocation { span: Span },
    /// Heap allocation of the function's closure frame.
    ClosureAllocation { span: Span },
}

impl Effect {
    pub fn span(self) -> Span {
        match self {
            Effect::Call { span, .. }
            | Effect::IndirectCall { span, .. }
            | Effect::GlobalAccess { span, .. }
            | Effect::UnsafeOperation { span }
            | Effect::FieldAccess { span, .. }
            | Effect::Throw { span }
            | Effect::GcAllocation { span }
            | Effect::ClosureAllocation { span } => span,
        }
    }

    pub fn callee(self) -> Option<DeclId> {
        match self {
            Effect::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Effect::Call { .. } => "calls a function that breaks the attribute",
            Effect::IndirectCall { .. } => "calls through a pointer lacking the attribute",
            Effect::GlobalAccess { write: true, .. } => "writes mutable global state",
            Effect::GlobalAccess { write: false, .. } => "reads mutable global state",
            Effect::UnsafeOperation { .. } => "performs an unsafe operation",
            Effect::FieldAccess { .. } => "accesses a field overlapping a pointer",
            Effect::Throw { .. } => "may throw",
            Effect::GcAllocation { .. } => "allocates with the GC",
            Effect::ClosureAllocation { .. } => "allocates a closure with the GC",
        }
    }
}
