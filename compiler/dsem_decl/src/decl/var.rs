//! Variable declarations.

use bitflags::bitflags;
use dsem_ir::{ExprRef, TypeRef};
use smallvec::SmallVec;

use crate::ids::{AggregateId, DeclId};

/// Initializer of a variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Initializer {
    /// `= void`: no initialization at all.
    Void,
    /// Default zero fill of the type.
    Zero,
    /// An initializing expression.
    Expr(ExprRef),
    /// `{ field: init, ... }` with the field names already resolved.
    Struct(Vec<(Option<DeclId>, Initializer)>),
    /// `[index: init, ...]`
    Array(Vec<(Option<ExprRef>, Initializer)>),
}

impl Initializer {
    /// Whether running this initializer is indistinguishable from leaving
    /// zero-filled or uninitialized memory behind.
    pub fn is_trivial(&self) -> bool {
        match self {
            Initializer::Void | Initializer::Zero => true,
            Initializer::Expr(_) => false,
            Initializer::Struct(fields) => fields.iter().all(|(_, init)| init.is_trivial()),
            Initializer::Array(elems) => elems.iter().all(|(_, init)| init.is_trivial()),
        }
    }
}

bitflags! {
    /// Origin and role of a variable.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct VarFlags: u16 {
        /// Hidden parameter holding the variadic argument pointer.
        const ARG_PTR = 1 << 0;
        /// Initialized inside a constructor.
        const CTOR_INIT = 1 << 1;
        /// Exception object of a catch clause.
        const CATCH_VAR = 1 << 2;
        /// Class instance promoted to the stack.
        const ON_STACK = 1 << 3;
        /// Allocated with a custom allocator.
        const MY_NEW = 1 << 4;
        /// Field shares bytes with another field.
        const OVERLAPPED = 1 << 5;
        /// Overlap would let safe code reinterpret a pointer.
        const OVERLAP_UNSAFE = 1 << 6;
        /// `scope` must not be inferred for this variable.
        const NO_INFER_SCOPE = 1 << 7;
    }
}

impl Default for VarFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Category of type reflected by a type-descriptor declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeInfoKind {
    Generic,
    Struct,
    Class,
    Interface,
    Pointer,
    Array,
    StaticArray,
    AssociativeArray,
    Enum,
    Function,
    Delegate,
    Tuple,
    Const,
    Immutable,
    Shared,
    Wild,
    Vector,
}

/// What a variable stands for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum VarRole {
    /// Ordinary variable, parameter or field.
    #[default]
    Plain,
    /// The hidden `this` parameter.
    This,
    /// Static initializer data of an aggregate.
    Symbol(AggregateId),
    /// Run-time type descriptor for `reflected`.
    TypeInfo {
        kind: TypeInfoKind,
        reflected: TypeRef,
    },
}

/// Variable-specific state.
#[derive(Clone, Debug, Default)]
pub struct VarDecl {
    pub role: VarRole,
    pub init: Option<Initializer>,
    /// Byte offset inside the parent aggregate, once laid out.
    pub offset: u32,
    /// Byte size, recorded by field layout.
    pub size: u32,
    /// Declaration order within the arena; re-issued on copy.
    pub sequence: u32,
    /// Explicit `align(n)`; `None` uses the type's natural alignment.
    pub alignment: Option<u32>,
    pub flags: VarFlags,
    /// Previous variable in the enclosing scope chain.
    pub last_var: Option<DeclId>,
    /// Nested functions referring to this variable.
    pub nestedrefs: SmallVec<[DeclId; 2]>,
    /// Symbol this variable aliases (tuple parameters, `alias this`).
    pub alias_sym: Option<DeclId>,
    /// Destructor call to run at end of scope.
    pub edtor: Option<ExprRef>,
}

impl VarDecl {
    pub fn has_nontrivial_init(&self) -> bool {
        self.init.as_ref().is_some_and(|init| !init.is_trivial())
    }

    pub fn type_info(&self) -> Option<(TypeInfoKind, TypeRef)> {
        match self.role {
            VarRole::TypeInfo { kind, reflected } => Some((kind, reflected)),
            _ => None,
        }
    }
}
