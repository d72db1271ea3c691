//! Aliases, overload-set anchors and tuples.

use dsem_ir::{ExprRef, TypeRef};

use crate::ids::DeclId;

/// `alias name = target;`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasDecl {
    /// Aliased symbol, once resolved.
    pub aliassym: Option<DeclId>,
    /// Aliased type, for aliases naming a type rather than a symbol.
    pub aliased_type: Option<TypeRef>,
    pub overnext: Option<DeclId>,
    /// Target lives in a module whose import has not been resolved yet.
    pub pending_import: bool,
}

impl AliasDecl {
    pub fn to_symbol(target: DeclId) -> Self {
        AliasDecl {
            aliassym: Some(target),
            ..AliasDecl::default()
        }
    }

    pub fn to_type(ty: TypeRef) -> Self {
        AliasDecl {
            aliased_type: Some(ty),
            ..AliasDecl::default()
        }
    }

    /// Placeholder for a symbol imported from a module not yet analyzed.
    pub fn pending() -> Self {
        AliasDecl {
            pending_import: true,
            ..AliasDecl::default()
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.aliassym.is_some() || self.aliased_type.is_some()
    }
}

/// Forwarding node that anchors an overload set.
///
/// Unlike an alias it is never itself the symbol a lookup produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverDecl {
    pub aliassym: Option<DeclId>,
    pub overnext: Option<DeclId>,
    /// Forward the whole overload set of `aliassym`, not only `aliassym`.
    pub has_overloads: bool,
}

/// Whether a tuple holds values or types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TupleKind {
    Expressions,
    Types,
}

/// One element of a tuple declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TupleElement {
    Decl(DeclId),
    Type(TypeRef),
    Expr(ExprRef),
}

impl TupleElement {
    fn fits(self, kind: TupleKind) -> bool {
        match kind {
            TupleKind::Types => matches!(self, TupleElement::Type(_)),
            TupleKind::Expressions => !matches!(self, TupleElement::Type(_)),
        }
    }
}

/// An ordered sequence of symbols or types treated as one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TupleDecl {
    kind: TupleKind,
    elements: Vec<TupleElement>,
}

impl TupleDecl {
    /// Build a tuple, rejecting elements that do not fit `kind`.
    ///
    /// On failure the error holds the index of the first offending element.
    pub fn new(kind: TupleKind, elements: Vec<TupleElement>) -> Result<Self, usize> {
        if let Some(index) = elements.iter().position(|elem| !elem.fits(kind)) {
            return Err(index);
        }
        Ok(TupleDecl { kind, elements })
    }

    pub fn kind(&self) -> TupleKind {
        self.kind
    }

    pub fn elements(&self) -> &[TupleElement] {
        &self.elements
    }

    pub fn is_type_tuple(&self) -> bool {
        self.kind == TupleKind::Types
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [TupleElement] {
        &mut self.elements
    }
}
