//! Aggregates, as far as the declaration model needs them.
//!
//! Members point at their aggregate through [`Parent::Aggregate`](crate::Parent);
//! the aggregate supplies default visibility, linkage and class-ness.

use dsem_ir::{Name, Span};

use crate::ids::DeclId;
use crate::visibility::{Linkage, Visibility};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AggregateKind {
    Struct,
    Union,
    Class,
    Interface,
}

#[derive(Clone, Debug)]
pub struct AggregateDecl {
    pub name: Name,
    pub span: Span,
    pub kind: AggregateKind,
    pub visibility: Visibility,
    pub linkage: Linkage,
    /// `final class`
    pub is_final: bool,
    /// Fields in declaration order.
    pub fields: Vec<DeclId>,
    /// Size in bytes once laid out.
    pub size: u32,
}

impl AggregateDecl {
    pub fn new(name: Name, span: Span, kind: AggregateKind) -> Self {
        AggregateDecl {
            name,
            span,
            kind,
            visibility: Visibility::Public,
            linkage: Linkage::D,
            is_final: false,
            fields: Vec::new(),
            size: 0,
        }
    }

    /// Classes and interfaces; members of these can be virtual.
    pub fn is_class(&self) -> bool {
        matches!(self.kind, AggregateKind::Class | AggregateKind::Interface)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == AggregateKind::Interface
    }

    pub fn is_union(&self) -> bool {
        self.kind == AggregateKind::Union
    }
}
