//! Declarations.
//!
//! One [`Declaration`] type covers every named entity: the fields all
//! declarations share live on the struct, the variant-specific state in
//! [`DeclKind`]. Queries that have to look at other declarations (the
//! parent aggregate, an alias target) live on [`DeclArena`](crate::DeclArena).

mod aggregate;
mod alias;
mod func;
mod var;

pub use aggregate::{AggregateDecl, AggregateKind};
pub use alias::{AliasDecl, OverDecl, TupleDecl, TupleElement, TupleKind};
pub use func::{
    BuiltinStatus, FuncBody, FuncDecl, FuncFlags, FuncKind, FuncPolicy, InlineStatus,
    InvariantRule, LabelInfo, LiteralKind, Parameter, PendingGoto, Variadic, Virtuality,
};
pub use var::{Initializer, TypeInfoKind, VarDecl, VarFlags, VarRole};

use dsem_ir::{Name, Span, TypeRef};

use crate::error::DeclError;
use crate::ids::{AggregateId, DeclId};
use crate::stc::StorageClass;
use crate::visibility::{Linkage, Visibility};

/// Lexical owner of a declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Parent {
    #[default]
    Module,
    Aggregate(AggregateId),
    Func(DeclId),
}

/// Variant-specific state.
#[derive(Clone, Debug)]
pub enum DeclKind {
    Tuple(TupleDecl),
    Alias(AliasDecl),
    Over(OverDecl),
    Var(VarDecl),
    Func(Box<FuncDecl>),
}

/// A named program entity.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: Name,
    pub span: Span,
    /// Analyzed type, owned by the type system.
    pub ty: Option<TypeRef>,
    /// Type as written, kept for diagnostics and copying.
    pub original_ty: Option<TypeRef>,
    pub stc: StorageClass,
    pub visibility: Visibility,
    pub linkage: Linkage,
    /// Re-entrancy counter for recursive queries on this declaration.
    pub inuse: u32,
    /// `pragma(mangle)` override.
    pub mangle_override: Option<Name>,
    pub parent: Parent,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn new(name: Name, span: Span, kind: DeclKind) -> Self {
        Declaration {
            name,
            span,
            ty: None,
            original_ty: None,
            stc: StorageClass::empty(),
            visibility: Visibility::Undefined,
            linkage: Linkage::D,
            inuse: 0,
            mangle_override: None,
            parent: Parent::Module,
            kind,
        }
    }

    pub fn var(name: Name, span: Span, ty: Option<TypeRef>) -> Self {
        Declaration {
            ty,
            original_ty: ty,
            ..Declaration::new(name, span, DeclKind::Var(VarDecl::default()))
        }
    }

    pub fn func(name: Name, span: Span, kind: FuncKind, params: Vec<Parameter>) -> Self {
        Declaration::new(name, span, DeclKind::Func(Box::new(FuncDecl::new(kind, params))))
    }

    pub fn alias(name: Name, span: Span, alias: AliasDecl) -> Self {
        Declaration::new(name, span, DeclKind::Alias(alias))
    }

    pub fn over(name: Name, span: Span, over: OverDecl) -> Self {
        Declaration::new(name, span, DeclKind::Over(over))
    }

    pub fn tuple(
        name: Name,
        span: Span,
        kind: TupleKind,
        elements: Vec<TupleElement>,
    ) -> Result<Self, DeclError> {
        match TupleDecl::new(kind, elements) {
            Ok(tuple) => Ok(Declaration::new(name, span, DeclKind::Tuple(tuple))),
            Err(index) => Err(DeclError::InvalidTupleElement { name, span, index }),
        }
    }

    /// The hidden `this` parameter of a member function.
    pub fn this_param(span: Span, ty: TypeRef) -> Self {
        let var = VarDecl {
            role: VarRole::This,
            ..VarDecl::default()
        };
        Declaration {
            ty: Some(ty),
            original_ty: Some(ty),
            stc: StorageClass::PARAMETER,
            ..Declaration::new(Name::THIS, span, DeclKind::Var(var))
        }
    }

    /// Static initializer data of `aggregate`.
    pub fn symbol(name: Name, span: Span, aggregate: AggregateId) -> Self {
        let var = VarDecl {
            role: VarRole::Symbol(aggregate),
            ..VarDecl::default()
        };
        Declaration {
            stc: StorageClass::CONST,
            ..Declaration::new(name, span, DeclKind::Var(var))
        }
    }

    /// Run-time type descriptor of `reflected`.
    ///
    /// Descriptors are global, public and C-linked.
    pub fn type_info(name: Name, kind: TypeInfoKind, reflected: TypeRef) -> Self {
        let var = VarDecl {
            role: VarRole::TypeInfo { kind, reflected },
            ..VarDecl::default()
        };
        Declaration {
            stc: StorageClass::STATIC | StorageClass::GSHARED,
            visibility: Visibility::Public,
            linkage: Linkage::C,
            ..Declaration::new(name, Span::DUMMY, DeclKind::Var(var))
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self.original_ty.get_or_insert(ty);
        self
    }

    /// Add storage-class bits.
    #[must_use]
    pub fn with_stc(mut self, stc: StorageClass) -> Self {
        self.stc |= stc;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Parent) -> Self {
        self.parent = parent;
        self
    }

    #[must_use]
    pub fn with_mangle_override(mut self, mangle: Name) -> Self {
        self.mangle_override = Some(mangle);
        self
    }

    /// Attach an initializer. Ignored for non-variables.
    #[must_use]
    pub fn with_init(mut self, init: Initializer) -> Self {
        if let Some(var) = self.as_var_mut() {
            var.init = Some(init);
        }
        self
    }

    /// Attach a body. Ignored for non-functions.
    #[must_use]
    pub fn with_body(mut self, body: FuncBody) -> Self {
        if let Some(func) = self.as_func_mut() {
            func.body = Some(body);
        }
        self
    }

    /// Set the variadic style. Ignored for non-functions.
    #[must_use]
    pub fn with_variadic(mut self, variadic: Variadic) -> Self {
        if let Some(func) = self.as_func_mut() {
            func.variadic = variadic;
        }
        self
    }

    pub fn as_var(&self) -> Option<&VarDecl> {
        match &self.kind {
            DeclKind::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_var_mut(&mut self) -> Option<&mut VarDecl> {
        match &mut self.kind {
            DeclKind::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&FuncDecl> {
        match &self.kind {
            DeclKind::Func(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_func_mut(&mut self) -> Option<&mut FuncDecl> {
        match &mut self.kind {
            DeclKind::Func(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_alias(&self) -> Option<&AliasDecl> {
        match &self.kind {
            DeclKind::Alias(alias) => Some(alias),
            _ => None,
        }
    }

    pub fn as_over(&self) -> Option<&OverDecl> {
        match &self.kind {
            DeclKind::Over(over) => Some(over),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleDecl> {
        match &self.kind {
            DeclKind::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    /// Next entry of the overload chain this declaration belongs to.
    pub fn overnext(&self) -> Option<DeclId> {
        match &self.kind {
            DeclKind::Func(func) => func.overnext,
            DeclKind::Alias(alias) => alias.overnext,
            DeclKind::Over(over) => over.overnext,
            DeclKind::Var(_) | DeclKind::Tuple(_) => None,
        }
    }

    /// Link `next` after this declaration. Returns `false` for variants
    /// that cannot be part of an overload chain.
    pub(crate) fn set_overnext(&mut self, next: Option<DeclId>) -> bool {
        match &mut self.kind {
            DeclKind::Func(func) => func.overnext = next,
            DeclKind::Alias(alias) => alias.overnext = next,
            DeclKind::Over(over) => over.overnext = next,
            DeclKind::Var(_) | DeclKind::Tuple(_) => return false,
        }
        true
    }

    /// Stable description of what this declaration is, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match &self.kind {
            DeclKind::Tuple(_) => "tuple",
            DeclKind::Alias(_) => "alias",
            DeclKind::Over(_) => "overload alias",
            DeclKind::Var(var) => match var.role {
                VarRole::Symbol(_) => "declaration",
                VarRole::Plain | VarRole::This | VarRole::TypeInfo { .. } => "variable",
            },
            DeclKind::Func(func) => func.kind.policy().kind,
        }
    }

    pub fn is_codeseg(&self) -> bool {
        matches!(self.kind, DeclKind::Func(_))
    }

    pub fn is_export(&self) -> bool {
        self.visibility == Visibility::Export
    }

    /// Exported symbol defined in another binary.
    pub fn is_imported_symbol(&self) -> bool {
        if !self.is_export() {
            return false;
        }
        match &self.kind {
            DeclKind::Func(func) => func.body.is_none(),
            DeclKind::Var(_) => self.stc.is_extern(),
            DeclKind::Tuple(_) | DeclKind::Alias(_) | DeclKind::Over(_) => false,
        }
    }

    pub fn can_take_address_of(&self) -> bool {
        match &self.kind {
            DeclKind::Var(_) => !self.stc.is_manifest(),
            DeclKind::Func(_) => true,
            DeclKind::Tuple(_) | DeclKind::Alias(_) | DeclKind::Over(_) => false,
        }
    }

    pub fn is_delete(&self) -> bool {
        self.as_func().is_some_and(|func| func.kind.policy().is_delete)
    }

    /// Symbol name the code generator emits.
    pub fn mangled_name(&self) -> Option<Name> {
        self.mangle_override
            .or_else(|| self.as_func().and_then(|func| func.mangle_string))
    }
}

#[cfg(test)]
mod tests;
