//! The function family.
//!
//! Constructors, destructors, static initializers, literals and the other
//! special functions share one data layout. What differs between them is
//! behaviour, which [`FuncKind::policy`] looks up in a fixed table.

use bitflags::bitflags;
use dsem_ir::{ExprRef, Name, Span, StmtRef, TypeRef};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ids::DeclId;
use crate::infer::{AttrSet, Effect};
use crate::stc::StorageClass;

/// A declared parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: Name,
    pub ty: TypeRef,
    pub stc: StorageClass,
    pub default: Option<ExprRef>,
}

impl Parameter {
    pub fn new(name: Name, ty: TypeRef) -> Self {
        Parameter {
            name,
            ty,
            stc: StorageClass::empty(),
            default: None,
        }
    }

    #[must_use]
    pub fn with_stc(mut self, stc: StorageClass) -> Self {
        self.stc = stc;
        self
    }

    /// Whether an argument bound to this parameter must be an lvalue.
    pub fn is_by_ref(&self) -> bool {
        self.stc.intersects(StorageClass::REF | StorageClass::OUT)
    }
}

/// Variadic style of a parameter list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Variadic {
    #[default]
    None,
    /// C-style `...`
    C,
    /// Typesafe `T[] args...`
    Typesafe,
}

/// Body of a function together with the effects semantic analysis found in it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuncBody {
    pub stmt: Option<StmtRef>,
    pub effects: Vec<Effect>,
}

impl FuncBody {
    pub fn new(stmt: StmtRef) -> Self {
        FuncBody {
            stmt: Some(stmt),
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Inlining verdict for one form (statement or expression) of a function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum InlineStatus {
    #[default]
    Unknown,
    Bad,
    Ok,
}

/// Whether a function is evaluated by the compiler itself.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum BuiltinStatus {
    #[default]
    Unknown,
    No,
    Yes,
}

/// Token a function literal was written with.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LiteralKind {
    Function,
    Delegate,
    /// Not yet decided; becomes one of the others during analysis.
    Reserved,
}

/// Which member of the function family a declaration is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum FuncKind {
    #[default]
    Plain,
    /// Alias to another function. `has_overloads` forwards the whole
    /// overload set rather than just `target`.
    Alias { target: DeclId, has_overloads: bool },
    Literal(LiteralKind),
    Ctor,
    PostBlit,
    Dtor,
    StaticCtor,
    SharedStaticCtor,
    StaticDtor,
    SharedStaticDtor,
    Invariant,
    UnitTest,
    /// Class allocator.
    New,
    /// Class deallocator.
    Delete,
}

/// When a function can be virtual.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Virtuality {
    /// Virtual when it is a non-static, non-private member of a class.
    Member,
    Never,
}

/// When an invariant call is inserted at entry or exit.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum InvariantRule {
    /// Public or protected member of a non-C++ aggregate with a frame.
    Member,
    /// Any member that has a `this` reference.
    WithThis,
    Never,
}

/// Behaviour table of a [`FuncKind`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct FuncPolicy {
    pub kind: &'static str,
    pub virtuality: Virtuality,
    pub pre_invariant: InvariantRule,
    pub post_invariant: InvariantRule,
    /// Whether other functions may join its overload set.
    pub overloadable: bool,
    /// Whether it can be a member with a `this` reference.
    pub has_this: bool,
    pub is_delete: bool,
}

impl FuncPolicy {
    const fn special(kind: &'static str, has_this: bool) -> Self {
        FuncPolicy {
            kind,
            virtuality: Virtuality::Never,
            pre_invariant: InvariantRule::Never,
            post_invariant: InvariantRule::Never,
            overloadable: true,
            has_this,
            is_delete: false,
        }
    }

    const PLAIN: Self = FuncPolicy {
        kind: "function",
        virtuality: Virtuality::Member,
        pre_invariant: InvariantRule::Member,
        post_invariant: InvariantRule::Member,
        overloadable: true,
        has_this: true,
        is_delete: false,
    };
}

impl FuncKind {
    /// Behaviour of this kind.
    pub const fn policy(self) -> FuncPolicy {
        match self {
            FuncKind::Plain => FuncPolicy::PLAIN,
            FuncKind::Alias { .. } => FuncPolicy {
                kind: "function alias",
                ..FuncPolicy::PLAIN
            },
            FuncKind::Literal(LiteralKind::Delegate) => FuncPolicy::special("delegate", true),
            FuncKind::Literal(LiteralKind::Function) => FuncPolicy::special("function", false),
            FuncKind::Literal(LiteralKind::Reserved) => FuncPolicy::special("delegate", false),
            FuncKind::Ctor => FuncPolicy {
                post_invariant: InvariantRule::WithThis,
                ..FuncPolicy::special("constructor", true)
            },
            FuncKind::PostBlit => FuncPolicy {
                post_invariant: InvariantRule::WithThis,
                overloadable: false,
                ..FuncPolicy::special("postblit", true)
            },
            FuncKind::Dtor => FuncPolicy {
                pre_invariant: InvariantRule::WithThis,
                overloadable: false,
                ..FuncPolicy::special("destructor", true)
            },
            FuncKind::StaticCtor => FuncPolicy::special("static constructor", false),
            FuncKind::SharedStaticCtor => FuncPolicy::special("shared static constructor", false),
            FuncKind::StaticDtor => FuncPolicy::special("static destructor", false),
            FuncKind::SharedStaticDtor => FuncPolicy::special("shared static destructor", false),
            FuncKind::Invariant => FuncPolicy::special("invariant", true),
            FuncKind::UnitTest => FuncPolicy::special("unittest", false),
            FuncKind::New => FuncPolicy::special("allocator", true),
            FuncKind::Delete => FuncPolicy {
                is_delete: true,
                ..FuncPolicy::special("deallocator", true)
            },
        }
    }

    pub fn is_literal(self) -> bool {
        matches!(self, FuncKind::Literal(_))
    }
}

bitflags! {
    /// Persistent facts about a function body.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct FuncFlags: u8 {
        /// Body contains inline assembly; no attribute can be inferred.
        const INLINE_ASM = 1 << 0;
        /// No prologue or epilogue is generated.
        const NAKED = 1 << 1;
    }
}

impl Default for FuncFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A label declared in a function body.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct LabelInfo {
    pub span: Span,
    /// Last variable declared before the label.
    pub last_var: Option<DeclId>,
}

/// A `goto` whose label had not been seen yet when it was analyzed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PendingGoto {
    pub label: Name,
    pub span: Span,
    /// Last variable declared before the jump.
    pub last_var: Option<DeclId>,
}

/// Function-specific state.
#[derive(Clone, Debug, Default)]
pub struct FuncDecl {
    pub kind: FuncKind,
    pub params: Vec<Parameter>,
    pub variadic: Variadic,
    pub body: Option<FuncBody>,
    /// `in` contract.
    pub frequire: Option<StmtRef>,
    /// `out` contract.
    pub fensure: Option<StmtRef>,
    /// Synthesized function checking the `in` contract.
    pub fdrequire: Option<DeclId>,
    /// Synthesized function checking the `out` contract.
    pub fdensure: Option<DeclId>,
    /// Result variable of the `out` contract.
    pub vresult: Option<DeclId>,
    /// Label `return` is rewritten to jump to when contracts are present.
    pub return_label: Option<Name>,
    pub overnext: Option<DeclId>,
    /// Functions this one overrides.
    pub foverrides: SmallVec<[DeclId; 1]>,
    pub locals: FxHashMap<Name, DeclId>,
    pub labels: FxHashMap<Name, LabelInfo>,
    pub pending_gotos: Vec<PendingGoto>,
    /// `this` or the context pointer of a nested function.
    pub vthis: Option<DeclId>,
    /// `_arguments` of a typesafe variadic function.
    pub v_arguments: Option<DeclId>,
    /// `_argptr` of a variadic function.
    pub v_argptr: Option<DeclId>,
    pub vtbl_index: Option<u32>,
    pub inline_status_stmt: InlineStatus,
    pub inline_status_exp: InlineStatus,
    pub builtin: BuiltinStatus,
    /// Number of places taking the address of this function.
    pub took_address_of: u32,
    pub requires_closure: bool,
    /// Locals captured by nested functions.
    pub closure_vars: SmallVec<[DeclId; 4]>,
    /// Nested siblings that call this function.
    pub sibling_callers: SmallVec<[DeclId; 2]>,
    pub flags: FuncFlags,
    /// Attributes whose storage-class bit was set by inference.
    pub inferred: AttrSet,
    /// Attributes whose value is final.
    pub concluded: AttrSet,
    /// Mangled symbol, filled in by the mangler.
    pub mangle_string: Option<Name>,
}

impl FuncDecl {
    pub fn new(kind: FuncKind, params: Vec<Parameter>) -> Self {
        FuncDecl {
            kind,
            params,
            ..FuncDecl::default()
        }
    }

    pub fn declare_local(&mut self, name: Name, var: DeclId) -> Option<DeclId> {
        self.locals.insert(name, var)
    }

    pub fn search_local(&self, name: Name) -> Option<DeclId> {
        self.locals.get(&name).copied()
    }

    pub fn declare_label(&mut self, name: Name, info: LabelInfo) -> Option<LabelInfo> {
        self.labels.insert(name, info)
    }

    pub fn search_label(&self, name: Name) -> Option<LabelInfo> {
        self.labels.get(&name).copied()
    }

    pub fn is_naked(&self) -> bool {
        self.flags.contains(FuncFlags::NAKED)
    }

    pub fn effects(&self) -> &[Effect] {
        self.body.as_ref().map_or(&[], |body| body.effects.as_slice())
    }
}
