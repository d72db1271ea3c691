//! Declaration core of the dsem front end.
//!
//! Declarations of a compilation unit live in a [`DeclArena`]. On top of it
//! this crate provides:
//! - [`StorageClass`]: the flag set of declaration properties
//! - Placement, visibility and virtuality queries on declarations
//! - Overload sets: [`overload_apply`] and [`function_resolve`]
//! - [`AttributeInference`] of `pure`, `@safe`, `nothrow` and `@nogc`
//! - Closure, jump and field-overlap checks for nested declarations
//!
//! # Design Philosophy
//!
//! - **Handles, not pointers**: declarations link to each other through
//!   [`DeclId`]s, so copying a declaration never leaves a link dangling
//! - **Values, not diagnostics**: checks return [`DeclError`]s and the
//!   caller decides how to report them
//! - **Collaborators behind traits**: types are opaque [`TypeRef`](dsem_ir::TypeRef)s;
//!   what the core needs to know about them comes from [`TypeQuery`] and
//!   [`MatchOracle`]

mod arena;
mod config;
mod decl;
mod error;
mod ids;
mod infer;
mod nested;
mod overload;
mod stack;
mod stc;
mod tracing_setup;
mod types;
mod visibility;

pub use arena::{DeclArena, UseSite};
pub use config::{AnalysisConfig, ConfigError, InferFlags};
pub use decl::{
    AggregateDecl, AggregateKind, AliasDecl, BuiltinStatus, DeclKind, Declaration, FuncBody,
    FuncDecl, FuncFlags, FuncKind, FuncPolicy, Initializer, InlineStatus, InvariantRule,
    LabelInfo, LiteralKind, OverDecl, Parameter, Parent, PendingGoto, TupleDecl, TupleElement,
    TupleKind, TypeInfoKind, VarDecl, VarFlags, VarRole, Variadic, Virtuality,
};
pub use error::DeclError;
pub use ids::{AggregateId, DeclId};
pub use infer::{AttrSet, Attribute, AttributeInference, Effect, PurityLevel};
pub use nested::goto::{
    check_goto, check_goto_label, declare_label, resolve_pending_gotos, LastVarCursor,
};
pub use nested::layout::{is_overlapped_with, mark_overlapping_fields, set_field_offset};
pub use nested::{check_func_nested_reference, check_var_nested_reference, needs_closure};
pub use overload::{
    candidates, function_resolve, is_unique, least_as_specialized, overload_apply,
    overload_exact_match, overload_insert, resolve_call, Argument, Match, MatchLevel,
    MatchOracle, Signature, TemplateArg,
};
pub use stc::{StorageClass, TypeMod};
pub use tracing_setup::init_tracing;
pub use types::{Indirection, TypeQuery};
pub use visibility::{Linkage, Visibility};

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{DeclId, StorageClass};
    dsem_ir::static_assert_size!(DeclId, 4);
    dsem_ir::static_assert_size!(Option<DeclId>, 8);
    dsem_ir::static_assert_size!(StorageClass, 8);
}
