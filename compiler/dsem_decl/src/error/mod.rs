//! Declaration errors and their diagnostics.

use std::fmt;

use dsem_diagnostic::{Diagnostic, ErrorCode};
use dsem_ir::{Name, Span, StringInterner};

use crate::arena::DeclArena;
use crate::decl::FuncKind;
use crate::ids::{AggregateId, DeclId};
use crate::infer::{Attribute, Effect};
use crate::overload::candidates;

/// Errors surfaced by declaration queries and checks.
///
/// Every variant is a value for the caller to report; none of the
/// operations in this crate emit diagnostics themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclError {
    /// A `@disable`d declaration was referenced.
    Disabled { decl: DeclId, span: Span },
    /// No overload of `start` accepts the arguments.
    NoMatchingOverload {
        start: DeclId,
        span: Span,
        /// Some candidate to point at, if the set was not empty.
        candidate: Option<DeclId>,
    },
    /// Two overloads match equally well and neither is more specialized.
    AmbiguousOverload {
        start: DeclId,
        span: Span,
        first: DeclId,
        second: DeclId,
    },
    /// A jump skips the initialization of `var`.
    GotoSkipsInitializer { var: DeclId, span: Span },
    /// Two overlapping fields where one of them holds pointers.
    UnsafeFieldOverlap {
        aggregate: AggregateId,
        first: DeclId,
        second: DeclId,
    },
    /// The body of `func` breaks an attribute written on it.
    AttributeViolation {
        func: DeclId,
        attribute: Attribute,
        cause: Option<Effect>,
    },
    /// An alias resolves back to itself.
    RecursiveAlias { name: Name, span: Span },
    /// `from` refers to `var` without being nested inside its function.
    CannotAccessFrame { var: DeclId, from: DeclId, span: Span },
    /// Element `index` of a tuple does not fit the tuple's kind.
    InvalidTupleElement { name: Name, span: Span, index: usize },
    /// `new` cannot join the overload set of `existing`.
    NotOverloadable { existing: DeclId, new: DeclId },
}

impl DeclError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DeclError::Disabled { .. } => ErrorCode::E1001,
            DeclError::RecursiveAlias { .. } => ErrorCode::E1002,
            DeclError::InvalidTupleElement { .. } => ErrorCode::E1003,
            DeclError::NotOverloadable { .. } => ErrorCode::E1004,
            DeclError::CannotAccessFrame { .. } => ErrorCode::E1005,
            DeclError::NoMatchingOverload { .. } => ErrorCode::E2001,
            DeclError::AmbiguousOverload { .. } => ErrorCode::E2002,
            DeclError::AttributeViolation { attribute, .. } => match attribute {
                Attribute::Purity => ErrorCode::E3001,
                Attribute::Safety => ErrorCode::E3002,
                Attribute::Nothrow => ErrorCode::E3003,
                Attribute::Nogc => ErrorCode::E3004,
            },
            DeclError::GotoSkipsInitializer { .. } => ErrorCode::E4001,
            DeclError::UnsafeFieldOverlap { .. } => ErrorCode::W4001,
        }
    }

    /// Convert to a diagnostic, naming declarations through `interner`.
    pub fn to_diagnostic(&self, arena: &DeclArena, interner: &StringInterner) -> Diagnostic {
        let name = |id: DeclId| interner.lookup(arena.get(id).name);
        let code = self.code();
        let base = if code.is_warning() {
            Diagnostic::warning(code)
        } else {
            Diagnostic::error(code)
        };

        match *self {
            DeclError::Disabled { decl, span } => {
                let d = arena.get(decl);
                let postblit_of = match (d.as_func().map(|f| f.kind), arena.is_member(decl)) {
                    (Some(FuncKind::PostBlit), Some(agg)) => Some(agg),
                    _ => None,
                };
                let message = match postblit_of {
                    Some(agg) => format!(
                        "`{}` is not copyable because it is annotated with `@disable`",
                        interner.lookup(arena.aggregate(agg).name)
                    ),
                    None => format!(
                        "{} `{}` cannot be used because it is annotated with `@disable`",
                        d.kind(),
                        name(decl)
                    ),
                };
                base.with_message(message)
                    .with_label(span, "used here")
                    .with_secondary_label(d.span, "disabled here")
            }

            DeclError::NoMatchingOverload {
                start,
                span,
                candidate,
            } => {
                let mut diag = base
                    .with_message(format!(
                        "none of the overloads of `{}` accept these arguments",
                        name(start)
                    ))
                    .with_label(span, "no matching overload");
                for func in candidates(arena, start) {
                    diag = diag.with_secondary_label(arena.get(func).span, "candidate");
                }
                if candidate.is_none() {
                    diag = diag.with_note(format!("`{}` has no callable overloads", name(start)));
                }
                diag
            }

            DeclError::AmbiguousOverload {
                start,
                span,
                first,
                second,
            } => base
                .with_message(format!(
                    "call to `{}` is ambiguous between two overloads",
                    name(start)
                ))
                .with_label(span, "ambiguous call")
                .with_secondary_label(arena.get(first).span, "could be this")
                .with_secondary_label(arena.get(second).span, "or this")
                .with_suggestion("add an explicit conversion to select one overload"),

            DeclError::GotoSkipsInitializer { var, span } => base
                .with_message(format!(
                    "goto skips declaration of variable `{}` with an initializer",
                    name(var)
                ))
                .with_label(span, "jump skips the initialization")
                .with_secondary_label(arena.get(var).span, "declared here"),

            DeclError::UnsafeFieldOverlap {
                aggregate,
                first,
                second,
            } => base
                .with_message(format!(
                    "fields `{}` and `{}` of `{}` overlap and one of them holds pointers",
                    name(first),
                    name(second),
                    interner.lookup(arena.aggregate(aggregate).name)
                ))
                .with_label(arena.get(first).span, "overlaps")
                .with_secondary_label(arena.get(second).span, "this field")
                .with_note("accessing either field is not `@safe`"),

            DeclError::AttributeViolation {
                func,
                attribute,
                cause,
            } => {
                let f = arena.get(func);
                let reason = cause.map_or("cannot keep the attribute", Effect::describe);
                let mut diag = base
                    .with_message(format!(
                        "{} `{}` is annotated `{}` but {}",
                        f.kind(),
                        name(func),
                        attribute.keyword(),
                        reason
                    ))
                    .with_label(cause.map_or(f.span, Effect::span), reason);
                if let Some(callee) = cause.and_then(Effect::callee) {
                    diag = diag.with_note(format!(
                        "`{}` is not `{}`",
                        name(callee),
                        attribute.keyword()
                    ));
                }
                if cause.is_some() {
                    diag = diag.with_secondary_label(f.span, "annotated here");
                }
                diag
            }

            DeclError::RecursiveAlias { name: alias, span } => base
                .with_message(format!(
                    "alias `{}` recursively refers to itself",
                    interner.lookup(alias)
                ))
                .with_label(span, "recursive alias"),

            DeclError::CannotAccessFrame { var, from, span } => {
                let owner = arena
                    .parent_func(var)
                    .map_or("<module>", |owner| name(owner));
                base.with_message(format!(
                    "`{}` cannot access the frame of `{owner}` to reach `{}`",
                    name(from),
                    name(var)
                ))
                .with_label(span, "referenced here")
                .with_secondary_label(arena.get(var).span, "declared here")
            }

            DeclError::InvalidTupleElement {
                name: tuple,
                span,
                index,
            } => base
                .with_message(format!(
                    "element {index} of tuple `{}` does not fit the tuple's kind",
                    interner.lookup(tuple)
                ))
                .with_label(span, "mixed tuple")
                .with_note("a tuple holds either only types or only symbols and values"),

            DeclError::NotOverloadable { existing, new } => base
                .with_message(format!(
                    "{} `{}` cannot overload {} `{}`",
                    arena.get(new).kind(),
                    name(new),
                    arena.get(existing).kind(),
                    name(existing)
                ))
                .with_label(arena.get(new).span, "conflicting declaration")
                .with_secondary_label(arena.get(existing).span, "previous declaration"),
        }
    }
}

impl fmt::Display for DeclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclError::Disabled { decl, .. } => write!(f, "{decl:?} is disabled"),
            DeclError::NoMatchingOverload { start, .. } => {
                write!(f, "no overload of {start:?} matches")
            }
            DeclError::AmbiguousOverload { first, second, .. } => {
                write!(f, "ambiguous call: {first:?} and {second:?} match equally")
            }
            DeclError::GotoSkipsInitializer { var, .. } => {
                write!(f, "goto skips initialization of {var:?}")
            }
            DeclError::UnsafeFieldOverlap { first, second, .. } => {
                write!(f, "unsafe overlap of {first:?} and {second:?}")
            }
            DeclError::AttributeViolation {
                func, attribute, ..
            } => write!(f, "{func:?} violates `{}`", attribute.keyword()),
            DeclError::RecursiveAlias { name, .. } => write!(f, "recursive alias {name:?}"),
            DeclError::CannotAccessFrame { var, from, .. } => {
                write!(f, "{from:?} cannot access the frame of {var:?}")
            }
            DeclError::InvalidTupleElement { index, .. } => {
                write!(f, "tuple element {index} does not fit the tuple kind")
            }
            DeclError::NotOverloadable { existing, new } => {
                write!(f, "{new:?} cannot overload {existing:?}")
            }
        }
    }
}

impl std::error::Error for DeclError {}
