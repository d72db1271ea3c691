//! Choosing the best function of an overload set for a call.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use dsem_ir::{ExprRef, TypeRef};

use super::overload_apply;
use crate::arena::{DeclArena, UseSite};
use crate::decl::{FuncKind, Parameter, Variadic};
use crate::error::DeclError;
use crate::ids::DeclId;
use crate::stc::{StorageClass, TypeMod};

/// How well an argument list fits a parameter list. Higher is better.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum MatchLevel {
    #[default]
    NoMatch,
    /// Matches with implicit conversions.
    Convert,
    /// Matches with conversions to const.
    Const,
    Exact,
}

/// One argument of a call, as the oracle sees it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Argument {
    pub ty: TypeRef,
    pub expr: Option<ExprRef>,
    /// Whether the argument can bind to a `ref` parameter.
    pub is_lvalue: bool,
}

impl Argument {
    pub fn rvalue(ty: TypeRef) -> Self {
        Argument {
            ty,
            expr: None,
            is_lvalue: false,
        }
    }

    pub fn lvalue(ty: TypeRef) -> Self {
        Argument {
            ty,
            expr: None,
            is_lvalue: true,
        }
    }

    #[must_use]
    pub fn with_expr(mut self, expr: ExprRef) -> Self {
        self.expr = Some(expr);
        self
    }
}

/// An explicit template argument, `f!(int)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TemplateArg {
    Type(TypeRef),
    Expr(ExprRef),
}

/// The parts of a function the match oracle needs.
#[derive(Copy, Clone, Debug)]
pub struct Signature<'a> {
    pub func: DeclId,
    pub ty: Option<TypeRef>,
    pub params: &'a [Parameter],
    pub variadic: Variadic,
    /// Storage class of the function, including `this` modifiers.
    pub stc: StorageClass,
}

impl DeclArena {
    pub fn signature(&self, id: DeclId) -> Option<Signature<'_>> {
        let decl = self.get(id);
        let func = decl.as_func()?;
        Some(Signature {
            func: id,
            ty: decl.ty,
            params: &func.params,
            variadic: func.variadic,
            stc: decl.stc,
        })
    }
}

/// Scores argument lists against signatures. Owned by the type system.
pub trait MatchOracle {
    /// How well `args` (and `this_ty`, for member calls) fit `callee`.
    fn call_match(
        &self,
        callee: &Signature<'_>,
        args: &[Argument],
        this_ty: Option<TypeRef>,
    ) -> MatchLevel;
}

/// Outcome of overload resolution.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Match {
    /// Number of candidates tied at the best level.
    pub count: u32,
    /// Best level seen.
    pub last: MatchLevel,
    /// Candidate achieving `last`.
    pub lastf: Option<DeclId>,
    /// Another candidate tied with `lastf`, when ambiguous.
    pub nextf: Option<DeclId>,
    /// First candidate visited, matching or not.
    pub anyf: Option<DeclId>,
}

impl Match {
    pub fn is_unmatched(&self) -> bool {
        self.lastf.is_none()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.count >= 2
    }

    /// The winner, if there is exactly one.
    pub fn best(&self) -> Option<DeclId> {
        if self.count == 1 {
            self.lastf
        } else {
            None
        }
    }

    fn take(&mut self, func: DeclId, level: MatchLevel) {
        self.last = level;
        self.lastf = Some(func);
        self.nextf = None;
        self.count = 1;
    }
}

/// Find the best function of the overload set at `start` for a call.
///
/// Candidates are scored by `oracle` in declaration order. A strictly
/// better level replaces the current best; an equal level is broken by
/// overriding, then by preferring a definition over an identical
/// declaration, then by [`least_as_specialized`]. What remains tied is
/// counted in [`Match::count`].
#[tracing::instrument(level = "debug", skip(arena, oracle, tiargs, args))]
pub fn function_resolve(
    arena: &DeclArena,
    oracle: &dyn MatchOracle,
    start: DeclId,
    tiargs: Option<&[TemplateArg]>,
    this_ty: Option<TypeRef>,
    args: &[Argument],
) -> Match {
    let mut m = Match::default();
    let explicit_tiargs = tiargs.is_some_and(|tiargs| !tiargs.is_empty());

    let _ = overload_apply(arena, start, |func| {
        if m.anyf.is_none() {
            m.anyf = Some(func);
        }
        if explicit_tiargs {
            tracing::trace!(candidate = ?func, "not a template, skipped");
            return ControlFlow::<()>::Continue(());
        }
        let Some(signature) = arena.signature(func) else {
            return ControlFlow::Continue(());
        };
        let level = oracle.call_match(&signature, args, this_arg(arena, func, this_ty));
        tracing::trace!(candidate = ?func, ?level, "scored");
        if level == MatchLevel::NoMatch {
            return ControlFlow::Continue(());
        }

        let Some(lastf) = m.lastf else {
            m.take(func, level);
            return ControlFlow::Continue(());
        };
        let ordering = level
            .cmp(&m.last)
            .then_with(|| tie_break(arena, oracle, func, lastf));
        match ordering {
            Ordering::Greater => m.take(func, level),
            Ordering::Less => {}
            Ordering::Equal => {
                m.nextf = Some(func);
                m.count += 1;
            }
        }
        ControlFlow::Continue(())
    });

    tracing::debug!(
        count = m.count,
        level = ?m.last,
        winner = ?m.lastf,
        "overload resolution finished"
    );
    m
}

/// `this` type passed to the oracle: only for member functions that take
/// one, and never for constructors.
fn this_arg(arena: &DeclArena, func: DeclId, this_ty: Option<TypeRef>) -> Option<TypeRef> {
    let is_ctor = arena
        .func(func)
        .is_some_and(|f| matches!(f.kind, FuncKind::Ctor));
    if arena.need_this(func) && !is_ctor {
        this_ty
    } else {
        None
    }
}

/// Order two candidates that matched at the same level. `Greater` prefers
/// `f`, `Less` prefers `last`.
fn tie_break(arena: &DeclArena, oracle: &dyn MatchOracle, f: DeclId, last: DeclId) -> Ordering {
    if overrides(arena, last, f) {
        return Ordering::Less;
    }
    if overrides(arena, f, last) {
        return Ordering::Greater;
    }
    if same_declaration(arena, f, last) {
        let has_body = |id: DeclId| arena.func(id).is_some_and(|func| func.body.is_some());
        match (has_body(f), has_body(last)) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
    }
    let f_over_last = least_as_specialized(arena, oracle, f, last);
    let last_over_f = least_as_specialized(arena, oracle, last, f);
    f_over_last.cmp(&last_over_f)
}

fn overrides(arena: &DeclArena, func: DeclId, base: DeclId) -> bool {
    arena
        .func(func)
        .is_some_and(|f| f.foverrides.contains(&base))
}

/// A declaration and a definition of the same function.
fn same_declaration(arena: &DeclArena, a: DeclId, b: DeclId) -> bool {
    let (a, b) = (arena.get(a), arena.get(b));
    a.ty.is_some()
        && a.ty == b.ty
        && a.stc == b.stc
        && a.parent == b.parent
        && a.visibility == b.visibility
        && a.linkage == b.linkage
}

/// How well `g` accepts every argument list `f` accepts.
///
/// Builds an argument list out of `f`'s parameter types and scores it
/// against `g`. Member functions must also agree on the `this` modifier
/// (for constructors the conversion runs the other way), and a variadic
/// `f` is never as specialized as a non-variadic `g`.
pub fn least_as_specialized(
    arena: &DeclArena,
    oracle: &dyn MatchOracle,
    f: DeclId,
    g: DeclId,
) -> MatchLevel {
    let (Some(sf), Some(sg)) = (arena.signature(f), arena.signature(g)) else {
        return MatchLevel::NoMatch;
    };

    if arena.need_this(f) && arena.need_this(g) {
        let f_mod = TypeMod::from_stc(sf.stc);
        let g_mod = TypeMod::from_stc(sg.stc);
        if f_mod != g_mod {
            let is_ctor = arena
                .func(f)
                .is_some_and(|func| matches!(func.kind, FuncKind::Ctor));
            let converts = if is_ctor {
                g_mod.implicit_conv(f_mod)
            } else {
                f_mod.implicit_conv(g_mod)
            };
            if !converts {
                return MatchLevel::NoMatch;
            }
        }
    }

    if sf.variadic != Variadic::None && sg.variadic == Variadic::None {
        return MatchLevel::NoMatch;
    }
    let args: Vec<Argument> = sf
        .params
        .iter()
        .map(|param| Argument {
            ty: param.ty,
            expr: None,
            is_lvalue: param.is_by_ref(),
        })
        .collect();
    oracle.call_match(&sg, &args, None)
}

/// Resolve a call and turn the outcome into the function to call.
///
/// No match and an ambiguous match become errors, as does a winner that is
/// `@disable`d at `site`.
pub fn resolve_call(
    arena: &DeclArena,
    oracle: &dyn MatchOracle,
    start: DeclId,
    tiargs: Option<&[TemplateArg]>,
    this_ty: Option<TypeRef>,
    args: &[Argument],
    site: UseSite,
) -> Result<DeclId, DeclError> {
    let m = function_resolve(arena, oracle, start, tiargs, this_ty, args);
    match (m.lastf, m.nextf) {
        (None, _) => Err(DeclError::NoMatchingOverload {
            start,
            span: site.span,
            candidate: m.anyf,
        }),
        (Some(first), Some(second)) if m.is_ambiguous() => Err(DeclError::AmbiguousOverload {
            start,
            span: site.span,
            first,
            second,
        }),
        (Some(func), _) => {
            arena.check_disabled(func, site, false)?;
            Ok(func)
        }
    }
}
