//! Traversal and maintenance of overload chains.

use std::ops::ControlFlow;

use dsem_ir::TypeRef;
use rustc_hash::FxHashSet;

use crate::arena::DeclArena;
use crate::decl::{DeclKind, FuncKind};
use crate::error::DeclError;
use crate::ids::DeclId;
use crate::stack::ensure_sufficient_stack;

/// Depth-first walk over overload chains.
///
/// `chains_seen` guards against alias cycles; `funcs_seen` keeps a function
/// reachable along two paths from being reported twice.
struct Walker<'a, F> {
    arena: &'a DeclArena,
    chains_seen: FxHashSet<DeclId>,
    funcs_seen: FxHashSet<DeclId>,
    visit: F,
}

impl<B, F> Walker<'_, F>
where
    F: FnMut(DeclId) -> ControlFlow<B>,
{
    fn walk(&mut self, start: DeclId) -> ControlFlow<B> {
        let arena = self.arena;
        let mut next = Some(start);
        while let Some(id) = next {
            if !self.chains_seen.insert(id) {
                tracing::trace!(?id, "overload chain reached a visited node");
                break;
            }
            let decl = arena.get(id);
            next = decl.overnext();
            match &decl.kind {
                DeclKind::Func(func) => match func.kind {
                    FuncKind::Alias {
                        target,
                        has_overloads: true,
                    } => ensure_sufficient_stack(|| self.walk(target))?,
                    FuncKind::Alias { .. } => self.report(arena.to_alias_func(id))?,
                    _ => self.report(id)?,
                },
                DeclKind::Over(over) => match over.aliassym {
                    Some(target) if !over.has_overloads && arena.func(target).is_some() => {
                        self.report(arena.to_alias_func(target))?;
                    }
                    Some(target) => ensure_sufficient_stack(|| self.walk(target))?,
                    None => {}
                },
                DeclKind::Alias(alias) => {
                    if let Some(target) = alias.aliassym {
                        ensure_sufficient_stack(|| self.walk(target))?;
                    }
                }
                DeclKind::Var(_) | DeclKind::Tuple(_) => {}
            }
        }
        ControlFlow::Continue(())
    }

    fn report(&mut self, func: DeclId) -> ControlFlow<B> {
        if self.arena.func(func).is_none() || !self.funcs_seen.insert(func) {
            return ControlFlow::Continue(());
        }
        (self.visit)(func)
    }
}

/// Call `visit` on every function of the overload set starting at `start`,
/// in declaration order, until it breaks.
///
/// Function aliases are reported as the function they name. Each distinct
/// function is visited once, and a self-referential alias ends its chain
/// instead of looping.
pub fn overload_apply<B>(
    arena: &DeclArena,
    start: DeclId,
    visit: impl FnMut(DeclId) -> ControlFlow<B>,
) -> ControlFlow<B> {
    let mut walker = Walker {
        arena,
        chains_seen: FxHashSet::default(),
        funcs_seen: FxHashSet::default(),
        visit,
    };
    walker.walk(start)
}

/// Every function of the overload set, in visiting order.
pub fn candidates(arena: &DeclArena, start: DeclId) -> Vec<DeclId> {
    let mut funcs = Vec::new();
    let _ = overload_apply(arena, start, |func| {
        funcs.push(func);
        ControlFlow::<()>::Continue(())
    });
    funcs
}

/// The only function of the overload set, if it has exactly one.
pub fn is_unique(arena: &DeclArena, start: DeclId) -> Option<DeclId> {
    let mut found = None;
    let flow = overload_apply(arena, start, |func| {
        if found.is_some() {
            return ControlFlow::Break(());
        }
        found = Some(func);
        ControlFlow::Continue(())
    });
    if flow.is_break() {
        None
    } else {
        found
    }
}

/// First function of the overload set whose type is exactly `ty`.
pub fn overload_exact_match(arena: &DeclArena, start: DeclId, ty: TypeRef) -> Option<DeclId> {
    let flow = overload_apply(arena, start, |func| {
        if arena.get(func).ty == Some(ty) {
            ControlFlow::Break(func)
        } else {
            ControlFlow::Continue(())
        }
    });
    match flow {
        ControlFlow::Break(func) => Some(func),
        ControlFlow::Continue(()) => None,
    }
}

/// Whether the chain node `at` lets `new` join its overload set.
fn accepts(arena: &DeclArena, at: DeclId, new: DeclId) -> bool {
    let joinable = match &arena.get(new).kind {
        DeclKind::Func(func) => func.kind.policy().overloadable,
        DeclKind::Alias(_) | DeclKind::Over(_) => true,
        DeclKind::Var(_) | DeclKind::Tuple(_) => false,
    };
    if !joinable {
        return false;
    }
    match &arena.get(at).kind {
        DeclKind::Func(func) => func.kind.policy().overloadable,
        DeclKind::Alias(alias) => match alias.aliassym {
            Some(target) => matches!(
                arena.get(target).kind,
                DeclKind::Func(_) | DeclKind::Alias(_) | DeclKind::Over(_)
            ),
            // Target not known yet; checked once the import resolves.
            None => true,
        },
        DeclKind::Over(_) => true,
        DeclKind::Var(_) | DeclKind::Tuple(_) => false,
    }
}

/// Append `new` to the end of the overload chain starting at `head`.
///
/// Destructors and postblits never overload, variables and tuples are not
/// overloadable at all. Inserting a declaration already in the chain is a
/// no-op.
pub fn overload_insert(arena: &mut DeclArena, head: DeclId, new: DeclId) -> Result<(), DeclError> {
    let refuse = || DeclError::NotOverloadable {
        existing: head,
        new,
    };
    if head == new {
        return Ok(());
    }
    let mut seen = FxHashSet::default();
    let mut tail = head;
    loop {
        if !accepts(arena, tail, new) {
            return Err(refuse());
        }
        seen.insert(tail);
        match arena.get(tail).overnext() {
            Some(next) if next == new => return Ok(()),
            Some(next) if !seen.contains(&next) => tail = next,
            Some(_) => return Err(refuse()),
            None => break,
        }
    }
    if arena.get_mut(tail).set_overnext(Some(new)) {
        tracing::trace!(?head, ?tail, ?new, "overload inserted");
        Ok(())
    } else {
        Err(refuse())
    }
}
