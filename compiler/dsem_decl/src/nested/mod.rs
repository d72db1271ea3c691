//! Nested functions and the lifetime of locals.
//!
//! A local referenced from a nested function lives in its function's frame
//! for as long as the nested function can run. When a nested function can
//! outlive the call (it is a member, its address is taken, or a sibling
//! that calls it escapes), the frame has to be a heap-allocated closure.
//!
//! The submodules cover the other two lifetime checks: jumps over
//! initializations ([`goto`]) and overlapping fields ([`layout`]).

pub mod goto;
pub mod layout;

use dsem_ir::Span;
use rustc_hash::FxHashSet;

use crate::arena::DeclArena;
use crate::error::DeclError;
use crate::ids::DeclId;

/// Whether `from` is `owner` or lexically nested inside it.
fn is_within(arena: &DeclArena, from: DeclId, owner: DeclId) -> bool {
    let mut current = Some(from);
    for _ in 0..=arena.len() {
        match current {
            Some(func) if func == owner => return true,
            Some(func) => current = arena.parent_func(func),
            None => return false,
        }
    }
    false
}

/// Whether `func` is one of the contract functions synthesized for `owner`.
fn is_contract_of(arena: &DeclArena, func: DeclId, owner: DeclId) -> bool {
    arena
        .func(owner)
        .is_some_and(|f| f.fdrequire == Some(func) || f.fdensure == Some(func))
}

/// Record that function `from` refers to local variable `var`.
///
/// Returns whether the reference crosses into another function's frame.
/// Such references are remembered on both sides: `from` in the variable's
/// `nestedrefs`, the variable in its function's `closure_vars` (except for
/// contracts, which run inside the frame). Statics, manifest constants and
/// same-frame references need nothing.
pub fn check_var_nested_reference(
    arena: &mut DeclArena,
    var: DeclId,
    from: DeclId,
    span: Span,
) -> Result<bool, DeclError> {
    let Some(owner) = arena.parent_func(var) else {
        return Ok(false);
    };
    if owner == from || arena.has_static_storage(var) || arena.get(var).stc.is_manifest() {
        return Ok(false);
    }
    if !is_within(arena, from, owner) {
        return Err(DeclError::CannotAccessFrame { var, from, span });
    }

    if let Some(v) = arena.var_mut(var) {
        if !v.nestedrefs.contains(&from) {
            v.nestedrefs.push(from);
        }
    }
    if !is_contract_of(arena, from, owner) {
        if let Some(f) = arena.func_mut(owner) {
            if !f.closure_vars.contains(&var) {
                f.closure_vars.push(var);
            }
        }
    }
    tracing::trace!(?var, ?from, ?owner, "nested reference");
    Ok(true)
}

/// Record that `caller` refers to the nested function `callee`.
///
/// A call from a sibling (any function other than the callee's parent) is
/// remembered in the callee's `sibling_callers`. The caller must be able to
/// reach the callee's parent frame.
pub fn check_func_nested_reference(
    arena: &mut DeclArena,
    callee: DeclId,
    caller: DeclId,
    span: Span,
) -> Result<(), DeclError> {
    let callee = arena.to_alias_func(callee);
    if !arena.is_nested(callee) {
        return Ok(());
    }
    let Some(parent) = arena.parent_func(callee) else {
        return Ok(());
    };
    if parent == caller || is_contract_of(arena, callee, parent) {
        return Ok(());
    }
    if !is_within(arena, caller, parent) {
        return Err(DeclError::CannotAccessFrame {
            var: callee,
            from: caller,
            span,
        });
    }
    if caller != callee {
        if let Some(f) = arena.func_mut(callee) {
            if !f.sibling_callers.contains(&caller) {
                f.sibling_callers.push(caller);
            }
        }
    }
    Ok(())
}

/// Whether a nested function can outlive the call of its parent.
fn escapes(arena: &DeclArena, func: DeclId) -> bool {
    arena.is_this(func).is_some() || arena.func(func).is_some_and(|f| f.took_address_of > 0)
}

/// Whether `func` escapes through a chain of sibling callers, marking every
/// escaping caller's parent as needing a closure.
fn check_escaping_siblings(
    arena: &mut DeclArena,
    func: DeclId,
    outer: DeclId,
    visited: &mut FxHashSet<DeclId>,
) -> bool {
    if !visited.insert(func) {
        return false;
    }
    let callers = arena
        .func(func)
        .map(|f| f.sibling_callers.to_vec())
        .unwrap_or_default();
    let mut any = false;
    for caller in callers {
        if escapes(arena, caller) {
            mark_closure_chain(arena, caller, outer);
            any = true;
        }
        any |= check_escaping_siblings(arena, caller, outer, visited);
    }
    any
}

/// Mark every function from `func`'s parent up to `outer` as needing a
/// closure.
fn mark_closure_chain(arena: &mut DeclArena, func: DeclId, outer: DeclId) {
    let mut current = arena.parent_func(func);
    for _ in 0..=arena.len() {
        let Some(fx) = current else {
            break;
        };
        if let Some(f) = arena.func_mut(fx) {
            f.requires_closure = true;
        }
        if fx == outer {
            break;
        }
        current = arena.parent_func(fx);
    }
}

/// Whether `func` needs its frame allocated on the heap.
///
/// True when a captured local is referenced from a nested function that
/// escapes, directly or by being called from an escaping sibling. The
/// result is stored in `requires_closure`.
pub fn needs_closure(arena: &mut DeclArena, func: DeclId) -> bool {
    let referrers: Vec<DeclId> = arena
        .func(func)
        .map(|f| {
            f.closure_vars
                .iter()
                .filter_map(|&var| arena.var(var))
                .flat_map(|var| var.nestedrefs.iter().copied())
                .collect()
        })
        .unwrap_or_default();

    let mut needed = false;
    let mut visited = FxHashSet::default();
    'referrers: for referrer in referrers {
        let mut current = Some(referrer);
        for _ in 0..=arena.len() {
            let Some(fx) = current else {
                break;
            };
            if fx == func {
                break;
            }
            if escapes(arena, fx) || check_escaping_siblings(arena, fx, func, &mut visited) {
                needed = true;
                break 'referrers;
            }
            current = arena.parent_func(fx);
        }
    }

    if let Some(f) = arena.func_mut(func) {
        f.requires_closure |= needed;
    }
    tracing::debug!(?func, needed, "closure check");
    needed
}
