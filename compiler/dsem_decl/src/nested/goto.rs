//! Jumps over variable initializations.
//!
//! Every local records the variable declared just before it (`last_var`),
//! so the variables visible at any point form a chain back to the start of
//! the function. A jump is legal when every variable visible at the label
//! is either visible at the jump too, or is one whose initialization can
//! be skipped.

use dsem_ir::{Name, Span};
use rustc_hash::FxHashSet;

use crate::arena::DeclArena;
use crate::decl::{LabelInfo, PendingGoto, VarDecl};
use crate::error::DeclError;
use crate::ids::DeclId;

/// The most recent variable declaration while walking a scope.
///
/// Copy the cursor on entering a scope and restore it on leaving, so that
/// variables of a closed scope drop out of the chain.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct LastVarCursor {
    last: Option<DeclId>,
}

impl LastVarCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(self) -> Option<DeclId> {
        self.last
    }

    /// Thread `var` onto the chain.
    pub fn declare(&mut self, arena: &mut DeclArena, var: DeclId) {
        if let Some(v) = arena.var_mut(var) {
            v.last_var = self.last;
            self.last = Some(var);
        }
    }
}

/// Whether jumping past the declaration of `var` leaves it in a state the
/// rest of the scope cannot observe.
fn may_skip(arena: &DeclArena, var: DeclId) -> bool {
    let decl = arena.get(var);
    if decl.stc.is_manifest() || arena.has_static_storage(var) {
        return true;
    }
    if decl.stc.is_exptemp() {
        return false;
    }
    !decl.as_var().is_some_and(VarDecl::has_nontrivial_init)
}

/// Check a jump whose source sees `goto_last` to a label that sees
/// `label_last`.
#[tracing::instrument(level = "debug", skip(arena))]
pub fn check_goto(
    arena: &DeclArena,
    goto_last: Option<DeclId>,
    label_last: Option<DeclId>,
    span: Span,
) -> Result<(), DeclError> {
    let mut visible = FxHashSet::default();
    let mut current = goto_last;
    while let Some(var) = current {
        if !visible.insert(var) {
            break;
        }
        current = arena.var(var).and_then(|v| v.last_var);
    }

    let mut skipped = FxHashSet::default();
    let mut current = label_last;
    while let Some(var) = current {
        if visible.contains(&var) || !skipped.insert(var) {
            break;
        }
        if !may_skip(arena, var) {
            tracing::debug!(?var, "jump skips an initialization");
            return Err(DeclError::GotoSkipsInitializer { var, span });
        }
        current = arena.var(var).and_then(|v| v.last_var);
    }
    Ok(())
}

/// Check a `goto label` inside `func`, or queue it until the label has
/// been declared.
pub fn check_goto_label(
    arena: &mut DeclArena,
    func: DeclId,
    goto: PendingGoto,
) -> Result<(), DeclError> {
    let Some(f) = arena.func(func) else {
        return Ok(());
    };
    if let Some(label) = f.search_label(goto.label) {
        return check_goto(arena, goto.last_var, label.last_var, goto.span);
    }
    if let Some(f) = arena.func_mut(func) {
        f.pending_gotos.push(goto);
    }
    Ok(())
}

/// Declare `label` in `func` at the point where `cursor` stands.
pub fn declare_label(
    arena: &mut DeclArena,
    func: DeclId,
    label: Name,
    span: Span,
    cursor: LastVarCursor,
) -> Option<LabelInfo> {
    arena.func_mut(func)?.declare_label(
        label,
        LabelInfo {
            span,
            last_var: cursor.last(),
        },
    )
}

/// Check every queued jump of `func` whose label is now known.
///
/// Jumps to labels that are still unknown stay queued.
pub fn resolve_pending_gotos(arena: &mut DeclArena, func: DeclId) -> Vec<DeclError> {
    let Some(f) = arena.func_mut(func) else {
        return Vec::new();
    };
    let pending = std::mem::take(&mut f.pending_gotos);
    let mut unresolved = Vec::new();
    let mut errors = Vec::new();
    for goto in pending {
        let label = arena.func(func).and_then(|f| f.search_label(goto.label));
        match label {
            Some(label) => {
                if let Err(error) = check_goto(arena, goto.last_var, label.last_var, goto.span) {
                    errors.push(error);
                }
            }
            None => unresolved.push(goto),
        }
    }
    if let Some(f) = arena.func_mut(func) {
        f.pending_gotos = unresolved;
    }
    errors
}
