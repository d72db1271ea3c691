//! Declaration storage.
//!
//! All declarations of a compilation unit live in one [`DeclArena`] and are
//! mutated in place by the analysis passes. Links between declarations are
//! [`DeclId`]s into the arena.

mod copy;
mod query;

use std::ops::ControlFlow;

use dsem_ir::{Name, Span};
use rustc_hash::FxHashSet;

use crate::decl::{
    AggregateDecl, BuiltinStatus, DeclKind, Declaration, FuncDecl, FuncKind, Parent, VarDecl,
};
use crate::error::DeclError;
use crate::ids::{AggregateId, DeclId};
use crate::overload::overload_apply;
use crate::stack::ensure_sufficient_stack;

/// Where a declaration is referenced from.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct UseSite {
    /// Function whose body contains the reference, if any.
    pub func: Option<DeclId>,
    pub span: Span,
}

impl UseSite {
    pub fn new(func: Option<DeclId>, span: Span) -> Self {
        UseSite { func, span }
    }
}

/// Owner of every declaration and aggregate of a compilation unit.
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Declaration>,
    aggregates: Vec<AggregateDecl>,
    next_sequence: u32,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a declaration. Variables receive the next sequence number.
    pub fn alloc(&mut self, mut decl: Declaration) -> DeclId {
        let Ok(raw) = u32::try_from(self.decls.len()) else {
            panic!("declaration arena overflow: more than {} declarations", u32::MAX);
        };
        if let Some(var) = decl.as_var_mut() {
            var.sequence = self.next_sequence;
            self.next_sequence += 1;
        }
        self.decls.push(decl);
        DeclId::from_raw(raw)
    }

    pub fn add_aggregate(&mut self, aggregate: AggregateDecl) -> AggregateId {
        let Ok(raw) = u32::try_from(self.aggregates.len()) else {
            panic!("aggregate arena overflow: more than {} aggregates", u32::MAX);
        };
        self.aggregates.push(aggregate);
        AggregateId::from_raw(raw)
    }

    #[inline]
    pub fn get(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    #[inline]
    pub fn aggregate(&self, id: AggregateId) -> &AggregateDecl {
        &self.aggregates[id.index()]
    }

    #[inline]
    pub fn aggregate_mut(&mut self, id: AggregateId) -> &mut AggregateDecl {
        &mut self.aggregates[id.index()]
    }

    pub fn func(&self, id: DeclId) -> Option<&FuncDecl> {
        self.get(id).as_func()
    }

    pub fn func_mut(&mut self, id: DeclId) -> Option<&mut FuncDecl> {
        self.get_mut(id).as_func_mut()
    }

    pub fn var(&self, id: DeclId) -> Option<&VarDecl> {
        self.get(id).as_var()
    }

    pub fn var_mut(&mut self, id: DeclId) -> Option<&mut VarDecl> {
        self.get_mut(id).as_var_mut()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        (0u32..).map(DeclId::from_raw).zip(self.decls.iter())
    }

    /// Make `var` a local of `func`, visible by name in its symbol table.
    ///
    /// Returns the local it shadows, if any.
    pub fn declare_local(&mut self, func: DeclId, var: DeclId) -> Option<DeclId> {
        let name = self.get(var).name;
        self.get_mut(var).parent = Parent::Func(func);
        self.func_mut(func).and_then(|f| f.declare_local(name, var))
    }

    /// Enclosing function of a declaration, if it is a local.
    pub fn parent_func(&self, id: DeclId) -> Option<DeclId> {
        match self.get(id).parent {
            Parent::Func(func) => Some(func),
            Parent::Module | Parent::Aggregate(_) => None,
        }
    }

    /// Follow alias links to the declaration an alias ultimately names.
    ///
    /// Non-aliases resolve to themselves. A cycle through aliases is
    /// reported as [`DeclError::RecursiveAlias`].
    pub fn to_alias(&mut self, id: DeclId) -> Result<DeclId, DeclError> {
        let target = match &self.get(id).kind {
            DeclKind::Alias(alias) => alias.aliassym,
            DeclKind::Var(var) => var.alias_sym,
            DeclKind::Tuple(_) | DeclKind::Over(_) | DeclKind::Func(_) => None,
        };
        let Some(target) = target else {
            return Ok(id);
        };
        let decl = self.get(id);
        if decl.inuse > 0 {
            tracing::debug!(alias = ?id, "recursive alias");
            return Err(DeclError::RecursiveAlias {
                name: decl.name,
                span: decl.span,
            });
        }
        self.get_mut(id).inuse += 1;
        let resolved = ensure_sufficient_stack(|| self.to_alias(target));
        self.get_mut(id).inuse -= 1;
        resolved
    }

    /// Follow function-alias links to the aliased function.
    pub fn to_alias_func(&self, id: DeclId) -> DeclId {
        let mut current = id;
        for _ in 0..self.decls.len() {
            match self.func(current).map(|func| func.kind) {
                Some(FuncKind::Alias { target, .. }) if target != id => current = target,
                _ => break,
            }
        }
        current
    }

    /// Fail if `id` is annotated `@disable` and may not be used at `site`.
    ///
    /// Disabled declarations stay usable from functions that are themselves
    /// disabled. For an aliased overload set (`is_aliased`) it is enough that
    /// one member of the set is enabled.
    pub fn check_disabled(
        &self,
        id: DeclId,
        site: UseSite,
        is_aliased: bool,
    ) -> Result<(), DeclError> {
        if !self.get(id).stc.is_disable() {
            return Ok(());
        }
        if site.func.is_some_and(|func| self.get(func).stc.is_disable()) {
            return Ok(());
        }
        if is_aliased && self.func(id).is_some() {
            let enabled = overload_apply(self, id, |fd| {
                if self.get(fd).stc.is_disable() {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            });
            if enabled.is_break() {
                return Ok(());
            }
        }
        Err(DeclError::Disabled {
            decl: id,
            span: site.span,
        })
    }

    /// Whether `id` is evaluated by the compiler itself, memoized.
    ///
    /// `builtins` is the table of mangled names the compiler implements.
    pub fn is_builtin(&mut self, id: DeclId, builtins: &FxHashSet<Name>) -> bool {
        let Some(symbol) = self.get(id).mangled_name() else {
            return false;
        };
        let Some(func) = self.func_mut(id) else {
            return false;
        };
        if func.builtin == BuiltinStatus::Unknown {
            func.builtin = if builtins.contains(&symbol) {
                BuiltinStatus::Yes
            } else {
                BuiltinStatus::No
            };
        }
        func.builtin == BuiltinStatus::Yes
    }
}
