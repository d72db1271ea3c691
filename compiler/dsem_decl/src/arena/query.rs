//! Queries that look past a single declaration: placement, membership,
//! virtuality and entry points.

use dsem_ir::Name;

use super::DeclArena;
use crate::config::AnalysisConfig;
use crate::decl::{DeclKind, FuncKind, InvariantRule, LiteralKind, Parent, VarRole, Virtuality};
use crate::ids::{AggregateId, DeclId};
use crate::stc::StorageClass;
use crate::visibility::{Linkage, Visibility};

/// Variables with any of these bits have no `this`.
const NOT_A_FIELD: StorageClass = StorageClass::from_bits_truncate(
    StorageClass::STATIC.bits()
        | StorageClass::EXTERN.bits()
        | StorageClass::MANIFEST.bits()
        | StorageClass::TEMPLATEPARAMETER.bits()
        | StorageClass::TLS.bits()
        | StorageClass::GSHARED.bits()
        | StorageClass::CTFE.bits(),
);

/// Explicit requests for static storage.
const STATIC_STORAGE: StorageClass = StorageClass::from_bits_truncate(
    StorageClass::STATIC.bits()
        | StorageClass::EXTERN.bits()
        | StorageClass::TLS.bits()
        | StorageClass::GSHARED.bits(),
);

/// Static variables with any of these bits are shared between threads.
const NOT_THREAD_LOCAL: StorageClass = StorageClass::from_bits_truncate(
    StorageClass::IMMUTABLE.bits() | StorageClass::SHARED.bits() | StorageClass::GSHARED.bits(),
);

impl DeclArena {
    /// Visibility of `id`, inherited from the enclosing aggregate or
    /// function when not written. Top-level declarations default to public.
    pub fn visibility(&self, id: DeclId) -> Visibility {
        let mut current = id;
        for _ in 0..=self.len() {
            let decl = self.get(current);
            if decl.visibility != Visibility::Undefined {
                return decl.visibility;
            }
            match decl.parent {
                Parent::Aggregate(agg) => {
                    let vis = self.aggregate(agg).visibility;
                    if vis != Visibility::Undefined {
                        return vis;
                    }
                    break;
                }
                Parent::Func(func) => current = func,
                Parent::Module => break,
            }
        }
        Visibility::Public
    }

    /// Aggregate `id` is a direct member of.
    pub fn is_member(&self, id: DeclId) -> Option<AggregateId> {
        match self.get(id).parent {
            Parent::Aggregate(agg) => Some(agg),
            Parent::Module | Parent::Func(_) => None,
        }
    }

    /// Aggregate whose instance `id` needs a `this` reference to.
    pub fn is_this(&self, id: DeclId) -> Option<AggregateId> {
        let decl = self.get(id);
        match &decl.kind {
            DeclKind::Var(_) if !decl.stc.intersects(NOT_A_FIELD) => self.is_member(id),
            DeclKind::Func(func) if func.kind.policy().has_this && !decl.stc.is_static() => {
                self.is_member(id)
            }
            _ => None,
        }
    }

    /// Whether using `id` requires a `this` reference.
    pub fn need_this(&self, id: DeclId) -> bool {
        let decl = self.get(id);
        match &decl.kind {
            DeclKind::Var(_) => decl.stc.is_field(),
            DeclKind::Func(_) => self.is_this(self.to_alias_func(id)).is_some(),
            DeclKind::Tuple(_) | DeclKind::Alias(_) | DeclKind::Over(_) => false,
        }
    }

    /// Whether a variable lives in static storage (thread-local or global).
    pub fn has_static_storage(&self, id: DeclId) -> bool {
        let decl = self.get(id);
        let Some(var) = decl.as_var() else {
            return false;
        };
        if decl.stc.intersects(StorageClass::MANIFEST | StorageClass::PARAMETER) {
            return false;
        }
        match var.role {
            VarRole::Symbol(_) | VarRole::TypeInfo { .. } => true,
            VarRole::This => false,
            VarRole::Plain => {
                decl.stc.intersects(STATIC_STORAGE) || decl.parent == Parent::Module
            }
        }
    }

    /// Whether a variable is placed in a per-thread storage block.
    pub fn is_threadlocal(&self, id: DeclId) -> bool {
        if !self.has_static_storage(id) {
            return false;
        }
        let decl = self.get(id);
        match decl.as_var().map(|var| var.role) {
            Some(VarRole::Plain) => decl.stc.is_tls() || !decl.stc.intersects(NOT_THREAD_LOCAL),
            _ => false,
        }
    }

    /// Whether a variable is placed in the global data segment.
    ///
    /// Thread-local variables and manifest constants never are.
    pub fn is_dataseg(&self, id: DeclId) -> bool {
        self.has_static_storage(id) && !self.is_threadlocal(id)
    }

    /// Whether a function is nested inside another and needs its frame.
    pub fn is_nested(&self, id: DeclId) -> bool {
        let id = self.to_alias_func(id);
        let decl = self.get(id);
        let Some(func) = decl.as_func() else {
            return false;
        };
        if let FuncKind::Literal(kind) = func.kind {
            return kind != LiteralKind::Function && self.is_this(id).is_none();
        }
        !decl.stc.is_static()
            && decl.linkage == Linkage::D
            && matches!(decl.parent, Parent::Func(_))
    }

    pub fn is_final_func(&self, id: DeclId) -> bool {
        let id = self.to_alias_func(id);
        let Some(agg) = self.is_member(id) else {
            return false;
        };
        let aggregate = self.aggregate(agg);
        self.get(id).stc.is_final() || (aggregate.is_class() && aggregate.is_final)
    }

    /// Whether a function may be dispatched through a vtable.
    pub fn is_virtual(&self, id: DeclId) -> bool {
        let id = self.to_alias_func(id);
        let decl = self.get(id);
        let Some(func) = decl.as_func() else {
            return false;
        };
        if func.kind.policy().virtuality == Virtuality::Never {
            return false;
        }
        let Some(agg) = self.is_member(id) else {
            return false;
        };
        let aggregate = self.aggregate(agg);
        let hidden = matches!(decl.visibility, Visibility::Private | Visibility::Package);
        !decl.stc.is_static()
            && !hidden
            && aggregate.is_class()
            && !(aggregate.is_interface() && self.is_final_func(id))
    }

    /// Whether a function occupies a vtable slot: virtual, and either not
    /// final or overriding something.
    pub fn is_virtual_method(&self, id: DeclId) -> bool {
        let id = self.to_alias_func(id);
        if !self.is_virtual(id) {
            return false;
        }
        let overrides = self.func(id).is_some_and(|func| !func.foverrides.is_empty());
        !self.is_final_func(id) || overrides
    }

    /// Whether a declaration has no implementation of its own.
    pub fn is_abstract(&self, id: DeclId) -> bool {
        let decl = self.get(id);
        if decl.stc.is_abstract() {
            return true;
        }
        let Some(func) = decl.as_func() else {
            return false;
        };
        let in_interface = self
            .is_member(id)
            .is_some_and(|agg| self.aggregate(agg).is_interface());
        in_interface && func.body.is_none() && !decl.stc.is_static() && !self.is_final_func(id)
    }

    pub fn add_pre_invariant(&self, id: DeclId, config: &AnalysisConfig) -> bool {
        self.func(id)
            .is_some_and(|func| self.invariant_applies(id, func.kind.policy().pre_invariant, config))
    }

    pub fn add_post_invariant(&self, id: DeclId, config: &AnalysisConfig) -> bool {
        self.func(id).is_some_and(|func| {
            self.invariant_applies(id, func.kind.policy().post_invariant, config)
        })
    }

    fn invariant_applies(&self, id: DeclId, rule: InvariantRule, config: &AnalysisConfig) -> bool {
        if !config.use_invariants {
            return false;
        }
        let Some(func) = self.func(id) else {
            return false;
        };
        match rule {
            InvariantRule::Never => false,
            InvariantRule::WithThis => self.is_this(id).is_some() && func.vthis.is_some(),
            InvariantRule::Member => {
                let Some(agg) = self.is_this(id) else {
                    return false;
                };
                let aggregate = self.aggregate(agg);
                let cpp_class = aggregate.is_class() && aggregate.linkage == Linkage::Cpp;
                let exposed = matches!(
                    self.visibility(id),
                    Visibility::Protected | Visibility::Public | Visibility::Export
                );
                !cpp_class && exposed && !func.is_naked()
            }
        }
    }

    fn is_entry_point(&self, id: DeclId, name: Name) -> bool {
        let decl = self.get(id);
        decl.name == name
            && decl.as_func().is_some()
            && self.is_member(id).is_none()
            && !self.is_nested(id)
    }

    /// `main` with D linkage.
    pub fn is_main(&self, id: DeclId) -> bool {
        self.is_entry_point(id, Name::MAIN) && self.get(id).linkage != Linkage::C
    }

    /// `main` with C linkage.
    pub fn is_c_main(&self, id: DeclId) -> bool {
        self.is_entry_point(id, Name::MAIN) && self.get(id).linkage == Linkage::C
    }

    pub fn is_win_main(&self, id: DeclId) -> bool {
        self.is_entry_point(id, Name::WIN_MAIN) && self.get(id).linkage != Linkage::C
    }

    pub fn is_dll_main(&self, id: DeclId) -> bool {
        self.is_entry_point(id, Name::DLL_MAIN) && self.get(id).linkage != Linkage::C
    }
}
