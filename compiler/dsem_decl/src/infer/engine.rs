use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::DeclArena;
use crate::config::AnalysisConfig;
use crate::decl::{DeclKind, Declaration, FuncBody, FuncDecl, FuncFlags, VarFlags};
use crate::error::DeclError;
use crate::ids::DeclId;
use crate::nested::needs_closure;
use crate::stack::ensure_sufficient_stack;
use crate::stc::{StorageClass, TypeMod};
use crate::types::{Indirection, TypeQuery};

use super::{AttrSet, Attribute, Effect, PurityLevel};

/// `low` of a result that does not depend on any function in progress.
const SETTLED: usize = usize::MAX;

/// A function whose attribute is being inferred.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
struct Frame {
    func: DeclId,
    attr: Attribute,
}

/// Outcome of visiting one function or effect.
#[derive(Copy, Clone, Debug)]
struct Visit {
    holds: bool,
    /// Lowest stack position the result assumed to hold.
    low: usize,
}

impl Visit {
    const HOLDS: Visit = Visit {
        holds: true,
        low: SETTLED,
    };
    const FAILS: Visit = Visit {
        holds: false,
        low: SETTLED,
    };

    fn settled(holds: bool) -> Visit {
        if holds {
            Visit::HOLDS
        } else {
            Visit::FAILS
        }
    }
}

/// What is known about an attribute of a function before looking at its body.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Status {
    Holds,
    Fails,
    Infer,
}

/// Attribute inference over the declarations of one arena.
///
/// The traversal state lives here rather than on the declarations, and is
/// empty again whenever a public method returns. `stack` holds every
/// function visited but not yet concluded, in visiting order; `positions`
/// indexes it.
pub struct AttributeInference<'a> {
    arena: &'a mut DeclArena,
    config: &'a AnalysisConfig,
    stack: Vec<Frame>,
    positions: FxHashMap<Frame, usize>,
}

impl<'a> AttributeInference<'a> {
    pub fn new(arena: &'a mut DeclArena, config: &'a AnalysisConfig) -> Self {
        AttributeInference {
            arena,
            config,
            stack: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    pub fn arena(&self) -> &DeclArena {
        self.arena
    }

    /// Whether `attr` holds for `func`, inferring it if necessary.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn infer(&mut self, func: DeclId, attr: Attribute) -> bool {
        let func = self.arena.to_alias_func(func);
        let visit = self.visit(func, attr);
        debug_assert!(self.stack.is_empty());
        debug_assert!(self.positions.is_empty());
        visit.holds
    }

    pub fn is_pure(&mut self, func: DeclId) -> bool {
        self.infer(func, Attribute::Purity)
    }

    pub fn is_safe(&mut self, func: DeclId) -> bool {
        self.infer(func, Attribute::Safety)
    }

    pub fn is_nothrow(&mut self, func: DeclId) -> bool {
        self.infer(func, Attribute::Nothrow)
    }

    pub fn is_nogc(&mut self, func: DeclId) -> bool {
        self.infer(func, Attribute::Nogc)
    }

    /// Every attribute that holds for `func`.
    pub fn infer_all(&mut self, func: DeclId) -> AttrSet {
        Attribute::ALL
            .into_iter()
            .filter(|&attr| self.infer(func, attr))
            .fold(AttrSet::empty(), |set, attr| set | attr.as_set())
    }

    /// Whether `attr` of `func` is currently being inferred.
    pub fn is_in_progress(&self, func: DeclId, attr: Attribute) -> bool {
        self.positions.contains_key(&Frame { func, attr })
    }

    fn status(&self, func: DeclId, attr: Attribute) -> Status {
        let decl = self.arena.get(func);
        let Some(f) = decl.as_func() else {
            return Status::Fails;
        };
        if attr.holds_in(decl.stc) {
            return Status::Holds;
        }
        if f.concluded.contains(attr.as_set()) {
            return Status::Fails;
        }
        if attr == Attribute::Safety && decl.stc.is_system() {
            return Status::Fails;
        }
        let inferable = can_infer_attributes(decl, f)
            && self.config.infer.contains(attr.as_set())
            && f.body.is_some()
            && !f.flags.contains(FuncFlags::INLINE_ASM);
        if inferable {
            Status::Infer
        } else {
            Status::Fails
        }
    }

    /// Depth-first visit in the manner of Tarjan's strongly connected
    /// components.
    ///
    /// A function stays on the stack until the root of its call cycle is
    /// done, so every function is visited at most once per traversal. The
    /// whole cycle concludes together: it holds if every member holds, and
    /// fails as soon as one member fails.
    fn visit(&mut self, func: DeclId, attr: Attribute) -> Visit {
        match self.status(func, attr) {
            Status::Holds => return Visit::HOLDS,
            Status::Fails => return Visit::FAILS,
            Status::Infer => {}
        }
        let frame = Frame { func, attr };
        if let Some(&depth) = self.positions.get(&frame) {
            tracing::trace!(
                ?func,
                attribute = attr.keyword(),
                depth,
                "cycle edge, assuming it holds"
            );
            return Visit {
                holds: true,
                low: depth,
            };
        }

        let depth = self.stack.len();
        self.stack.push(frame);
        self.positions.insert(frame, depth);

        let effects = self
            .arena
            .func(func)
            .map(|f| f.effects().to_vec())
            .unwrap_or_default();
        let mut low = SETTLED;
        for effect in effects {
            let verdict = self.effect_verdict(effect, attr);
            if !verdict.holds {
                tracing::debug!(
                    ?func,
                    attribute = attr.keyword(),
                    cause = effect.describe(),
                    "attribute does not hold"
                );
                // Everything above `depth` reaches `func` through calls.
                self.conclude_from(depth, false);
                return Visit::FAILS;
            }
            low = low.min(verdict.low);
        }

        if low >= depth {
            self.conclude_from(depth, true);
            return Visit::HOLDS;
        }
        Visit { holds: true, low }
    }

    /// Pop every frame from `depth` up and conclude it.
    fn conclude_from(&mut self, depth: usize, holds: bool) {
        let members: Vec<Frame> = self.stack.drain(depth..).collect();
        if members.len() > 1 {
            tracing::trace!(members = members.len(), holds, "concluding call cycle");
        }
        for frame in members {
            self.positions.remove(&frame);
            self.conclude(frame.func, frame.attr, holds);
        }
    }

    fn effect_verdict(&mut self, effect: Effect, attr: Attribute) -> Visit {
        match effect {
            Effect::Call { callee, .. } => {
                let callee = self.arena.to_alias_func(callee);
                if self.arena.func(callee).is_none() {
                    return Visit::FAILS;
                }
                ensure_sufficient_stack(|| self.visit(callee, attr))
            }
            _ => Visit::settled(!direct_violation(self.arena, effect, attr)),
        }
    }

    fn conclude(&mut self, func: DeclId, attr: Attribute, holds: bool) {
        tracing::debug!(?func, attribute = attr.keyword(), holds, "concluded");
        let Declaration { stc, kind, .. } = self.arena.get_mut(func);
        if let DeclKind::Func(f) = kind {
            f.concluded |= attr.as_set();
            if holds {
                *stc |= attr.stc();
                f.inferred |= attr.as_set();
            }
        }
    }

    /// Withdraw `attr` from `func` after a violation was found.
    ///
    /// Inferred attributes are dropped silently and stay dropped for the rest
    /// of the pass. Callers that concluded the attribute through a call to
    /// `func` lose it as well; callers that wrote it out are reported. An
    /// explicitly written attribute on `func` itself cannot be dropped and is
    /// reported as a violation instead. `@trusted` functions may do unsafe
    /// things, so safety downgrades leave them alone.
    pub fn downgrade(
        &mut self,
        func: DeclId,
        attr: Attribute,
        cause: Option<Effect>,
    ) -> Vec<DeclError> {
        let func = self.arena.to_alias_func(func);
        match self.withdraw(func, attr, cause) {
            Err(error) => vec![error],
            Ok(true) => self.downgrade_callers(func, attr),
            Ok(false) => {
                if self.status(func, attr) == Status::Infer {
                    self.conclude(func, attr, false);
                }
                Vec::new()
            }
        }
    }

    /// Drop an inferred `attr` from `func`. Returns whether a bit was dropped.
    fn withdraw(
        &mut self,
        func: DeclId,
        attr: Attribute,
        cause: Option<Effect>,
    ) -> Result<bool, DeclError> {
        let decl = self.arena.get(func);
        let Some(f) = decl.as_func() else {
            return Ok(false);
        };
        if attr == Attribute::Safety && decl.stc.is_trusted() {
            return Ok(false);
        }
        if is_explicit(decl, f, attr) {
            return Err(DeclError::AttributeViolation {
                func,
                attribute: attr,
                cause,
            });
        }
        if !f.inferred.contains(attr.as_set()) {
            return Ok(false);
        }
        tracing::debug!(?func, attribute = attr.keyword(), "downgrading inferred attribute");
        let Declaration { stc, kind, .. } = self.arena.get_mut(func);
        *stc -= attr.stc();
        if let DeclKind::Func(f) = kind {
            f.inferred -= attr.as_set();
        }
        Ok(true)
    }

    /// Carry a downgrade of `callee` to every function that holds `attr`
    /// while calling it, transitively.
    fn downgrade_callers(&mut self, callee: DeclId, attr: Attribute) -> Vec<DeclError> {
        let callers = self.callers_holding(attr);
        let mut errors = Vec::new();
        let mut seen = FxHashSet::default();
        let mut work = vec![callee];
        while let Some(callee) = work.pop() {
            let Some(edges) = callers.get(&callee) else {
                continue;
            };
            for &(caller, effect) in edges {
                if !seen.insert(caller) {
                    continue;
                }
                tracing::trace!(
                    ?caller,
                    ?callee,
                    attribute = attr.keyword(),
                    "caller relied on callee"
                );
                match self.withdraw(caller, attr, Some(effect)) {
                    Ok(true) => work.push(caller),
                    Ok(false) => {}
                    Err(error) => errors.push(error),
                }
            }
        }
        errors
    }

    /// Reverse call edges of the functions `attr` currently holds for.
    fn callers_holding(&self, attr: Attribute) -> FxHashMap<DeclId, Vec<(DeclId, Effect)>> {
        let mut callers: FxHashMap<DeclId, Vec<(DeclId, Effect)>> = FxHashMap::default();
        for (id, decl) in self.arena.iter() {
            let Some(f) = decl.as_func() else {
                continue;
            };
            if !attr.holds_in(decl.stc) {
                continue;
            }
            for &effect in f.effects() {
                if let Effect::Call { callee, .. } = effect {
                    let callee = self.arena.to_alias_func(callee);
                    callers.entry(callee).or_default().push((id, effect));
                }
            }
        }
        callers
    }

    pub fn set_impure(&mut self, func: DeclId) -> Vec<DeclError> {
        self.downgrade(func, Attribute::Purity, None)
    }

    pub fn set_unsafe(&mut self, func: DeclId) -> Vec<DeclError> {
        self.downgrade(func, Attribute::Safety, None)
    }

    pub fn set_throws(&mut self, func: DeclId) -> Vec<DeclError> {
        self.downgrade(func, Attribute::Nothrow, None)
    }

    pub fn set_gc(&mut self, func: DeclId) -> Vec<DeclError> {
        self.downgrade(func, Attribute::Nogc, None)
    }

    /// Add an effect found in the body of `func` after analysis moved on.
    ///
    /// Attributes already established for `func` are checked against the
    /// new effect: inferred ones are downgraded, explicit ones produce a
    /// violation. Attributes not decided yet will see the effect when they
    /// are inferred.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn record_effect(&mut self, func: DeclId, effect: Effect) -> Vec<DeclError> {
        let func = self.arena.to_alias_func(func);
        let Some(f) = self.arena.func_mut(func) else {
            return Vec::new();
        };
        f.body.get_or_insert_with(FuncBody::default).effects.push(effect);

        let mut errors = Vec::new();
        for attr in Attribute::ALL {
            if self.status(func, attr) != Status::Holds {
                continue;
            }
            if self.effect_verdict(effect, attr).holds {
                continue;
            }
            errors.extend(self.downgrade(func, attr, Some(effect)));
        }
        errors
    }

    /// Check the body of `func` against the attributes written on it.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn verify_explicit_attributes(&mut self, func: DeclId) -> Vec<DeclError> {
        let decl = self.arena.get(func);
        let Some(f) = decl.as_func() else {
            return Vec::new();
        };
        let explicit: Vec<Attribute> = Attribute::ALL
            .into_iter()
            .filter(|&attr| is_explicit(decl, f, attr))
            .collect();
        let effects = f.effects().to_vec();

        let mut errors = Vec::new();
        for attr in explicit {
            for &effect in &effects {
                if !self.effect_verdict(effect, attr).holds {
                    errors.push(DeclError::AttributeViolation {
                        func,
                        attribute: attr,
                        cause: Some(effect),
                    });
                }
            }
        }
        errors
    }

    /// Strength of the purity of `func`.
    pub fn purity_level(&mut self, func: DeclId, types: &dyn TypeQuery) -> PurityLevel {
        let func = self.arena.to_alias_func(func);
        if self.is_in_progress(func, Attribute::Purity) {
            return PurityLevel::FwdRef;
        }
        if !self.infer(func, Attribute::Purity) {
            return PurityLevel::Impure;
        }
        let Some(f) = self.arena.func(func) else {
            return PurityLevel::Impure;
        };

        let mut level = PurityLevel::Strong;
        for param in &f.params {
            let by_ref = param
                .stc
                .intersects(StorageClass::REF | StorageClass::OUT | StorageClass::LAZY);
            let param_level = if by_ref {
                PurityLevel::Weak
            } else {
                match types.indirection(param.ty) {
                    Indirection::None | Indirection::Immutable => PurityLevel::Strong,
                    Indirection::Const => PurityLevel::Const,
                    Indirection::Mutable => PurityLevel::Weak,
                }
            };
            level = level.min(param_level);
        }

        if self.arena.need_this(func) {
            let this_mod = TypeMod::from_stc(self.arena.get(func).stc);
            if !this_mod.contains(TypeMod::IMMUTABLE) {
                if this_mod.intersects(TypeMod::CONST | TypeMod::WILD) {
                    level = level.min(PurityLevel::Const);
                } else {
                    level = level.min(PurityLevel::Weak);
                }
            }
        }

        if self.arena.is_nested(func) {
            level = level.min(PurityLevel::Weak);
        }
        level
    }

    /// Decide whether `func` needs a heap closure and account for the
    /// allocation. Returns whether a closure is needed.
    pub fn check_closure(&mut self, func: DeclId) -> Result<bool, DeclError> {
        if !needs_closure(self.arena, func) {
            return Ok(false);
        }
        let span = self.arena.get(func).span;
        let errors = self.record_effect(func, Effect::ClosureAllocation { span });
        match errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(true),
        }
    }
}

/// Whether attributes of the function may be inferred from its body.
fn can_infer_attributes(decl: &Declaration, func: &FuncDecl) -> bool {
    decl.stc.is_inference() || func.kind.is_literal()
}

/// Whether `attr` was written on the function rather than inferred.
fn is_explicit(decl: &Declaration, func: &FuncDecl, attr: Attribute) -> bool {
    let written = match attr {
        Attribute::Safety => decl.stc.is_safe(),
        _ => attr.holds_in(decl.stc),
    };
    written && !func.inferred.contains(attr.as_set())
}

/// Whether a non-call effect breaks `attr` on its own.
fn direct_violation(arena: &DeclArena, effect: Effect, attr: Attribute) -> bool {
    match (attr, effect) {
        (_, Effect::IndirectCall { attrs, .. }) => !attr.holds_in(attrs),
        (Attribute::Purity, Effect::GlobalAccess { var, write, .. }) => {
            let immutable = arena
                .get(var)
                .stc
                .intersects(StorageClass::IMMUTABLE | StorageClass::MANIFEST);
            write || !immutable
        }
        (Attribute::Safety, Effect::UnsafeOperation { .. }) => true,
        (Attribute::Safety, Effect::FieldAccess { field, .. }) => arena
            .var(field)
            .is_some_and(|var| var.flags.contains(VarFlags::OVERLAP_UNSAFE)),
        (Attribute::Nothrow, Effect::Throw { .. }) => true,
        (Attribute::Nogc, Effect::GcAllocation { .. } | Effect::ClosureAllocation { .. }) => true,
        _ => false,
    }
}
