use super::*;

use std::cell::RefCell;
use std::ops::ControlFlow;

use dsem_ir::{Name, Span, TypeRef};
use pretty_assertions::assert_eq;

use crate::arena::{DeclArena, UseSite};
use crate::decl::{
    AggregateDecl, AggregateKind, AliasDecl, DeclKind, Declaration, FuncBody, FuncKind,
    OverDecl, Parameter, Parent, Variadic,
};
use crate::error::DeclError;
use crate::ids::DeclId;
use crate::stc::StorageClass;

const SHORT: TypeRef = TypeRef::from_raw(0);
const INT: TypeRef = TypeRef::from_raw(1);
const LONG: TypeRef = TypeRef::from_raw(2);
const CONST_INT: TypeRef = TypeRef::from_raw(3);

/// `short` converts to `int` and `long`, `int` to `long`, and `int` binds
/// to `const int`.
fn score(param: TypeRef, arg: TypeRef) -> MatchLevel {
    match (arg, param) {
        (a, p) if a == p => MatchLevel::Exact,
        (INT, CONST_INT) => MatchLevel::Const,
        (SHORT, INT | LONG) | (INT, LONG) => MatchLevel::Convert,
        _ => MatchLevel::NoMatch,
    }
}

struct Lattice;

impl MatchOracle for Lattice {
    fn call_match(
        &self,
        callee: &Signature<'_>,
        args: &[Argument],
        _this_ty: Option<TypeRef>,
    ) -> MatchLevel {
        let params = callee.params;
        if args.len() < params.len()
            || (args.len() > params.len() && callee.variadic == Variadic::None)
        {
            return MatchLevel::NoMatch;
        }
        params
            .iter()
            .zip(args)
            .map(|(param, arg)| score(param.ty, arg.ty))
            .min()
            .unwrap_or(MatchLevel::Exact)
    }
}

/// Scores everything `Exact` and remembers what it was asked.
#[derive(Default)]
struct Recorder {
    calls: RefCell<Vec<(DeclId, Option<TypeRef>)>>,
}

impl MatchOracle for Recorder {
    fn call_match(
        &self,
        callee: &Signature<'_>,
        _args: &[Argument],
        this_ty: Option<TypeRef>,
    ) -> MatchLevel {
        self.calls.borrow_mut().push((callee.func, this_ty));
        MatchLevel::Exact
    }
}

fn name(raw: u32) -> Name {
    Name::from_raw(100 + raw)
}

fn site() -> UseSite {
    UseSite::new(None, Span::new(50, 60))
}

fn plain(raw: u32, params: &[TypeRef]) -> Declaration {
    let params = params
        .iter()
        .enumerate()
        .map(|(i, &ty)| Parameter::new(name(10 + i as u32), ty))
        .collect();
    Declaration::func(name(raw), Span::new(raw, raw + 1), FuncKind::Plain, params)
}

fn func(arena: &mut DeclArena, raw: u32, params: &[TypeRef]) -> DeclId {
    arena.alloc(plain(raw, params))
}

/// Link `ids` into one overload chain.
fn chain(arena: &mut DeclArena, ids: &[DeclId]) {
    for &id in &ids[1..] {
        assert_eq!(overload_insert(arena, ids[0], id), Ok(()));
    }
}

fn link(arena: &mut DeclArena, from: DeclId, to: DeclId) {
    assert!(arena.get_mut(from).set_overnext(Some(to)));
}

// Walking overload sets

#[test]
fn candidates_in_declaration_order() {
    let mut arena = DeclArena::new();
    let f1 = func(&mut arena, 0, &[INT]);
    let f2 = func(&mut arena, 1, &[LONG]);
    let f3 = func(&mut arena, 2, &[SHORT]);
    chain(&mut arena, &[f1, f2, f3]);

    assert_eq!(candidates(&arena, f1), vec![f1, f2, f3]);
    assert_eq!(candidates(&arena, f2), vec![f2, f3]);
    assert_eq!(is_unique(&arena, f1), None);
    assert_eq!(is_unique(&arena, f3), Some(f3));
}

#[test]
fn visitor_can_stop_early() {
    let mut arena = DeclArena::new();
    let f1 = func(&mut arena, 0, &[INT]);
    let f2 = func(&mut arena, 1, &[LONG]);
    let f3 = func(&mut arena, 2, &[SHORT]);
    chain(&mut arena, &[f1, f2, f3]);

    let mut visited = Vec::new();
    let flow = overload_apply(&arena, f1, |id| {
        visited.push(id);
        if id == f2 {
            ControlFlow::Break(id)
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(flow, ControlFlow::Break(f2));
    assert_eq!(visited, vec![f1, f2]);
}

#[test]
fn function_aliases_report_their_target_once() {
    let mut arena = DeclArena::new();
    let f1 = func(&mut arena, 0, &[INT]);
    let f2 = func(&mut arena, 1, &[LONG]);
    let alias = arena.alloc(Declaration::func(
        name(2),
        Span::DUMMY,
        FuncKind::Alias {
            target: f2,
            has_overloads: false,
        },
        Vec::new(),
    ));
    link(&mut arena, f1, alias);
    link(&mut arena, alias, f2);

    assert_eq!(candidates(&arena, f1), vec![f1, f2]);
}

#[test]
fn alias_with_overloads_forwards_the_whole_set() {
    let mut arena = DeclArena::new();
    let f1 = func(&mut arena, 0, &[INT]);
    let f2 = func(&mut arena, 1, &[LONG]);
    chain(&mut arena, &[f1, f2]);
    let g = func(&mut arena, 2, &[SHORT]);
    let forward = arena.alloc(Declaration::func(
        name(3),
        Span::DUMMY,
        FuncKind::Alias {
            target: f1,
            has_overloads: true,
        },
        Vec::new(),
    ));
    link(&mut arena, g, forward);

    assert_eq!(candidates(&arena, g), vec![g, f1, f2]);
}

#[test]
fn over_declarations() {
    let mut arena = DeclArena::new();
    let f1 = func(&mut arena, 0, &[INT]);
    let f2 = func(&mut arena, 1, &[LONG]);
    chain(&mut arena, &[f1, f2]);

    let single = arena.alloc(Declaration::over(
        name(2),
        Span::DUMMY,
        OverDecl {
            aliassym: Some(f1),
            ..OverDecl::default()
        },
    ));
    let whole = arena.alloc(Declaration::over(
        name(3),
        Span::DUMMY,
        OverDecl {
            aliassym: Some(f1),
            has_overloads: true,
            ..OverDecl::default()
        },
    ));
    let empty = arena.alloc(Declaration::over(name(4), Span::DUMMY, OverDecl::default()));

    assert_eq!(candidates(&arena, single), vec![f1]);
    assert_eq!(candidates(&arena, whole), vec![f1, f2]);
    assert_eq!(candidates(&arena, empty), Vec::new());
}

#[test]
fn alias_cycle_ends_the_walk() {
    let mut arena = DeclArena::new();
    let a = arena.alloc(Declaration::alias(name(0), Span::DUMMY, AliasDecl::default()));
    let b = arena.alloc(Declaration::alias(
        name(1),
        Span::DUMMY,
        AliasDecl::to_symbol(a),
    ));
    arena.get_mut(a).kind = DeclKind::Alias(AliasDecl::to_symbol(b));
    let f = func(&mut arena, 2, &[INT]);
    link(&mut arena, b, f);

    assert_eq!(candidates(&arena, a), vec![f]);
}

#[test]
fn exact_match_by_type() {
    let mut arena = DeclArena::new();
    let fn_int = TypeRef::from_raw(20);
    let fn_long = TypeRef::from_raw(21);
    let f1 = arena.alloc(plain(0, &[INT]).with_type(fn_int));
    let f2 = arena.alloc(plain(1, &[LONG]).with_type(fn_long));
    chain(&mut arena, &[f1, f2]);

    assert_eq!(overload_exact_match(&arena, f1, fn_long), Some(f2));
    assert_eq!(overload_exact_match(&arena, f1, TypeRef::from_raw(22)), None);
}

// Building overload sets

#[test]
fn insert_is_idempotent() {
    let mut arena = DeclArena::new();
    let f1 = func(&mut arena, 0, &[INT]);
    let f2 = func(&mut arena, 1, &[LONG]);
    chain(&mut arena, &[f1, f2]);

    assert_eq!(overload_insert(&mut arena, f1, f1), Ok(()));
    assert_eq!(overload_insert(&mut arena, f1, f2), Ok(()));
    assert_eq!(candidates(&arena, f1), vec![f1, f2]);
}

#[test]
fn destructors_and_variables_do_not_overload() {
    let mut arena = DeclArena::new();
    let f = func(&mut arena, 0, &[INT]);
    let dtor = arena.alloc(Declaration::func(name(1), Span::DUMMY, FuncKind::Dtor, Vec::new()));
    let var = arena.alloc(Declaration::var(name(2), Span::DUMMY, Some(INT)));

    assert_eq!(
        overload_insert(&mut arena, f, dtor),
        Err(DeclError::NotOverloadable {
            existing: f,
            new: dtor
        })
    );
    assert_eq!(
        overload_insert(&mut arena, var, f),
        Err(DeclError::NotOverloadable {
            existing: var,
            new: f
        })
    );
    assert_eq!(
        overload_insert(&mut arena, dtor, f),
        Err(DeclError::NotOverloadable {
            existing: dtor,
            new: f
        })
    );
}

#[test]
fn unresolved_alias_accepts_overloads() {
    let mut arena = DeclArena::new();
    let pending = arena.alloc(Declaration::alias(name(0), Span::DUMMY, AliasDecl::pending()));
    let f = func(&mut arena, 1, &[INT]);

    assert_eq!(overload_insert(&mut arena, pending, f), Ok(()));
    assert_eq!(candidates(&arena, pending), vec![f]);
}

#[test]
fn alias_to_variable_refuses_overloads() {
    let mut arena = DeclArena::new();
    let var = arena.alloc(Declaration::var(name(0), Span::DUMMY, Some(INT)));
    let alias = arena.alloc(Declaration::alias(
        name(1),
        Span::DUMMY,
        AliasDecl::to_symbol(var),
    ));
    let f = func(&mut arena, 2, &[INT]);

    assert!(overload_insert(&mut arena, alias, f).is_err());
}

#[test]
fn insert_refuses_a_cyclic_chain() {
    let mut arena = DeclArena::new();
    let f1 = func(&mut arena, 0, &[INT]);
    let f2 = func(&mut arena, 1, &[LONG]);
    let f3 = func(&mut arena, 2, &[SHORT]);
    link(&mut arena, f1, f2);
    link(&mut arena, f2, f1);

    assert!(overload_insert(&mut arena, f1, f3).is_err());
}

// Resolution

#[test]
fn exact_match_beats_conversion() {
    let mut arena = DeclArena::new();
    let f_int = func(&mut arena, 0, &[INT]);
    let f_long = func(&mut arena, 1, &[LONG]);
    chain(&mut arena, &[f_int, f_long]);

    let m = function_resolve(&arena, &Lattice, f_int, None, None, &[Argument::rvalue(INT)]);
    assert_eq!(m.count, 1);
    assert_eq!(m.last, MatchLevel::Exact);
    assert_eq!(m.best(), Some(f_int));
    assert_eq!(m.nextf, None);

    let m = function_resolve(&arena, &Lattice, f_int, None, None, &[Argument::rvalue(LONG)]);
    assert_eq!(m.best(), Some(f_long));
}

#[test]
fn later_better_match_replaces_earlier() {
    let mut arena = DeclArena::new();
    let f_long = func(&mut arena, 0, &[LONG]);
    let f_const = func(&mut arena, 1, &[CONST_INT]);
    let f_int = func(&mut arena, 2, &[INT]);
    chain(&mut arena, &[f_long, f_const, f_int]);

    let m = function_resolve(&arena, &Lattice, f_long, None, None, &[Argument::rvalue(INT)]);
    assert_eq!(m.best(), Some(f_int));
    assert_eq!(m.anyf, Some(f_long));
}

#[test]
fn equally_good_candidates_are_ambiguous() {
    let mut arena = DeclArena::new();
    let f = func(&mut arena, 0, &[LONG]);
    let g = func(&mut arena, 1, &[LONG]);
    chain(&mut arena, &[f, g]);

    let m = function_resolve(&arena, &Lattice, f, None, None, &[Argument::rvalue(INT)]);
    assert!(m.is_ambiguous());
    assert_eq!(m.count, 2);
    assert_eq!(m.last, MatchLevel::Convert);
    assert_eq!(m.lastf, Some(f));
    assert_eq!(m.nextf, Some(g));
    assert_eq!(m.best(), None);
}

#[test]
fn no_match_remembers_a_candidate() {
    let mut arena = DeclArena::new();
    let f = func(&mut arena, 0, &[INT]);
    let g = func(&mut arena, 1, &[INT, INT]);
    chain(&mut arena, &[f, g]);

    let m = function_resolve(&arena, &Lattice, f, None, None, &[Argument::rvalue(LONG)]);
    assert!(m.is_unmatched());
    assert_eq!(m.count, 0);
    assert_eq!(m.anyf, Some(f));
}

#[test]
fn definition_preferred_over_its_declaration() {
    let mut arena = DeclArena::new();
    let fn_ty = TypeRef::from_raw(20);
    let declaration = arena.alloc(plain(0, &[INT]).with_type(fn_ty));
    let definition = arena.alloc(
        plain(0, &[INT])
            .with_type(fn_ty)
            .with_body(FuncBody::default()),
    );
    chain(&mut arena, &[declaration, definition]);

    let m = function_resolve(
        &arena,
        &Lattice,
        declaration,
        None,
        None,
        &[Argument::rvalue(INT)],
    );
    assert_eq!(m.count, 1);
    assert_eq!(m.best(), Some(definition));
}

#[test]
fn overriding_function_wins() {
    for derived_first in [true, false] {
        let mut arena = DeclArena::new();
        let derived = func(&mut arena, 0, &[INT]);
        let base = func(&mut arena, 1, &[INT]);
        if let Some(f) = arena.func_mut(derived) {
            f.foverrides.push(base);
        }
        let (head, tail) = if derived_first {
            (derived, base)
        } else {
            (base, derived)
        };
        chain(&mut arena, &[head, tail]);

        let m = function_resolve(&arena, &Lattice, head, None, None, &[Argument::rvalue(INT)]);
        assert_eq!(m.count, 1, "derived first: {derived_first}");
        assert_eq!(m.best(), Some(derived), "derived first: {derived_first}");
    }
}

#[test]
fn more_specialized_wins_a_tie() {
    let mut arena = DeclArena::new();
    let f_long = func(&mut arena, 0, &[LONG]);
    let f_int = func(&mut arena, 1, &[INT]);
    chain(&mut arena, &[f_long, f_int]);

    assert_eq!(
        least_as_specialized(&arena, &Lattice, f_int, f_long),
        MatchLevel::Convert
    );
    assert_eq!(
        least_as_specialized(&arena, &Lattice, f_long, f_int),
        MatchLevel::NoMatch
    );

    let m = function_resolve(&arena, &Lattice, f_long, None, None, &[Argument::rvalue(SHORT)]);
    assert_eq!(m.last, MatchLevel::Convert);
    assert_eq!(m.count, 1);
    assert_eq!(m.best(), Some(f_int));
}

#[test]
fn variadic_is_less_specialized() {
    let mut arena = DeclArena::new();
    let variadic = arena.alloc(plain(0, &[INT]).with_variadic(Variadic::C));
    let fixed = func(&mut arena, 1, &[INT]);
    chain(&mut arena, &[variadic, fixed]);

    assert_eq!(
        least_as_specialized(&arena, &Lattice, variadic, fixed),
        MatchLevel::NoMatch
    );
    assert_eq!(
        least_as_specialized(&arena, &Lattice, fixed, variadic),
        MatchLevel::Exact
    );

    let m = function_resolve(&arena, &Lattice, variadic, None, None, &[Argument::rvalue(INT)]);
    assert_eq!(m.best(), Some(fixed));
}

#[test]
fn this_modifier_takes_part_in_specialization() {
    let mut arena = DeclArena::new();
    let agg = arena.add_aggregate(AggregateDecl::new(name(50), Span::DUMMY, AggregateKind::Struct));
    let mutable = arena.alloc(plain(0, &[INT]).with_parent(Parent::Aggregate(agg)));
    let constant = arena.alloc(
        plain(1, &[INT])
            .with_parent(Parent::Aggregate(agg))
            .with_stc(StorageClass::CONST),
    );

    assert_eq!(
        least_as_specialized(&arena, &Lattice, mutable, constant),
        MatchLevel::Exact
    );
    assert_eq!(
        least_as_specialized(&arena, &Lattice, constant, mutable),
        MatchLevel::NoMatch
    );
}

#[test]
fn explicit_template_arguments_skip_functions() {
    let mut arena = DeclArena::new();
    let f = func(&mut arena, 0, &[INT]);
    let tiargs = [TemplateArg::Type(INT)];

    let m = function_resolve(
        &arena,
        &Lattice,
        f,
        Some(&tiargs[..]),
        None,
        &[Argument::rvalue(INT)],
    );
    assert!(m.is_unmatched());
    assert_eq!(m.anyf, Some(f));

    let none: [TemplateArg; 0] = [];
    let m = function_resolve(&arena, &Lattice, f, Some(&none[..]), None, &[Argument::rvalue(INT)]);
    assert_eq!(m.best(), Some(f));
}

#[test]
fn constructors_are_scored_without_this() {
    let mut arena = DeclArena::new();
    let agg = arena.add_aggregate(AggregateDecl::new(name(50), Span::DUMMY, AggregateKind::Class));
    let ctor = arena.alloc(
        Declaration::func(name(0), Span::DUMMY, FuncKind::Ctor, Vec::new())
            .with_parent(Parent::Aggregate(agg)),
    );
    let method = arena.alloc(plain(1, &[]).with_parent(Parent::Aggregate(agg)));
    let free = func(&mut arena, 2, &[]);
    let this_ty = Some(TypeRef::from_raw(30));

    let recorder = Recorder::default();
    for start in [ctor, method, free] {
        function_resolve(&arena, &recorder, start, None, this_ty, &[]);
    }
    assert_eq!(
        recorder.calls.into_inner(),
        vec![(ctor, None), (method, this_ty), (free, None)]
    );
}

#[test]
fn resolve_call_reports_failures() {
    let mut arena = DeclArena::new();
    let f = func(&mut arena, 0, &[LONG]);
    let g = func(&mut arena, 1, &[LONG]);
    chain(&mut arena, &[f, g]);

    assert_eq!(
        resolve_call(&arena, &Lattice, f, None, None, &[Argument::rvalue(CONST_INT)], site()),
        Err(DeclError::NoMatchingOverload {
            start: f,
            span: site().span,
            candidate: Some(f),
        })
    );
    assert_eq!(
        resolve_call(&arena, &Lattice, f, None, None, &[Argument::rvalue(INT)], site()),
        Err(DeclError::AmbiguousOverload {
            start: f,
            span: site().span,
            first: f,
            second: g,
        })
    );
    assert_eq!(
        resolve_call(&arena, &Lattice, g, None, None, &[Argument::rvalue(INT)], site()),
        Ok(g)
    );
}

#[test]
fn resolve_call_rejects_a_disabled_winner() {
    let mut arena = DeclArena::new();
    let disabled = arena.alloc(plain(0, &[INT]).with_stc(StorageClass::DISABLE));
    let also_disabled = arena.alloc(plain(1, &[]).with_stc(StorageClass::DISABLE));
    let args = [Argument::lvalue(INT)];

    assert_eq!(
        resolve_call(&arena, &Lattice, disabled, None, None, &args, site()),
        Err(DeclError::Disabled {
            decl: disabled,
            span: site().span,
        })
    );
    let inside = UseSite::new(Some(also_disabled), Span::DUMMY);
    assert_eq!(
        resolve_call(&arena, &Lattice, disabled, None, None, &args, inside),
        Ok(disabled)
    );
}
