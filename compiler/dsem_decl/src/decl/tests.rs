use super::*;

use dsem_ir::{ExprRef, StmtRef};
use pretty_assertions::assert_eq;

fn name(raw: u32) -> Name {
    Name::from_raw(100 + raw)
}

fn ty(raw: u32) -> TypeRef {
    TypeRef::from_raw(raw)
}

fn plain_func() -> Declaration {
    Declaration::func(name(0), Span::new(0, 4), FuncKind::Plain, Vec::new())
}

#[test]
fn kind_strings() {
    let var = Declaration::var(name(0), Span::DUMMY, None);
    let symbol = Declaration::symbol(name(1), Span::DUMMY, AggregateId::from_raw(0));
    let alias = Declaration::alias(name(2), Span::DUMMY, AliasDecl::default());
    let over = Declaration::over(name(3), Span::DUMMY, OverDecl::default());
    let tuple = Declaration::tuple(name(4), Span::DUMMY, TupleKind::Types, Vec::new());

    assert_eq!(var.kind(), "variable");
    assert_eq!(symbol.kind(), "declaration");
    assert_eq!(alias.kind(), "alias");
    assert_eq!(over.kind(), "overload alias");
    assert_eq!(tuple.map(|t| t.kind()), Ok("tuple"));
    assert_eq!(plain_func().kind(), "function");
}

#[test]
fn function_kind_strings() {
    let cases = [
        (FuncKind::Ctor, "constructor"),
        (FuncKind::PostBlit, "postblit"),
        (FuncKind::Dtor, "destructor"),
        (FuncKind::StaticCtor, "static constructor"),
        (FuncKind::SharedStaticDtor, "shared static destructor"),
        (FuncKind::Invariant, "invariant"),
        (FuncKind::UnitTest, "unittest"),
        (FuncKind::New, "allocator"),
        (FuncKind::Delete, "deallocator"),
        (FuncKind::Literal(LiteralKind::Delegate), "delegate"),
        (FuncKind::Literal(LiteralKind::Function), "function"),
        (
            FuncKind::Alias {
                target: DeclId::from_raw(0),
                has_overloads: false,
            },
            "function alias",
        ),
    ];
    for (kind, expected) in cases {
        let decl = Declaration::func(name(0), Span::DUMMY, kind, Vec::new());
        assert_eq!(decl.kind(), expected, "{kind:?}");
    }
}

#[test]
fn policy_table() {
    assert!(!FuncKind::Dtor.policy().overloadable);
    assert!(!FuncKind::PostBlit.policy().overloadable);
    assert!(FuncKind::Ctor.policy().overloadable);
    assert!(!FuncKind::StaticCtor.policy().has_this);
    assert!(!FuncKind::UnitTest.policy().has_this);
    assert!(FuncKind::Invariant.policy().has_this);
    assert_eq!(FuncKind::Ctor.policy().post_invariant, InvariantRule::WithThis);
    assert_eq!(FuncKind::Dtor.policy().pre_invariant, InvariantRule::WithThis);
    assert_eq!(FuncKind::Plain.policy().virtuality, Virtuality::Member);
    assert_eq!(FuncKind::Ctor.policy().virtuality, Virtuality::Never);
    assert!(FuncKind::Delete.policy().is_delete);
}

#[test]
fn mixed_tuple_is_rejected() {
    let elements = vec![
        TupleElement::Type(ty(1)),
        TupleElement::Expr(ExprRef::from_raw(0)),
    ];
    let result = Declaration::tuple(name(0), Span::new(3, 9), TupleKind::Types, elements);
    assert_eq!(
        result.err(),
        Some(DeclError::InvalidTupleElement {
            name: name(0),
            span: Span::new(3, 9),
            index: 1,
        })
    );
}

#[test]
fn expression_tuple_holds_symbols_and_values() {
    let elements = vec![
        TupleElement::Decl(DeclId::from_raw(4)),
        TupleElement::Expr(ExprRef::from_raw(0)),
    ];
    let decl = Declaration::tuple(name(0), Span::DUMMY, TupleKind::Expressions, elements);
    let Ok(decl) = decl else {
        panic!("expression tuple rejected");
    };
    let tuple = decl.as_tuple();
    assert_eq!(tuple.map(TupleDecl::is_type_tuple), Some(false));
    assert_eq!(tuple.map(|t| t.elements().len()), Some(2));
}

#[test]
fn type_info_placement() {
    let decl = Declaration::type_info(name(0), TypeInfoKind::Struct, ty(7));
    assert!(decl.stc.is_static());
    assert!(decl.stc.is_gshared());
    assert_eq!(decl.visibility, Visibility::Public);
    assert_eq!(decl.linkage, Linkage::C);
    assert_eq!(
        decl.as_var().and_then(VarDecl::type_info),
        Some((TypeInfoKind::Struct, ty(7)))
    );
}

#[test]
fn this_parameter() {
    let decl = Declaration::this_param(Span::DUMMY, ty(3));
    assert_eq!(decl.name, Name::THIS);
    assert!(decl.stc.is_parameter());
    assert_eq!(decl.as_var().map(|v| v.role), Some(VarRole::This));
}

#[test]
fn builders_only_touch_matching_variants() {
    let var = Declaration::var(name(0), Span::DUMMY, Some(ty(1)))
        .with_body(FuncBody::new(StmtRef::from_raw(0)))
        .with_init(Initializer::Zero);
    assert_eq!(var.as_var().and_then(|v| v.init.clone()), Some(Initializer::Zero));

    let func = plain_func()
        .with_init(Initializer::Zero)
        .with_variadic(Variadic::C);
    assert_eq!(func.as_func().map(|f| f.variadic), Some(Variadic::C));
    assert!(func.as_var().is_none());
}

#[test]
fn with_type_keeps_the_written_type() {
    let decl = Declaration::var(name(0), Span::DUMMY, Some(ty(1))).with_type(ty(2));
    assert_eq!(decl.ty, Some(ty(2)));
    assert_eq!(decl.original_ty, Some(ty(1)));
}

#[test]
fn overnext_only_on_chain_variants() {
    let mut func = plain_func();
    assert!(func.set_overnext(Some(DeclId::from_raw(9))));
    assert_eq!(func.overnext(), Some(DeclId::from_raw(9)));

    let mut var = Declaration::var(name(0), Span::DUMMY, None);
    assert!(!var.set_overnext(Some(DeclId::from_raw(9))));
    assert_eq!(var.overnext(), None);
}

#[test]
fn address_and_segment_queries() {
    let manifest = Declaration::var(name(0), Span::DUMMY, None).with_stc(StorageClass::MANIFEST);
    assert!(!manifest.can_take_address_of());
    assert!(!manifest.is_codeseg());
    assert!(plain_func().can_take_address_of());
    assert!(plain_func().is_codeseg());
}

#[test]
fn imported_symbols() {
    let exported_decl = plain_func().with_visibility(Visibility::Export);
    assert!(exported_decl.is_imported_symbol());

    let exported_def = plain_func()
        .with_visibility(Visibility::Export)
        .with_body(FuncBody::default());
    assert!(!exported_def.is_imported_symbol());

    let extern_var = Declaration::var(name(0), Span::DUMMY, None)
        .with_stc(StorageClass::EXTERN)
        .with_visibility(Visibility::Export);
    assert!(extern_var.is_imported_symbol());
}

#[test]
fn mangle_override_wins() {
    let mut decl = plain_func();
    if let Some(func) = decl.as_func_mut() {
        func.mangle_string = Some(name(1));
    }
    assert_eq!(decl.mangled_name(), Some(name(1)));
    let decl = decl.with_mangle_override(name(2));
    assert_eq!(decl.mangled_name(), Some(name(2)));
}

#[test]
fn initializer_triviality() {
    assert!(Initializer::Void.is_trivial());
    assert!(Initializer::Zero.is_trivial());
    assert!(!Initializer::Expr(ExprRef::from_raw(0)).is_trivial());
    let nested = Initializer::Struct(vec![
        (None, Initializer::Zero),
        (None, Initializer::Array(vec![(None, Initializer::Void)])),
    ]);
    assert!(nested.is_trivial());
    let nontrivial = Initializer::Array(vec![(None, Initializer::Expr(ExprRef::from_raw(1)))]);
    assert!(!nontrivial.is_trivial());
}

#[test]
fn by_ref_parameters() {
    let plain = Parameter::new(name(0), ty(1));
    assert!(!plain.is_by_ref());
    assert!(plain.clone().with_stc(StorageClass::REF).is_by_ref());
    assert!(plain.clone().with_stc(StorageClass::OUT).is_by_ref());
    assert!(!plain.with_stc(StorageClass::IN).is_by_ref());
}

#[test]
fn locals_and_labels() {
    let mut func = FuncDecl::new(FuncKind::Plain, Vec::new());
    assert_eq!(func.declare_local(name(0), DeclId::from_raw(1)), None);
    assert_eq!(
        func.declare_local(name(0), DeclId::from_raw(2)),
        Some(DeclId::from_raw(1))
    );
    assert_eq!(func.search_local(name(0)), Some(DeclId::from_raw(2)));

    let info = LabelInfo {
        span: Span::new(1, 2),
        last_var: None,
    };
    assert_eq!(func.declare_label(name(5), info), None);
    assert_eq!(func.search_label(name(5)), Some(info));
    assert_eq!(func.search_label(name(6)), None);
}
