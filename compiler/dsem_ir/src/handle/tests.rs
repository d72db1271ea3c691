use super::*;

#[test]
fn handles_roundtrip_raw() {
    assert_eq!(TypeRef::from_raw(7).raw(), 7);
    assert_eq!(ExprRef::from_raw(8).raw(), 8);
    assert_eq!(StmtRef::from_raw(9).raw(), 9);
}

#[test]
fn handles_debug_with_prefix() {
    assert_eq!(format!("{:?}", TypeRef::from_raw(3)), "ty#3");
    assert_eq!(format!("{:?}", ExprRef::from_raw(4)), "expr#4");
    assert_eq!(format!("{:?}", StmtRef::from_raw(5)), "stmt#5");
}
