use super::*;

#[test]
fn display_matches_as_str() {
    for &code in ErrorCode::ALL {
        assert_eq!(code.to_string(), code.as_str());
    }
}

#[test]
fn all_codes_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for &code in ErrorCode::ALL {
        assert!(seen.insert(code.as_str()), "duplicate code {code}");
    }
}

#[test]
fn warnings_are_classified() {
    assert!(ErrorCode::W4001.is_warning());
    assert!(!ErrorCode::E4001.is_warning());
    assert!(!ErrorCode::E2002.is_warning());
}

#[test]
fn every_code_has_a_description() {
    for &code in ErrorCode::ALL {
        assert!(!code.description().is_empty());
    }
}
