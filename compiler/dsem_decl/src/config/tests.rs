use super::*;
use pretty_assertions::assert_eq;

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |var| {
        pairs
            .iter()
            .find(|(key, _)| *key == var)
            .map(|(_, value)| (*value).to_owned())
    }
}

#[test]
fn defaults_infer_everything() {
    let config = AnalysisConfig::default();
    assert!(config.use_invariants);
    assert_eq!(config.infer, InferFlags::all());
}

#[test]
fn empty_environment_keeps_defaults() {
    let config = AnalysisConfig::from_lookup(lookup(&[]));
    assert_eq!(config, Ok(AnalysisConfig::default()));
}

#[test]
fn parse_attribute_list() {
    assert_eq!(
        InferFlags::parse("pure, NoThrow"),
        Ok(AttrSet::PURITY | AttrSet::NOTHROW)
    );
    assert_eq!(InferFlags::parse("@safe,@nogc"), Ok(AttrSet::SAFETY | AttrSet::NOGC));
    assert_eq!(InferFlags::parse("all"), Ok(AttrSet::all()));
    assert_eq!(InferFlags::parse("none"), Ok(AttrSet::empty()));
    assert_eq!(InferFlags::parse(""), Ok(AttrSet::empty()));
}

#[test]
fn parse_rejects_unknown_attribute() {
    assert_eq!(
        InferFlags::parse("pure,fast"),
        Err(ConfigError::UnknownAttribute("fast".to_owned()))
    );
}

#[test]
fn environment_overrides() {
    let config = AnalysisConfig::from_lookup(lookup(&[
        ("DSEM_INFER", "pure"),
        ("DSEM_NO_INVARIANTS", "1"),
    ]));
    assert_eq!(
        config,
        Ok(AnalysisConfig {
            use_invariants: false,
            infer: AttrSet::PURITY,
        })
    );
}

#[test]
fn invalid_bool_is_reported() {
    let err = AnalysisConfig::from_lookup(lookup(&[("DSEM_NO_INVARIANTS", "maybe")]));
    assert_eq!(
        err,
        Err(ConfigError::InvalidBool {
            var: "DSEM_NO_INVARIANTS",
            value: "maybe".to_owned(),
        })
    );
}

#[test]
fn error_messages() {
    assert_eq!(
        ConfigError::UnknownAttribute("x".to_owned()).to_string(),
        "unknown attribute `x`; expected pure, safe, nothrow, nogc, all or none"
    );
}
