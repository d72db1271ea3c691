//! Overload sets and overload resolution.
//!
//! An overload set is a chain of declarations linked through `overnext`.
//! Aliases and overload anchors splice other chains into it, so the same
//! function can be reachable along several paths; [`overload_apply`] is the
//! one traversal everything else is built on and reports every function
//! exactly once.

mod apply;
mod resolve;

pub use apply::{candidates, is_unique, overload_apply, overload_exact_match, overload_insert};
pub use resolve::{
    function_resolve, least_as_specialized, resolve_call, Argument, Match, MatchLevel,
    MatchOracle, Signature, TemplateArg,
};

#[cfg(test)]
mod tests;
