//! Purity strength.

use std::fmt;

/// How strongly a pure function is isolated from its callers.
///
/// A strongly pure function can only see its arguments by value, so calls
/// with equal arguments may be folded. Weakly pure functions can still
/// mutate through their parameters.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum PurityLevel {
    Impure,
    /// Purity is still being inferred.
    FwdRef,
    Weak,
    Const,
    Strong,
}

impl PurityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PurityLevel::Impure => "impure",
            PurityLevel::FwdRef => "forward reference",
            PurityLevel::Weak => "weakly pure",
            PurityLevel::Const => "const pure",
            PurityLevel::Strong => "strongly pure",
        }
    }
}

impl fmt::Display for PurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
