//! Error codes for declaration-core diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E2002`) with the first
//! digit indicating the subsystem that detected the problem.

use std::fmt;

/// Error codes for all declaration-core diagnostics.
///
/// Format: E#### where the first digit indicates the subsystem:
/// - E1xxx: Declaration model errors
/// - E2xxx: Overload resolution errors
/// - E3xxx: Attribute errors
/// - E4xxx: Control-flow and layout errors
/// - E9xxx: Internal errors
/// - W4xxx: Layout warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Declaration Errors (E1xxx)
    /// Declaration annotated `@disable` was referenced
    E1001,
    /// Alias resolves back to itself
    E1002,
    /// Tuple element does not fit the tuple's kind
    E1003,
    /// Declaration cannot join the overload set
    E1004,
    /// Nested reference to a frame that is not lexically enclosing
    E1005,

    // Overload Errors (E2xxx)
    /// No overload matches the argument list
    E2001,
    /// Two or more overloads match equally well
    E2002,

    // Attribute Errors (E3xxx)
    /// `pure` function performs an impure operation
    E3001,
    /// `@safe` function performs an unsafe operation
    E3002,
    /// `nothrow` function may throw
    E3003,
    /// `@nogc` function allocates
    E3004,

    // Flow / Layout Errors (E4xxx)
    /// `goto` skips a declaration with an initializer
    E4001,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,

    // Layout Warnings (W4xxx)
    /// Overlapping fields mix pointers and raw data
    W4001,
}

impl ErrorCode {
    /// All variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E4001,
        ErrorCode::E9001,
        ErrorCode::E9002,
        ErrorCode::W4001,
    ];

    /// The code as printed in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::W4001 => "W4001",
        }
    }

    /// Whether this code is a warning rather than an error.
    pub fn is_warning(self) -> bool {
        self.as_str().starts_with('W')
    }

    /// Short description, used by `--explain`-style listings.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E1001 => "declaration is disabled",
            ErrorCode::E1002 => "recursive alias declaration",
            ErrorCode::E1003 => "invalid tuple element",
            ErrorCode::E1004 => "declaration is not overloadable",
            ErrorCode::E1005 => "cannot access frame of function",
            ErrorCode::E2001 => "no matching overload",
            ErrorCode::E2002 => "ambiguous call",
            ErrorCode::E3001 => "purity violation",
            ErrorCode::E3002 => "safety violation",
            ErrorCode::E3003 => "nothrow violation",
            ErrorCode::E3004 => "@nogc violation",
            ErrorCode::E4001 => "goto skips declaration with initializer",
            ErrorCode::E9001 => "internal compiler error",
            ErrorCode::E9002 => "too many errors",
            ErrorCode::W4001 => "unsafe field overlap",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
