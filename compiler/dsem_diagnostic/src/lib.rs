//! Diagnostic system for the declaration core.
//!
//! The core itself never prints. Fallible operations return values, and
//! the caller turns them into [`Diagnostic`]s:
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Secondary labels and notes (why it's wrong)
//!
//! [`DiagnosticQueue`] collects diagnostics for one compilation unit and
//! enforces an error limit.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
