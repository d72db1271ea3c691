//! Diagnostic queue for one compilation unit.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical diagnostics at the same span
//! - Stable ordering by primary span

use crate::{Diagnostic, ErrorCode};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before further errors are dropped (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting, deduplicating, and sorting diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    limit_reached: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a queue with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue with a custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `false` if the diagnostic was dropped (duplicate, or the
    /// error limit was already reached).
    pub fn add(&mut self, diagnostic: Diagnostic) -> bool {
        if self.config.deduplicate && self.diagnostics.contains(&diagnostic) {
            return false;
        }

        if diagnostic.is_error() {
            if self.limit_reached {
                return false;
            }
            self.error_count += 1;
            if self.config.error_limit > 0 && self.error_count >= self.config.error_limit {
                self.limit_reached = true;
                self.diagnostics.push(diagnostic);
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::E9002)
                        .with_message("aborting due to too many errors"),
                );
                return true;
            }
        }

        self.diagnostics.push(diagnostic);
        true
    }

    /// Number of errors added (warnings excluded).
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Whether any error was added.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Whether the error limit stopped further errors.
    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    /// Take all diagnostics, sorted by primary span start.
    ///
    /// Diagnostics without a primary span keep their insertion order at
    /// the end.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        out.sort_by_key(|d| d.primary_span().map_or(u32::MAX, |s| s.start));
        out
    }
}
