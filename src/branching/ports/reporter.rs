//! Operator-visible progress output port.

/// Sink for operator-visible progress lines.
///
/// The workflow reports every deduced field, every skipped stage, and every
/// prospective diff through this port, so preview runs give the operator a
/// complete picture of what a committing run would do.
pub trait Reporter: Send + Sync {
    /// Emits one progress line.
    fn note(&self, line: &str);
}

/// Reporter that discards all output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn note(&self, _line: &str) {}
}
