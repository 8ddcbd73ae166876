//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing with the `info` default filter.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("info");
}

/// Tracing configuration (filters, JSON formatting).
pub mod tracing;
