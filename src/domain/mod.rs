// Domain model for the debug panel: call records, per-request state, and
// stack trace capture.

pub mod call;
pub mod panel;
pub mod stacktrace;
