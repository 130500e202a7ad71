// Call records captured from the instrumented REST client.

use crate::domain::stacktrace::StackFrame;
use indexmap::IndexMap;
use serde::Serialize;

/// Ordered string mapping used for request headers and payloads.
/// Insertion order is preserved so rendered output matches the order the
/// client supplied.
pub type FieldMap = IndexMap<String, String>;

/// Render a headers or payload mapping as "key: value" lines.
///
/// An empty or absent mapping renders as the literal string "None"; the
/// panel template keys off that sentinel to decide whether a payload link
/// is shown.
pub fn render_fields(fields: Option<&FieldMap>) -> String {
    match fields {
        Some(map) if !map.is_empty() => {
            let mut out = String::new();
            for (k, v) in map {
                out.push_str(k);
                out.push_str(": ");
                out.push_str(v);
                out.push('\n');
            }
            out
        }
        _ => "None".to_string(),
    }
}

/// One intercepted outbound call.
///
/// Headers and payload are rendered to text at capture time. The raw stack
/// frames are captured at call time and never mutated; `trace_html` is
/// filled in once by the panel when the batch is received.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    pub method: String,
    pub url: String,
    /// Rendered request headers ("k: v" lines or "None").
    pub headers: String,
    /// Rendered request payload ("k: v" lines or "None").
    pub data: String,
    /// Call site stack, outermost frame first.
    pub trace: Vec<StackFrame>,
    /// HTML rendering of `trace`, empty until the panel formats it.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_html: String,
    /// Rendered response headers + body, empty if the call failed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub response: String,
}

/// The calls observed during one timed span of the transport.
#[derive(Debug, Clone, Serialize)]
pub struct CallBatch {
    pub duration_ms: f64,
    pub calls: Vec<CallRecord>,
}
