//! HTML Panel Exporter
//!
//! Renders the aggregated render context as the toolbar's HTML fragment:
//! a method/count summary table plus one row per recorded call with
//! collapsible stack trace, response, and payload rows.

use crate::common::escape_html;
use crate::domain::panel::RenderContext;
use anyhow::Result;
use std::io;

/// Static toggle behavior for the collapsible rows. The host serves this
/// once alongside the fragment; the fragment itself carries no script.
/// Detail rows start hidden and each action link toggles the matching
/// detail row of its own call.
pub const TOGGLE_JS: &str = r#"document.addEventListener('DOMContentLoaded', function () {
    var detailClasses = ['gdbt-trace', 'gdbt-response', 'gdbt-data'];

    function detailRow(link, cls) {
        var row = link.closest('tr');
        var next = row ? row.nextElementSibling : null;
        while (next) {
            if (next.classList.contains(cls)) { return next; }
            var isDetail = detailClasses.some(function (c) {
                return next.classList.contains(c);
            });
            if (!isDetail) { break; }
            next = next.nextElementSibling;
        }
        return null;
    }

    document.querySelectorAll('.gdbt-trace, .gdbt-response, .gdbt-data')
        .forEach(function (row) { row.style.display = 'none'; });

    [['gdbt-show-trace', 'gdbt-trace'],
     ['gdbt-show-response', 'gdbt-response'],
     ['gdbt-show-data', 'gdbt-data']].forEach(function (pair) {
        document.querySelectorAll('.' + pair[0]).forEach(function (link) {
            link.addEventListener('click', function (event) {
                event.preventDefault();
                var row = detailRow(link, pair[1]);
                if (row) {
                    row.style.display =
                        row.style.display === 'none' ? '' : 'none';
                }
            });
        });
    });
});
"#;

pub struct HtmlExporter;

impl HtmlExporter {
    /// Write the fragment plus the toggle script to a file, so the export
    /// is viewable on its own.
    pub fn export(context: &RenderContext, path: &str) -> io::Result<()> {
        let mut content = Self::to_html(context);
        content.push_str("\n<script>\n");
        content.push_str(TOGGLE_JS);
        content.push_str("</script>\n");
        std::fs::write(path, content)
    }

    /// Serialize the render context as pretty JSON.
    pub fn to_json(context: &RenderContext) -> Result<String> {
        Ok(serde_json::to_string_pretty(context)?)
    }

    /// Convert the render context to the panel's HTML fragment.
    ///
    /// Method, url, headers, and payload are escaped here. The stack trace
    /// was escaped when the panel formatted it and the response body is
    /// produced by the client library, so both go in verbatim.
    pub fn to_html(context: &RenderContext) -> String {
        let mut lines = Vec::new();

        // Method/count summary table
        lines.push("<h4>Calls</h4>".to_string());
        lines.push("<table>".to_string());
        lines.push("<thead>".to_string());
        lines.push("<tr><th>Method</th><th>Count</th></tr>".to_string());
        lines.push("</thead>".to_string());
        lines.push("<tbody>".to_string());
        for (method, count) in &context.method_counts {
            lines.push(format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(method),
                count
            ));
        }
        lines.push("</tbody>".to_string());
        lines.push("</table>".to_string());
        lines.push(String::new());

        // Per-call detail table
        lines.push("<table>".to_string());
        lines.push("<thead>".to_string());
        lines.push(
            "<tr><th>Duration</th><th>Method</th><th>Url</th><th>Headers</th><th>Action</th></tr>"
                .to_string(),
        );
        lines.push("</thead>".to_string());
        lines.push("<tbody>".to_string());

        for batch in &context.batches {
            for (i, call) in batch.calls.iter().enumerate() {
                // Duration is shown only on the first row of its batch.
                let duration = if i == 0 {
                    format!("{:.2} ms", batch.duration_ms)
                } else {
                    String::new()
                };
                let has_data = call.data != "None";
                let has_trace = !call.trace_html.is_empty();
                let has_response = !call.response.is_empty();

                let mut actions = Vec::new();
                if has_data {
                    actions.push(
                        "<a href=\"#\" class=\"gdbt-show-data\">Show payload</a>".to_string(),
                    );
                }
                if has_trace {
                    actions.push(
                        "<a href=\"#\" class=\"gdbt-show-trace\">Show stacktrace</a>".to_string(),
                    );
                }
                if has_response {
                    actions.push(
                        "<a href=\"#\" class=\"gdbt-show-response\">Show response</a>".to_string(),
                    );
                }

                lines.push("<tr>".to_string());
                lines.push(format!("<td>{}</td>", duration));
                lines.push(format!("<td>{}</td>", escape_html(&call.method)));
                lines.push(format!("<td>{}</td>", escape_html(&call.url)));
                lines.push(format!("<td>{}</td>", escape_html(&call.headers)));
                lines.push(format!("<td>{}</td>", actions.join("\n")));
                lines.push("</tr>".to_string());

                if has_trace {
                    lines.push("<tr class=\"gdbt-trace\">".to_string());
                    lines.push(format!(
                        "<td colspan=\"5\"><pre class=\"stack\">{}</pre></td>",
                        call.trace_html
                    ));
                    lines.push("</tr>".to_string());
                }

                if has_response {
                    lines.push("<tr class=\"gdbt-response\">".to_string());
                    lines.push(format!(
                        "<td colspan=\"5\"><pre class=\"stack\">{}</pre></td>",
                        call.response
                    ));
                    lines.push("</tr>".to_string());
                }

                if has_data {
                    lines.push("<tr class=\"gdbt-data\">".to_string());
                    lines.push(format!(
                        "<td colspan=\"5\"><pre class=\"stack\">{}</pre></td>",
                        escape_html(&call.data)
                    ));
                    lines.push("</tr>".to_string());
                }
            }
        }

        lines.push("</tbody>".to_string());
        lines.push("</table>".to_string());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{CallBatch, CallRecord};
    use crate::domain::panel::PanelState;

    fn call(method: &str, url: &str) -> CallRecord {
        CallRecord {
            method: method.to_string(),
            url: url.to_string(),
            headers: "Accept: application/json\n".to_string(),
            data: "None".to_string(),
            trace: vec![],
            trace_html: String::new(),
            response: String::new(),
        }
    }

    fn context_of(batches: Vec<CallBatch>) -> RenderContext {
        let mut state = PanelState::new();
        for batch in batches {
            state.add_batch(batch);
        }
        state.render_context()
    }

    #[test]
    fn test_to_html_summary_table() {
        let context = context_of(vec![
            CallBatch { duration_ms: 1.0, calls: vec![call("GET", "http://h/a")] },
            CallBatch { duration_ms: 1.0, calls: vec![call("POST", "http://h/b")] },
        ]);
        let html = HtmlExporter::to_html(&context);
        assert!(html.contains("<h4>Calls</h4>"));
        assert!(html.contains("<tr><td>GET</td><td>1</td></tr>"));
        assert!(html.contains("<tr><td>POST</td><td>1</td></tr>"));
    }

    #[test]
    fn test_duration_only_on_first_row_of_batch() {
        let context = context_of(vec![CallBatch {
            duration_ms: 3.14159,
            calls: vec![call("GET", "http://h/a"), call("GET", "http://h/b")],
        }]);
        let html = HtmlExporter::to_html(&context);
        assert_eq!(html.matches("3.14 ms").count(), 1);
    }

    #[test]
    fn test_payload_link_suppressed_for_none_sentinel() {
        let mut with_data = call("POST", "http://h/node");
        with_data.data = "query: MATCH (n) RETURN n\n".to_string();

        let context = context_of(vec![
            CallBatch { duration_ms: 1.0, calls: vec![call("GET", "http://h/a")] },
            CallBatch { duration_ms: 1.0, calls: vec![with_data] },
        ]);
        let html = HtmlExporter::to_html(&context);
        assert_eq!(html.matches("gdbt-show-data").count(), 1);
        assert_eq!(html.matches("class=\"gdbt-data\"").count(), 1);
        assert!(html.contains("query: MATCH (n) RETURN n"));
    }

    #[test]
    fn test_untrusted_text_escaped_response_verbatim() {
        let mut c = call("GET", "http://h/<script>alert(1)</script>");
        c.response = "Status: 200\n\n<b>body</b>".to_string();

        let context = context_of(vec![CallBatch { duration_ms: 1.0, calls: vec![c] }]);
        let html = HtmlExporter::to_html(&context);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert(1)"));
        // The response body is trusted and inserted as-is.
        assert!(html.contains("<b>body</b>"));
    }

    #[test]
    fn test_fragment_carries_no_inline_script() {
        let context = context_of(vec![CallBatch {
            duration_ms: 1.0,
            calls: vec![call("GET", "http://h/a")],
        }]);
        let html = HtmlExporter::to_html(&context);
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_to_json_round_trips_methods() {
        let context = context_of(vec![CallBatch {
            duration_ms: 1.0,
            calls: vec![call("DELETE", "http://h/a")],
        }]);
        let json = HtmlExporter::to_json(&context).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["method_counts"]["DELETE"], 1);
    }
}
