// Panel wiring: one GraphPanel per request/response cycle.

use crate::domain::call::CallBatch;
use crate::domain::panel::{PanelState, RenderContext};
use crate::infrastructure::bus::CallBus;
use crate::ports::html_exporter::HtmlExporter;
use crate::ports::{CallSubscriber, ToolbarPanel};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};

/// The debug-toolbar panel for graph-database calls.
///
/// Constructed per request via [`GraphPanel::attach`], which registers it
/// on the bus; dropping the panel at the end of the cycle unsubscribes it.
/// Nothing here may break the page being debugged: lock failures degrade
/// to empty output instead of panicking.
pub struct GraphPanel {
    state: Mutex<PanelState>,
}

impl GraphPanel {
    /// Create a panel for one request cycle and subscribe it to the bus.
    pub fn attach(bus: &CallBus) -> Arc<Self> {
        let panel = Arc::new(Self {
            state: Mutex::new(PanelState::new()),
        });
        bus.subscribe(&panel);
        panel
    }

    /// Snapshot of the aggregated state for rendering.
    pub fn render_context(&self) -> RenderContext {
        match self.state.lock() {
            Ok(state) => state.render_context(),
            Err(_) => PanelState::new().render_context(),
        }
    }
}

impl CallSubscriber for GraphPanel {
    fn on_batch(&self, batch: &CallBatch) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("panel state lock poisoned"))?;
        state.add_batch(batch.clone());
        Ok(())
    }
}

impl ToolbarPanel for GraphPanel {
    fn nav_title(&self) -> &str {
        "GraphDB"
    }

    fn nav_subtitle(&self) -> String {
        match self.state.lock() {
            Ok(state) => state.summary_line(),
            Err(_) => String::new(),
        }
    }

    fn content(&self) -> String {
        HtmlExporter::to_html(&self.render_context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::CallRecord;

    fn batch(method: &str, duration_ms: f64) -> CallBatch {
        CallBatch {
            duration_ms,
            calls: vec![CallRecord {
                method: method.to_string(),
                url: "http://localhost:7474/db/data/".to_string(),
                headers: "None".to_string(),
                data: "None".to_string(),
                trace: vec![],
                trace_html: String::new(),
                response: String::new(),
            }],
        }
    }

    #[test]
    fn test_attach_subscribes_and_aggregates() {
        let bus = CallBus::new();
        let panel = GraphPanel::attach(&bus);

        bus.publish(&batch("GET", 1.25));
        bus.publish(&batch("GET", 0.75));

        assert_eq!(panel.nav_subtitle(), "2 calls in 2.00ms");
        let context = panel.render_context();
        assert_eq!(context.method_counts.get("GET"), Some(&2));
    }

    #[test]
    fn test_toolbar_contract_defaults() {
        let bus = CallBus::new();
        let panel = GraphPanel::attach(&bus);
        assert_eq!(panel.nav_title(), "GraphDB");
        assert_eq!(panel.title(), "GraphDB");
        assert!(panel.has_content());
        assert_eq!(panel.url(), "");
    }

    #[test]
    fn test_content_renders_fragment() {
        let bus = CallBus::new();
        let panel = GraphPanel::attach(&bus);
        bus.publish(&batch("PUT", 3.0));

        let html = panel.content();
        assert!(html.contains("<h4>Calls</h4>"));
        assert!(html.contains("<tr><td>PUT</td><td>1</td></tr>"));
        assert!(html.contains("3.00 ms"));
    }

    #[test]
    fn test_drop_unsubscribes_panel() {
        let bus = CallBus::new();
        let panel = GraphPanel::attach(&bus);
        assert_eq!(bus.subscriber_count(), 1);
        drop(panel);
        bus.publish(&batch("GET", 1.0));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
