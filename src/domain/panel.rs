// Per-request panel state and aggregation.

use crate::domain::call::CallBatch;
use crate::domain::stacktrace::render_stacktrace;
use indexmap::IndexMap;
use serde::Serialize;

/// Aggregated state for one request/response cycle.
///
/// Owned by exactly one panel instance and discarded with it; nothing here
/// survives across requests.
#[derive(Debug, Default)]
pub struct PanelState {
    batches: Vec<CallBatch>,
}

/// Everything the renderer needs: the ordered batches plus the derived
/// method -> count mapping.
#[derive(Debug, Serialize)]
pub struct RenderContext {
    pub batches: Vec<CallBatch>,
    pub method_counts: IndexMap<String, usize>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a received batch. This is the only mutation path.
    ///
    /// Each record's raw stack frames are rendered to their escaped HTML
    /// form here, once, so the renderer can insert them verbatim.
    pub fn add_batch(&mut self, mut batch: CallBatch) {
        for call in &mut batch.calls {
            call.trace_html = render_stacktrace(&call.trace);
        }
        self.batches.push(batch);
    }

    /// Total number of recorded calls across all batches.
    pub fn call_count(&self) -> usize {
        self.batches.iter().map(|b| b.calls.len()).sum()
    }

    /// Total duration across all batches, in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        self.batches.iter().map(|b| b.duration_ms).sum()
    }

    /// One-line summary for the toolbar subtitle, e.g. "3 calls in 4.20ms".
    pub fn summary_line(&self) -> String {
        let calls = self.call_count();
        let duration = self.total_duration_ms();
        tracing::debug!(calls, duration_ms = duration, "graphdb panel summary");
        if calls == 1 {
            format!("1 call in {:.2}ms", duration)
        } else {
            format!("{} calls in {:.2}ms", calls, duration)
        }
    }

    /// Build the render context, recomputing method counts from scratch.
    pub fn render_context(&self) -> RenderContext {
        let mut method_counts: IndexMap<String, usize> = IndexMap::new();
        for batch in &self.batches {
            for call in &batch.calls {
                *method_counts.entry(call.method.clone()).or_insert(0) += 1;
            }
        }
        RenderContext {
            batches: self.batches.clone(),
            method_counts,
        }
    }
}
