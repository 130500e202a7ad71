// Ports for the debug panel: the transport seam being instrumented, the
// bus subscriber seam, and the contract the toolbar host drives.

use crate::domain::call::{CallBatch, FieldMap};
use anyhow::Result;

pub mod html_exporter;

/// Response produced by the transport: headers plus raw body content.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub headers: FieldMap,
    pub content: String,
}

/// The graph-database client's request-dispatch operation.
///
/// The recording wrapper implements this same trait around a real
/// transport, so instrumentation is plain dependency injection rather than
/// mutation of shared client state.
pub trait Transport: Send + Sync {
    fn request(
        &self,
        method: &str,
        url: &str,
        data: Option<&FieldMap>,
        headers: Option<&FieldMap>,
    ) -> Result<TransportResponse>;
}

/// Receives call batches published by the recording transport.
/// Implementations must be thread-safe (Send + Sync).
pub trait CallSubscriber: Send + Sync {
    fn on_batch(&self, batch: &CallBatch) -> Result<()>;
}

/// Panel lifecycle contract of the debug-toolbar host. One instance is
/// constructed per request/response cycle.
pub trait ToolbarPanel {
    /// Short name shown in the toolbar navigation.
    fn nav_title(&self) -> &str;

    /// Panel heading; defaults to the navigation title.
    fn title(&self) -> &str {
        self.nav_title()
    }

    /// Summary text shown under the title.
    fn nav_subtitle(&self) -> String;

    fn has_content(&self) -> bool {
        true
    }

    /// Dedicated sub-view URL; empty means none.
    fn url(&self) -> String {
        String::new()
    }

    /// The rendered panel body.
    fn content(&self) -> String;
}
