// Recording wrapper around the client transport.
//
// Construct the client with a `RecordingTransport` around its real
// transport; no shared library state is mutated.

use crate::domain::call::{render_fields, CallBatch, CallRecord, FieldMap};
use crate::domain::stacktrace::capture_stack;
use crate::infrastructure::bus::CallBus;
use crate::ports::{Transport, TransportResponse};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Recorder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Maximum number of stack frames kept per call.
    pub max_frames: usize,
    /// Whether to read source lines for captured frames.
    pub capture_source: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_frames: 20,
            capture_source: true,
        }
    }
}

/// Times every outbound call of the wrapped transport and publishes a
/// single-record batch on the bus, without changing the call's behavior.
pub struct RecordingTransport<T: Transport> {
    inner: T,
    bus: Arc<CallBus>,
    config: RecorderConfig,
}

impl<T: Transport> RecordingTransport<T> {
    pub fn new(inner: T, bus: Arc<CallBus>) -> Self {
        Self::with_config(inner, bus, RecorderConfig::default())
    }

    pub fn with_config(inner: T, bus: Arc<CallBus>, config: RecorderConfig) -> Self {
        Self { inner, bus, config }
    }

    fn make_record(
        &self,
        method: &str,
        url: &str,
        data: Option<&FieldMap>,
        headers: Option<&FieldMap>,
    ) -> CallRecord {
        CallRecord {
            method: method.to_string(),
            url: url.to_string(),
            headers: render_fields(headers),
            data: render_fields(data),
            trace: capture_stack(self.config.max_frames, self.config.capture_source),
            trace_html: String::new(),
            response: String::new(),
        }
    }
}

impl<T: Transport> Transport for RecordingTransport<T> {
    fn request(
        &self,
        method: &str,
        url: &str,
        data: Option<&FieldMap>,
        headers: Option<&FieldMap>,
    ) -> Result<TransportResponse> {
        let mut record = self.make_record(method, url, data, headers);

        let start = Instant::now();
        let result = self.inner.request(method, url, data, headers);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        if let Ok(response) = &result {
            record.response = format!(
                "{}\n\n{}",
                render_fields(Some(&response.headers)),
                response.content
            );
        }

        // Published exactly once, on the success and the failure path
        // alike; the delegated error then propagates unchanged.
        self.bus.publish(&CallBatch {
            duration_ms,
            calls: vec![record],
        });

        result
    }
}
