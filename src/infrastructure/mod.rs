// Infrastructure implementations: the call bus and the recording transport.

pub mod bus;
pub mod recorder;

pub use bus::CallBus;
pub use recorder::{RecorderConfig, RecordingTransport};
