// src/lib.rs
// 流水线核心与外围 (配置、录制、串口、后台线程)，GUI 在 bin 里
pub mod config;
pub mod engine;
pub mod recorder;
pub mod serial;
pub mod telemetry;
pub mod types;

pub use config::{PanelSettings, PipelineConfig};
pub use engine::{Connection, SharedPipeline};
pub use recorder::{CsvDocument, Recorder};
pub use telemetry::{ChannelPipeline, GrapherError};
