// src/telemetry/mod.rs
// 流水线各阶段: 分行 -> 解析 -> 平滑 -> 环形缓冲 -> 量程/渲染
pub mod buffer;
pub mod channels;
pub mod error;
pub mod line;
pub mod monitor;
pub mod parser;
pub mod pipeline;
pub mod plot;
pub mod rate;
pub mod replay;
pub mod scale;
pub mod smoothing;
pub mod source;
pub mod view;
// 公开导出常用类型，方便外部调用
pub use buffer::{RingBuffer, Sample};
pub use channels::{ChannelInfo, ChannelSet, SplitChannels};
pub use error::GrapherError;
pub use line::LineAssembler;
pub use monitor::{ColorTag, SerialMonitor};
pub use parser::{coerce_numeric, parse_sample};
pub use pipeline::{ChannelPipeline, LinkState};
pub use plot::{render_frame_png, PlotStyle};
pub use rate::RateEstimator;
pub use replay::CsvTable;
pub use scale::{format_axis_label, nice_range, ScaleEstimator, ScaleMode, ValueRange};
pub use smoothing::SmoothingFilter;
pub use source::{open_transport, ManualTransport, ReadOutcome, SimulatedTransport, Transport};
pub use view::{FrameSnapshot, GraphStyle};
