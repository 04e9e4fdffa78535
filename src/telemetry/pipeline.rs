use std::time::Instant;
use log::{debug, info, trace, warn};
use crate::config::PipelineConfig;
use crate::recorder::{write_csv, CsvDocument, Recorder};
use crate::telemetry::buffer::{RingBuffer, Sample};
use crate::telemetry::channels::ChannelSet;
use crate::telemetry::error::GrapherError;
use crate::telemetry::line::LineAssembler;
use crate::telemetry::monitor::SerialMonitor;
use crate::telemetry::parser::parse_sample;
use crate::telemetry::rate::RateEstimator;
use crate::telemetry::scale::{ScaleEstimator, ScaleMode, ValueRange};
use crate::telemetry::smoothing::SmoothingFilter;
use crate::telemetry::view::FrameSnapshot;
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Streaming,
    Paused,
}
/// Stateful core driven by the transport loop and the UI.
///
/// Bytes flow line assembler -> parser -> smoothing -> ring buffer, and
/// every pushed sample is mirrored into the recorder while it is active.
/// Each assembled line is also echoed to the serial monitor, paused or not.
pub struct ChannelPipeline {
    config: PipelineConfig,
    state: LinkState,
    lines: LineAssembler,
    smoothing: SmoothingFilter,
    buffer: RingBuffer,
    scale: ScaleEstimator,
    rate: RateEstimator,
    channels: ChannelSet,
    recorder: Recorder,
    monitor: SerialMonitor,
}
impl ChannelPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, GrapherError> {
        config.validate()?;
        Ok(Self {
            state: LinkState::Idle,
            lines: LineAssembler::new(),
            smoothing: SmoothingFilter::new(config.channel_count, config.smoothing_factor)?,
            buffer: RingBuffer::new(config.max_samples, config.channel_count),
            scale: ScaleEstimator::new(ScaleMode::default(), ValueRange::new(0.0, 1000.0)),
            rate: RateEstimator::new(config.rate_period(), Instant::now()),
            channels: ChannelSet::new(config.channel_count),
            recorder: Recorder::new(),
            monitor: SerialMonitor::default(),
            config,
        })
    }
    pub fn state(&self) -> LinkState {
        self.state
    }
    pub fn is_connected(&self) -> bool {
        self.state != LinkState::Idle
    }
    pub fn is_paused(&self) -> bool {
        self.state == LinkState::Paused
    }
    /// Idle -> Streaming. Already connected pipelines are left alone.
    pub fn connect(&mut self) {
        if self.state != LinkState::Idle {
            return;
        }
        self.lines.discard();
        self.rate.restart(Instant::now());
        self.state = LinkState::Streaming;
        info!("pipeline streaming");
    }
    /// Back to Idle from any state. Ingested samples are kept.
    pub fn disconnect(&mut self) {
        if self.state == LinkState::Idle {
            return;
        }
        self.lines.discard();
        self.state = LinkState::Idle;
        info!("pipeline idle ({} samples buffered)", self.buffer.len());
    }
    pub fn pause(&mut self) {
        if self.state == LinkState::Streaming {
            self.state = LinkState::Paused;
            debug!("pipeline paused");
        }
    }
    pub fn resume(&mut self) {
        if self.state == LinkState::Paused {
            self.state = LinkState::Streaming;
            debug!("pipeline resumed");
        }
    }
    pub fn toggle_pause(&mut self) {
        match self.state {
            LinkState::Streaming => self.pause(),
            LinkState::Paused => self.resume(),
            LinkState::Idle => {}
        }
    }
    /// Feeds one transport chunk and returns the number of samples appended.
    ///
    /// Ignored while Idle. While Paused the lines are still assembled, then
    /// dropped.
    pub fn on_chunk(&mut self, chunk: &[u8]) -> usize {
        if self.state == LinkState::Idle {
            trace!("dropping {} bytes while idle", chunk.len());
            return 0;
        }
        let lines: Vec<String> = self.lines.feed(chunk).collect();
        for line in &lines {
            self.monitor.push_received(line);
        }
        let appended = lines.iter().filter(|line| self.ingest_line(line)).count();
        trace!(
            "chunk of {} bytes -> {} lines, {} samples",
            chunk.len(),
            lines.len(),
            appended
        );
        appended
    }
    /// Processes the held tail as a final line at a clean end of stream.
    pub fn flush_pending(&mut self) -> usize {
        match self.lines.flush() {
            Some(line) if self.is_connected() => {
                self.monitor.push_received(&line);
                usize::from(self.ingest_line(&line))
            }
            _ => 0,
        }
    }
    fn ingest_line(&mut self, line: &str) -> bool {
        if self.state != LinkState::Streaming {
            return false;
        }
        let raw = parse_sample(line, self.config.channel_count);
        let sample = self.smoothing.apply(&raw);
        self.recorder.record(&sample);
        self.buffer.push(sample);
        self.rate.record(1);
        true
    }
    /// Empties the chart state and starts a fresh rate window. The connection
    /// is untouched; an active recording keeps going but loses what it held.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.smoothing.reset();
        self.scale.reset();
        self.recorder.discard();
        self.rate.restart(Instant::now());
        debug!("pipeline cleared");
    }
    pub fn start_recording(&mut self) {
        self.recorder.start();
    }
    /// Ends the recording and serializes it. An empty session gives a
    /// header-only document.
    pub fn stop_recording(&mut self) -> CsvDocument {
        let samples = self.recorder.stop();
        write_csv(&samples, &self.channels.names(), self.rate.rate_hz())
    }
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }
    pub fn recorded_len(&self) -> usize {
        self.recorder.len()
    }
    /// CSV of the live buffer.
    pub fn export_live(&self) -> Result<CsvDocument, GrapherError> {
        if self.buffer.is_empty() {
            return Err(GrapherError::NothingToExport);
        }
        Ok(write_csv(
            &self.buffer.to_vec(),
            &self.channels.names(),
            self.rate.rate_hz(),
        ))
    }
    /// Applies a new configuration, or rejects it and keeps the current one.
    pub fn configure(&mut self, config: PipelineConfig) -> Result<(), GrapherError> {
        if let Err(err) = config.validate() {
            warn!("rejected pipeline configuration: {err}");
            return Err(err);
        }
        if config.channel_count != self.config.channel_count {
            self.smoothing.set_channel_count(config.channel_count);
            self.buffer.set_channel_count(config.channel_count);
            self.channels.resize(config.channel_count);
            self.scale.reset();
        }
        self.buffer.set_max_samples(config.max_samples);
        self.smoothing.set_factor(config.smoothing_factor)?;
        self.rate.set_period(config.rate_period());
        info!("pipeline configured: {config:?}");
        self.config = config;
        Ok(())
    }
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
    /// Closes the rate window when its period has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.rate.tick(now)
    }
    pub fn data_rate(&self) -> f64 {
        self.rate.rate_hz()
    }
    pub fn len(&self) -> usize {
        self.buffer.len()
    }
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
    pub fn samples(&self) -> Vec<Sample> {
        self.buffer.to_vec()
    }
    pub fn latest_values(&self) -> &[f64] {
        self.buffer.latest()
    }
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }
    pub fn channels_mut(&mut self) -> &mut ChannelSet {
        &mut self.channels
    }
    pub fn monitor(&self) -> &SerialMonitor {
        &self.monitor
    }
    pub fn monitor_mut(&mut self) -> &mut SerialMonitor {
        &mut self.monitor
    }
    /// Flips visibility of channels currently reading near zero.
    pub fn toggle_empty_channels(&mut self) {
        let latest = self.buffer.latest().to_vec();
        self.channels.toggle_empty(&latest);
    }
    pub fn scale_mode(&self) -> ScaleMode {
        self.scale.mode()
    }
    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.scale.set_mode(mode);
    }
    pub fn fixed_bounds(&self) -> ValueRange {
        self.scale.fixed_bounds()
    }
    pub fn set_fixed_bounds(&mut self, bounds: ValueRange) {
        self.scale.set_fixed_bounds(bounds);
    }
    /// Copies out one frame for rendering.
    pub fn snapshot(&mut self) -> FrameSnapshot {
        let samples = self.buffer.to_vec();
        let visible = self.channels.visibility();
        let range = self.scale.estimate(&samples, &visible);
        FrameSnapshot {
            samples,
            range,
            names: self.channels.names(),
            colors: self.channels.colors(),
            visible,
            latest: self.buffer.latest().to_vec(),
            data_rate: self.rate.rate_hz(),
            state: self.state,
            recording: self.recorder.is_recording(),
            recorded_len: self.recorder.len(),
        }
    }
}
