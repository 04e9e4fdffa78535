use std::collections::VecDeque;
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::telemetry::error::GrapherError;
use crate::types::TransportSpec;
/// Result of one non-blocking-ish read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were written to the front of the buffer.
    Data(usize),
    /// Nothing arrived within the transport's timeout.
    Pending,
    /// The stream ended cleanly.
    Closed,
}
/// A byte-chunk source the read loop can own. Any device, socket or
/// scripted playback fits behind it.
pub trait Transport: Send {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, GrapherError>;
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), GrapherError>;
    fn close(&mut self) {}
    fn describe(&self) -> String;
}
pub fn open_transport(spec: &TransportSpec) -> Result<Box<dyn Transport>, GrapherError> {
    match spec {
        TransportSpec::Serial { port, baud } => {
            Ok(Box::new(crate::serial::SerialTransport::open(port, *baud)?))
        }
        TransportSpec::Simulated {
            channels,
            interval_ms,
        } => Ok(Box::new(SimulatedTransport::new(
            *channels,
            Duration::from_millis(*interval_ms),
        ))),
    }
}
/// In-memory transport useful for tests and deterministic playback.
pub struct ManualTransport {
    chunks: VecDeque<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
    hold_open: bool,
    failure: Option<String>,
    closed: bool,
}
impl ManualTransport {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            written: Arc::new(Mutex::new(Vec::new())),
            hold_open: false,
            failure: None,
            closed: false,
        }
    }
    /// Keeps reporting `Pending` after the script runs out instead of closing.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
    /// Fails with a connection error after the script runs out.
    pub fn fail_with(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }
    /// Handle to everything written through the transport.
    pub fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.written)
    }
}
impl Transport for ManualTransport {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, GrapherError> {
        if self.closed {
            return Ok(ReadOutcome::Closed);
        }
        let Some(mut chunk) = self.chunks.pop_front() else {
            if let Some(reason) = self.failure.take() {
                return Err(GrapherError::Connection(reason));
            }
            if self.hold_open {
                thread::sleep(Duration::from_millis(2));
                return Ok(ReadOutcome::Pending);
            }
            return Ok(ReadOutcome::Closed);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(chunk.split_off(n));
        }
        Ok(ReadOutcome::Data(n))
    }
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), GrapherError> {
        if self.closed {
            return Err(GrapherError::Connection("transport closed".into()));
        }
        self.written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(bytes);
        Ok(())
    }
    fn close(&mut self) {
        self.closed = true;
    }
    fn describe(&self) -> String {
        "manual".into()
    }
}
/// Demo device: one CSV line of smooth, noisy waveforms per interval.
pub struct SimulatedTransport {
    channels: usize,
    interval: Duration,
    started: Instant,
    rng: StdRng,
    pending: VecDeque<u8>,
}
impl SimulatedTransport {
    pub fn new(channels: usize, interval: Duration) -> Self {
        Self::with_rng(channels, interval, StdRng::from_entropy())
    }
    pub fn with_seed(channels: usize, interval: Duration, seed: u64) -> Self {
        Self::with_rng(channels, interval, StdRng::seed_from_u64(seed))
    }
    fn with_rng(channels: usize, interval: Duration, rng: StdRng) -> Self {
        Self {
            channels,
            interval,
            started: Instant::now(),
            rng,
            pending: VecDeque::new(),
        }
    }
    fn next_line(&mut self) -> String {
        let t = self.started.elapsed().as_secs_f64();
        let mut line = String::new();
        for i in 0..self.channels {
            let value = self.channel_value(i, t).clamp(0.0, 1000.0);
            if i > 0 {
                line.push(',');
            }
            let _ = write!(line, "{value:.2}");
        }
        line.push('\n');
        line
    }
    fn channel_value(&mut self, channel: usize, t: f64) -> f64 {
        let i = channel as f64;
        let noise = self.rng.gen::<f64>() - 0.5;
        match channel % 4 {
            0 => {
                150.0
                    + 80.0 * (t * 0.8 + i * 0.5).sin()
                    + 30.0 * (t * 2.5 + i * 0.3).sin()
                    + 15.0 * (t * 5.0 + i * 0.7).sin()
                    + noise * 8.0
            }
            1 => {
                120.0
                    + 60.0 * (t * 0.6 + i * 0.4).cos()
                    + 25.0 * (t * 1.8 + i * 0.6).cos()
                    + 12.0 * (t * 4.0 + i * 0.2).cos()
                    + noise * 6.0
            }
            2 => {
                100.0
                    + 50.0 * (t * 1.2 + i * 0.3).sin()
                    + 20.0 * (t * 3.6 + i * 0.8).sin()
                    + noise * 10.0
            }
            _ => {
                130.0
                    + 40.0 * (t * 0.4 + i * 0.2).sin() * (t * 1.5 + i * 0.5).cos()
                    + 20.0 * (t * 6.0 + i * 0.9 + PI / 8.0).sin()
                    + noise * 5.0
            }
        }
    }
}
impl Transport for SimulatedTransport {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, GrapherError> {
        if self.pending.is_empty() {
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
            let line = self.next_line();
            self.pending.extend(line.as_bytes());
        }
        let n = self.pending.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(ReadOutcome::Data(n))
    }
    fn write_all(&mut self, _bytes: &[u8]) -> Result<(), GrapherError> {
        Ok(())
    }
    fn describe(&self) -> String {
        format!("simulation ({} channels)", self.channels)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::line::LineAssembler;
    use crate::telemetry::parser::parse_sample;
    #[test]
    fn manual_transport_splits_large_chunks() {
        let mut t = ManualTransport::new(vec![b"abcdef".to_vec()]);
        let mut buf = [0u8; 4];
        assert_eq!(t.read_chunk(&mut buf).unwrap(), ReadOutcome::Data(4));
        assert_eq!(&buf, b"abcd");
        assert_eq!(t.read_chunk(&mut buf).unwrap(), ReadOutcome::Data(2));
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(t.read_chunk(&mut buf).unwrap(), ReadOutcome::Closed);
    }
    #[test]
    fn manual_transport_reports_failure_and_writes() {
        let mut t = ManualTransport::new(Vec::<Vec<u8>>::new()).fail_with("unplugged");
        t.write_all(b"ping\n").unwrap();
        assert_eq!(t.written().lock().unwrap().as_slice(), b"ping\n");
        let mut buf = [0u8; 8];
        assert!(matches!(t.read_chunk(&mut buf), Err(GrapherError::Connection(_))));
        t.close();
        assert!(t.write_all(b"x").is_err());
    }
    #[test]
    fn simulation_emits_bounded_csv_lines() {
        let mut t = SimulatedTransport::with_seed(13, Duration::ZERO, 7);
        let mut lines = LineAssembler::new();
        let mut buf = [0u8; 16];
        let mut collected = Vec::new();
        while collected.len() < 5 {
            let ReadOutcome::Data(n) = t.read_chunk(&mut buf).unwrap() else {
                panic!("simulation never pends");
            };
            collected.extend(lines.feed(&buf[..n]));
        }
        for line in collected {
            assert_eq!(line.split(',').count(), 13);
            let sample = parse_sample(&line, 13);
            assert!(sample.values().iter().all(|v| (0.0..=1000.0).contains(v)));
            assert!(sample.values().iter().any(|v| *v > 0.0));
        }
    }
}
