use serde::{Deserialize, Serialize};
use crate::telemetry::buffer::Sample;
use crate::telemetry::pipeline::LinkState;
use crate::telemetry::scale::ValueRange;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphStyle {
    #[default]
    Line,
    Dots,
    Bars,
}
/// Everything a renderer needs for one frame, copied out of the pipeline.
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    pub samples: Vec<Sample>,
    pub range: ValueRange,
    pub names: Vec<String>,
    pub colors: Vec<[u8; 3]>,
    pub visible: Vec<bool>,
    pub latest: Vec<f64>,
    pub data_rate: f64,
    pub state: LinkState,
    pub recording: bool,
    pub recorded_len: usize,
}
impl FrameSnapshot {
    /// Snapshot of static data (file replay): no rate, no link.
    pub fn from_table(
        samples: Vec<Sample>,
        names: Vec<String>,
        colors: Vec<[u8; 3]>,
        range: ValueRange,
    ) -> Self {
        let channels = names.len();
        let latest = samples
            .last()
            .map(|s| s.values().to_vec())
            .unwrap_or_else(|| vec![0.0; channels]);
        Self {
            samples,
            range,
            names,
            colors,
            visible: vec![true; channels],
            latest,
            data_rate: 1.0,
            state: LinkState::Idle,
            recording: false,
            recorded_len: 0,
        }
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn channel_count(&self) -> usize {
        self.names.len()
    }
    pub fn is_visible(&self, channel: usize) -> bool {
        self.visible.get(channel).copied().unwrap_or(false)
    }
    fn rate(&self) -> f64 {
        if self.data_rate.is_finite() && self.data_rate > 0.0 {
            self.data_rate
        } else {
            1.0
        }
    }
    /// `[seconds, value]` points for one channel, oldest first.
    pub fn series(&self, channel: usize) -> Vec<[f64; 2]> {
        let rate = self.rate();
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.get(channel).map(|v| [i as f64 / rate, v]))
            .collect()
    }
    pub fn time_span(&self) -> f64 {
        self.samples.len() as f64 / self.rate()
    }
    /// Horizontal pixel position of sample `index` across `width`.
    pub fn sample_x(&self, index: usize, width: f64) -> f64 {
        let last = self.samples.len().saturating_sub(1).max(1);
        index as f64 / last as f64 * width
    }
    /// Vertical pixel position, 0 at the top.
    pub fn value_to_y(&self, value: f64, height: f64) -> f64 {
        height - self.range.normalize(value) * height
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn snapshot(rows: &[&[f64]], rate: f64, range: ValueRange) -> FrameSnapshot {
        let samples: Vec<Sample> = rows.iter().map(|r| Sample::new(r.to_vec())).collect();
        let mut snap = FrameSnapshot::from_table(
            samples,
            vec!["A".into(), "B".into()],
            vec![[0, 0, 0]; 2],
            range,
        );
        snap.data_rate = rate;
        snap
    }
    #[test]
    fn series_uses_rate_for_time_axis() {
        let snap = snapshot(&[&[1.0, 2.0], &[3.0, 4.0]], 4.0, ValueRange::new(0.0, 10.0));
        assert_eq!(snap.series(1), vec![[0.0, 2.0], [0.25, 4.0]]);
        assert_eq!(snap.time_span(), 0.5);
        assert!(snap.series(5).is_empty());
    }
    #[test]
    fn pixel_mapping_guards_flat_range() {
        let snap = snapshot(&[&[5.0, 5.0]], 1.0, ValueRange::new(5.0, 5.0));
        assert_eq!(snap.value_to_y(5.0, 200.0), 100.0);
        assert_eq!(snap.sample_x(0, 300.0), 0.0);
        let snap = snapshot(&[&[0.0, 0.0], &[1.0, 1.0], &[2.0, 2.0]], 1.0, ValueRange::new(0.0, 10.0));
        assert_eq!(snap.sample_x(2, 300.0), 300.0);
        assert_eq!(snap.value_to_y(10.0, 200.0), 0.0);
    }
}
