use std::collections::VecDeque;
use std::sync::Arc;
/// One timestep of per-channel readings. Cheap to clone, immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    values: Arc<[f64]>,
}
impl Sample {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into(),
        }
    }
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    pub fn get(&self, channel: usize) -> Option<f64> {
        self.values.get(channel).copied()
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
impl From<Vec<f64>> for Sample {
    fn from(values: Vec<f64>) -> Self {
        Sample::new(values)
    }
}
/// Bounded FIFO of samples plus the per-channel "current value" cache.
pub struct RingBuffer {
    samples: VecDeque<Sample>,
    latest: Vec<f64>,
    max_samples: usize,
}
impl RingBuffer {
    pub fn new(max_samples: usize, channel_count: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples.min(16_384)),
            latest: vec![0.0; channel_count],
            max_samples,
        }
    }
    /// Appends `sample`, evicting the single oldest one when over capacity.
    pub fn push(&mut self, sample: Sample) {
        for (slot, value) in self.latest.iter_mut().zip(sample.values()) {
            *slot = *value;
        }
        self.samples.push_back(sample);
        if self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }
    pub fn clear(&mut self) {
        self.samples.clear();
        self.latest.iter_mut().for_each(|v| *v = 0.0);
    }
    /// Shrinking trims the oldest samples immediately.
    pub fn set_max_samples(&mut self, max_samples: usize) {
        self.max_samples = max_samples;
        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }
    /// Resizes the current-value cache; stored samples are dropped because
    /// their width no longer matches.
    pub fn set_channel_count(&mut self, channel_count: usize) {
        self.samples.clear();
        self.latest = vec![0.0; channel_count];
    }
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
    /// Ordered copy of the contents, oldest first.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }
    pub fn latest(&self) -> &[f64] {
        &self.latest
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn s(v: f64) -> Sample {
        Sample::new(vec![v, -v])
    }
    #[test]
    fn evicts_oldest_in_order() {
        let mut buffer = RingBuffer::new(3, 2);
        for v in [1.0, 2.0, 3.0, 4.0] {
            buffer.push(s(v));
        }
        assert_eq!(buffer.to_vec(), vec![s(2.0), s(3.0), s(4.0)]);
    }
    #[test]
    fn holds_most_recent_pushes() {
        let mut buffer = RingBuffer::new(5, 2);
        for i in 0..37 {
            buffer.push(s(i as f64));
            assert!(buffer.len() <= 5);
        }
        let expected: Vec<Sample> = (32..37).map(|i| s(i as f64)).collect();
        assert_eq!(buffer.to_vec(), expected);
    }
    #[test]
    fn shrink_trims_eagerly() {
        let mut buffer = RingBuffer::new(10, 2);
        for v in 0..10 {
            buffer.push(s(v as f64));
        }
        buffer.set_max_samples(4);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.to_vec().first(), Some(&s(6.0)));
        buffer.set_max_samples(8);
        buffer.push(s(10.0));
        assert_eq!(buffer.len(), 5);
    }
    #[test]
    fn clear_resets_current_values() {
        let mut buffer = RingBuffer::new(4, 2);
        buffer.push(s(7.0));
        assert_eq!(buffer.latest(), &[7.0, -7.0]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.latest(), &[0.0, 0.0]);
    }
}
