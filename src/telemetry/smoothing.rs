use crate::telemetry::buffer::Sample;
use crate::telemetry::error::GrapherError;
/// Per-channel exponential moving average.
///
/// `factor` is the weight kept from the previous accumulator: 0 passes raw
/// values through, values near 1 smooth heavily.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    factor: f64,
    accumulators: Vec<Option<f64>>,
}
impl SmoothingFilter {
    pub fn new(channel_count: usize, factor: f64) -> Result<Self, GrapherError> {
        validate_factor(factor)?;
        Ok(Self {
            factor,
            accumulators: vec![None; channel_count],
        })
    }
    pub fn apply(&mut self, raw: &Sample) -> Sample {
        let factor = self.factor;
        for (acc, &value) in self.accumulators.iter_mut().zip(raw.values()) {
            *acc = Some(match *acc {
                None => value,
                Some(prev) => prev * factor + value * (1.0 - factor),
            });
        }
        Sample::new(self.accumulators.iter().map(|a| a.unwrap_or(0.0)).collect())
    }
    /// Next `apply` re-seeds every channel from its raw value.
    pub fn reset(&mut self) {
        self.accumulators.iter_mut().for_each(|a| *a = None);
    }
    pub fn set_factor(&mut self, factor: f64) -> Result<(), GrapherError> {
        validate_factor(factor)?;
        self.factor = factor;
        Ok(())
    }
    pub fn set_channel_count(&mut self, channel_count: usize) {
        self.accumulators = vec![None; channel_count];
    }
    pub fn factor(&self) -> f64 {
        self.factor
    }
    pub fn channel_count(&self) -> usize {
        self.accumulators.len()
    }
}
pub(crate) fn validate_factor(factor: f64) -> Result<(), GrapherError> {
    if (0.0..1.0).contains(&factor) {
        Ok(())
    } else {
        Err(GrapherError::InvalidSmoothingFactor(factor))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn first_sample_seeds_accumulator() {
        let mut filter = SmoothingFilter::new(2, 0.85).unwrap();
        let out = filter.apply(&Sample::new(vec![10.0, -4.0]));
        assert_eq!(out.values(), &[10.0, -4.0]);
    }
    #[test]
    fn blends_with_previous_value() {
        let mut filter = SmoothingFilter::new(1, 0.8).unwrap();
        filter.apply(&Sample::new(vec![0.0]));
        let out = filter.apply(&Sample::new(vec![10.0]));
        assert!((out.values()[0] - 2.0).abs() < 1e-12);
    }
    #[test]
    fn converges_to_constant_input() {
        for factor in [0.0, 0.5, 0.85, 0.99] {
            let mut filter = SmoothingFilter::new(1, factor).unwrap();
            filter.apply(&Sample::new(vec![-300.0]));
            let mut last = 0.0;
            for _ in 0..5_000 {
                last = filter.apply(&Sample::new(vec![42.0])).values()[0];
            }
            assert!((last - 42.0).abs() < 1e-6, "factor {factor} ended at {last}");
        }
    }
    #[test]
    fn zero_factor_is_passthrough() {
        let mut filter = SmoothingFilter::new(2, 0.0).unwrap();
        filter.apply(&Sample::new(vec![1.0, 2.0]));
        let out = filter.apply(&Sample::new(vec![5.0, 6.0]));
        assert_eq!(out.values(), &[5.0, 6.0]);
    }
    #[test]
    fn reset_reseeds() {
        let mut filter = SmoothingFilter::new(1, 0.9).unwrap();
        filter.apply(&Sample::new(vec![100.0]));
        filter.reset();
        let out = filter.apply(&Sample::new(vec![3.0]));
        assert_eq!(out.values(), &[3.0]);
    }
    #[test]
    fn rejects_factor_outside_unit_interval() {
        assert!(SmoothingFilter::new(1, 1.0).is_err());
        assert!(SmoothingFilter::new(1, -0.1).is_err());
        let mut filter = SmoothingFilter::new(1, 0.5).unwrap();
        assert!(filter.set_factor(f64::NAN).is_err());
        assert_eq!(filter.factor(), 0.5);
    }
}
