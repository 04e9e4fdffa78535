use serde::{Deserialize, Serialize};
use crate::telemetry::buffer::Sample;
/// Margin added on both sides when every visible value is identical.
const FLAT_MARGIN: f64 = 50.0;
/// Fraction of the data span added on each side before rounding.
const PAD_FRACTION: f64 = 0.1;
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}
impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
    /// Position of `value` in the range as 0..1 (bottom to top).
    /// A zero-height range maps everything to the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span == 0.0 || !span.is_finite() {
            0.5
        } else {
            (value - self.min) / span
        }
    }
    pub fn union(&self, other: &ValueRange) -> ValueRange {
        ValueRange::new(self.min.min(other.min), self.max.max(other.max))
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Configured bounds, untouched by the data.
    Fixed,
    /// Recomputed from the visible samples on every frame.
    AutoExpand,
    /// Like `AutoExpand`, but never narrower than the previous result.
    ExpandOnly,
}
impl Default for ScaleMode {
    fn default() -> Self {
        ScaleMode::AutoExpand
    }
}
pub struct ScaleEstimator {
    mode: ScaleMode,
    fixed: ValueRange,
    last: Option<ValueRange>,
}
impl ScaleEstimator {
    pub fn new(mode: ScaleMode, fixed: ValueRange) -> Self {
        Self {
            mode,
            fixed,
            last: None,
        }
    }
    pub fn mode(&self) -> ScaleMode {
        self.mode
    }
    pub fn set_mode(&mut self, mode: ScaleMode) {
        self.mode = mode;
    }
    pub fn fixed_bounds(&self) -> ValueRange {
        self.fixed
    }
    pub fn set_fixed_bounds(&mut self, fixed: ValueRange) {
        self.fixed = fixed;
    }
    /// Forgets the previous result; the next auto estimate starts fresh.
    pub fn reset(&mut self) {
        self.last = None;
    }
    pub fn estimate(&mut self, samples: &[Sample], visible: &[bool]) -> ValueRange {
        if self.mode == ScaleMode::Fixed {
            return self.fixed;
        }
        let prior = self.last.unwrap_or(self.fixed);
        let Some(raw) = visible_extent(samples, visible) else {
            return prior;
        };
        let Some(nice) = padded_nice_range(raw) else {
            return prior;
        };
        let range = match (self.mode, self.last) {
            (ScaleMode::ExpandOnly, Some(last)) => nice.union(&last),
            _ => nice,
        };
        self.last = Some(range);
        range
    }
}
fn visible_extent(samples: &[Sample], visible: &[bool]) -> Option<ValueRange> {
    let mut extent: Option<ValueRange> = None;
    for sample in samples {
        for (value, _) in sample
            .values()
            .iter()
            .zip(visible)
            .filter(|(_, shown)| **shown)
        {
            extent = Some(match extent {
                None => ValueRange::new(*value, *value),
                Some(r) => ValueRange::new(r.min.min(*value), r.max.max(*value)),
            });
        }
    }
    extent
}
fn padded_nice_range(raw: ValueRange) -> Option<ValueRange> {
    let span = raw.span();
    let padded = if span == 0.0 {
        ValueRange::new(raw.min - FLAT_MARGIN, raw.max + FLAT_MARGIN)
    } else {
        let pad = span * PAD_FRACTION;
        ValueRange::new(raw.min - pad, raw.max + pad)
    };
    nice_range(padded)
}
/// Snaps the span to 1, 2, 5 or 10 times a power of ten, keeping the midpoint.
pub fn nice_range(range: ValueRange) -> Option<ValueRange> {
    let span = range.span();
    if !(span > 0.0) || !span.is_finite() {
        return None;
    }
    let magnitude = 10f64.powf(span.log10().floor());
    let normalized = span / magnitude;
    let multiplier = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    let width = multiplier * magnitude;
    let center = (range.min + range.max) / 2.0;
    Some(ValueRange::new(center - width / 2.0, center + width / 2.0))
}
pub fn format_axis_label(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{:.1}k", value / 1000.0)
    } else if value.abs() >= 1.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn samples(rows: &[&[f64]]) -> Vec<Sample> {
        rows.iter().map(|r| Sample::new(r.to_vec())).collect()
    }
    fn auto() -> ScaleEstimator {
        ScaleEstimator::new(ScaleMode::AutoExpand, ValueRange::new(0.0, 1000.0))
    }
    fn close(a: ValueRange, min: f64, max: f64) -> bool {
        (a.min - min).abs() < 1e-9 && (a.max - max).abs() < 1e-9
    }
    #[test]
    fn fixed_mode_returns_configured_bounds() {
        let mut est = ScaleEstimator::new(ScaleMode::Fixed, ValueRange::new(-10.0, 10.0));
        let r = est.estimate(&samples(&[&[500.0]]), &[true]);
        assert_eq!(r, ValueRange::new(-10.0, 10.0));
    }
    #[test]
    fn pads_and_rounds_to_nice_width() {
        let mut est = auto();
        let r = est.estimate(&samples(&[&[0.0], &[10.0]]), &[true]);
        // padded -1..11 -> span 12 -> width 20 around 5
        assert!(close(r, -5.0, 15.0), "{r:?}");
    }
    #[test]
    fn identical_values_never_collapse() {
        let mut est = auto();
        for v in [0.0, 5.0, -250.0, 1e6] {
            let r = est.estimate(&samples(&[&[v], &[v], &[v]]), &[true]);
            assert!(r.max > r.min, "{v}: {r:?}");
        }
        let r = est.estimate(&samples(&[&[5.0]]), &[true]);
        assert!(close(r, -45.0, 55.0), "{r:?}");
    }
    #[test]
    fn hidden_channels_are_ignored() {
        let mut est = auto();
        let data = samples(&[&[0.0, 9000.0], &[10.0, -9000.0]]);
        let r = est.estimate(&data, &[true, false]);
        assert!(close(r, -5.0, 15.0), "{r:?}");
    }
    #[test]
    fn empty_input_keeps_prior_bounds() {
        let mut est = auto();
        let first = est.estimate(&samples(&[&[0.0], &[10.0]]), &[true]);
        assert_eq!(est.estimate(&[], &[true]), first);
        assert_eq!(est.estimate(&samples(&[&[3.0]]), &[false]), first);
    }
    #[test]
    fn expand_only_never_shrinks() {
        let mut est = ScaleEstimator::new(ScaleMode::ExpandOnly, ValueRange::new(0.0, 1000.0));
        let wide = est.estimate(&samples(&[&[0.0], &[100.0]]), &[true]);
        let narrow = est.estimate(&samples(&[&[40.0], &[41.0]]), &[true]);
        assert!(narrow.min <= wide.min && narrow.max >= wide.max);
        est.reset();
        let fresh = est.estimate(&samples(&[&[40.0], &[41.0]]), &[true]);
        assert!(fresh.span() < wide.span());
    }
    #[test]
    fn nice_range_multipliers() {
        let r = nice_range(ValueRange::new(0.0, 3.0)).unwrap();
        assert!(close(r, -1.0, 4.0));
        let r = nice_range(ValueRange::new(0.0, 70.0)).unwrap();
        assert!(close(r, -15.0, 85.0));
        assert!(nice_range(ValueRange::new(1.0, 1.0)).is_none());
    }
    #[test]
    fn normalize_guards_flat_range() {
        assert_eq!(ValueRange::new(3.0, 3.0).normalize(3.0), 0.5);
        assert_eq!(ValueRange::new(0.0, 10.0).normalize(2.5), 0.25);
    }
    #[test]
    fn axis_labels() {
        assert_eq!(format_axis_label(1500.0), "1.5k");
        assert_eq!(format_axis_label(-2300.0), "-2.3k");
        assert_eq!(format_axis_label(42.2), "42");
        assert_eq!(format_axis_label(0.126), "0.13");
    }
}
