use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use log::info;
use crate::telemetry::buffer::Sample;
use crate::telemetry::error::GrapherError;
pub const DEFAULT_OUTPUT_FILENAME: &str = "graph_data.csv";
/// Secondary, unbounded copy of the samples ingested while recording is on.
#[derive(Debug, Default)]
pub struct Recorder {
    samples: Vec<Sample>,
    recording: bool,
}
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
    /// Starts a fresh session. Samples from a previous unfinished one are dropped.
    pub fn start(&mut self) {
        self.samples.clear();
        self.recording = true;
        info!("recording started");
    }
    /// Ends the session and hands back everything captured, emptying the recorder.
    pub fn stop(&mut self) -> Vec<Sample> {
        self.recording = false;
        let samples = std::mem::take(&mut self.samples);
        info!("recording stopped with {} samples", samples.len());
        samples
    }
    /// Drops what was captured so far; an active session keeps recording.
    pub fn discard(&mut self) {
        self.samples.clear();
    }
    pub fn record(&mut self, sample: &Sample) {
        if self.recording {
            self.samples.push(sample.clone());
        }
    }
    pub fn is_recording(&self) -> bool {
        self.recording
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
/// Serialized CSV export, ready to be written out.
#[derive(Clone, Debug, PartialEq)]
pub struct CsvDocument {
    pub text: String,
    pub rows: usize,
}
impl CsvDocument {
    /// Header-only documents have no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GrapherError> {
        let path = path.as_ref();
        fs::write(path, &self.text)?;
        info!("saved {} rows to {}", self.rows, path.display());
        Ok(())
    }
}
/// `Timestamp,<names>` header, then one row per sample with the synthetic
/// timestamp `index / data_rate`. Every number is written with 3 decimals.
pub fn write_csv(samples: &[Sample], names: &[String], data_rate: f64) -> CsvDocument {
    let rate = if data_rate.is_finite() && data_rate > 0.0 {
        data_rate
    } else {
        1.0
    };
    let mut text = String::from("Timestamp");
    for name in names {
        text.push(',');
        push_header_field(&mut text, name);
    }
    text.push('\n');
    for (idx, sample) in samples.iter().enumerate() {
        // writing into a String cannot fail
        let _ = write!(text, "{:.3}", idx as f64 / rate);
        for value in sample.values() {
            let _ = write!(text, ",{value:.3}");
        }
        text.push('\n');
    }
    CsvDocument {
        text,
        rows: samples.len(),
    }
}
/// Quotes a header field that would otherwise break the column layout.
pub(crate) fn push_header_field(text: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        text.push('"');
        text.push_str(&field.replace('"', "\"\""));
        text.push('"');
    } else {
        text.push_str(field);
    }
}
/// Splits a header line written by [`write_csv`], honouring quoted fields.
pub(crate) fn split_header(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => quoted = false,
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            (',', false) => fields.push(std::mem::take(&mut field).trim().to_owned()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_owned());
    fields
}
/// Trims the name, falls back to the default and ensures a `.csv` suffix.
pub fn normalize_output_filename(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        return DEFAULT_OUTPUT_FILENAME.to_owned();
    }
    if name.to_ascii_lowercase().ends_with(".csv") {
        name.to_owned()
    } else {
        format!("{name}.csv")
    }
}
/// Default name for a save of the live buffer.
pub fn live_snapshot_filename() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("live_graph_{timestamp}.csv")
}
#[cfg(test)]
mod tests {
    use super::*;
    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }
    #[test]
    fn csv_layout_matches_export_format() {
        let samples = vec![
            Sample::new(vec![1.0, 2.0, 3.0]),
            Sample::new(vec![4.0, 5.0, 6.0]),
        ];
        let doc = write_csv(&samples, &names(&["A", "B", "C"]), 2.0);
        assert_eq!(
            doc.text,
            "Timestamp,A,B,C\n0.000,1.000,2.000,3.000\n0.500,4.000,5.000,6.000\n"
        );
        assert_eq!(doc.rows, 2);
    }
    #[test]
    fn header_names_with_separators_are_quoted() {
        let doc = write_csv(
            &[Sample::new(vec![1.0, 2.0, 3.0])],
            &names(&["Temp, C", "say \"hi\"", "Plain"]),
            1.0,
        );
        let header = doc.text.lines().next().unwrap();
        assert_eq!(header, "Timestamp,\"Temp, C\",\"say \"\"hi\"\"\",Plain");
        assert_eq!(doc.text.lines().nth(1).unwrap(), "0.000,1.000,2.000,3.000");
    }
    #[test]
    fn quoted_header_splits_back_into_names() {
        let doc = write_csv(&[], &names(&["Temp, C", "say \"hi\"", "Plain"]), 1.0);
        let header = doc.text.lines().next().unwrap();
        assert_eq!(
            split_header(header),
            vec!["Timestamp", "Temp, C", "say \"hi\"", "Plain"]
        );
        assert_eq!(split_header("a, b ,c"), vec!["a", "b", "c"]);
    }
    #[test]
    fn empty_export_is_header_only() {
        let doc = write_csv(&[], &names(&["A"]), 24.0);
        assert_eq!(doc.text, "Timestamp,A\n");
        assert!(doc.is_empty());
    }
    #[test]
    fn invalid_rate_falls_back_to_one() {
        let samples = vec![Sample::new(vec![0.5]), Sample::new(vec![-1.25])];
        for rate in [0.0, -3.0, f64::NAN] {
            let doc = write_csv(&samples, &names(&["X"]), rate);
            assert_eq!(doc.text, "Timestamp,X\n0.000,0.500\n1.000,-1.250\n");
        }
    }
    #[test]
    fn recorder_only_captures_while_active() {
        let mut recorder = Recorder::new();
        recorder.record(&Sample::new(vec![1.0]));
        assert!(recorder.is_empty());
        recorder.start();
        recorder.record(&Sample::new(vec![2.0]));
        recorder.record(&Sample::new(vec![3.0]));
        let captured = recorder.stop();
        assert_eq!(captured.len(), 2);
        assert!(!recorder.is_recording());
        assert!(recorder.is_empty());
    }
    #[test]
    fn discard_keeps_session_active() {
        let mut recorder = Recorder::new();
        recorder.start();
        recorder.record(&Sample::new(vec![1.0]));
        recorder.discard();
        assert!(recorder.is_recording());
        assert!(recorder.is_empty());
        recorder.record(&Sample::new(vec![2.0]));
        assert_eq!(recorder.stop(), vec![Sample::new(vec![2.0])]);
    }
    #[test]
    fn output_filename_policy() {
        assert_eq!(normalize_output_filename("  "), "graph_data.csv");
        assert_eq!(normalize_output_filename(" run1 "), "run1.csv");
        assert_eq!(normalize_output_filename("RUN.CSV"), "RUN.CSV");
        assert!(live_snapshot_filename().starts_with("live_graph_"));
    }
    #[test]
    fn document_saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let doc = write_csv(&[Sample::new(vec![7.0])], &names(&["A"]), 1.0);
        doc.save(&path).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "Timestamp,A\n0.000,7.000\n");
    }
}
