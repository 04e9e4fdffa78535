use crate::recorder::{push_header_field, split_header};
use crate::telemetry::buffer::Sample;
use crate::telemetry::error::GrapherError;
use crate::telemetry::parser::parse_sample;
use crate::telemetry::scale::ValueRange;
/// A previously recorded CSV file, loaded for static display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Sample>,
}
impl CsvTable {
    /// First non-empty line is the header; the first data row's width fixes
    /// the channel count for every row.
    pub fn parse(text: &str) -> Result<Self, GrapherError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines.next().ok_or(GrapherError::MissingHeader)?;
        let headers = split_header(header);
        let mut rows = Vec::new();
        let mut width = None;
        for line in lines {
            let channels = *width.get_or_insert_with(|| line.split(',').count());
            rows.push(parse_sample(line, channels));
        }
        Ok(Self { headers, rows })
    }
    pub fn channel_count(&self) -> usize {
        self.rows.first().map(Sample::len).unwrap_or(self.headers.len())
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// Header names lined up with the data columns.
    pub fn channel_names(&self) -> Vec<String> {
        (0..self.channel_count())
            .map(|i| {
                self.headers
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("Column {}", i + 1))
            })
            .collect()
    }
    /// Raw min/max over every value, widened when flat.
    pub fn value_range(&self) -> Option<ValueRange> {
        let mut values = self.rows.iter().flat_map(|r| r.values().iter().copied());
        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min == max {
            Some(ValueRange::new(min - 1.0, max + 1.0))
        } else {
            Some(ValueRange::new(min, max))
        }
    }
    /// Header plus rows joined with `,` and `\n`.
    pub fn to_csv(&self) -> String {
        let mut header = String::new();
        for (idx, name) in self.headers.iter().enumerate() {
            if idx > 0 {
                header.push(',');
            }
            push_header_field(&mut header, name);
        }
        let mut lines = vec![header];
        lines.extend(self.rows.iter().map(|row| {
            row.values()
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",")
        }));
        lines.join("\n")
    }
}
