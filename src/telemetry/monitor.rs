use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use log::info;
use crate::telemetry::error::GrapherError;
/// Lines kept by the terminal; the oldest go first.
pub const TERMINAL_CAPACITY: usize = 1000;
pub const DEFAULT_LOG_FILENAME: &str = "serial_log.txt";
pub const SENT_PREFIX: &str = "SENT: ";
pub const ERROR_PREFIX: &str = "ERROR: ";
pub const INFO_PREFIX: &str = "[info] ";
/// Substring highlighted with a colour wherever it shows up in a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTag {
    pub text: String,
    pub color: [u8; 3],
}
impl ColorTag {
    pub fn new(text: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}
/// Serial monitor terminal: every assembled line plus the local echo of
/// sent commands and transport errors.
#[derive(Clone, Debug)]
pub struct SerialMonitor {
    lines: VecDeque<String>,
    tags: Vec<ColorTag>,
    capacity: usize,
}
impl Default for SerialMonitor {
    fn default() -> Self {
        Self::with_capacity(TERMINAL_CAPACITY)
    }
}
impl SerialMonitor {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            tags: vec![
                ColorTag::new("SENT:", [0x67, 0xd8, 0xef]),
                ColorTag::new("[info]", [0x98, 0xc3, 0x79]),
                ColorTag::new("ERROR:", [0xd0, 0x26, 0x62]),
                ColorTag::new("DEBUG:", [0xe5, 0xc0, 0x7b]),
            ],
            capacity: capacity.max(1),
        }
    }
    /// A line read from the device. Blank lines are skipped.
    pub fn push_received(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() {
            self.push(line.to_owned());
        }
    }
    pub fn push_sent(&mut self, command: &str) {
        self.push(format!("{SENT_PREFIX}{}", command.trim()));
    }
    pub fn push_error(&mut self, message: &str) {
        self.push(format!("{ERROR_PREFIX}{message}"));
    }
    pub fn push_info(&mut self, message: &str) {
        self.push(format!("{INFO_PREFIX}{message}"));
    }
    fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
    pub fn len(&self) -> usize {
        self.lines.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
    pub fn clear(&mut self) {
        self.lines.clear();
    }
    pub fn tags(&self) -> &[ColorTag] {
        &self.tags
    }
    /// Blank tag text is refused.
    pub fn add_tag(&mut self, text: &str, color: [u8; 3]) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.tags.push(ColorTag::new(text, color));
        true
    }
    pub fn remove_tag(&mut self, index: usize) -> Option<ColorTag> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }
    /// Cuts a line into plain and tagged pieces, left to right. Where two
    /// tags start at the same place the earlier tag wins.
    pub fn spans<'a>(&self, line: &'a str) -> Vec<(&'a str, Option<[u8; 3]>)> {
        let mut spans = Vec::new();
        let mut rest = line;
        while !rest.is_empty() {
            let hit = self
                .tags
                .iter()
                .filter(|tag| !tag.text.is_empty())
                .filter_map(|tag| rest.find(tag.text.as_str()).map(|at| (at, tag)))
                .min_by_key(|(at, _)| *at);
            let Some((at, tag)) = hit else {
                spans.push((rest, None));
                break;
            };
            if at > 0 {
                spans.push((&rest[..at], None));
            }
            let end = at + tag.text.len();
            spans.push((&rest[at..end], Some(tag.color)));
            rest = &rest[end..];
        }
        spans
    }
    /// Terminal contents, one line each.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GrapherError> {
        let path = path.as_ref();
        fs::write(path, self.to_text())?;
        info!("saved {} terminal lines to {}", self.lines.len(), path.display());
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn keeps_the_newest_lines() {
        let mut monitor = SerialMonitor::with_capacity(3);
        for i in 0..5 {
            monitor.push_received(&i.to_string());
        }
        assert_eq!(monitor.lines().collect::<Vec<_>>(), vec!["2", "3", "4"]);
        assert_eq!(SerialMonitor::default().capacity, TERMINAL_CAPACITY);
    }
    #[test]
    fn echo_and_error_prefixes() {
        let mut monitor = SerialMonitor::default();
        monitor.push_received("   ");
        monitor.push_received(" 1,2,3 ");
        monitor.push_sent("start_logging\n");
        monitor.push_error("Serial read error - unplugged");
        monitor.push_info("Serial connection closed");
        assert_eq!(
            monitor.lines().collect::<Vec<_>>(),
            vec![
                "1,2,3",
                "SENT: start_logging",
                "ERROR: Serial read error - unplugged",
                "[info] Serial connection closed",
            ]
        );
        monitor.clear();
        assert!(monitor.is_empty());
    }
    #[test]
    fn tags_split_lines_into_coloured_spans() {
        let mut monitor = SerialMonitor::default();
        assert!(monitor.add_tag("temp", [1, 2, 3]));
        assert!(!monitor.add_tag("  ", [0, 0, 0]));
        let spans = monitor.spans("SENT: temp? temp");
        assert_eq!(
            spans,
            vec![
                ("SENT:", Some([0x67, 0xd8, 0xef])),
                (" ", None),
                ("temp", Some([1, 2, 3])),
                ("? ", None),
                ("temp", Some([1, 2, 3])),
            ]
        );
        assert_eq!(monitor.spans("1,2,3"), vec![("1,2,3", None)]);
        let removed = monitor.remove_tag(0).unwrap();
        assert_eq!(removed.text, "SENT:");
        assert_eq!(monitor.spans("SENT: x"), vec![("SENT: x", None)]);
        assert!(monitor.remove_tag(99).is_none());
    }
    #[test]
    fn log_saves_as_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_LOG_FILENAME);
        let mut monitor = SerialMonitor::default();
        monitor.push_received("10,20");
        monitor.push_sent("status");
        monitor.save(&path).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "10,20\nSENT: status\n");
    }
}
