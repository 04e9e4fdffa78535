/// Reassembles newline-terminated text lines from arbitrarily split chunks.
///
/// The unterminated tail is held back as raw bytes, so a multi-byte UTF-8
/// character split across two chunks still decodes correctly once the line
/// is complete.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
}
impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }
    /// Appends `chunk` and returns every line completed by it.
    ///
    /// Lines come out trimmed, empty lines are skipped. Bytes after the last
    /// newline stay pending until a later chunk terminates them.
    pub fn feed(&mut self, chunk: &[u8]) -> CompleteLines {
        self.pending.extend_from_slice(chunk);
        let ready = match self.pending.iter().rposition(|&b| b == b'\n') {
            Some(last_newline) => {
                let tail = self.pending.split_off(last_newline + 1);
                std::mem::replace(&mut self.pending, tail)
            }
            None => Vec::new(),
        };
        CompleteLines { ready, cursor: 0 }
    }
    pub fn feed_str(&mut self, chunk: &str) -> CompleteLines {
        self.feed(chunk.as_bytes())
    }
    /// Hands out the unterminated tail as a final line, if it holds any text.
    pub fn flush(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.pending);
        let line = String::from_utf8_lossy(&tail).trim().to_string();
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
    /// Drops the held fragment without emitting it.
    pub fn discard(&mut self) {
        self.pending.clear();
    }
}
/// Lazy iterator over the lines completed by one [`LineAssembler::feed`] call.
#[derive(Debug)]
pub struct CompleteLines {
    ready: Vec<u8>,
    cursor: usize,
}
impl Iterator for CompleteLines {
    type Item = String;
    fn next(&mut self) -> Option<String> {
        while self.cursor < self.ready.len() {
            let rest = &self.ready[self.cursor..];
            let end = rest
                .iter()
                .position(|&b| b == b'\n')
                .unwrap_or(rest.len());
            self.cursor += end + 1;
            let line = String::from_utf8_lossy(&rest[..end]);
            let line = line.trim();
            if !line.is_empty() {
                return Some(line.to_string());
            }
        }
        None
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn feed_all(assembler: &mut LineAssembler, chunks: &[&str]) -> Vec<String> {
        chunks
            .iter()
            .flat_map(|c| assembler.feed_str(c).collect::<Vec<_>>())
            .collect()
    }
    #[test]
    fn line_is_independent_of_split_points() {
        let text = "12,34,56\n";
        for first in 0..=text.len() {
            for second in first..=text.len() {
                let mut assembler = LineAssembler::new();
                let lines = feed_all(
                    &mut assembler,
                    &[&text[..first], &text[first..second], &text[second..]],
                );
                assert_eq!(lines, vec!["12,34,56".to_string()], "split {first}/{second}");
                assert_eq!(assembler.pending_len(), 0);
            }
        }
    }
    #[test]
    fn holds_unterminated_tail() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.feed_str("1,2").count(), 0);
        assert_eq!(assembler.pending_len(), 3);
        let lines: Vec<_> = assembler.feed_str(",3\n4").collect();
        assert_eq!(lines, vec!["1,2,3"]);
        assert_eq!(assembler.pending_len(), 1);
    }
    #[test]
    fn trims_and_skips_blank_lines() {
        let mut assembler = LineAssembler::new();
        let lines: Vec<_> = assembler.feed_str("  7,8 \r\n\n\r\n 9\n").collect();
        assert_eq!(lines, vec!["7,8", "9"]);
    }
    #[test]
    fn multibyte_character_split_across_chunks() {
        let bytes = "µV,1\n".as_bytes();
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.feed(&bytes[..1]).count(), 0);
        let lines: Vec<_> = assembler.feed(&bytes[1..]).collect();
        assert_eq!(lines, vec!["µV,1"]);
    }
    #[test]
    fn flush_returns_tail_once() {
        let mut assembler = LineAssembler::new();
        assert_eq!(assembler.feed_str("5,6").count(), 0);
        assert_eq!(assembler.flush().as_deref(), Some("5,6"));
        assert_eq!(assembler.flush(), None);
    }
    #[test]
    fn discard_drops_fragment() {
        let mut assembler = LineAssembler::new();
        let _ = assembler.feed_str("partial");
        assembler.discard();
        let lines: Vec<_> = assembler.feed_str(",1\n").collect();
        assert_eq!(lines, vec![",1"]);
    }
}
