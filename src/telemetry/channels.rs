use crate::telemetry::error::GrapherError;
/// Palette for the first channels, cycled past its end.
const PALETTE: [[u8; 3]; 13] = [
    [0x67, 0xd8, 0xef],
    [0xd0, 0x26, 0x62],
    [0x61, 0xaf, 0xef],
    [0xe0, 0x5c, 0x7e],
    [0x98, 0xc3, 0x79],
    [0xe5, 0xc0, 0x7b],
    [0xc6, 0x78, 0xdd],
    [0x56, 0xb6, 0xc2],
    [0xff, 0x6b, 0x6b],
    [0x4e, 0xcd, 0xc4],
    [0x45, 0xb7, 0xd1],
    [0x96, 0xce, 0xb4],
    [0xfe, 0xca, 0x57],
];
/// Channels kept on screen by [`ChannelSet::toggle_hidden`].
const PRIMARY_CHANNELS: usize = 4;
/// Values below this magnitude count as "empty" for [`ChannelSet::toggle_empty`].
const EMPTY_THRESHOLD: f64 = 1.0;
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelInfo {
    pub name: String,
    pub color: [u8; 3],
    pub visible: bool,
}
impl ChannelInfo {
    fn default_for(index: usize) -> Self {
        Self {
            name: format!("Signal-{}", index + 1),
            color: PALETTE[index % PALETTE.len()],
            visible: true,
        }
    }
}
#[derive(Clone, Debug)]
pub struct ChannelSet {
    channels: Vec<ChannelInfo>,
    split: SplitChannels,
}
impl ChannelSet {
    pub fn new(count: usize) -> Self {
        Self {
            channels: (0..count).map(ChannelInfo::default_for).collect(),
            split: SplitChannels::default(),
        }
    }
    /// Keeps existing names/colors/visibility for surviving indices.
    pub fn resize(&mut self, count: usize) {
        let start = self.channels.len();
        self.channels.truncate(count);
        self.channels
            .extend((start..count).map(ChannelInfo::default_for));
    }
    pub fn len(&self) -> usize {
        self.channels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
    pub fn get(&self, index: usize) -> Option<&ChannelInfo> {
        self.channels.get(index)
    }
    pub fn iter(&self) -> impl Iterator<Item = &ChannelInfo> {
        self.channels.iter()
    }
    pub fn names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }
    pub fn visibility(&self) -> Vec<bool> {
        self.channels.iter().map(|c| c.visible).collect()
    }
    pub fn colors(&self) -> Vec<[u8; 3]> {
        self.channels.iter().map(|c| c.color).collect()
    }
    pub fn rename(&mut self, index: usize, name: impl Into<String>) {
        if let Some(ch) = self.channels.get_mut(index) {
            ch.name = name.into();
        }
    }
    pub fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(ch) = self.channels.get_mut(index) {
            ch.visible = visible;
        }
    }
    pub fn toggle(&mut self, index: usize) {
        if let Some(ch) = self.channels.get_mut(index) {
            ch.visible = !ch.visible;
        }
    }
    pub fn split(&self) -> &SplitChannels {
        &self.split
    }
    pub fn split_mut(&mut self) -> &mut SplitChannels {
        &mut self.split
    }
    /// Shows everything if anything is hidden, otherwise hides all but the
    /// primary channels.
    pub fn toggle_hidden(&mut self) {
        let any_hidden = self.channels.iter().any(|c| !c.visible);
        for (idx, ch) in self.channels.iter_mut().enumerate() {
            ch.visible = any_hidden || idx < PRIMARY_CHANNELS;
        }
    }
    /// Flips visibility of every channel whose current value is near zero.
    pub fn toggle_empty(&mut self, latest: &[f64]) {
        for (ch, value) in self.channels.iter_mut().zip(latest) {
            if value.abs() < EMPTY_THRESHOLD {
                ch.visible = !ch.visible;
            }
        }
    }
}
/// Highest channel number a split entry may name, and the list capacity.
pub const MAX_SPLIT_CHANNEL: usize = PALETTE.len();
/// 1-based channel numbers picked out for a separate graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitChannels {
    entries: Vec<usize>,
}
impl Default for SplitChannels {
    fn default() -> Self {
        Self {
            entries: vec![1, 2, 3, 4],
        }
    }
}
impl SplitChannels {
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn contains(&self, channel: usize) -> bool {
        self.entries.contains(&channel)
    }
    /// Appends a channel number; duplicates and a full list are rejected.
    pub fn add(&mut self, channel: usize) -> Result<(), GrapherError> {
        check_split_channel(channel)?;
        if self.entries.len() >= MAX_SPLIT_CHANNEL {
            return Err(GrapherError::SplitListFull);
        }
        if self.contains(channel) {
            return Err(GrapherError::DuplicateSplitChannel(channel));
        }
        self.entries.push(channel);
        Ok(())
    }
    /// Replaces the entry at `index`. Out-of-range indices are ignored.
    pub fn edit(&mut self, index: usize, channel: usize) -> Result<(), GrapherError> {
        check_split_channel(channel)?;
        if self
            .entries
            .iter()
            .enumerate()
            .any(|(i, c)| i != index && *c == channel)
        {
            return Err(GrapherError::DuplicateSplitChannel(channel));
        }
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = channel;
        }
        Ok(())
    }
    pub fn remove(&mut self, index: usize) -> Option<usize> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }
    /// Smallest channel number not yet listed, offered as the next entry.
    pub fn next_free(&self) -> Option<usize> {
        if self.entries.len() >= MAX_SPLIT_CHANNEL {
            return None;
        }
        (1..=MAX_SPLIT_CHANNEL).find(|c| !self.contains(*c))
    }
}
fn check_split_channel(channel: usize) -> Result<(), GrapherError> {
    if (1..=MAX_SPLIT_CHANNEL).contains(&channel) {
        Ok(())
    } else {
        Err(GrapherError::InvalidSplitChannel(channel))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn default_names_and_colors() {
        let set = ChannelSet::new(13);
        assert_eq!(set.get(0).unwrap().name, "Signal-1");
        assert_eq!(set.get(12).unwrap().name, "Signal-13");
        assert_eq!(set.get(12).unwrap().color, [0xfe, 0xca, 0x57]);
        assert!(set.visibility().iter().all(|v| *v));
    }
    #[test]
    fn toggle_hidden_alternates() {
        let mut set = ChannelSet::new(6);
        set.toggle_hidden();
        assert_eq!(set.visibility(), vec![true, true, true, true, false, false]);
        set.toggle_hidden();
        assert!(set.visibility().iter().all(|v| *v));
    }
    #[test]
    fn toggle_empty_flips_quiet_channels() {
        let mut set = ChannelSet::new(3);
        set.toggle_empty(&[0.2, 50.0, -0.9]);
        assert_eq!(set.visibility(), vec![false, true, false]);
    }
    #[test]
    fn resize_keeps_existing_settings() {
        let mut set = ChannelSet::new(2);
        set.rename(0, "Temp");
        set.toggle(1);
        set.resize(4);
        assert_eq!(set.names(), vec!["Temp", "Signal-2", "Signal-3", "Signal-4"]);
        assert_eq!(set.visibility(), vec![true, false, true, true]);
        set.split_mut().add(9).unwrap();
        set.resize(1);
        assert_eq!(set.len(), 1);
        assert!(set.split().contains(9));
    }
    #[test]
    fn split_list_starts_with_first_four() {
        let split = SplitChannels::default();
        assert_eq!(split.entries(), &[1, 2, 3, 4]);
        assert_eq!(split.next_free(), Some(5));
    }
    #[test]
    fn split_add_rejects_range_and_duplicates() {
        let mut split = SplitChannels::default();
        assert!(matches!(split.add(0), Err(GrapherError::InvalidSplitChannel(0))));
        assert!(matches!(split.add(14), Err(GrapherError::InvalidSplitChannel(14))));
        assert!(matches!(split.add(3), Err(GrapherError::DuplicateSplitChannel(3))));
        split.add(13).unwrap();
        assert_eq!(split.entries(), &[1, 2, 3, 4, 13]);
        for channel in 5..=12 {
            split.add(channel).unwrap();
        }
        assert_eq!(split.len(), MAX_SPLIT_CHANNEL);
        assert!(matches!(split.add(7), Err(GrapherError::SplitListFull)));
        assert_eq!(split.next_free(), None);
    }
    #[test]
    fn split_edit_and_remove() {
        let mut split = SplitChannels::default();
        split.edit(1, 9).unwrap();
        assert_eq!(split.entries(), &[1, 9, 3, 4]);
        // re-saving an entry with its own value is fine
        split.edit(1, 9).unwrap();
        assert!(matches!(split.edit(0, 3), Err(GrapherError::DuplicateSplitChannel(3))));
        assert!(split.edit(0, 20).unwrap_err().is_configuration());
        assert_eq!(split.remove(0), Some(1));
        assert_eq!(split.remove(10), None);
        assert_eq!(split.entries(), &[9, 3, 4]);
        assert_eq!(split.next_free(), Some(1));
    }
}
