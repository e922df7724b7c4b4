use std::collections::BTreeSet;
use std::fmt::Display;

/// Inclusive run of contiguous block numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_single_block(&self) -> bool {
        self.start == self.end
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Merge block numbers into maximal ascending segments
pub fn extract<I: IntoIterator<Item = u64>>(blocks: I) -> Vec<Segment> {
    let sorted: BTreeSet<u64> = blocks.into_iter().collect();
    let mut segments: Vec<Segment> = Vec::new();
    for block in sorted {
        match segments.last_mut() {
            Some(last) if last.end.checked_add(1) == Some(block) => last.end = block,
            _ => segments.push(Segment {
                start: block,
                end: block,
            }),
        }
    }
    segments
}

/// Count segments, optionally ignoring ones made of a single block
pub fn count(segments: &[Segment], discard_single_block: bool) -> u64 {
    segments
        .iter()
        .filter(|segment| !(discard_single_block && segment.is_single_block()))
        .count() as u64
}
