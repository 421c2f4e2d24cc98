// Peak range expansion
// Widens point peaks into inclusive index ranges used to classify window centers

use serde::{Deserialize, Serialize};

/// Inclusive index range `[left, right]` around a peak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakRange {
    pub left: usize,
    pub right: usize,
}

impl PeakRange {
    pub fn contains(&self, idx: usize) -> bool {
        self.left <= idx && idx <= self.right
    }
}

/// Onset ranges for one stream
/// Overlapping ranges are kept as-is; membership checks every range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeakRanges {
    ranges: Vec<PeakRange>,
}

impl PeakRanges {
    /// Expand each peak `p` to `[p - radius, p + radius]`
    /// A peak whose range would leave `[0, len)` is dropped, not clipped.
    pub fn expand(peaks: &[usize], len: usize, radius: usize) -> Self {
        let ranges = peaks
            .iter()
            .filter_map(|&p| {
                let left = p.checked_sub(radius)?;
                let right = p.checked_add(radius)?;
                (right < len).then_some(PeakRange { left, right })
            })
            .collect();

        PeakRanges { ranges }
    }

    /// Whether `idx` falls inside any range, inclusive on both ends
    pub fn contains(&self, idx: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(idx))
    }

    pub fn as_slice(&self) -> &[PeakRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
