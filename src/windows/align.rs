// Stream alignment
// Maps a time interval onto the index space of an independently sampled stream

/// Leftmost index whose timestamp is `>= t`
/// Equals `timestamps.len()` when every timestamp is earlier than `t`.
pub fn search_sorted_left(timestamps: &[f64], t: f64) -> usize {
    timestamps.partition_point(|&ts| ts < t)
}

/// Translate `[t_start, t_end]` into `(i_start, i_end)` insertion points of a
/// second stream's ascending timestamps
pub fn align_interval(t_start: f64, t_end: f64, timestamps: &[f64]) -> (usize, usize) {
    (
        search_sorted_left(timestamps, t_start),
        search_sorted_left(timestamps, t_end),
    )
}
