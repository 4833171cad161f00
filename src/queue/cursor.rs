/// A structural change to the queue, described by the indices it touched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueueOp {
    /// One or more tracks appended at the end.
    Append,
    /// The track at `index` was removed.
    Remove { index: usize },
    /// Everything removed.
    Clear,
    /// The track at `from` now sits at `to`.
    Move { from: usize, to: usize },
}

/// Where the cursor points after `op`, given where it pointed before and the
/// queue length afterwards.
///
/// Keeps the same logical track current wherever possible. Removing the
/// current track leaves the index alone, so the following track slides into
/// the current slot; it is clamped only when the removed track was the last.
pub fn repair_cursor(cursor: Option<usize>, op: QueueOp, len_after: usize) -> Option<usize> {
    if len_after == 0 {
        return None;
    }

    let repaired = match (op, cursor) {
        (QueueOp::Clear, _) => None,
        (QueueOp::Append, None) => Some(0),
        (QueueOp::Append, Some(c)) => Some(c),
        (_, None) => None,
        (QueueOp::Remove { index }, Some(c)) => {
            if index < c {
                Some(c - 1)
            } else {
                Some(c)
            }
        }
        (QueueOp::Move { from, to }, Some(c)) => {
            if from == c {
                Some(to)
            } else if from < c && to >= c {
                Some(c - 1)
            } else if from > c && to <= c {
                Some(c + 1)
            } else {
                Some(c)
            }
        }
    };

    repaired.map(|c| c.min(len_after - 1))
}
