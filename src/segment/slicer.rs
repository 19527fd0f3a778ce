//! Threshold slicing of an energy envelope.
//!
//! A single scan finds the regions at or above the threshold, each region is
//! then widened outward along the strictly decreasing slopes on either side so
//! quiet attacks and decays are kept with the loud part.

use super::Interval;

/// Coarse intervals, boundary refinement and width filtering in one call.
///
/// Returns intervals sorted by `left`, none overlapping, each with
/// `min_len <= width <= max_len`.
pub fn slice(envelope: &[f32], threshold: f32, min_len: usize, max_len: usize) -> Vec<Interval> {
    let coarse = coarse_intervals(envelope, threshold);
    let refined: Vec<Interval> = coarse
        .iter()
        .map(|interval| refine(envelope, *interval))
        .filter(|interval| (min_len..=max_len).contains(&interval.width()))
        .collect();

    log::debug!(
        "Slicer: {} crossings, {} within {}..={} frames",
        coarse.len(),
        refined.len(),
        min_len,
        max_len
    );

    refined
}

/// Linear scan for threshold crossings.
///
/// A rising crossing (`prev < threshold <= value`) opens an interval, a falling
/// crossing (`prev >= threshold > value`) closes it. The frame before the
/// first one counts as quiet, and an interval still open at the end is closed
/// on the last frame. Regions touching either edge are kept, not dropped.
pub fn coarse_intervals(envelope: &[f32], threshold: f32) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut open: Option<usize> = None;
    let mut prev_loud = false;

    for (i, &value) in envelope.iter().enumerate() {
        let loud = value >= threshold;
        if loud && !prev_loud {
            open = Some(i);
        } else if !loud && prev_loud {
            if let Some(left) = open.take() {
                if i > left {
                    intervals.push(Interval::new(left, i));
                }
            }
        }
        prev_loud = loud;
    }

    if let Some(left) = open {
        let last = envelope.len().saturating_sub(1);
        if last > left {
            intervals.push(Interval::new(left, last));
        }
    }

    intervals
}

/// Widen an interval while the envelope keeps strictly falling away from it.
///
/// An equal or higher neighbour stops the extension, so refining an already
/// refined interval returns it unchanged.
pub fn refine(envelope: &[f32], interval: Interval) -> Interval {
    if envelope.is_empty() {
        return interval;
    }
    let max_index = envelope.len() - 1;

    let mut left = interval.left.min(max_index);
    while left > 0 && envelope[left - 1] < envelope[left] {
        left -= 1;
    }

    let mut right = interval.right.min(max_index);
    while right < max_index && envelope[right + 1] < envelope[right] {
        right += 1;
    }

    Interval::new(left, right)
}
