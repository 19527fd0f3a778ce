//! Run-length segmentation of a thresholded envelope.
//!
//! Short quiet gaps are filled and short loud blips removed, with the two
//! length cut-offs picked by a grid search that makes the resulting run
//! lengths as uniform as possible.

use super::Interval;
use crate::stats::{linspace, std_dev};

pub const DEFAULT_GRID_SIZE: usize = 10;

/// A maximal run of equal values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub active: bool,
    pub len: usize,
}

pub fn split_runs(values: &[bool]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for &active in values {
        match runs.last_mut() {
            Some(run) if run.active == active => run.len += 1,
            _ => runs.push(Run { active, len: 1 }),
        }
    }
    runs
}

/// Flip every `search` run shorter than `min_len` and merge the neighbours it joins.
pub fn replace_short_runs(runs: &[Run], search: bool, min_len: f64) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        let active = if run.active == search && (run.len as f64) < min_len {
            !search
        } else {
            run.active
        };
        match merged.last_mut() {
            Some(last) if last.active == active => last.len += run.len,
            _ => merged.push(Run {
                active,
                len: run.len,
            }),
        }
    }
    merged
}

/// Grid search over (quiet, sound) cut-offs spanning `min_length..=max_length`.
///
/// Keeps the partition with the smallest run-length standard deviation among
/// those with more than one run; empty when no grid point qualifies.
pub fn optimal_runs(runs: &[Run], min_length: f64, max_length: f64, grid_size: usize) -> Vec<Run> {
    let grid = linspace(min_length, max_length, grid_size);
    let mut best: Option<(f64, Vec<Run>)> = None;

    for &quiet_thresh in &grid {
        let filled = replace_short_runs(runs, false, quiet_thresh);
        for &sound_thresh in &grid {
            let candidate = replace_short_runs(&filled, true, sound_thresh);
            if candidate.len() <= 1 {
                continue;
            }
            let lengths: Vec<f64> = candidate.iter().map(|r| r.len as f64).collect();
            let spread = std_dev(&lengths);
            if best.as_ref().map_or(true, |(best_spread, _)| spread < *best_spread) {
                log::trace!(
                    "Chunker: quiet={:.1} sound={:.1} -> {} runs, std={:.3}",
                    quiet_thresh,
                    sound_thresh,
                    candidate.len(),
                    spread
                );
                best = Some((spread, candidate));
            }
        }
    }

    best.map(|(_, runs)| runs).unwrap_or_default()
}

/// Active runs no wider than `max_length`, as frame intervals.
pub fn runs_to_intervals(runs: &[Run], max_length: usize) -> Vec<Interval> {
    let mut intervals = Vec::new();
    let mut position = 0;
    for run in runs {
        let next = position + run.len;
        if run.active && run.len <= max_length {
            intervals.push(Interval::new(position, next));
        }
        position = next;
    }
    intervals
}

pub fn optimal_intervals(
    active: &[bool],
    min_length: usize,
    max_length: usize,
    grid_size: usize,
) -> Vec<Interval> {
    let runs = split_runs(active);
    let best = optimal_runs(&runs, min_length as f64, max_length as f64, grid_size);
    let intervals = runs_to_intervals(&best, max_length);
    log::debug!(
        "Chunker: {} raw runs -> {} runs, {} intervals",
        runs.len(),
        best.len(),
        intervals.len()
    );
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(active: bool, len: usize) -> Run {
        Run { active, len }
    }

    fn expand(runs: &[Run]) -> Vec<bool> {
        runs.iter()
            .flat_map(|r| std::iter::repeat(r.active).take(r.len))
            .collect()
    }

    #[test]
    fn split_runs_groups_equal_values() {
        let values = [true, true, false, true, false, false];
        assert_eq!(
            split_runs(&values),
            vec![run(true, 2), run(false, 1), run(true, 1), run(false, 2)]
        );
        assert!(split_runs(&[]).is_empty());
    }

    #[test]
    fn replace_short_runs_merges_neighbours() {
        let runs = vec![run(true, 3), run(false, 1), run(true, 2), run(false, 5)];
        assert_eq!(
            replace_short_runs(&runs, false, 2.0),
            vec![run(true, 6), run(false, 5)]
        );
        // length equal to the cut-off is kept
        assert_eq!(replace_short_runs(&runs, true, 2.0), runs);
    }

    #[test]
    fn replacement_preserves_total_length() {
        let runs = vec![run(false, 4), run(true, 1), run(false, 2), run(true, 7)];
        let out = replace_short_runs(&runs, true, 3.0);
        assert_eq!(expand(&out).len(), expand(&runs).len());
        assert_eq!(out, vec![run(false, 7), run(true, 7)]);
    }

    #[test]
    fn grid_search_fills_short_gaps() {
        let active = expand(&[
            run(true, 2),
            run(false, 1),
            run(true, 2),
            run(false, 4),
            run(true, 2),
            run(false, 1),
            run(true, 2),
            run(false, 4),
        ]);
        let intervals = optimal_intervals(&active, 1, 5, 4);
        assert_eq!(intervals, vec![Interval::new(0, 5), Interval::new(9, 14)]);
    }

    #[test]
    fn already_uniform_runs_are_kept() {
        let active = expand(&[
            run(false, 3),
            run(true, 3),
            run(false, 3),
            run(true, 2),
            run(false, 3),
        ]);
        let intervals = optimal_intervals(&active, 1, 3, 3);
        assert_eq!(intervals, vec![Interval::new(3, 6), Interval::new(9, 11)]);
    }

    #[test]
    fn single_run_has_no_partition() {
        assert!(optimal_intervals(&[true; 12], 1, 5, 4).is_empty());
        assert!(optimal_intervals(&[], 1, 5, 4).is_empty());
    }

    #[test]
    fn wide_runs_are_not_intervals() {
        let runs = vec![run(false, 2), run(true, 6), run(false, 1), run(true, 3)];
        assert_eq!(runs_to_intervals(&runs, 4), vec![Interval::new(9, 12)]);
    }
}
