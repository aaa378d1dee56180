//! Column packing for overlapping jobs on a single day.
//!
//! Jobs are grouped into clusters of transitively overlapping intervals. Each
//! cluster is packed independently with a first-fit sweep, so a job's column
//! only depends on the other jobs in its own cluster.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::warn;

use super::time::{ParsedInterval, TimeGrid};

/// Where a job sits horizontally within its day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSlot {
    /// 0-based column index
    pub column: usize,
    /// Columns used by the job's cluster (always >= 1)
    pub total_columns: usize,
}

impl Default for LayoutSlot {
    fn default() -> Self {
        Self { column: 0, total_columns: 1 }
    }
}

fn by_start_then_id(a: &ParsedInterval, b: &ParsedInterval) -> Ordering {
    a.start
        .total_cmp(&b.start)
        .then_with(|| a.job_id.cmp(&b.job_id))
}

/// Split in-grid intervals into maximal overlap clusters, in start order.
pub fn clusters<'a>(intervals: &'a [ParsedInterval], grid: &TimeGrid) -> Vec<Vec<&'a ParsedInterval>> {
    let mut in_range: Vec<&ParsedInterval> = intervals
        .iter()
        .filter(|i| grid.contains(i.start))
        .collect();
    in_range.sort_by(|a, b| by_start_then_id(a, b));

    let mut clusters = Vec::new();
    let mut current: Vec<&ParsedInterval> = Vec::new();
    let mut cluster_end = f32::NEG_INFINITY;

    for interval in in_range {
        if current.is_empty() || interval.start < cluster_end {
            cluster_end = cluster_end.max(interval.end);
            current.push(interval);
        } else {
            clusters.push(std::mem::take(&mut current));
            cluster_end = interval.end;
            current.push(interval);
        }
    }
    if !current.is_empty() {
        clusters.push(current);
    }

    clusters
}

/// First-fit column assignment for one cluster. Returns the column of each
/// member (in cluster order) and the number of columns opened.
fn assign_columns(cluster: &[&ParsedInterval]) -> (Vec<usize>, usize) {
    // end time of the job currently occupying each open column
    let mut column_ends: Vec<f32> = Vec::new();
    let mut assigned = Vec::with_capacity(cluster.len());

    for interval in cluster {
        let column = match column_ends.iter().position(|&end| end <= interval.start) {
            Some(free) => {
                column_ends[free] = interval.end;
                free
            }
            None => {
                column_ends.push(interval.end);
                column_ends.len() - 1
            }
        };
        assigned.push(column);
    }

    (assigned, column_ends.len())
}

/// Assign a [`LayoutSlot`] to every job of a day.
///
/// Jobs starting outside `grid` are not drawn in the grid body and always get
/// the default `{ column: 0, total_columns: 1 }`.
pub fn pack(intervals: &[ParsedInterval], grid: &TimeGrid) -> HashMap<String, LayoutSlot> {
    let mut slots = HashMap::with_capacity(intervals.len());

    for interval in intervals.iter().filter(|i| !grid.contains(i.start)) {
        slots.insert(interval.job_id.clone(), LayoutSlot::default());
    }

    for cluster in clusters(intervals, grid) {
        let (columns, total_columns) = assign_columns(&cluster);
        for (interval, column) in cluster.iter().zip(columns) {
            let previous = slots.insert(
                interval.job_id.clone(),
                LayoutSlot { column, total_columns },
            );
            if previous.is_some() {
                warn!(job_id = %interval.job_id, "duplicate job id in day, later entry wins");
            }
        }
    }

    slots
}
