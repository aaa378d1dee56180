//! One day's jobs, parsed, packed and positioned.

use crate::api::Job;

use super::packer::{pack, LayoutSlot};
use super::render::{BlockGeometry, RenderMapper};
use super::time::{parse_interval, ParsedInterval, TimeGrid};

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedJob {
    pub job: Job,
    pub interval: ParsedInterval,
    pub slot: LayoutSlot,
    pub block: BlockGeometry,
    /// false when the job starts outside the visible hours
    pub in_grid: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayLayout {
    pub placed: Vec<PlacedJob>,
}

impl DayLayout {
    /// Rebuild the whole layout for `jobs`; placement keeps the input order
    pub fn build(jobs: &[Job], grid: &TimeGrid, mapper: &RenderMapper) -> Self {
        let intervals: Vec<ParsedInterval> = jobs.iter().map(parse_interval).collect();
        let slots = pack(&intervals, grid);

        let placed = jobs
            .iter()
            .zip(intervals)
            .map(|(job, interval)| {
                let slot = slots.get(&job.id).copied().unwrap_or_default();
                let block = mapper.map(&interval, slot);
                PlacedJob {
                    job: job.clone(),
                    in_grid: grid.contains(interval.start),
                    interval,
                    slot,
                    block,
                }
            })
            .collect();

        Self { placed }
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn in_grid(&self) -> impl Iterator<Item = &PlacedJob> {
        self.placed.iter().filter(|p| p.in_grid)
    }

    pub fn outside_grid(&self) -> impl Iterator<Item = &PlacedJob> {
        self.placed.iter().filter(|p| !p.in_grid)
    }

    pub fn slot(&self, job_id: &str) -> Option<LayoutSlot> {
        self.placed.iter().find(|p| p.job.id == job_id).map(|p| p.slot)
    }

    /// Height of the day body: the hour rows, stretched so blocks starting
    /// near the last row still fit below it
    pub fn body_height(&self, grid: &TimeGrid, mapper: &RenderMapper) -> f32 {
        self.in_grid()
            .map(|p| p.block.top + p.block.height)
            .fold(mapper.grid_height(grid.rows), f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_grid_jobs_are_kept_but_separated() {
        let jobs = vec![
            Job::new("night", Some("11:30 PM"), Some("11:59 PM")),
            Job::new("day", Some("10:00 AM"), Some("12:00 PM")),
        ];
        let layout = DayLayout::build(&jobs, &TimeGrid::default(), &RenderMapper::default());

        assert_eq!(layout.placed.len(), 2);
        let outside: Vec<_> = layout.outside_grid().map(|p| p.job.id.as_str()).collect();
        assert_eq!(outside, vec!["night"]);
        assert_eq!(layout.in_grid().count(), 1);
        assert_eq!(layout.slot("night"), Some(LayoutSlot::default()));
    }

    #[test]
    fn unparsable_times_land_at_eight() {
        let jobs = vec![Job::new("tbd", Some("TBD"), None)];
        let layout = DayLayout::build(&jobs, &TimeGrid::default(), &RenderMapper::default());
        let placed = &layout.placed[0];
        assert!(placed.interval.start_defaulted);
        assert_eq!(placed.block.top, 120.0);
        assert_eq!(placed.block.height, 120.0);
    }

    #[test]
    fn empty_day() {
        let layout = DayLayout::build(&[], &TimeGrid::default(), &RenderMapper::default());
        assert!(layout.is_empty());
        assert_eq!(layout.body_height(&TimeGrid::default(), &RenderMapper::default()), 1020.0);
    }

    #[test]
    fn late_blocks_stretch_the_body() {
        let grid = TimeGrid::default();
        let mapper = RenderMapper::default();
        let jobs = vec![
            Job::new("eleven", Some("11:00 PM"), Some("11:45 PM")),
            Job::new("quarter_to", Some("10:45 PM"), Some("11:45 PM")),
            Job::new("evening", Some("7:00 PM"), Some("9:00 PM")),
        ];
        let layout = DayLayout::build(&jobs, &grid, &mapper);

        assert_eq!(layout.in_grid().count(), 3);
        assert_eq!(layout.outside_grid().count(), 0);

        let body = layout.body_height(&grid, &mapper);
        assert!(body > mapper.grid_height(grid.rows));
        for placed in layout.in_grid() {
            assert!(
                placed.block.top + placed.block.height <= body,
                "{} ends below the body",
                placed.job.id
            );
        }
        // 11:00 PM start with the half hour floor
        assert_eq!(body, 1020.0 + 45.0);
    }
}
