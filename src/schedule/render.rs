//! Maps packed intervals to block geometry in the day body.

use super::packer::LayoutSlot;
use super::time::{ParsedInterval, MIN_DURATION_HOURS};

/// Position and size of a job block.
///
/// Horizontal values are split into a percentage of the container plus a pixel
/// offset, so blocks keep a fixed gap whatever the container width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockGeometry {
    pub top: f32,
    pub height: f32,
    pub left_percent: f32,
    pub left_offset_px: f32,
    pub width_percent: f32,
    pub width_offset_px: f32,
}

impl BlockGeometry {
    /// Resolve to `(x, width)` in pixels for a container of the given width
    pub fn resolve(&self, container_width: f32) -> (f32, f32) {
        let x = container_width * self.left_percent / 100.0 + self.left_offset_px;
        let width = container_width * self.width_percent / 100.0 + self.width_offset_px;
        (x, width.max(0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderMapper {
    pub px_per_hour: f32,
    pub min_block_height: f32,
    pub column_gap: f32,
    pub grid_start_hour: f32,
}

impl Default for RenderMapper {
    fn default() -> Self {
        Self::new(60.0, 6)
    }
}

impl RenderMapper {
    pub fn new(px_per_hour: f32, grid_start_hour: u8) -> Self {
        Self {
            px_per_hour,
            min_block_height: MIN_DURATION_HOURS * px_per_hour,
            column_gap: 2.0,
            grid_start_hour: grid_start_hour as f32,
        }
    }

    pub fn map(&self, interval: &ParsedInterval, slot: LayoutSlot) -> BlockGeometry {
        let columns = slot.total_columns.max(1) as f32;
        let column = slot.column as f32;
        let width_percent = 100.0 / columns;

        BlockGeometry {
            top: (interval.start - self.grid_start_hour) * self.px_per_hour,
            height: (interval.duration() * self.px_per_hour).max(self.min_block_height),
            left_percent: column * width_percent,
            left_offset_px: column * self.column_gap / columns,
            width_percent,
            width_offset_px: -self.column_gap * (columns - 1.0) / columns,
        }
    }

    /// Total height of a grid with `rows` hour rows
    pub fn grid_height(&self, rows: u8) -> f32 {
        rows as f32 * self.px_per_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: f32, end: f32) -> ParsedInterval {
        ParsedInterval {
            job_id: "j".into(),
            start,
            end,
            start_defaulted: false,
            end_defaulted: false,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn vertical_placement() {
        let mapper = RenderMapper::default();
        let block = mapper.map(&iv(9.5, 11.0), LayoutSlot::default());
        assert_eq!(block.top, 210.0);
        assert_eq!(block.height, 90.0);
    }

    #[test]
    fn short_jobs_keep_min_height() {
        let mapper = RenderMapper::default();
        let block = mapper.map(&iv(9.0, 9.1), LayoutSlot::default());
        assert_eq!(block.height, 30.0);
    }

    #[test]
    fn single_column_fills_container() {
        let mapper = RenderMapper::default();
        let block = mapper.map(&iv(9.0, 10.0), LayoutSlot::default());
        assert_eq!(block.resolve(300.0), (0.0, 300.0));
    }

    #[test]
    fn columns_are_separated_by_the_gap() {
        let mapper = RenderMapper::default();
        let width = 310.0;
        let total = 3;
        let rects: Vec<(f32, f32)> = (0..total)
            .map(|column| {
                mapper
                    .map(&iv(9.0, 10.0), LayoutSlot { column, total_columns: total })
                    .resolve(width)
            })
            .collect();

        assert!(approx(rects[0].0, 0.0));
        for pair in rects.windows(2) {
            let (x0, w0) = pair[0];
            let (x1, _) = pair[1];
            assert!(approx(x1 - (x0 + w0), mapper.column_gap));
        }
        let (last_x, last_w) = rects[2];
        assert!(approx(last_x + last_w, width));
        assert!(approx(rects[0].1, 102.0));
    }
}
