//! Swipe paging for the week strip and the day body.
//!
//! A drag translates a three-panel strip (previous/current/next). On release
//! the paginator either commits, animating a full panel width before the
//! caller swaps in the new date, or rolls back to the resting position.

use std::time::{Duration, Instant};

use tracing::{debug, info};

/// How long the settle animation runs before the page swap happens
pub const SETTLE_DURATION: Duration = Duration::from_millis(300);

/// Fraction of the container width a drag must exceed to commit
pub const COMMIT_THRESHOLD: f32 = 0.2;

/// Whether the motion so far reads as a page swipe rather than a vertical
/// scroll. Ties go to the swipe.
pub fn is_horizontal_swipe(dx: f32, dy: f32) -> bool {
    dx.abs() >= dy.abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageUnit {
    Week,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Dragged left, revealing the next page
    Forward,
    /// Dragged right, revealing the previous page
    Backward,
}

/// A committed navigation the caller applies to its calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTurn {
    pub unit: PageUnit,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        anchor_x: f32,
    },
    Settling {
        target_offset: f32,
        /// `None` for a rollback
        direction: Option<Direction>,
        started_at: Instant,
    },
}

#[derive(Debug, Clone)]
pub struct CarouselPaginator {
    unit: PageUnit,
    state: GestureState,
    offset: f32,
    // set for the single frame after a commit so the reset does not animate
    suppress_transition: bool,
}

impl CarouselPaginator {
    pub fn new(unit: PageUnit) -> Self {
        Self {
            unit,
            state: GestureState::Idle,
            offset: 0.0,
            suppress_transition: false,
        }
    }

    pub fn unit(&self) -> PageUnit {
        self.unit
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Signed drag offset in pixels, 0 when idle
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_settling(&self) -> bool {
        matches!(self.state, GestureState::Settling { .. })
    }

    /// Start tracking a drag. Ignored while a previous gesture is settling.
    pub fn touch_start(&mut self, x: f32) -> bool {
        match self.state {
            GestureState::Settling { .. } => {
                debug!(unit = ?self.unit, "touch ignored while settling");
                false
            }
            GestureState::Idle | GestureState::Dragging { .. } => {
                self.state = GestureState::Dragging { anchor_x: x };
                self.offset = 0.0;
                self.suppress_transition = false;
                true
            }
        }
    }

    pub fn touch_move(&mut self, x: f32) {
        if let GestureState::Dragging { anchor_x } = self.state {
            self.offset = x - anchor_x;
        }
    }

    /// Finish the drag and decide between commit and rollback
    pub fn touch_end(&mut self, container_width: f32, now: Instant) {
        if !matches!(self.state, GestureState::Dragging { .. }) {
            return;
        }

        let threshold = container_width * COMMIT_THRESHOLD;
        let (target_offset, direction) = if self.offset.abs() > threshold {
            if self.offset < 0.0 {
                (-container_width, Some(Direction::Forward))
            } else {
                (container_width, Some(Direction::Backward))
            }
        } else {
            (0.0, None)
        };

        debug!(
            unit = ?self.unit,
            offset = self.offset,
            threshold,
            commit = direction.is_some(),
            "drag released"
        );

        self.offset = target_offset;
        self.state = GestureState::Settling {
            target_offset,
            direction,
            started_at: now,
        };
    }

    /// Abandon the drag, animating back to rest
    pub fn touch_cancel(&mut self, now: Instant) {
        if matches!(self.state, GestureState::Dragging { .. }) {
            self.offset = 0.0;
            self.state = GestureState::Settling {
                target_offset: 0.0,
                direction: None,
                started_at: now,
            };
        }
    }

    /// Advance time. Returns the committed turn once the settle animation has
    /// run for [`SETTLE_DURATION`].
    pub fn poll(&mut self, now: Instant) -> Option<PageTurn> {
        match self.state {
            GestureState::Settling { started_at, .. }
                if now.saturating_duration_since(started_at) >= SETTLE_DURATION =>
            {
                self.finish_settle()
            }
            _ => {
                // the reset frame has been rendered
                if matches!(self.state, GestureState::Idle) {
                    self.suppress_transition = false;
                }
                None
            }
        }
    }

    /// Complete the settle animation immediately
    pub fn finish_settle(&mut self) -> Option<PageTurn> {
        let GestureState::Settling { direction, .. } = self.state else {
            return None;
        };

        self.state = GestureState::Idle;
        self.offset = 0.0;

        let direction = direction?;
        self.suppress_transition = true;
        let turn = PageTurn { unit: self.unit, direction };
        info!(unit = ?turn.unit, direction = ?turn.direction, "page turn committed");
        Some(turn)
    }

    /// Whether offset changes should be eased (false while the finger is down
    /// and on the frame the strip snaps back after a committed turn)
    pub fn animates(&self) -> bool {
        !matches!(self.state, GestureState::Dragging { .. }) && !self.suppress_transition
    }

    /// Horizontal translation of the three-panel strip: one panel to the left
    /// so the current panel is visible, plus the drag offset.
    pub fn strip_translation(&self, panel_width: f32) -> f32 {
        -panel_width + self.offset
    }

    /// Time left on the settle animation, for scheduling a repaint
    pub fn settle_remaining(&self, now: Instant) -> Option<Duration> {
        match self.state {
            GestureState::Settling { started_at, .. } => {
                Some(SETTLE_DURATION.saturating_sub(now.saturating_duration_since(started_at)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 400.0;

    fn swipe(pager: &mut CarouselPaginator, dx: f32, now: Instant) {
        assert!(pager.touch_start(200.0));
        pager.touch_move(200.0 + dx / 2.0);
        pager.touch_move(200.0 + dx);
        pager.touch_end(WIDTH, now);
    }

    #[test]
    fn drag_tracks_raw_delta() {
        let mut pager = CarouselPaginator::new(PageUnit::Week);
        pager.touch_start(100.0);
        pager.touch_move(40.0);
        assert_eq!(pager.offset(), -60.0);
        pager.touch_move(900.0);
        assert_eq!(pager.offset(), 800.0);
        assert!(!pager.animates());
        assert_eq!(pager.strip_translation(WIDTH), 400.0);
    }

    #[test]
    fn below_threshold_rolls_back() {
        let now = Instant::now();
        let mut pager = CarouselPaginator::new(PageUnit::Day);
        swipe(&mut pager, -0.19 * WIDTH, now);
        assert_eq!(pager.offset(), 0.0);
        assert!(pager.is_settling());
        assert_eq!(pager.poll(now + SETTLE_DURATION), None);
        assert_eq!(pager.state(), GestureState::Idle);
    }

    #[test]
    fn above_threshold_commits_after_animation() {
        let now = Instant::now();
        let mut pager = CarouselPaginator::new(PageUnit::Day);
        swipe(&mut pager, -0.21 * WIDTH, now);
        assert_eq!(pager.offset(), -WIDTH);
        assert!(pager.animates());

        assert_eq!(pager.poll(now + Duration::from_millis(100)), None);
        assert!(pager.is_settling());

        let turn = pager.poll(now + SETTLE_DURATION);
        assert_eq!(
            turn,
            Some(PageTurn { unit: PageUnit::Day, direction: Direction::Forward })
        );
        assert_eq!(pager.offset(), 0.0);
        // the snap back to centre is not animated
        assert!(!pager.animates());
        assert_eq!(pager.poll(now + SETTLE_DURATION), None);
        assert!(pager.animates());
    }

    #[test]
    fn rightward_drag_goes_backward() {
        let now = Instant::now();
        let mut pager = CarouselPaginator::new(PageUnit::Week);
        swipe(&mut pager, 0.5 * WIDTH, now);
        assert_eq!(pager.offset(), WIDTH);
        assert_eq!(
            pager.finish_settle(),
            Some(PageTurn { unit: PageUnit::Week, direction: Direction::Backward })
        );
    }

    #[test]
    fn touches_during_settle_are_ignored() {
        let now = Instant::now();
        let mut pager = CarouselPaginator::new(PageUnit::Week);
        swipe(&mut pager, -0.5 * WIDTH, now);
        assert!(!pager.touch_start(10.0));
        pager.touch_move(300.0);
        assert_eq!(pager.offset(), -WIDTH);
        assert!(pager.poll(now + SETTLE_DURATION).is_some());
        assert!(pager.touch_start(10.0));
    }

    #[test]
    fn cancel_rolls_back() {
        let now = Instant::now();
        let mut pager = CarouselPaginator::new(PageUnit::Day);
        pager.touch_start(0.0);
        pager.touch_move(-300.0);
        pager.touch_cancel(now);
        assert_eq!(pager.offset(), 0.0);
        assert_eq!(pager.finish_settle(), None);
    }

    #[test]
    fn release_without_drag_is_a_no_op() {
        let mut pager = CarouselPaginator::new(PageUnit::Day);
        pager.touch_end(WIDTH, Instant::now());
        assert_eq!(pager.state(), GestureState::Idle);
        assert_eq!(pager.settle_remaining(Instant::now()), None);
    }

    #[test]
    fn mostly_vertical_motion_is_a_scroll() {
        assert!(is_horizontal_swipe(-30.0, 10.0));
        assert!(is_horizontal_swipe(12.0, -12.0));
        assert!(!is_horizontal_swipe(4.0, 25.0));
        assert!(!is_horizontal_swipe(-3.0, -8.0));
    }
}
