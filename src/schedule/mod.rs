//! Day/week schedule core: time parsing, overlap packing, block geometry,
//! swipe paging and the data feed behind the day body.

pub mod calendar;
pub mod carousel;
pub mod feed;
pub mod layout;
pub mod packer;
pub mod render;
pub mod time;

pub use calendar::{week_start, CalendarWindow, DayInfo, WeekInfo};
pub use carousel::{is_horizontal_swipe, CarouselPaginator, Direction, GestureState, PageTurn, PageUnit};
pub use feed::{FeedState, FeedStatus, ScheduleFeed};
pub use layout::{DayLayout, PlacedJob};
pub use packer::{pack, LayoutSlot};
pub use render::{BlockGeometry, RenderMapper};
pub use time::{compute_duration, parse_interval, parse_time_of_day, ParsedInterval, ParsedTime, TimeGrid};
