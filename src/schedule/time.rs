//! Time-of-day parsing and the visible hour grid.
//!
//! Job times arrive as display strings like `"2:30 PM"`. Anything that does not
//! parse falls back to a fixed hour so the grid always has something to draw;
//! callers can tell the two apart through [`ParsedTime`].

use tracing::debug;

use crate::api::Job;

/// Hour used when a time is missing or unreadable (8 AM)
pub const DEFAULT_HOUR: f32 = 8.0;

/// Duration used when either end of a job is missing
pub const DEFAULT_DURATION_HOURS: f32 = 2.0;

/// Shortest duration a job is given, so degenerate spans stay visible
pub const MIN_DURATION_HOURS: f32 = 0.5;

/// Result of parsing a time-of-day string
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedTime {
    /// Hour of day read from the text (13.5 = 1:30 PM)
    Parsed(f32),
    /// The text was missing or malformed; holds the fallback hour
    Defaulted(f32),
}

impl ParsedTime {
    pub fn hour(self) -> f32 {
        match self {
            ParsedTime::Parsed(h) | ParsedTime::Defaulted(h) => h,
        }
    }

    pub fn is_defaulted(self) -> bool {
        matches!(self, ParsedTime::Defaulted(_))
    }
}

/// Parse an `"H:MM AM/PM"` string into a fractional hour of day
pub fn parse_time_of_day(text: Option<&str>) -> ParsedTime {
    let Some(text) = text else {
        return ParsedTime::Defaulted(DEFAULT_HOUR);
    };

    match parse_meridiem_time(text) {
        Some(hour) => ParsedTime::Parsed(hour),
        None => {
            if !text.trim().is_empty() {
                debug!(input = text, "unparsable time of day, using default hour");
            }
            ParsedTime::Defaulted(DEFAULT_HOUR)
        }
    }
}

fn parse_meridiem_time(text: &str) -> Option<f32> {
    let input = text.trim().to_ascii_lowercase();

    let (time_part, is_pm) = if let Some(rest) = input.strip_suffix("pm") {
        (rest, true)
    } else if let Some(rest) = input.strip_suffix("am") {
        (rest, false)
    } else {
        return None;
    };

    let (hour, minute) = time_part.trim_end().split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.bytes().all(|b| b.is_ascii_digit()) || !minute.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 12 || minute > 59 {
        return None;
    }

    let hour_24 = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    Some(hour_24 as f32 + minute as f32 / 60.0)
}

/// Duration in hours between two time strings.
///
/// Falls back to [`DEFAULT_DURATION_HOURS`] when either side is missing or
/// malformed, and never returns less than [`MIN_DURATION_HOURS`].
pub fn compute_duration(start: Option<&str>, end: Option<&str>) -> f32 {
    let start = parse_time_of_day(start);
    let end = parse_time_of_day(end);
    duration_between(start, end)
}

fn duration_between(start: ParsedTime, end: ParsedTime) -> f32 {
    if start.is_defaulted() || end.is_defaulted() {
        return DEFAULT_DURATION_HOURS;
    }
    (end.hour() - start.hour()).max(MIN_DURATION_HOURS)
}

/// A job's time span on the day, in fractional hours
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInterval {
    pub job_id: String,
    pub start: f32,
    pub end: f32,
    pub start_defaulted: bool,
    pub end_defaulted: bool,
}

impl ParsedInterval {
    pub fn duration(&self) -> f32 {
        self.end - self.start
    }

    /// Half-open overlap test on `[start, end)`
    pub fn overlaps(&self, other: &ParsedInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub fn parse_interval(job: &Job) -> ParsedInterval {
    let start = parse_time_of_day(job.start_time.as_deref());
    let end = parse_time_of_day(job.end_time.as_deref());
    let duration = duration_between(start, end);

    ParsedInterval {
        job_id: job.id.clone(),
        start: start.hour(),
        end: start.hour() + duration,
        start_defaulted: start.is_defaulted(),
        end_defaulted: end.is_defaulted(),
    }
}

/// The fixed set of hour rows shown in the day body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    pub start_hour: u8,
    pub rows: u8,
}

impl Default for TimeGrid {
    fn default() -> Self {
        // 6 am through 10 pm
        Self { start_hour: 6, rows: 17 }
    }
}

impl TimeGrid {
    pub fn new(start_hour: u8, rows: u8) -> Self {
        let start_hour = start_hour.min(23);
        let rows = rows.clamp(1, 24 - start_hour);
        Self { start_hour, rows }
    }

    /// Hour at the bottom edge of the last row
    pub fn end_hour(&self) -> u8 {
        self.start_hour + self.rows
    }

    pub fn hours(&self) -> impl Iterator<Item = u8> {
        self.start_hour..self.end_hour()
    }

    /// Whether a job starting at `start` is drawn in the grid body
    pub fn contains(&self, start: f32) -> bool {
        start >= self.start_hour as f32 && start <= self.end_hour() as f32
    }

    pub fn hour_label(hour: u8) -> String {
        match hour {
            0 => "12 am".to_string(),
            12 => "12 pm".to_string(),
            h if h > 12 => format!("{} pm", h - 12),
            h => format!("{} am", h),
        }
    }
}
