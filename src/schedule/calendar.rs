//! The previous/current/next buffer behind the week strip and day body.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::carousel::{Direction, PageTurn, PageUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayInfo {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub day_number: u32,
    pub is_today: bool,
}

impl DayInfo {
    fn new(date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            date,
            day_name: day_name(date.weekday()),
            day_number: date.day(),
            is_today: date == today,
        }
    }
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

/// Sunday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Seven consecutive days, Sunday first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekInfo {
    pub days: [DayInfo; 7],
}

impl WeekInfo {
    pub fn containing(date: NaiveDate, today: NaiveDate) -> Self {
        let start = week_start(date);
        Self {
            days: std::array::from_fn(|i| DayInfo::new(start + Duration::days(i as i64), today)),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.days[0].date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        week_start(date) == self.start()
    }
}

/// Selected date plus the neighbouring weeks and days kept resident so a
/// swipe can reveal them without recomputing anything mid-gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWindow {
    /// previous, current and next week around `selected`
    pub weeks: [WeekInfo; 3],
    /// previous, current and next day around `selected`
    pub days: [NaiveDate; 3],
    selected: NaiveDate,
    today: NaiveDate,
}

impl CalendarWindow {
    pub fn new(selected: NaiveDate, today: NaiveDate) -> Self {
        Self {
            weeks: Self::three_weeks(selected, today),
            days: Self::three_days(selected),
            selected,
            today,
        }
    }

    fn three_weeks(center: NaiveDate, today: NaiveDate) -> [WeekInfo; 3] {
        [
            WeekInfo::containing(center - Duration::days(7), today),
            WeekInfo::containing(center, today),
            WeekInfo::containing(center + Duration::days(7), today),
        ]
    }

    fn three_days(center: NaiveDate) -> [NaiveDate; 3] {
        [center - Duration::days(1), center, center + Duration::days(1)]
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_week(&self) -> &WeekInfo {
        &self.weeks[1]
    }

    /// Move the selection to `date`. The week buffer is only rebuilt when the
    /// date leaves the current week. Returns whether the selection changed.
    pub fn select(&mut self, date: NaiveDate) -> bool {
        if date == self.selected {
            return false;
        }
        if !self.current_week().contains(date) {
            self.weeks = Self::three_weeks(date, self.today);
        }
        self.days = Self::three_days(date);
        self.selected = date;
        true
    }

    /// Apply a committed swipe: one week or one day in the swipe's direction
    pub fn turn(&mut self, turn: PageTurn) -> NaiveDate {
        let step = match turn.unit {
            PageUnit::Week => 7,
            PageUnit::Day => 1,
        };
        let delta = match turn.direction {
            Direction::Forward => step,
            Direction::Backward => -step,
        };
        self.select(self.selected + Duration::days(delta));
        self.selected
    }

    /// Keep `is_today` markers correct when the clock crosses midnight
    pub fn set_today(&mut self, today: NaiveDate) {
        if today != self.today {
            self.today = today;
            self.weeks = Self::three_weeks(self.selected, today);
        }
    }

    /// First day of the month `offset` months away from the selection
    pub fn month_start(&self, offset: i32) -> NaiveDate {
        let months = self.selected.year() * 12 + self.selected.month0() as i32 + offset;
        let (year, month0) = (months.div_euclid(12), months.rem_euclid(12) as u32);
        NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(self.selected)
    }
}
