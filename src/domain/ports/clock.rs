//! Clock port.
//!
//! All time-zone policy lives behind this trait: callers receive an
//! already-localized date and hour and never do offset arithmetic themselves.

use chrono::{NaiveDate, Weekday};

/// One consistent reading of the local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub date: NaiveDate,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: u8,
    /// 0-23.
    pub hour: u8,
    pub epoch_secs: i64,
}

impl ClockReading {
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday {
            0 => "Monday",
            1 => "Tuesday",
            2 => "Wednesday",
            3 => "Thursday",
            4 => "Friday",
            5 => "Saturday",
            _ => "Sunday",
        }
    }
}

/// Convert a chrono weekday to the 0 = Monday numbering used by goal configs.
pub fn weekday_index(weekday: Weekday) -> u8 {
    #[allow(clippy::cast_possible_truncation)]
    let index = weekday.num_days_from_monday() as u8;
    index
}

pub trait Clock: Send + Sync {
    fn now(&self) -> ClockReading;
}
