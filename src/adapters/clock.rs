//! Clock adapters.

use std::sync::{Mutex, PoisonError};

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{weekday_index, Clock, ClockReading};

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// Wall clock shifted to a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn with_offset_minutes(minutes: i32) -> DomainResult<Self> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(DomainError::InvalidInput(format!(
                "UTC offset of {minutes} minutes is out of range"
            )));
        }
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            DomainError::InvalidInput(format!("UTC offset of {minutes} minutes is out of range"))
        })?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> ClockReading {
        let utc = Utc::now();
        let local = utc.with_timezone(&self.offset);
        #[allow(clippy::cast_possible_truncation)]
        ClockReading {
            date: local.date_naive(),
            weekday: weekday_index(local.weekday()),
            hour: local.hour() as u8,
            epoch_secs: utc.timestamp(),
        }
    }
}

/// Manually driven clock for tests and dry runs.
///
/// Holds a local date-time; `epoch_secs` treats that local time as UTC,
/// which keeps differences between readings correct.
#[derive(Debug)]
pub struct FixedClock {
    local: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            local: Mutex::new(local),
        }
    }

    /// Clock set to the top of `hour` on `date`.
    pub fn at(date: NaiveDate, hour: u8) -> Self {
        let time = NaiveTime::from_hms_opt(u32::from(hour.min(23)), 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(date.and_time(time))
    }

    pub fn set_hour(&self, hour: u8) {
        let mut local = self.lock();
        let time = NaiveTime::from_hms_opt(u32::from(hour.min(23)), 0, 0).unwrap_or(NaiveTime::MIN);
        *local = local.date().and_time(time);
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut local = self.lock();
        *local += Duration::seconds(secs);
    }

    pub fn advance_days(&self, days: i64) {
        let mut local = self.lock();
        *local += Duration::days(days);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        self.local.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> ClockReading {
        let local = *self.lock();
        #[allow(clippy::cast_possible_truncation)]
        ClockReading {
            date: local.date(),
            weekday: weekday_index(local.weekday()),
            hour: local.hour() as u8,
            epoch_secs: local.and_utc().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_bounds() {
        assert!(SystemClock::with_offset_minutes(330).is_ok());
        assert!(SystemClock::with_offset_minutes(-18 * 60).is_ok());
        assert!(SystemClock::with_offset_minutes(18 * 60 + 1).is_err());
    }

    #[test]
    fn test_system_clock_hour_matches_offset() {
        let clock = SystemClock::with_offset_minutes(330).unwrap();
        let reading = clock.now();
        let expected = (Utc::now() + Duration::minutes(330)).hour() as u8;
        // Allow for the hour turning over between the two readings.
        assert!(reading.hour == expected || (reading.hour + 1) % 24 == expected);
    }

    #[test]
    fn test_fixed_clock_moves() {
        let clock = FixedClock::at(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 10);
        let before = clock.now();
        assert_eq!(before.weekday, 0);
        assert_eq!(before.hour, 10);

        clock.advance_secs(1800);
        assert_eq!(clock.now().epoch_secs - before.epoch_secs, 1800);

        clock.advance_days(1);
        let after = clock.now();
        assert_eq!(after.weekday, 1);
        assert_eq!(after.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        clock.set_hour(18);
        assert_eq!(clock.now().hour, 18);
    }
}
