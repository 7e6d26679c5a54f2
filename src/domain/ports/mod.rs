//! Port trait definitions (Hexagonal Architecture)
//!
//! - Clock: localized time source
//! - DailyStateRepository: persistence of the daily state record
//! - NotificationChannel: outbound nudge delivery

pub mod clock;
pub mod daily_state_repository;
pub mod notification_channel;

pub use clock::{weekday_index, Clock, ClockReading};
pub use daily_state_repository::DailyStateRepository;
pub use notification_channel::NotificationChannel;
