//! Wall-clock abstraction for log timestamps.
//!
//! # Invariants
//! - `today()` is formatted `YYYY-MM-DD`; `now_time()` is `HH:mm:ss`.
//! - Both use local time.

use chrono::Local;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Source of the date and time stamped onto log entries.
pub trait Clock {
    fn today(&self) -> String;
    fn now_time(&self) -> String;
}

/// Local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        Local::now().format(DATE_FORMAT).to_string()
    }

    fn now_time(&self) -> String {
        Local::now().format(TIME_FORMAT).to_string()
    }
}

/// Clock frozen at one instant, for deterministic tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock {
    date: String,
    time: String,
}

impl FixedClock {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.date.clone()
    }

    fn now_time(&self) -> String {
        self.time.clone()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn today(&self) -> String {
        (**self).today()
    }

    fn now_time(&self) -> String {
        (**self).now_time()
    }
}
