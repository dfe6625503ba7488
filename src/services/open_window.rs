// src/services/open_window.rs

//! Open/closed evaluation for shop hours.
//!
//! Hours are plain times of day (`HH:MM`, 24h). A window whose close time is
//! earlier than its open time wraps past midnight (e.g. `22:00`-`02:00`).
//! Both ends are inclusive. When open and close are equal the window is the
//! single minute they name; shops open around the clock use `00:00`-`23:59`.
//!
//! No time zone is modelled here: `now` must be in the same zone the hours
//! were written in. [`wall_clock_time`] produces it from the configured offset.

use std::sync::LazyLock;

use chrono::{FixedOffset, Local, NaiveTime, Timelike, Utc};
use regex::Regex;
use thiserror::Error;
use validator::ValidationError;

static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").expect("Invalid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
#[error("time must be in HH:MM 24-hour format")]
pub struct InvalidClockTime;

/// Parses `H:MM` / `HH:MM` (00:00 to 23:59).
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, InvalidClockTime> {
    if !CLOCK_TIME_RE.is_match(value) {
        return Err(InvalidClockTime);
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| InvalidClockTime)
}

/// `validator` hook for `openTime` / `closeTime` payload fields.
pub fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    parse_clock_time(value).map(|_| ()).map_err(|_| {
        ValidationError::new("clock_time").with_message("Time must be in HH:MM format".into())
    })
}

/// Drops seconds so `now` compares minute by minute with stored hours.
pub fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time)
}

/// Minutes since midnight, seconds are ignored.
pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpenWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    pub fn wraps_midnight(&self) -> bool {
        minutes_of_day(self.close) < minutes_of_day(self.open)
    }

    pub fn contains(&self, now: NaiveTime) -> bool {
        let open = minutes_of_day(self.open);
        let close = minutes_of_day(self.close);
        let now = minutes_of_day(now);

        if close < open {
            // Overnight (e.g. 22:00 to 02:00)
            now >= open || now <= close
        } else {
            now >= open && now <= close
        }
    }
}

/// A shop is open when it is visible (active and approved) and `now` falls in its window.
pub fn is_open_now(
    open: NaiveTime,
    close: NaiveTime,
    is_active: bool,
    is_approved: bool,
    now: NaiveTime,
) -> bool {
    if !is_active || !is_approved {
        return false;
    }
    OpenWindow::new(open, close).contains(now)
}

/// Current time of day in the zone shop hours are authored in.
/// `None` means the server's local zone.
pub fn wall_clock_time(offset: Option<FixedOffset>) -> NaiveTime {
    match offset {
        Some(offset) => Utc::now().with_timezone(&offset).time(),
        None => Local::now().time(),
    }
}
