//! Time windows and the calendar units they span.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::errors::BcoDataErr;

/// The file-granularity period of an instrument: one file per day or one per month.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CalendarStep {
    /// One file per calendar day.
    Day,
    /// One file per calendar month.
    Month,
}

/// The caller-specified [start, end] range of a data request.
///
/// The invariant `start <= end` holds for every constructed value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    /// Create a window from two timestamps.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, BcoDataErr> {
        if start > end {
            return Err(BcoDataErr::InvalidWindow { start, end });
        }

        Ok(TimeWindow { start, end })
    }

    /// Create a window from two partial date strings.
    ///
    /// Strings are zero-padded to the full `YYYYMMDDhhmmss` precision, with missing
    /// steps filled by the lowest possible value: `"2017"` becomes 2017-01-01 00:00:00
    /// and `"201701021530"` becomes 2017-01-02 15:30:00.
    pub fn parse(start: &str, end: &str) -> Result<Self, BcoDataErr> {
        let start = parse_time_str(start)?;
        let end = parse_time_str(end)?;

        Self::new(start, end)
    }

    /// The start of the window.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// The end of the window.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Every calendar unit the window touches, in chronological order, inclusive on
    /// both ends. For `CalendarStep::Month` each unit is the first day of the month.
    pub fn calendar_units(&self, step: CalendarStep) -> Vec<NaiveDate> {
        match step {
            CalendarStep::Day => {
                let days = (self.end.date() - self.start.date()).num_days();
                (0..=days)
                    .map(|n| self.start.date() + Duration::days(n))
                    .collect()
            }
            CalendarStep::Month => {
                let mut units = vec![];
                let (mut year, mut month) = (self.start.year(), self.start.month());
                let last = (self.end.year(), self.end.month());

                while (year, month) <= last {
                    // The 1st of a valid year/month always exists.
                    units.push(NaiveDate::from_ymd_opt(year, month, 1).unwrap());
                    month += 1;
                    if month > 12 {
                        month = 1;
                        year += 1;
                    }
                }

                units
            }
        }
    }
}

/// Pad a partial date string out to the full 14 character form.
///
/// Pads with "01" pairs up to the date part (8 characters), then with zeros for the
/// time-of-day part, so `"2017"` -> `"20170101000000"`.
fn pad_time_str(input: &str) -> String {
    let mut padded = input.to_string();
    while padded.len() < 14 {
        while padded.len() < 8 {
            padded.push_str("01");
        }
        padded.push('0');
    }
    padded
}

fn parse_time_str(input: &str) -> Result<NaiveDateTime, BcoDataErr> {
    let padded = pad_time_str(input);

    NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S")
        .map_err(|_| BcoDataErr::InvalidTimeString(input.to_string()))
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
