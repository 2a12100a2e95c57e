//! Pure unit-conversion helpers.
//!
//! Timestamps in the archive files are stored as floating point seconds since the
//! Unix epoch. Naive timestamps are interpreted as UTC throughout.

use chrono::{DateTime, Duration, NaiveDateTime};

/// Convert a temperature from degrees Celsius to Kelvin.
pub fn celsius_to_kelvin(value: f64) -> f64 {
    value + 273.15
}

/// Convert a temperature from Kelvin to degrees Celsius.
pub fn kelvin_to_celsius(value: f64) -> f64 {
    value - 273.15
}

/// Convert a whole array of temperatures from degrees Celsius to Kelvin.
pub fn celsius_to_kelvin_all(values: &[f64]) -> Vec<f64> {
    values.iter().copied().map(celsius_to_kelvin).collect()
}

/// Convert a whole array of temperatures from Kelvin to degrees Celsius.
pub fn kelvin_to_celsius_all(values: &[f64]) -> Vec<f64> {
    values.iter().copied().map(kelvin_to_celsius).collect()
}

/// Convert a timestamp to seconds since the Unix epoch.
pub fn time_to_num(time: NaiveDateTime) -> f64 {
    let utc = time.and_utc();
    utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) / 1.0e9
}

/// Convert seconds since the Unix epoch to a timestamp. Fractional seconds are kept
/// to nanosecond precision; values outside the representable range saturate to the
/// epoch itself.
pub fn num_to_time(num: f64) -> NaiveDateTime {
    let secs = num.floor();
    let nanos = ((num - secs) * 1.0e9).round() as u32;
    // Round-up at the nanosecond edge would overflow the subsecond field.
    let (secs, nanos) = if nanos >= 1_000_000_000 {
        (secs as i64 + 1, 0)
    } else {
        (secs as i64, nanos)
    };

    DateTime::from_timestamp(secs, nanos)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

/// Convert a whole array of timestamps to seconds since the Unix epoch.
pub fn times_to_nums(times: &[NaiveDateTime]) -> Vec<f64> {
    times.iter().copied().map(time_to_num).collect()
}

/// Convert a whole array of epoch seconds to timestamps.
pub fn nums_to_times(nums: &[f64]) -> Vec<NaiveDateTime> {
    nums.iter().copied().map(num_to_time).collect()
}

/// Shift local timestamps to UTC using a fixed hour offset east of Greenwich.
/// No daylight saving rules are applied.
pub fn local_to_utc(times: &[NaiveDateTime], utc_offset_hours: i64) -> Vec<NaiveDateTime> {
    times
        .iter()
        .map(|t| *t - Duration::hours(utc_offset_hours))
        .collect()
}

/// Shift UTC timestamps to local time using a fixed hour offset east of Greenwich.
pub fn utc_to_local(times: &[NaiveDateTime], utc_offset_hours: i64) -> Vec<NaiveDateTime> {
    times
        .iter()
        .map(|t| *t + Duration::hours(utc_offset_hours))
        .collect()
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_temperature_round_trip() {
        for celsius in [-40.0, 0.0, 26.85, 100.0] {
            let back = kelvin_to_celsius(celsius_to_kelvin(celsius));
            assert!((back - celsius).abs() < 1.0e-12);
        }

        assert_eq!(celsius_to_kelvin(0.0), 273.15);
        assert_eq!(kelvin_to_celsius(273.15), 0.0);
    }

    #[test]
    fn test_temperature_arrays() {
        let celsius = [0.0, 10.0, -5.0];
        let kelvin = celsius_to_kelvin_all(&celsius);
        assert_eq!(kelvin, vec![273.15, 283.15, 268.15]);
        assert_eq!(kelvin_to_celsius_all(&kelvin), celsius.to_vec());
    }

    #[test]
    fn test_time_round_trip() {
        let representative = [
            NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2017, 1, 2)
                .unwrap()
                .and_hms_opt(15, 30, 45)
                .unwrap(),
            NaiveDate::from_ymd_opt(2018, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
        ];

        for time in representative {
            assert_eq!(num_to_time(time_to_num(time)), time);
        }
    }

    #[test]
    fn test_time_known_value() {
        let time = NaiveDate::from_ymd_opt(2018, 1, 23)
            .unwrap()
            .and_hms_opt(0, 0, 10)
            .unwrap();

        assert_eq!(time_to_num(time), 1_516_665_610.0);
    }

    #[test]
    fn test_time_arrays() {
        let times = [
            NaiveDate::from_ymd_opt(2017, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2017, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 10)
                .unwrap(),
        ];

        let nums = times_to_nums(&times);
        assert_eq!(nums[1] - nums[0], 10.0);
        assert_eq!(nums_to_times(&nums), times.to_vec());
    }

    #[test]
    fn test_fixed_offset() {
        let local = [NaiveDate::from_ymd_opt(2018, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()];

        // Barbados is UTC-4 year round.
        let utc = local_to_utc(&local, -4);
        assert_eq!(
            utc[0],
            NaiveDate::from_ymd_opt(2018, 1, 1)
                .unwrap()
                .and_hms_opt(16, 0, 0)
                .unwrap()
        );

        assert_eq!(utc_to_local(&utc, -4), local.to_vec());
    }
}
