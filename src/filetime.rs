//! Windows FILETIME conversion.


use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

use crate::error::ParsingError;


/// Milliseconds between 1601-01-01 and 1970-01-01.
const EPOCH_DELTA_MILLIS: i64 = 11_644_473_600_000;


/// Converts a count of 100-nanosecond intervals since 1601-01-01 into a UTC time with millisecond
/// precision.
pub fn filetime_to_utc(ticks: u64) -> Result<DateTime<Utc>, ParsingError> {
    // u64::MAX / 10_000 fits comfortably into an i64
    let millis_since_1601 = (ticks / 10_000) as i64;
    Utc.timestamp_millis_opt(millis_since_1601 - EPOCH_DELTA_MILLIS)
        .single()
        .ok_or(ParsingError::InvalidTimestamp { ticks })
}

/// Formats a time as ISO-8601 with millisecond precision and a trailing `Z`.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_timestamp() {
        let time = filetime_to_utc(0x01D6_BDDE_2794_7E40).unwrap();
        assert_eq!(time.timestamp_millis(), 1_605_726_489_844);
        assert_eq!(format_timestamp(&time), "2020-11-18T19:08:09.844Z");
    }

    #[test]
    fn epochs() {
        let unix_epoch = filetime_to_utc(116_444_736_000_000_000).unwrap();
        assert_eq!(format_timestamp(&unix_epoch), "1970-01-01T00:00:00.000Z");

        let windows_epoch = filetime_to_utc(0).unwrap();
        assert_eq!(format_timestamp(&windows_epoch), "1601-01-01T00:00:00.000Z");
    }
}
