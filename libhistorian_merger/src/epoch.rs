use time::OffsetDateTime;

use super::error::ConversionError;

/// Number of 100 ns ticks between 1601-01-01 and 1970-01-01
pub const UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;
const NANOS_PER_TICK: i128 = 100;

/// Convert an archive epoch tick (100 ns since 1601-01-01 UTC) into a UTC instant.
///
/// The full tick precision is kept. Ticks before the Unix epoch, or beyond year 9999, are
/// rejected with `ConversionError::OutOfRange`.
pub fn ticks_to_instant(ticks: u64) -> Result<OffsetDateTime, ConversionError> {
    let since_unix = ticks
        .checked_sub(UNIX_EPOCH_TICKS)
        .ok_or(ConversionError::OutOfRange(ticks))?;
    OffsetDateTime::from_unix_timestamp_nanos(since_unix as i128 * NANOS_PER_TICK)
        .map_err(|_| ConversionError::OutOfRange(ticks))
}

/// Inverse of `ticks_to_instant`. Sub-tick nanoseconds are truncated.
///
/// Instants before the Unix epoch are rejected with `ConversionError::UnrepresentableInstant`.
pub fn instant_to_ticks(instant: OffsetDateTime) -> Result<u64, ConversionError> {
    u64::try_from(instant.unix_timestamp_nanos().div_euclid(NANOS_PER_TICK))
        .ok()
        .and_then(|ticks| ticks.checked_add(UNIX_EPOCH_TICKS))
        .ok_or(ConversionError::UnrepresentableInstant(instant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_unix_epoch() {
        let instant = ticks_to_instant(UNIX_EPOCH_TICKS).unwrap();
        assert_eq!(instant, datetime!(1970-01-01 0:00 UTC));
        assert_eq!(instant.nanosecond(), 0);
    }

    #[test]
    fn test_before_unix_epoch() {
        assert_eq!(
            ticks_to_instant(UNIX_EPOCH_TICKS - 1),
            Err(ConversionError::OutOfRange(UNIX_EPOCH_TICKS - 1))
        );
        assert_eq!(ticks_to_instant(0), Err(ConversionError::OutOfRange(0)));
    }

    #[test]
    fn test_beyond_representable() {
        assert_eq!(
            ticks_to_instant(u64::MAX),
            Err(ConversionError::OutOfRange(u64::MAX))
        );
    }

    #[test]
    fn test_sub_second_precision() {
        // 2024-01-01 00:00:00.1234567
        let ticks = 133_485_408_000_000_000 + 1_234_567;
        let instant = ticks_to_instant(ticks).unwrap();
        assert_eq!(instant.date(), datetime!(2024-01-01 0:00 UTC).date());
        assert_eq!(instant.nanosecond(), 123_456_700);
        assert_eq!(instant.microsecond(), 123_456);
    }

    #[test]
    fn test_inverse() {
        let ticks = 133_485_408_000_000_000 + 1_234_567;
        let instant = ticks_to_instant(ticks).unwrap();
        assert_eq!(instant_to_ticks(instant), Ok(ticks));
        assert_eq!(
            instant_to_ticks(datetime!(2024-01-01 0:00 UTC)),
            Ok(133_485_408_000_000_000)
        );
    }

    #[test]
    fn test_instant_before_unix_epoch() {
        let instant = datetime!(1969-12-31 23:59 UTC);
        assert_eq!(
            instant_to_ticks(instant),
            Err(ConversionError::UnrepresentableInstant(instant))
        );
        // Sub-tick remainders of pre-epoch instants must not round up to tick 0
        let just_before = datetime!(1969-12-31 23:59:59.99999995 UTC);
        assert!(instant_to_ticks(just_before).is_err());
    }
}
