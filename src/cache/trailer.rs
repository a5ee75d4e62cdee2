//! Expiration instants and the on-disk trailer format.
//!
//! Every cached tile file ends in a fixed 16-byte trailer: the ASCII tag
//! `EXPIRES:` followed by a little-endian signed 64-bit tick count. Ticks
//! are 100-nanosecond units counted from 0001-01-01T00:00:00 UTC, the
//! representation the original cache writer used, so existing cache trees
//! stay readable byte for byte.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// ASCII tag opening every trailer.
pub const EXPIRES_TAG: &[u8; 8] = b"EXPIRES:";

/// Total trailer length in bytes: 8-byte tag plus 8-byte tick count.
pub const TRAILER_LEN: usize = 16;

/// 100-nanosecond ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Tick count of 1970-01-01T00:00:00Z in the 0001-01-01 epoch.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// A UTC expiration instant with 100 ns resolution.
///
/// Entries whose trailer is missing or malformed decode to
/// [`Expiration::NEVER`] and are never reclaimed by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiration(i64);

impl Expiration {
    /// Sentinel for entries that never expire.
    pub const NEVER: Expiration = Expiration(i64::MAX);

    pub fn from_ticks(ticks: i64) -> Self {
        Expiration(ticks)
    }

    pub fn ticks(self) -> i64 {
        self.0
    }

    /// The current UTC time as an expiration instant.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// An instant `ttl` from now.
    pub fn after(ttl: Duration) -> Self {
        Self::from_datetime(Utc::now() + ttl)
    }

    /// Convert a UTC instant to ticks, saturating to `NEVER` when the
    /// instant is not representable.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        let subsec = i64::from(instant.timestamp_subsec_nanos() / 100);
        match instant
            .timestamp()
            .checked_mul(TICKS_PER_SECOND)
            .and_then(|ticks| ticks.checked_add(subsec))
            .and_then(|ticks| ticks.checked_add(UNIX_EPOCH_TICKS))
        {
            Some(ticks) => Expiration(ticks),
            None => Expiration::NEVER,
        }
    }

    /// The instant as a `DateTime`, or `None` for `NEVER` and values
    /// outside the representable range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if self == Self::NEVER {
            return None;
        }
        let unix_ticks = self.0.checked_sub(UNIX_EPOCH_TICKS)?;
        let seconds = unix_ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = (unix_ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(seconds, nanos)
    }

    /// True once the current UTC time is strictly past this instant.
    pub fn is_past(self) -> bool {
        Self::now().0 > self.0
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(instant) => write!(f, "{}", instant.to_rfc3339()),
            None => f.write_str("never"),
        }
    }
}

/// Encode `expires` as the 16-byte file trailer.
pub fn encode_trailer(expires: Expiration) -> [u8; TRAILER_LEN] {
    let mut trailer = [0u8; TRAILER_LEN];
    trailer[..8].copy_from_slice(EXPIRES_TAG);
    trailer[8..].copy_from_slice(&expires.ticks().to_le_bytes());
    trailer
}

/// Decode a trailer buffer. `None` means the tag did not match; callers
/// treat such files as never-expiring payload.
pub fn decode_trailer(trailer: &[u8; TRAILER_LEN]) -> Option<Expiration> {
    if &trailer[..8] != EXPIRES_TAG {
        return None;
    }
    let mut ticks = [0u8; 8];
    ticks.copy_from_slice(&trailer[8..]);
    Some(Expiration::from_ticks(i64::from_le_bytes(ticks)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailer_round_trip_is_tick_exact() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45).unwrap()
            + Duration::nanoseconds(123_456_700);
        let expires = Expiration::from_datetime(instant);

        let decoded = decode_trailer(&encode_trailer(expires)).unwrap();
        assert_eq!(decoded, expires);
        assert_eq!(decoded.to_datetime().unwrap(), instant);
    }

    #[test]
    fn trailer_layout_is_bit_exact() {
        let expires = Expiration::from_ticks(0x0102_0304_0506_0708);
        let trailer = encode_trailer(expires);

        assert_eq!(&trailer[..8], b"EXPIRES:");
        // Little-endian tick bytes.
        assert_eq!(
            &trailer[8..],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn known_instant_matches_reference_ticks() {
        // 2020-01-01T00:00:00Z in the original writer's representation.
        let instant = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            Expiration::from_datetime(instant).ticks(),
            637_134_336_000_000_000
        );
    }

    #[test]
    fn mismatched_tag_decodes_to_none() {
        let mut trailer = encode_trailer(Expiration::now());
        trailer[0] = b'X';
        assert_eq!(decode_trailer(&trailer), None);
    }

    #[test]
    fn never_is_not_past_and_has_no_datetime() {
        assert!(!Expiration::NEVER.is_past());
        assert_eq!(Expiration::NEVER.to_datetime(), None);
        assert_eq!(Expiration::NEVER.to_string(), "never");
    }

    #[test]
    fn past_and_future_classification() {
        let yesterday = Expiration::from_datetime(Utc::now() - Duration::days(1));
        let tomorrow = Expiration::from_datetime(Utc::now() + Duration::days(1));

        assert!(yesterday.is_past());
        assert!(!tomorrow.is_past());
        assert!(yesterday < tomorrow);
    }
}
