//! Domain models for the API.
//!
//! Row types derive `sqlx::FromRow` with the Spanish column names of the
//! `ferremas` schema and serialize with the same names on the wire.

pub mod commune;
pub mod dispatch;
pub mod payment;
pub mod user;

use chrono::{DateTime, Utc};
use serde::Serializer;

/// Wire format for timestamps (`2025-06-01 14:03:22`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize a timestamp as [`TIMESTAMP_FORMAT`].
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize_timestamp<S: Serializer>(
    value: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Stamp {
        #[serde(serialize_with = "serialize_timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 14, 3, 22).unwrap();
        let json = serde_json::to_string(&Stamp { at }).unwrap();
        assert_eq!(json, r#"{"at":"2025-06-01 14:03:22"}"#);
    }
}
