//! The session record.

use chrono::{DateTime, TimeZone, Utc};
use keepalive_ddb_client::codec::CodecError;
use keepalive_ddb_client::value::{Record, from_record, to_record};
use serde::{Deserialize, Serialize};

/// A registered keepalive session.
///
/// Stored with camelCase attribute names:
///
/// ```json
/// {"sessionId": "s-1", "fcmDeviceToken": "tok", "intervalSeconds": 60, "expireTime": 1700000000}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Partition key.
    pub session_id: String,
    /// Push token of the device to wake.
    pub fcm_device_token: String,
    /// Seconds between keepalive pushes.
    pub interval_seconds: i64,
    /// Expiry as Unix epoch seconds.
    pub expire_time: i64,
}

impl Session {
    /// Attribute holding the session id.
    pub const ID_ATTRIBUTE: &'static str = "sessionId";
    /// Attribute holding the expiry.
    pub const EXPIRE_ATTRIBUTE: &'static str = "expireTime";

    /// Converts the session into a store record.
    pub fn to_record(&self) -> Result<Record, CodecError> {
        to_record(self)
    }

    /// Reads a session back from a store record.
    pub fn from_record(record: Record) -> Result<Self, CodecError> {
        from_record(record)
    }

    /// Expiry as a timestamp; `None` when out of range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expire_time, 0).single()
    }

    /// Returns `true` once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expire_time
    }
}
