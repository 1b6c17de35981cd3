// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Serde (de)serialization of `chrono::DateTime<Utc>` as RFC3339/ISO-8601
//! strings, matching the document wire format's `Timestamps serialized as
//! ISO-8601 UTC` requirement. Use via `#[serde(with = "datetime_serde")]`.

use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| D::Error::custom(format!("invalid RFC3339 timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        at: DateTime<Utc>,
    }

    #[test]
    fn round_trips_through_json() {
        let original = Wrapper { at: Utc::now() };
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(original.at.timestamp_millis(), parsed.at.timestamp_millis());
    }

    #[test]
    fn rejects_non_rfc3339_strings() {
        let json = r#"{"at":"not-a-date"}"#;
        assert!(serde_json::from_str::<Wrapper>(json).is_err());
    }
}
