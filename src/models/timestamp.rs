//! Local wall-clock timestamps stored as `%Y-%m-%d %H:%M:%S`.
//!
//! Use with `#[serde(with = "crate::models::timestamp")]`.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time, truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: NaiveDateTime,
    }

    #[test]
    fn formats_without_fraction() {
        let at = NaiveDateTime::parse_from_str("2025-11-05 08:30:00", FORMAT).unwrap();
        let json = serde_json::to_string(&Stamped { at }).unwrap();
        assert_eq!(json, r#"{"at":"2025-11-05 08:30:00"}"#);
    }

    #[test]
    fn rejects_iso_t_separator() {
        let result: Result<Stamped, _> = serde_json::from_str(r#"{"at":"2025-11-05T08:30:00"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn now_has_no_subsecond_part() {
        assert_eq!(now().nanosecond(), 0);
    }
}
