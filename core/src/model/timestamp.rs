//! Timestamp parsing for the formats the API emits.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde_json::Value;

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a timestamp given either as a string or as a serialized DateTime
/// object (`{"date": ..., "timezone_type": ..., "timezone": ...}`).
/// Strings without an offset are read as UTC.
pub(crate) fn parse(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(text) => parse_str(text),
        Value::Object(object) => {
            let date = object.get("date")?.as_str()?;
            let zone = object.get("timezone").and_then(Value::as_str).unwrap_or("UTC");
            let naive = parse_naive(date.trim())?;
            in_zone(&naive, zone)
        }
        _ => None,
    }
}

fn parse_str(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed);
    }
    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(text, format).ok())
    {
        return Some(parsed);
    }
    if let Some(naive) = parse_naive(text) {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().fixed_offset())
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// `zone` is `UTC`, a `+HH:MM` offset or an IANA name such as
/// `Europe/Prague`. Ambiguous local times resolve to the earlier instant.
fn in_zone(naive: &NaiveDateTime, zone: &str) -> Option<DateTime<FixedOffset>> {
    let zone = zone.trim();
    let fixed = match zone {
        "UTC" | "GMT" | "Z" => FixedOffset::east_opt(0),
        other => other.parse::<FixedOffset>().ok(),
    };
    if let Some(offset) = fixed {
        return offset.from_local_datetime(naive).earliest();
    }
    let tz: Tz = zone.parse().ok()?;
    tz.from_local_datetime(naive)
        .earliest()
        .map(|local| local.fixed_offset())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rfc3339(value: Value) -> Option<String> {
        parse(&value).map(|dt| dt.to_rfc3339())
    }

    #[test]
    fn accepts_rfc3339() {
        assert_eq!(
            rfc3339(json!("2024-05-01T08:30:00+02:00")).as_deref(),
            Some("2024-05-01T08:30:00+02:00")
        );
        assert_eq!(
            rfc3339(json!("2024-05-01T08:30:00Z")).as_deref(),
            Some("2024-05-01T08:30:00+00:00")
        );
    }

    #[test]
    fn accepts_iso8601_offset_without_colon() {
        assert_eq!(
            rfc3339(json!("2024-05-01T08:30:00+0200")).as_deref(),
            Some("2024-05-01T08:30:00+02:00")
        );
        assert_eq!(
            rfc3339(json!("2024-05-01T08:30:00.5-0130")).as_deref(),
            Some("2024-05-01T08:30:00.500-01:30")
        );
    }

    #[test]
    fn space_separated_values_default_to_utc() {
        assert_eq!(
            rfc3339(json!("2024-05-01 08:30:00")).as_deref(),
            Some("2024-05-01T08:30:00+00:00")
        );
        assert_eq!(
            rfc3339(json!("2024-05-01 08:30:00.250000")).as_deref(),
            Some("2024-05-01T08:30:00.250+00:00")
        );
        assert_eq!(
            rfc3339(json!("2024-05-01 08:30:00+01:00")).as_deref(),
            Some("2024-05-01T08:30:00+01:00")
        );
    }

    #[test]
    fn date_only_is_midnight_utc() {
        assert_eq!(
            rfc3339(json!("2024-05-01")).as_deref(),
            Some("2024-05-01T00:00:00+00:00")
        );
    }

    #[test]
    fn accepts_serialized_datetime_objects() {
        let utc = json!({"date": "2023-11-20 14:00:00.000000", "timezone_type": 3, "timezone": "UTC"});
        assert_eq!(rfc3339(utc).as_deref(), Some("2023-11-20T14:00:00+00:00"));

        let offset = json!({"date": "2023-11-20 14:00:00.000000", "timezone_type": 1, "timezone": "+01:00"});
        assert_eq!(rfc3339(offset).as_deref(), Some("2023-11-20T14:00:00+01:00"));
    }

    #[test]
    fn accepts_named_zones_in_datetime_objects() {
        let winter = json!({"date": "2023-11-20 14:00:00.000000", "timezone_type": 3, "timezone": "Europe/Prague"});
        assert_eq!(rfc3339(winter).as_deref(), Some("2023-11-20T14:00:00+01:00"));

        let summer = json!({"date": "2024-07-01 09:00:00.000000", "timezone_type": 3, "timezone": "Europe/Budapest"});
        assert_eq!(rfc3339(summer).as_deref(), Some("2024-07-01T09:00:00+02:00"));

        // 02:30 happens twice on this night; the first one is CEST.
        let repeated = json!({"date": "2023-10-29 02:30:00", "timezone": "Europe/Prague"});
        assert_eq!(rfc3339(repeated).as_deref(), Some("2023-10-29T02:30:00+02:00"));
    }

    #[test]
    fn rejects_garbage() {
        for value in [
            json!("not a date"),
            json!(""),
            json!("2024-13-45"),
            json!(1_700_000_000),
            json!({"date": "2023-11-20 14:00:00", "timezone": "Mars/Olympus"}),
            json!({"date": "2024-03-31 02:30:00", "timezone": "Europe/Prague"}),
        ] {
            assert_eq!(parse(&value), None, "{value}");
        }
    }
}
