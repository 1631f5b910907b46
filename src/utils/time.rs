use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Parse a value from an HTML datetime-local input (YYYY-MM-DDTHH:MM, seconds optional)
pub fn parse_datetime_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Render a naive local time as RFC 3339 in the given zone.
///
/// Ambiguous local times (DST folds) resolve to the earliest
/// interpretation; times that don't exist in the zone (DST gaps)
/// yield None and the draft is rejected.
pub fn to_rfc3339_in(naive: NaiveDateTime, tz: Tz) -> Option<String> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.to_rfc3339())
}
