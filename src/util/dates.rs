use chrono::{NaiveDate, NaiveDateTime};

/// Formats tried in order for date-time strings published by the service.
const DATETIME_FORMATS: [&str; 2] = ["%d-%m-%Y %H:%M:%S", "%d-%m-%Y %H:%M"];

/// Date-only fallback, interpreted as midnight.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Best-effort parse of a loosely formatted timestamp.
///
/// Tries `dd-mm-yyyy HH:MM:SS`, then `dd-mm-yyyy HH:MM`, then `yyyy-mm-dd`.
/// Empty or unrecognised input yields `None`.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
