use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a due date typed by the user, in local time.
///
/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DDTHH:MM` and `YYYY-MM-DD HH:MM`.
pub fn parse_due(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    let naive = NaiveDateTime::parse_from_str(input, INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(input, DISPLAY_FORMAT))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    resolve_local(&Local, naive)
}

/// Map a wall-clock time in `tz` to UTC. A time that falls in a
/// spring-forward gap moves to the first whole hour after it; an ambiguous
/// time takes the earlier instant.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    (0..=2)
        .find_map(|hours| {
            let shifted = naive.checked_add_signed(TimeDelta::hours(hours))?;
            tz.from_local_datetime(&shifted).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// First instant of the local day after the one containing `now`. Due dates
/// before this count as "today".
pub fn end_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&Local).date_naive();
    today
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|midnight| resolve_local(&Local, midnight))
        .unwrap_or(now)
}

/// Format for editing (round-trips through [`parse_due`])
pub fn format_due_input(due: &DateTime<Utc>) -> String {
    due.with_timezone(&Local).format(INPUT_FORMAT).to_string()
}

/// Format for lists and detail output
pub fn format_due(due: &DateTime<Utc>) -> String {
    due.with_timezone(&Local).format(DISPLAY_FORMAT).to_string()
}
