use time::{Date, OffsetDateTime};

/// Week identifier in `<year>W<ww>` form, e.g. "2024W07".
///
/// Uses the ISO-8601 week date so the boundary does not move with the
/// runtime locale; the year component is the ISO week-based year, which
/// differs from the calendar year around New Year.
pub fn week_id_for(date: Date) -> String {
    let (year, week, _) = date.to_iso_week_date();
    format!("{year:04}W{week:02}")
}

/// Week identifier for the current UTC date.
pub fn current_week_id() -> String {
    week_id_for(OffsetDateTime::now_utc().date())
}
