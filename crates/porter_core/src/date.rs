use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Hour of day assigned to every entry; the source only records a date.
pub const CANONICAL_HOUR: u32 = 12;

/// Layouts tried in order against the header once the weekday is removed.
const DATE_LAYOUTS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("date header is empty")]
    Empty,
    #[error("'{0}' does not match any known date layout")]
    NoMatchingLayout(String),
}

/// Parses a header such as `Wednesday, May 14, 2025` into noon UTC of that day.
///
/// Everything up to and including the first comma is treated as the weekday.
/// Headers without a weekday are accepted as a fallback.
pub fn parse_header_date(header: &str) -> Result<DateTime<Utc>, DateParseError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(DateParseError::Empty);
    }

    let without_weekday = header
        .split_once(',')
        .map(|(_, rest)| rest.trim())
        .unwrap_or(header);

    let date = parse_with_layouts(without_weekday)
        .or_else(|| parse_with_layouts(header))
        .ok_or_else(|| DateParseError::NoMatchingLayout(without_weekday.to_string()))?;

    Ok(at_canonical_time(date))
}

/// The instant used for a date-only source record.
pub fn at_canonical_time(date: NaiveDate) -> DateTime<Utc> {
    let noon = NaiveTime::from_hms_opt(CANONICAL_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(noon).and_utc()
}

fn parse_with_layouts(text: &str) -> Option<NaiveDate> {
    let text = collapse_whitespace(text);
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(&text, layout).ok())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn full_month_header_parses_to_noon() {
        let instant = parse_header_date("Wednesday, May 14, 2025").unwrap();
        assert_eq!((instant.year(), instant.month(), instant.day()), (2025, 5, 14));
        assert_eq!((instant.hour(), instant.minute(), instant.second()), (12, 0, 0));
    }

    #[test]
    fn abbreviated_month_is_accepted() {
        let instant = parse_header_date("Tue, Dec 12, 2023").unwrap();
        assert_eq!((instant.year(), instant.month(), instant.day()), (2023, 12, 12));
    }

    #[test]
    fn day_first_layout_is_accepted() {
        let instant = parse_header_date("Wednesday, 14 May 2025").unwrap();
        assert_eq!((instant.month(), instant.day()), (5, 14));
    }

    #[test]
    fn header_without_weekday_falls_back_to_whole_text() {
        let instant = parse_header_date("May 14, 2025").unwrap();
        assert_eq!((instant.year(), instant.month(), instant.day()), (2025, 5, 14));
    }

    #[test]
    fn surrounding_and_inner_whitespace_is_ignored() {
        let instant = parse_header_date("  Monday,\n   January  2,   2006 ").unwrap();
        assert_eq!((instant.year(), instant.month(), instant.day()), (2006, 1, 2));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            parse_header_date("garbage text"),
            Err(DateParseError::NoMatchingLayout("garbage text".into()))
        );
        assert_eq!(parse_header_date("   "), Err(DateParseError::Empty));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert!(parse_header_date("Friday, February 30, 2024").is_err());
    }
}
