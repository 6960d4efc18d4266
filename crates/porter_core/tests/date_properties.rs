use chrono::{Datelike, NaiveDate, Timelike};
use porter_core::{parse_header_date, CANONICAL_HOUR};
use proptest::prelude::*;

fn init_logging() {
    porter_logging::initialize_for_tests();
}

proptest! {
    #[test]
    fn rendered_headers_parse_back_to_the_same_day(days in 0i64..80_000) {
        init_logging();
        let base = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let date = base + chrono::Duration::days(days);
        let header = date.format("%A, %B %-d, %Y").to_string();

        let instant = parse_header_date(&header).unwrap();

        prop_assert_eq!(instant.year(), date.year());
        prop_assert_eq!(instant.month(), date.month());
        prop_assert_eq!(instant.day(), date.day());
        prop_assert_eq!(instant.hour(), CANONICAL_HOUR);
        prop_assert_eq!((instant.minute(), instant.second(), instant.nanosecond()), (0, 0, 0));
    }

    #[test]
    fn parsing_is_deterministic(days in 0i64..80_000) {
        let base = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let date = base + chrono::Duration::days(days);
        let header = date.format("%A, %b %-d, %Y").to_string();

        prop_assert_eq!(parse_header_date(&header), parse_header_date(&header));
    }

    #[test]
    fn text_without_digits_never_parses(text in "[a-zA-Z ,]{0,40}") {
        prop_assert!(parse_header_date(&text).is_err());
    }
}
