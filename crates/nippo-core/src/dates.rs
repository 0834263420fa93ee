//! Date formatting for document labels and email subjects.
//!
//! Report timestamps are rendered in Japan Standard Time. JST has no DST, so
//! a fixed +09:00 offset keeps the conversion deterministic without a tzdb.

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::{self, TimeZone};

/// `M月D日`, no leading zeros.
pub fn month_day(date: Date) -> String {
    format!("{}月{}日", date.month(), date.day())
}

/// `Y年M月D日`, no leading zeros.
pub fn year_month_day(date: Date) -> String {
    format!("{}年{}月{}日", date.year(), date.month(), date.day())
}

/// The JST calendar date of an instant.
pub fn jst_date(at: Timestamp) -> Date {
    at.to_zoned(TimeZone::fixed(tz::offset(9))).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn month_day_has_no_leading_zeros() {
        assert_eq!(month_day(date(2024, 3, 7)), "3月7日");
        assert_eq!(month_day(date(2024, 12, 31)), "12月31日");
    }

    #[test]
    fn year_month_day_format() {
        assert_eq!(year_month_day(date(2024, 3, 7)), "2024年3月7日");
    }

    #[test]
    fn jst_date_shifts_across_midnight() {
        // 2024-03-06T16:00:00Z is 2024-03-07T01:00 in JST.
        let at: Timestamp = "2024-03-06T16:00:00Z".parse().unwrap();
        assert_eq!(jst_date(at), date(2024, 3, 7));
    }
}
