//! Utility functions shared across the bot.
//!
//! Path construction for the data directory, A1 spreadsheet coordinates, the
//! positive-integer rule used by every numeric argument, and the game-day
//! boundary used by the daily ledgers.

use std::path::PathBuf;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Offset in hours of the clan's day boundary from UTC.
///
/// Daily ledgers roll over at midnight in UTC+3.
const GAME_DAY_OFFSET_HOURS: i64 = 3;

/// Constructs a file system path by joining a directory path with a subdirectory.
///
/// # Examples
///
/// ```
/// # use clanbot::utils::get_path;
/// let path = get_path("/home/user", "store.json");
/// assert_eq!(path, "/home/user/store.json");
/// ```
pub fn get_path(dir_path: &str, subdir_path: &str) -> String {
    let path_buf: PathBuf = [dir_path, subdir_path].iter().collect();
    path_buf.to_string_lossy().into_owned()
}

/// Parses a strictly positive integer written in canonical form.
///
/// The value is accepted only if it parses, is greater than zero, and its
/// re-stringified form has the same length as the input. That rejects signs,
/// leading zeros and surrounding whitespace.
///
/// # Examples
///
/// ```
/// # use clanbot::utils::parse_positive_integer;
/// assert_eq!(parse_positive_integer("42"), Some(42));
/// assert_eq!(parse_positive_integer("007"), None);
/// assert_eq!(parse_positive_integer("0"), None);
/// ```
pub fn parse_positive_integer(value: &str) -> Option<u64> {
    let number = value.parse::<u64>().ok()?;

    if number == 0 || number.to_string().len() != value.len() {
        return None;
    }

    Some(number)
}

/// Converts a zero-based column index into its A1 letters (`0` → `A`, `26` → `AA`).
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }

    letters.iter().rev().collect()
}

/// Returns the calendar day of `now` at the clan's day boundary.
pub fn game_day(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(GAME_DAY_OFFSET_HOURS)).date_naive()
}

/// Formats a game day the way the damage ledger header labels its columns (`M/D`).
pub fn day_label(day: NaiveDate) -> String {
    format!("{}/{}", day.month(), day.day())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_get_path_simple() {
        let path = get_path("/home/user", "config");
        #[cfg(unix)]
        assert_eq!(path, "/home/user/config");
        #[cfg(windows)]
        assert_eq!(path, "\\home\\user\\config");
    }

    #[test]
    fn test_get_path_relative_paths() {
        let path = get_path(".", "store.json");
        #[cfg(unix)]
        assert_eq!(path, "./store.json");
        #[cfg(windows)]
        assert_eq!(path, ".\\store.json");
    }

    #[test]
    fn test_parse_positive_integer_accepts_canonical_numbers() {
        assert_eq!(parse_positive_integer("42"), Some(42));
        assert_eq!(parse_positive_integer("1"), Some(1));
        assert_eq!(parse_positive_integer("1234567890"), Some(1234567890));
    }

    #[test]
    fn test_parse_positive_integer_rejects_leading_zeros() {
        assert_eq!(parse_positive_integer("007"), None);
        assert_eq!(parse_positive_integer("00"), None);
    }

    #[test]
    fn test_parse_positive_integer_rejects_non_positive() {
        assert_eq!(parse_positive_integer("0"), None);
        assert_eq!(parse_positive_integer("-3"), None);
    }

    #[test]
    fn test_parse_positive_integer_rejects_garbage() {
        assert_eq!(parse_positive_integer(""), None);
        assert_eq!(parse_positive_integer("12a"), None);
        assert_eq!(parse_positive_integer("+5"), None);
        assert_eq!(parse_positive_integer(" 5"), None);
        assert_eq!(parse_positive_integer("1.5"), None);
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_game_day_rolls_over_at_utc_plus_3_midnight() {
        // 20:59 UTC is still the same day at UTC+3
        let before = Utc.with_ymd_and_hms(2024, 3, 10, 20, 59, 59).unwrap();
        // 21:00 UTC is midnight at UTC+3
        let after = Utc.with_ymd_and_hms(2024, 3, 10, 21, 0, 0).unwrap();

        assert_eq!(game_day(before), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(game_day(after), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn test_day_label_has_no_padding() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(day_label(day), "3/5");

        let day = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(day_label(day), "12/25");
    }
}
