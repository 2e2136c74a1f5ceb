use chrono::{NaiveDate, Weekday};
use overnight_roster::calendar::{self, DateWindows, WeekdayTable};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn weekday_names_parse_in_full_and_abbreviated_forms() {
    assert_eq!(calendar::parse_weekday("Monday"), Some(Weekday::Mon));
    assert_eq!(calendar::parse_weekday("  sunday "), Some(Weekday::Sun));
    assert_eq!(calendar::parse_weekday("THU"), Some(Weekday::Thu));
    assert_eq!(calendar::parse_weekday("Funday"), None);
    assert_eq!(calendar::parse_weekday(""), None);
}

#[test]
fn dates_parse_iso_and_us_formats() {
    assert_eq!(calendar::parse_date("2025-01-06"), Some(d(2025, 1, 6)));
    assert_eq!(calendar::parse_date("01/06/2025"), Some(d(2025, 1, 6)));
    assert_eq!(calendar::parse_date("2025-13-01"), None);
    assert_eq!(calendar::parse_date("yesterday"), None);
}

#[test]
fn weekday_table_is_indexed_monday_first() {
    let table = WeekdayTable::new([1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(table[Weekday::Mon], 1);
    assert_eq!(table[Weekday::Sun], 7);

    let from_fn = WeekdayTable::from_fn(|day| day == Weekday::Sat);
    assert!(from_fn[Weekday::Sat]);
    assert!(!from_fn[Weekday::Fri]);
    assert_eq!(from_fn.iter().filter(|(_, set)| **set).count(), 1);
}

#[test]
fn try_from_fn_stops_at_first_error() {
    let result: Result<WeekdayTable<u8>, Weekday> =
        WeekdayTable::try_from_fn(|day| if day == Weekday::Wed { Err(day) } else { Ok(1) });
    assert_eq!(result, Err(Weekday::Wed));
}

#[test]
fn windows_are_inclusive_and_follow_calendar_distance() {
    // Jan 6, 7, 9 and 20: gaps matter, positions do not.
    let dates = vec![d(2025, 1, 6), d(2025, 1, 7), d(2025, 1, 9), d(2025, 1, 20)];
    let windows = DateWindows::new(&dates, 2);

    assert_eq!(windows.len(), 4);
    assert_eq!(windows.window(0), 0..2);
    assert_eq!(windows.window(1), 0..3);
    assert_eq!(windows.window(2), 1..3);
    assert_eq!(windows.window(3), 3..4);
}

#[test]
fn default_window_spans_twenty_one_days() {
    let dates: Vec<NaiveDate> = (0..30).map(|offset| d(2025, 1, 1) + chrono::Duration::days(offset)).collect();
    let windows = DateWindows::new(&dates, 10);

    // Jan 15 sees Jan 5 through Jan 25.
    assert_eq!(windows.window(14), 4..25);
    assert_eq!(windows.window(14).len(), 21);
    // Near the edge the window is clipped to the covered range.
    assert_eq!(windows.window(0), 0..11);
}

#[test]
fn zero_half_width_windows_hold_only_the_date_itself() {
    let dates = vec![d(2025, 1, 6), d(2025, 1, 7)];
    let windows = DateWindows::new(&dates, 0);
    assert_eq!(windows.window(0), 0..1);
    assert_eq!(windows.window(1), 1..2);
}
