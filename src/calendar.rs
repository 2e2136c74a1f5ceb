use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::ops::{Index, Range};

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// One value per weekday, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekdayTable<T> {
    values: [T; 7],
}

impl<T> WeekdayTable<T> {
    pub fn new(values: [T; 7]) -> Self {
        Self { values }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(Weekday) -> T,
    {
        Self {
            values: ALL_WEEKDAYS.map(f),
        }
    }

    pub fn get(&self, day: Weekday) -> &T {
        &self.values[day.num_days_from_monday() as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &T)> {
        ALL_WEEKDAYS.iter().copied().zip(self.values.iter())
    }

    /// Fallible counterpart of [`WeekdayTable::from_fn`]; stops at the first error.
    pub fn try_from_fn<E, F>(mut f: F) -> Result<Self, E>
    where
        F: FnMut(Weekday) -> Result<T, E>,
    {
        let mut values = Vec::with_capacity(7);
        for day in ALL_WEEKDAYS {
            values.push(f(day)?);
        }
        match <[T; 7]>::try_from(values) {
            Ok(values) => Ok(Self { values }),
            Err(_) => unreachable!("ALL_WEEKDAYS has seven entries"),
        }
    }
}

impl<T: Copy> WeekdayTable<T> {
    pub fn filled(value: T) -> Self {
        Self { values: [value; 7] }
    }
}

impl<T> Index<Weekday> for WeekdayTable<T> {
    type Output = T;

    fn index(&self, day: Weekday) -> &T {
        self.get(day)
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Lower-case column prefix used by the employee table (`monday_avail`, `monday_pref`).
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Accepts full English names and three-letter abbreviations, case-insensitive.
pub fn parse_weekday(input: &str) -> Option<Weekday> {
    let normalized = input.trim().to_ascii_lowercase();
    ALL_WEEKDAYS.into_iter().find(|day| {
        let key = weekday_key(*day);
        normalized == key || normalized == key[..3]
    })
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Inclusive rolling windows over a sorted date sequence.
///
/// Each position maps to the index range of dates within `half_width_days`
/// calendar days of it. Bounds are found by binary search once per date and
/// shared by every employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindows {
    half_width_days: u32,
    bounds: Vec<Range<usize>>,
}

impl DateWindows {
    pub fn new(sorted_dates: &[NaiveDate], half_width_days: u32) -> Self {
        debug_assert!(sorted_dates.windows(2).all(|pair| pair[0] < pair[1]));
        let half_width = Duration::days(i64::from(half_width_days));
        let bounds = sorted_dates
            .iter()
            .map(|&date| {
                let earliest = date.checked_sub_signed(half_width).unwrap_or(NaiveDate::MIN);
                let latest = date.checked_add_signed(half_width).unwrap_or(NaiveDate::MAX);
                let start = sorted_dates.partition_point(|&other| other < earliest);
                let end = sorted_dates.partition_point(|&other| other <= latest);
                start..end
            })
            .collect();
        Self {
            half_width_days,
            bounds,
        }
    }

    pub fn half_width_days(&self) -> u32 {
        self.half_width_days
    }

    pub fn window(&self, date_idx: usize) -> Range<usize> {
        self.bounds[date_idx].clone()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

pub(crate) fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

// 1970-01-01
const EPOCH_DAYS_FROM_CE: i32 = 719_163;
