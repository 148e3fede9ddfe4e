//! Week and day selector options for a calendar month.
use crate::error::FilterError;
use crate::types::{DayToken, WeekToken, ALL_DAYS, ALL_WEEKS};
use chrono::{Datelike, Month, NaiveDate, Weekday};

/// One entry of a selector list: the text shown and the token it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption<T> {
    pub label: String,
    pub token: T,
}

pub type WeekOption = SelectorOption<WeekToken>;
pub type DayOption = SelectorOption<DayToken>;

/// Month number for an English month name such as `November`.
pub fn month_from_name(name: &str) -> Result<u32, FilterError> {
    name.trim()
        .parse::<Month>()
        .map(|m| m.number_from_month())
        .map_err(|_| FilterError::UnknownMonth(name.to_string()))
}

pub fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
}

fn days_of_month(year: i32, month: u32) -> impl Iterator<Item = NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    first
        .into_iter()
        .flat_map(|d| d.iter_days())
        .take_while(move |d| d.month() == month)
}

fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Business weeks of a month, each opened by a Monday and closed by the
/// following Friday. A trailing week cut off by month end is kept only when
/// the month ends on Monday to Thursday. The list starts with "All Weeks".
pub fn weeks_in_month(year: i32, month: u32) -> Vec<WeekOption> {
    let mut weeks = vec![WeekOption {
        label: ALL_WEEKS.to_string(),
        token: WeekToken::All,
    }];
    let mut counter = 1;
    let mut start: Option<NaiveDate> = None;
    let days: Vec<NaiveDate> = days_of_month(year, month).collect();
    let last = days.last().copied();

    for date in days {
        let weekday = date.weekday();
        if weekday == Weekday::Mon {
            start = Some(date);
        }
        let Some(week_start) = start else { continue };
        let closes = weekday == Weekday::Fri
            || (Some(date) == last && weekday.num_days_from_monday() <= 3);
        if closes {
            weeks.push(WeekOption {
                label: format!(
                    "Week {} ({} to {})",
                    counter,
                    fmt_date(week_start),
                    fmt_date(date)
                ),
                token: WeekToken::Range {
                    start: week_start,
                    end: date,
                },
            });
            counter += 1;
            start = None;
        }
    }
    weeks
}

/// Same as [`weeks_in_month`] for a month given by name. An unknown name
/// yields only the "All Weeks" entry.
pub fn weeks_in_named_month(year: i32, month_name: &str) -> Vec<WeekOption> {
    match month_from_name(month_name) {
        Ok(month) => weeks_in_month(year, month),
        Err(_) => vec![WeekOption {
            label: ALL_WEEKS.to_string(),
            token: WeekToken::All,
        }],
    }
}

/// Business days of the selected week, or of the whole month when no week is
/// selected. The list starts with "All Days".
pub fn days_in_period(year: i32, month: u32, week: &WeekToken) -> Vec<DayOption> {
    let mut days = vec![DayOption {
        label: ALL_DAYS.to_string(),
        token: DayToken::All,
    }];
    let candidates: Vec<NaiveDate> = match week {
        WeekToken::All => days_of_month(year, month).collect(),
        WeekToken::Range { start, end } => start
            .iter_days()
            .take_while(|d| d <= end)
            .collect(),
    };
    days.extend(
        candidates
            .into_iter()
            .filter(|d| d.weekday().num_days_from_monday() <= 4)
            .map(|d| DayOption {
                label: fmt_date(d),
                token: DayToken::On(d),
            }),
    );
    days
}

pub fn labels<T>(options: &[SelectorOption<T>]) -> Vec<String> {
    options.iter().map(|o| o.label.clone()).collect()
}
