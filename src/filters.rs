//! Period, week, day and agent filters.
//!
//! Every stage borrows its input and returns a new table, so the same loaded
//! tables can be filtered again for another view or another selection.
use crate::types::{AgentSelection, DayToken, MonthSelection, PeriodSelection, Table, WeekToken};
use chrono::{Datelike, Weekday};
use log::{debug, warn};

/// Keep rows dated inside `year` and one of the selected months. Rows without
/// a parseable date are dropped. A table with no date column yields an empty
/// table.
pub fn filter_period(table: &Table, year: i32, months: &MonthSelection) -> Table {
    if !table.has_date_field() {
        debug!("{}: no date column, period filter yields nothing", table.name);
        return table.empty_like();
    }
    table.filtered(|r| {
        r.date
            .map(|d| d.year() == year && months.contains(d.month()))
            .unwrap_or(false)
    })
}

fn is_business_day(weekday: Weekday) -> bool {
    weekday.num_days_from_monday() <= 4
}

/// Keep rows inside the week range that fall on Monday to Friday.
pub fn filter_week(table: &Table, week: &WeekToken) -> Table {
    match week {
        WeekToken::All => table.clone(),
        WeekToken::Range { .. } if !table.has_date_field() => table.clone(),
        WeekToken::Range { start, end } => table.filtered(|r| {
            r.date
                .map(|d| *start <= d && d <= *end && is_business_day(d.weekday()))
                .unwrap_or(false)
        }),
    }
}

/// Keep rows dated exactly on the selected day.
pub fn filter_day(table: &Table, day: &DayToken) -> Table {
    match day {
        DayToken::All => table.clone(),
        DayToken::On(_) if !table.has_date_field() => table.clone(),
        DayToken::On(target) => table.filtered(|r| r.date == Some(*target)),
    }
}

/// Keep rows whose normalised agent is selected. Tables without an agent
/// column pass through untouched.
pub fn filter_agents(table: &Table, agents: &AgentSelection) -> Table {
    match agents {
        AgentSelection::All => table.clone(),
        AgentSelection::Subset(_) if !table.has_agent_field() => table.clone(),
        AgentSelection::Subset(selected) => table.filtered(|r| {
            r.agent
                .as_ref()
                .map(|a| selected.contains(a))
                .unwrap_or(false)
        }),
    }
}

/// Week filter driven by a selector label. A label that cannot be parsed
/// leaves the table unfiltered.
pub fn apply_week_label(table: &Table, label: &str) -> Table {
    match WeekToken::parse_label(label) {
        Ok(week) => filter_week(table, &week),
        Err(e) => {
            warn!("{}: {}; week filter skipped", table.name, e);
            table.clone()
        }
    }
}

/// Day filter driven by a selector label. A label that cannot be parsed
/// leaves the table unfiltered.
pub fn apply_day_label(table: &Table, label: &str) -> Table {
    match DayToken::parse_label(label) {
        Ok(day) => filter_day(table, &day),
        Err(e) => {
            warn!("{}: {}; day filter skipped", table.name, e);
            table.clone()
        }
    }
}

/// Period, week, day and agent filters in that order.
pub fn apply_filters(table: &Table, period: &PeriodSelection, agents: &AgentSelection) -> Table {
    let by_period = filter_period(table, period.year, &period.months);
    let by_week = filter_week(&by_period, &period.week);
    let by_day = filter_day(&by_week, &period.day);
    let out = filter_agents(&by_day, agents);
    debug!(
        "{}: {} rows -> period {} -> week {} -> day {} -> agents {}",
        table.name,
        table.len(),
        by_period.len(),
        by_week.len(),
        by_day.len(),
        out.len()
    );
    out
}
