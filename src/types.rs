use crate::error::FilterError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use tabled::Tabled;

pub const ALL_DIALERS: &str = "All Dialers";
pub const ALL_WEEKS: &str = "All Weeks";
pub const ALL_DAYS: &str = "All Days";
/// Agent label used for trend points of tables without an agent column.
pub const TOTAL_AGENT: &str = "TOTAL";
/// Agent label for rows whose agent cell was blank.
pub const UNKNOWN_AGENT: &str = "UNKNOWN";

/// One row of a source table.
///
/// `cells` keeps the raw text in header order. `date` and `agent` are the
/// canonical values filled in by the cleaner; they stay `None` until then.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub cells: Vec<String>,
    pub date: Option<NaiveDate>,
    pub agent: Option<String>,
}

impl Record {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            date: None,
            agent: None,
        }
    }
}

/// Positions of the canonical columns, once the reconciler found them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalColumns {
    pub date: Option<usize>,
    pub agent: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
    pub canonical: CanonicalColumns,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
            canonical: CanonicalColumns::default(),
        }
    }

    /// Build a raw table from string slices. Handy for tests and fixtures.
    pub fn from_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Table::new(name, headers.iter().map(|h| h.to_string()).collect());
        table.rows = rows
            .iter()
            .map(|r| Record::new(r.iter().map(|c| c.to_string()).collect()))
            .collect();
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_date_field(&self) -> bool {
        self.canonical.date.is_some()
    }

    pub fn has_agent_field(&self) -> bool {
        self.canonical.agent.is_some()
    }

    /// First column whose lower-cased header satisfies `pred`.
    pub fn find_column<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.headers.iter().position(|h| pred(&h.to_lowercase()))
    }

    /// Cell text, or `""` when the row is shorter than the header.
    pub fn cell<'a>(&self, row: &'a Record, col: usize) -> &'a str {
        row.cells.get(col).map(String::as_str).unwrap_or("")
    }

    /// Same schema, no rows.
    pub fn empty_like(&self) -> Table {
        Table {
            name: self.name.clone(),
            headers: self.headers.clone(),
            rows: Vec::new(),
            canonical: self.canonical,
        }
    }

    /// New table holding clones of the rows for which `keep` returns true.
    pub fn filtered<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Record) -> bool,
    {
        let mut out = self.empty_like();
        out.rows = self.rows.iter().filter(|r| keep(*r)).cloned().collect();
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthSelection {
    Single(u32),
    Multiple(BTreeSet<u32>),
}

impl MonthSelection {
    pub fn new<I>(months: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut set = BTreeSet::new();
        for m in months {
            if !(1..=12).contains(&m) {
                return Err(FilterError::InvalidMonthNumber(m));
            }
            set.insert(m);
        }
        if set.len() > 1 {
            return Ok(MonthSelection::Multiple(set));
        }
        set.into_iter()
            .next()
            .map(MonthSelection::Single)
            .ok_or(FilterError::EmptyMonthSelection)
    }

    pub fn contains(&self, month: u32) -> bool {
        match self {
            MonthSelection::Single(m) => *m == month,
            MonthSelection::Multiple(set) => set.contains(&month),
        }
    }

    /// The month when exactly one is selected.
    pub fn single(&self) -> Option<u32> {
        match self {
            MonthSelection::Single(m) => Some(*m),
            MonthSelection::Multiple(set) if set.len() == 1 => set.iter().next().copied(),
            MonthSelection::Multiple(_) => None,
        }
    }

    pub fn months(&self) -> Vec<u32> {
        match self {
            MonthSelection::Single(m) => vec![*m],
            MonthSelection::Multiple(set) => set.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSelection {
    All,
    Subset(BTreeSet<String>),
}

impl AgentSelection {
    /// Build a selection from selector choices. An empty choice list or one
    /// containing the "All Dialers" sentinel means unrestricted.
    pub fn from_choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for choice in choices {
            let choice = choice.as_ref();
            if choice == ALL_DIALERS {
                return AgentSelection::All;
            }
            let cleaned = choice.trim().to_uppercase();
            if !cleaned.is_empty() {
                set.insert(cleaned);
            }
        }
        if set.is_empty() {
            AgentSelection::All
        } else {
            AgentSelection::Subset(set)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, AgentSelection::All)
    }
}

/// A Mon–Fri window inside one month, or no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekToken {
    All,
    Range { start: NaiveDate, end: NaiveDate },
}

impl WeekToken {
    /// Parse a selector label such as `Week 1 (2025-11-03 to 2025-11-07)`.
    pub fn parse_label(label: &str) -> Result<Self, FilterError> {
        let label = label.trim();
        if label == ALL_WEEKS {
            return Ok(WeekToken::All);
        }
        let invalid = || FilterError::InvalidWeekLabel(label.to_string());
        let inner = label
            .split_once('(')
            .map(|(_, rest)| rest.trim_end_matches(')'))
            .ok_or_else(invalid)?;
        let (start, end) = inner.split_once(" to ").ok_or_else(invalid)?;
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
        if end < start {
            return Err(invalid());
        }
        Ok(WeekToken::Range { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            WeekToken::All => true,
            WeekToken::Range { start, end } => *start <= date && date <= *end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayToken {
    All,
    On(NaiveDate),
}

impl DayToken {
    pub fn parse_label(label: &str) -> Result<Self, FilterError> {
        let label = label.trim();
        if label == ALL_DAYS {
            return Ok(DayToken::All);
        }
        NaiveDate::parse_from_str(label, "%Y-%m-%d")
            .map(DayToken::On)
            .map_err(|_| FilterError::InvalidDayLabel(label.to_string()))
    }

    pub fn label(&self) -> String {
        match self {
            DayToken::All => ALL_DAYS.to_string(),
            DayToken::On(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSelection {
    pub year: i32,
    pub months: MonthSelection,
    pub week: WeekToken,
    pub day: DayToken,
}

impl PeriodSelection {
    /// Week and day only apply to a single-month selection; anything that
    /// falls outside the selected month (or the selected week, for the day)
    /// is reset to unrestricted.
    pub fn new(year: i32, months: MonthSelection, week: WeekToken, day: DayToken) -> Self {
        let Some(month) = months.single() else {
            return Self {
                year,
                months,
                week: WeekToken::All,
                day: DayToken::All,
            };
        };
        let in_month = |d: NaiveDate| d.year() == year && d.month() == month;
        let week = match week {
            WeekToken::Range { start, end } if in_month(start) && in_month(end) => week,
            _ => WeekToken::All,
        };
        let day = match day {
            DayToken::On(d) if in_month(d) && week.contains(d) => day,
            _ => DayToken::All,
        };
        Self {
            year,
            months,
            week,
            day,
        }
    }

    /// Whole months, no week or day restriction.
    pub fn months_only(year: i32, months: MonthSelection) -> Self {
        Self::new(year, months, WeekToken::All, DayToken::All)
    }
}

/// The full filter state of one report view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilters {
    pub period: PeriodSelection,
    pub agents: AgentSelection,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Dialer")]
    #[tabled(rename = "Dialer")]
    pub agent: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, Default, PartialEq)]
pub struct SalesKpis {
    #[serde(rename = "TotalSales")]
    #[tabled(rename = "Total Sales Count")]
    pub total_sales: usize,
    #[serde(rename = "SalesPct")]
    #[tabled(rename = "Sales %")]
    pub sales_percentage: i64,
    #[serde(rename = "AvgSalesPerDay")]
    #[tabled(rename = "Average Sales per day")]
    pub avg_sales_per_day: i64,
    #[serde(rename = "AvgAttendancePerDialer")]
    #[tabled(rename = "Avg Attendance per Dialer")]
    pub avg_attendance_per_dialer: i64,
    #[serde(rename = "AvgAttendancePerDay")]
    #[tabled(rename = "Avg Attendance per day")]
    pub avg_attendance_per_day: i64,
}

#[derive(Debug, Serialize, Tabled, Clone, Default, PartialEq)]
pub struct OplansKpis {
    #[serde(rename = "TotalOplans")]
    #[tabled(rename = "Total Oplans Count")]
    pub total_oplans: usize,
    #[serde(rename = "AvgOplansPerDay")]
    #[tabled(rename = "Average Oplans per day")]
    pub avg_oplans_per_day: i64,
    #[serde(rename = "TransferRatio")]
    #[tabled(rename = "Transfer Ratio")]
    pub transfer_ratio: i64,
    #[serde(rename = "AvgAttendancePerDay")]
    #[tabled(rename = "Average Attendance per day")]
    pub avg_attendance_per_day: i64,
}

#[derive(Debug, Serialize, Tabled, Clone, Default, PartialEq)]
pub struct OthersKpis {
    #[serde(rename = "TotalOthers")]
    #[tabled(rename = "Total Others")]
    pub total_others: usize,
    #[serde(rename = "TotalOplans")]
    #[tabled(rename = "Total Oplans")]
    pub total_oplans: usize,
    #[serde(rename = "CombinedLeads")]
    #[tabled(rename = "Combined Leads")]
    pub combined_leads: usize,
    #[serde(rename = "OthersPct")]
    #[tabled(rename = "Others %")]
    pub others_percentage: f64,
    #[serde(rename = "AvgOthersPerDay")]
    #[tabled(rename = "Average Others per day")]
    pub avg_others_per_day: i64,
    #[serde(rename = "AvgChecksPerAgent")]
    #[tabled(rename = "Average checks per agent", display_with = "display_two_decimals")]
    pub avg_checks_per_agent: f64,
    #[serde(rename = "AvgAttendancePerDay")]
    #[tabled(rename = "Average Attendance per day")]
    pub avg_attendance_per_day: i64,
}

fn display_two_decimals(value: &f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_selection_shapes() {
        assert_eq!(MonthSelection::new([11]).unwrap(), MonthSelection::Single(11));
        let multi = MonthSelection::new([12, 11, 11]).unwrap();
        assert_eq!(multi.months(), vec![11, 12]);
        assert_eq!(multi.single(), None);
        assert!(multi.contains(12));
        assert_eq!(MonthSelection::new([]), Err(FilterError::EmptyMonthSelection));
        assert_eq!(MonthSelection::new([0]), Err(FilterError::InvalidMonthNumber(0)));
    }

    #[test]
    fn test_agent_selection_sentinels() {
        assert!(AgentSelection::from_choices(Vec::<String>::new()).is_all());
        assert!(AgentSelection::from_choices(["SA2", ALL_DIALERS]).is_all());
        let subset = AgentSelection::from_choices([" sa2 ", "SA3", ""]);
        let expected: BTreeSet<String> = ["SA2", "SA3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(subset, AgentSelection::Subset(expected));
    }

    #[test]
    fn test_week_label_parsing() {
        assert_eq!(WeekToken::parse_label(ALL_WEEKS), Ok(WeekToken::All));
        assert_eq!(
            WeekToken::parse_label("Week 1 (2025-11-03 to 2025-11-07)"),
            Ok(WeekToken::Range {
                start: d(2025, 11, 3),
                end: d(2025, 11, 7)
            })
        );
        assert!(WeekToken::parse_label("Week 1").is_err());
        assert!(WeekToken::parse_label("Week 1 (2025-11-07 to 2025-11-03)").is_err());
    }

    #[test]
    fn test_day_label_parsing() {
        assert_eq!(DayToken::parse_label(ALL_DAYS), Ok(DayToken::All));
        assert_eq!(DayToken::parse_label("2025-11-04"), Ok(DayToken::On(d(2025, 11, 4))));
        assert!(matches!(
            DayToken::parse_label("tomorrow"),
            Err(FilterError::InvalidDayLabel(_))
        ));
    }

    #[test]
    fn test_period_selection_multi_month_resets_week_and_day() {
        let week = WeekToken::Range {
            start: d(2025, 11, 3),
            end: d(2025, 11, 7),
        };
        let period = PeriodSelection::new(
            2025,
            MonthSelection::new([11, 12]).unwrap(),
            week,
            DayToken::On(d(2025, 11, 4)),
        );
        assert_eq!(period.week, WeekToken::All);
        assert_eq!(period.day, DayToken::All);
    }

    #[test]
    fn test_period_selection_drops_day_outside_week() {
        let week = WeekToken::Range {
            start: d(2025, 11, 3),
            end: d(2025, 11, 7),
        };
        let period = PeriodSelection::new(
            2025,
            MonthSelection::Single(11),
            week,
            DayToken::On(d(2025, 11, 12)),
        );
        assert_eq!(period.week, week);
        assert_eq!(period.day, DayToken::All);

        let other_month =
            PeriodSelection::new(2025, MonthSelection::Single(10), week, DayToken::All);
        assert_eq!(other_month.week, WeekToken::All);
    }
}
