//! Aggregation of filtered tables into trend series and KPI scalars, and the
//! three report views built on top of them.
use crate::calendar::{month_name, weeks_in_month};
use crate::clean::clean;
use crate::config::{ColumnAliases, ReportConfig};
use crate::exclusion::exclude_disqualified_sales;
use crate::filters::{apply_filters, filter_period};
use crate::reconcile::reconcile;
use crate::types::{
    DayToken, MonthSelection, OplansKpis, OthersKpis, PeriodSelection, SalesKpis, Table,
    TrendPoint, ViewFilters, WeekToken, ALL_DIALERS, TOTAL_AGENT, UNKNOWN_AGENT,
};
use crate::util::{average, parse_f64_safe, round_to, round_to_int, safe_ratio};
use chrono::{Datelike, NaiveDate};
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// The five source tables, loaded once and shared read-only by every view.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub attendance: Table,
    pub sales: Table,
    pub oplans: Table,
    pub others: Table,
    pub checks: Table,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub trend: Vec<TrendPoint>,
    pub kpis: SalesKpis,
    pub period_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OplansReport {
    pub trend: Vec<TrendPoint>,
    pub kpis: OplansKpis,
    pub period_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OthersReport {
    pub trend: Vec<TrendPoint>,
    pub kpis: OthersKpis,
    pub period_label: String,
}

/// Reconcile column names, then clean the records.
pub fn prepare(table: &Table, aliases: &ColumnAliases) -> Table {
    clean(&reconcile(table, aliases))
}

/// Row counts per (day, agent), sorted by day then agent. Tables without an
/// agent column are counted per day under the `TOTAL` label; blank agents in
/// an agent-bearing table count under `UNKNOWN`. Undated rows are skipped.
pub fn trend_series(table: &Table) -> Vec<TrendPoint> {
    let mut counts: BTreeMap<(NaiveDate, String), usize> = BTreeMap::new();
    for r in &table.rows {
        let Some(date) = r.date else { continue };
        let agent = if table.has_agent_field() {
            r.agent.clone().unwrap_or_else(|| UNKNOWN_AGENT.to_string())
        } else {
            TOTAL_AGENT.to_string()
        };
        *counts.entry((date, agent)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((date, agent), count)| TrendPoint { date, agent, count })
        .collect()
}

/// Number of distinct calendar days that hold at least one dated row.
pub fn distinct_days(table: &Table) -> usize {
    table
        .rows
        .iter()
        .filter_map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .len()
}

/// `total / active days`, rounded; 0 when no day has rows.
pub fn average_per_day(total: f64, table: &Table) -> i64 {
    round_to_int(safe_ratio(total, distinct_days(table) as f64))
}

/// `numerator / denominator * 100`, rounded; 0 when the denominator is 0.
pub fn percentage(numerator: usize, denominator: usize) -> i64 {
    round_to_int(safe_ratio(numerator as f64, denominator as f64) * 100.0)
}

/// Parseable numeric values of a column; blanks and text are skipped.
pub fn numeric_values(table: &Table, col: usize) -> Vec<f64> {
    table
        .rows
        .iter()
        .filter_map(|r| parse_f64_safe(Some(table.cell(r, col))))
        .collect()
}

pub fn find_attendance_column(table: &Table) -> Option<usize> {
    table.find_column(|h| h.trim() == "attendance")
}

/// Oplan status column: "opener" and "status" together, else "opener", else
/// "status".
pub fn find_oplan_status_column(table: &Table) -> Option<usize> {
    table
        .find_column(|h| h.contains("opener") && h.contains("status"))
        .or_else(|| table.find_column(|h| h.contains("opener")))
        .or_else(|| table.find_column(|h| h.contains("status")))
}

/// Check-count column of the secondary sheet: `att`, else anything mentioning
/// "attendance".
pub fn find_check_column(table: &Table) -> Option<usize> {
    table
        .find_column(|h| h.trim() == "att")
        .or_else(|| table.find_column(|h| h.contains("attendance")))
}

/// Rows whose trimmed, upper-cased status is one of `statuses`.
pub fn transfer_count(table: &Table, statuses: &[String]) -> usize {
    let Some(col) = find_oplan_status_column(table) else {
        return 0;
    };
    let allowed: BTreeSet<String> = statuses.iter().map(|s| s.trim().to_uppercase()).collect();
    table
        .rows
        .iter()
        .filter(|r| allowed.contains(&table.cell(r, col).trim().to_uppercase()))
        .count()
}

/// Attendance figures of a filtered attendance table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttendanceSummary {
    pub total: f64,
    pub avg_per_dialer: i64,
    pub avg_per_day: i64,
}

pub fn attendance_summary(table: &Table) -> AttendanceSummary {
    let Some(col) = find_attendance_column(table) else {
        return AttendanceSummary::default();
    };
    let values = numeric_values(table, col);
    let total: f64 = values.iter().sum();
    let dialers_present = table
        .rows
        .iter()
        .filter_map(|r| r.agent.as_deref())
        .collect::<BTreeSet<_>>()
        .len();
    let avg_per_dialer = if dialers_present > 0 {
        round_to_int(average(&values))
    } else {
        0
    };
    AttendanceSummary {
        total,
        avg_per_dialer,
        avg_per_day: average_per_day(total, table),
    }
}

/// Dialer selector options: "All Dialers" followed by the sorted distinct
/// agents seen in attendance for the selected year and months.
pub fn agent_options(
    attendance: &Table,
    year: i32,
    months: &MonthSelection,
    aliases: &ColumnAliases,
) -> Vec<String> {
    let prepared = prepare(attendance, aliases);
    let agents: BTreeSet<String> = filter_period(&prepared, year, months)
        .rows
        .into_iter()
        .filter_map(|r| r.agent)
        .collect();
    std::iter::once(ALL_DIALERS.to_string())
        .chain(agents)
        .collect()
}

/// Human-readable period: the day, else the week's selector label, else the
/// month names.
pub fn period_label(period: &PeriodSelection) -> String {
    if let DayToken::On(_) = period.day {
        return period.day.label();
    }
    if let WeekToken::Range { start, end } = period.week {
        return weeks_in_month(start.year(), start.month())
            .into_iter()
            .find(|w| w.token == period.week)
            .map(|w| w.label)
            .unwrap_or_else(|| {
                format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
            });
    }
    period
        .months
        .months()
        .into_iter()
        .filter_map(month_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn filtered(table: &Table, filters: &ViewFilters, config: &ReportConfig) -> Table {
    apply_filters(&prepare(table, &config.columns), &filters.period, &filters.agents)
}

pub fn sales_report(data: &Dataset, filters: &ViewFilters, config: &ReportConfig) -> SalesReport {
    let sales = exclude_disqualified_sales(
        &filtered(&data.sales, filters, config),
        &config.exclusion,
    );
    let oplans = filtered(&data.oplans, filters, config);
    let attendance = attendance_summary(&filtered(&data.attendance, filters, config));

    let total_sales = sales.len();
    let kpis = SalesKpis {
        total_sales,
        sales_percentage: percentage(total_sales, oplans.len()),
        avg_sales_per_day: average_per_day(total_sales as f64, &sales),
        avg_attendance_per_dialer: attendance.avg_per_dialer,
        avg_attendance_per_day: attendance.avg_per_day,
    };
    info!(
        "sales view {} {:?}: {} sales over {} days",
        filters.period.year,
        filters.period.months.months(),
        total_sales,
        distinct_days(&sales)
    );
    SalesReport {
        trend: trend_series(&sales),
        kpis,
        period_label: period_label(&filters.period),
    }
}

pub fn oplans_report(data: &Dataset, filters: &ViewFilters, config: &ReportConfig) -> OplansReport {
    let oplans = filtered(&data.oplans, filters, config);
    let attendance = attendance_summary(&filtered(&data.attendance, filters, config));

    let total_oplans = oplans.len();
    let transfers = transfer_count(&oplans, &config.transfer_statuses);
    let kpis = OplansKpis {
        total_oplans,
        avg_oplans_per_day: average_per_day(total_oplans as f64, &oplans),
        transfer_ratio: percentage(transfers, total_oplans),
        avg_attendance_per_day: attendance.avg_per_day,
    };
    info!(
        "oplans view {} {:?}: {} oplans, {} transfers",
        filters.period.year,
        filters.period.months.months(),
        total_oplans,
        transfers
    );
    OplansReport {
        trend: trend_series(&oplans),
        kpis,
        period_label: period_label(&filters.period),
    }
}

pub fn others_report(data: &Dataset, filters: &ViewFilters, config: &ReportConfig) -> OthersReport {
    let others = filtered(&data.others, filters, config);
    let oplans = filtered(&data.oplans, filters, config);
    let attendance = attendance_summary(&filtered(&data.attendance, filters, config));
    let checks = filtered(&data.checks, filters, config);

    let total_others = others.len();
    let total_oplans = oplans.len();
    let combined_leads = total_others + total_oplans;
    let has_checks = find_check_column(&checks)
        .map(|col| numeric_values(&checks, col).iter().any(|v| *v > 0.0))
        .unwrap_or(false);
    let avg_checks_per_agent = if has_checks {
        round_to(safe_ratio(combined_leads as f64, attendance.total), 2)
    } else {
        0.0
    };
    let kpis = OthersKpis {
        total_others,
        total_oplans,
        combined_leads,
        others_percentage: round_to(
            safe_ratio(total_others as f64, combined_leads as f64) * 100.0,
            config.others_pct_decimals,
        ),
        avg_others_per_day: average_per_day(total_others as f64, &others),
        avg_checks_per_agent,
        avg_attendance_per_day: attendance.avg_per_day,
    };
    info!(
        "others view {} {:?}: {} others, {} combined leads",
        filters.period.year,
        filters.period.months.months(),
        total_others,
        combined_leads
    );
    OthersReport {
        trend: trend_series(&others),
        kpis,
        period_label: period_label(&filters.period),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentSelection;

    fn prepared(headers: &[&str], rows: &[&[&str]]) -> Table {
        prepare(&Table::from_rows("t", headers, rows), &ColumnAliases::default())
    }

    #[test]
    fn test_trend_series_counts_and_order() {
        let table = prepared(
            &["Date", "Dialer"],
            &[
                &["2025-11-04", "SA3"],
                &["2025-11-03", "SA3"],
                &["2025-11-03", "SA2"],
                &["2025-11-03", "sa2"],
                &["2025-11-04", ""],
            ],
        );
        let trend = trend_series(&table);
        let flat: Vec<(String, &str, usize)> = trend
            .iter()
            .map(|p| (p.date.to_string(), p.agent.as_str(), p.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("2025-11-03".to_string(), "SA2", 2),
                ("2025-11-03".to_string(), "SA3", 1),
                ("2025-11-04".to_string(), "SA3", 1),
                ("2025-11-04".to_string(), "UNKNOWN", 1),
            ]
        );
        assert_eq!(trend.iter().map(|p| p.count).sum::<usize>(), table.len());
    }

    #[test]
    fn test_trend_series_without_agent_column_uses_total() {
        let table = prepared(&["Date"], &[&["2025-11-03"], &["2025-11-03"], &["2025-11-05"]]);
        let trend = trend_series(&table);
        assert_eq!(trend.len(), 2);
        assert!(trend.iter().all(|p| p.agent == TOTAL_AGENT));
        assert_eq!(trend[0].count, 2);
    }

    #[test]
    fn test_zero_safe_kpis() {
        let empty = prepared(&["Date", "Dialer"], &[]);
        assert_eq!(average_per_day(0.0, &empty), 0);
        assert_eq!(average_per_day(12.0, &empty), 0);
        assert_eq!(percentage(3, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
    }

    #[test]
    fn test_kpis_round_halves_to_even() {
        let config = ReportConfig::default();
        let filters = ViewFilters {
            period: PeriodSelection::months_only(2025, MonthSelection::Single(11)),
            agents: AgentSelection::All,
        };
        let mut oplan_rows = vec![["2025-11-03", "SA2", "Transferred"]];
        oplan_rows.extend(std::iter::repeat(["2025-11-03", "SA2", "Pending"]).take(7));
        let oplans: Vec<&[&str]> = oplan_rows.iter().map(|r| &r[..]).collect();
        let data = Dataset {
            oplans: Table::from_rows(
                "oplans",
                &["created time", "dialer", "Opener Status"],
                &oplans,
            ),
            sales: Table::from_rows(
                "sales",
                &["created time", "dialer"],
                &[
                    &["2025-11-03", "SA2"],
                    &["2025-11-03", "SA2"],
                    &["2025-11-03", "SA2"],
                    &["2025-11-04", "SA2"],
                    &["2025-11-04", "SA2"],
                ],
            ),
            ..Dataset::default()
        };
        // 1 of 8 is 12.5%.
        assert_eq!(oplans_report(&data, &filters, &config).kpis.transfer_ratio, 12);
        // 5 sales over 2 days is 2.5 per day.
        assert_eq!(sales_report(&data, &filters, &config).kpis.avg_sales_per_day, 2);
        assert_eq!(percentage(3, 8), 38);
    }

    #[test]
    fn test_average_per_day_uses_active_days() {
        let table = prepared(
            &["Date"],
            &[&["2025-11-03"], &["2025-11-03"], &["2025-11-03"], &["2025-11-10"]],
        );
        // 4 rows over 2 active days, not over the 20 business days of the month.
        assert_eq!(average_per_day(table.len() as f64, &table), 2);
    }

    #[test]
    fn test_transfer_count_picks_opener_status_column() {
        let table = prepared(
            &["Date", "Status", "Opener Status"],
            &[
                &["2025-11-03", "TRANSFERRED", " transferred "],
                &["2025-11-03", "TRANSFERRED", "Pending"],
                &["2025-11-03", "Pending", "red flags"],
            ],
        );
        let statuses = ReportConfig::default().transfer_statuses;
        assert_eq!(transfer_count(&table, &statuses), 2);
        let no_status = prepared(&["Date"], &[&["2025-11-03"]]);
        assert_eq!(transfer_count(&no_status, &statuses), 0);
    }

    #[test]
    fn test_attendance_summary() {
        let table = prepared(
            &["date", "dialer", "attendance"],
            &[
                &["2025-11-03", "SA2", "1"],
                &["2025-11-03", "SA3", "1"],
                &["2025-11-04", "SA2", "1"],
                &["2025-11-04", "SA3", "x"],
            ],
        );
        let summary = attendance_summary(&table);
        assert_eq!(summary.total, 3.0);
        assert_eq!(summary.avg_per_dialer, 1);
        // 3 attendance over 2 days is 1.5, which rounds to the even 2.
        assert_eq!(summary.avg_per_day, 2);

        let no_column = prepared(&["date", "dialer"], &[&["2025-11-03", "SA2"]]);
        assert_eq!(attendance_summary(&no_column), AttendanceSummary::default());
    }

    #[test]
    fn test_agent_options_from_attendance() {
        let attendance = Table::from_rows(
            "attendance",
            &["Date", "Dialer"],
            &[
                &["2025-11-03", "HU1"],
                &["2025-11-03", "SA2"],
                &["2025-10-31", "SA9"],
                &["2025-11-04", "none"],
            ],
        );
        let options = agent_options(
            &attendance,
            2025,
            &MonthSelection::Single(11),
            &ColumnAliases::default(),
        );
        assert_eq!(options, vec![ALL_DIALERS, "HU1", "SA2"]);
    }

    #[test]
    fn test_period_label_precedence() {
        let months = MonthSelection::new([11, 12]).unwrap();
        assert_eq!(
            period_label(&PeriodSelection::months_only(2025, months)),
            "November, December"
        );
        let day = NaiveDate::from_ymd_opt(2025, 11, 4).unwrap();
        let with_day = PeriodSelection::new(
            2025,
            MonthSelection::Single(11),
            WeekToken::All,
            DayToken::On(day),
        );
        assert_eq!(period_label(&with_day), "2025-11-04");

        let week_two = PeriodSelection::new(
            2025,
            MonthSelection::Single(11),
            WeekToken::Range {
                start: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            },
            DayToken::All,
        );
        assert_eq!(period_label(&week_two), "Week 2 (2025-11-10 to 2025-11-14)");
    }

    #[test]
    fn test_others_checks_gate() {
        let config = ReportConfig::default();
        let filters = ViewFilters {
            period: PeriodSelection::months_only(2025, MonthSelection::Single(11)),
            agents: AgentSelection::All,
        };
        let mut data = Dataset {
            attendance: Table::from_rows(
                "attendance",
                &["date", "dialer", "attendance"],
                &[&["2025-11-03", "SA2", "1"], &["2025-11-03", "SA3", "2"]],
            ),
            oplans: Table::from_rows(
                "oplans",
                &["created time", "dialer"],
                &[&["2025-11-03", "SA2"], &["2025-11-03", "SA3"]],
            ),
            others: Table::from_rows(
                "others",
                &["Date", "Other Leads Dialer"],
                &[&["2025-11-03", "SA2"]],
            ),
            checks: Table::from_rows("checks", &["Date", "att"], &[&["2025-11-03", "0"]]),
            ..Dataset::default()
        };
        let report = others_report(&data, &filters, &config);
        assert_eq!(report.kpis.combined_leads, 3);
        assert_eq!(report.kpis.others_percentage, 33.3);
        assert_eq!(report.kpis.avg_checks_per_agent, 0.0);

        data.checks = Table::from_rows("checks", &["Date", "att"], &[&["2025-11-03", "4"]]);
        let report = others_report(&data, &filters, &config);
        assert_eq!(report.kpis.avg_checks_per_agent, 1.0);
        assert_eq!(report.kpis.avg_attendance_per_day, 3);
    }
}
