//! Record cleaning: normalise agent identifiers and coerce date cells.
use crate::types::{Record, Table};
use crate::util::parse_date_dayfirst;
use log::debug;

/// Trim and upper-case an agent cell. Blank, `NAN` and `NONE` mean absent.
pub fn normalize_agent(raw: &str) -> Option<String> {
    let cleaned = raw.trim().to_uppercase();
    match cleaned.as_str() {
        "" | "NAN" | "NONE" => None,
        _ => Some(cleaned),
    }
}

/// Return a copy of `table` whose records carry their canonical date and
/// agent. Rows with an unparseable date are kept here with `date: None`;
/// date-based stages drop them.
pub fn clean(table: &Table) -> Table {
    let mut out = table.empty_like();
    let mut bad_dates = 0usize;
    out.rows = table
        .rows
        .iter()
        .map(|row| {
            let mut rec = Record::new(row.cells.clone());
            if let Some(col) = table.canonical.agent {
                rec.agent = normalize_agent(table.cell(row, col));
                if let Some(cell) = rec.cells.get_mut(col) {
                    *cell = rec.agent.clone().unwrap_or_default();
                }
            }
            if let Some(col) = table.canonical.date {
                rec.date = parse_date_dayfirst(table.cell(row, col));
                if rec.date.is_none() {
                    bad_dates += 1;
                }
            }
            rec
        })
        .collect();
    if bad_dates > 0 {
        debug!("{}: {} rows with unparseable dates", table.name, bad_dates);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnAliases;
    use crate::reconcile::reconcile;
    use chrono::NaiveDate;

    #[test]
    fn test_normalize_agent() {
        assert_eq!(normalize_agent(" sa2 "), Some("SA2".to_string()));
        assert_eq!(normalize_agent("nan"), None);
        assert_eq!(normalize_agent("None"), None);
        assert_eq!(normalize_agent("   "), None);
    }

    #[test]
    fn test_clean_fills_canonical_fields() {
        let raw = Table::from_rows(
            "att",
            &["date", "dialer", "attendance"],
            &[
                &["03/11/2025", " sa2 ", "1"],
                &["garbage", "SA3", "1"],
                &["2025-11-04", "nan", "1"],
            ],
        );
        let table = clean(&reconcile(&raw, &ColumnAliases::default()));
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0].date, NaiveDate::from_ymd_opt(2025, 11, 3));
        assert_eq!(table.rows[0].agent.as_deref(), Some("SA2"));
        assert_eq!(table.rows[0].cells[1], "SA2");
        assert_eq!(table.rows[1].date, None);
        assert_eq!(table.rows[2].agent, None);
        assert_eq!(table.rows[2].cells[1], "");
    }

    #[test]
    fn test_clean_without_canonical_columns_leaves_rows_alone() {
        let raw = Table::from_rows("checks", &["att"], &[&["3"]]);
        let table = clean(&raw);
        assert_eq!(table.rows[0].cells, vec!["3"]);
        assert_eq!(table.rows[0].date, None);
        assert_eq!(table.rows[0].agent, None);
    }
}
