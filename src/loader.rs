use crate::config::DataFiles;
use crate::error::{ReportError, Result};
use crate::reports::Dataset;
use crate::types::{Record, Table};
use csv::ReaderBuilder;
use log::{info, warn};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub table: String,
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Read a CSV export into a raw table. Header names are kept as written
/// (surrounding whitespace trimmed); short rows are padded with empty cells.
pub fn load_table(name: &str, path: impl AsRef<Path>) -> Result<(Table, LoadReport)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ReportError::MissingFile(path.display().to_string()));
    }
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();
    let mut table = Table::new(name, headers);
    let mut report = LoadReport {
        table: name.to_string(),
        ..LoadReport::default()
    };

    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.parse_errors += 1;
                continue;
            }
        };
        let mut cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        table.rows.push(Record::new(cells));
    }
    report.loaded_rows = table.len();
    if report.parse_errors > 0 {
        warn!("{}: skipped {} malformed rows", name, report.parse_errors);
    }
    info!("{}: loaded {} rows from {}", name, report.loaded_rows, path.display());
    Ok((table, report))
}

/// Load the five tables from `dir`.
pub fn load_dataset(
    dir: impl AsRef<Path>,
    files: &DataFiles,
) -> Result<(Dataset, Vec<LoadReport>)> {
    let dir = dir.as_ref();
    let (attendance, r1) = load_table("attendance", dir.join(&files.attendance))?;
    let (sales, r2) = load_table("sales", dir.join(&files.sales))?;
    let (oplans, r3) = load_table("oplans", dir.join(&files.oplans))?;
    let (others, r4) = load_table("others", dir.join(&files.others))?;
    let (checks, r5) = load_table("checks", dir.join(&files.checks))?;
    let data = Dataset {
        attendance,
        sales,
        oplans,
        others,
        checks,
    };
    Ok((data, vec![r1, r2, r3, r4, r5]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("dialer_report_{}_{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_table_pads_and_skips_blank_rows() {
        let dir = scratch_dir("load_table");
        let path = dir.join("sales.csv");
        fs::write(
            &path,
            " Created Time ,Dialer,Client\n03/11/2025,sa2,Acme\n04/11/2025,SA3\n,,\n",
        )
        .unwrap();
        let (table, report) = load_table("sales", &path).unwrap();
        assert_eq!(table.headers, vec!["Created Time", "Dialer", "Client"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].cells, vec!["04/11/2025", "SA3", ""]);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.loaded_rows, 2);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = scratch_dir("missing");
        let err = load_table("sales", dir.join("nope.csv")).unwrap_err();
        assert!(matches!(err, ReportError::MissingFile(_)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_dataset_reads_all_five_tables() {
        let dir = scratch_dir("dataset");
        let files = DataFiles::default();
        fs::write(
            dir.join(&files.attendance),
            "date,dialer,attendance\n2025-11-03,SA2,1\n",
        )
        .unwrap();
        fs::write(dir.join(&files.sales), "created time,dialer\n2025-11-03,SA2\n").unwrap();
        fs::write(dir.join(&files.oplans), "created time,dialer,Opener Status\n").unwrap();
        fs::write(dir.join(&files.others), "Date,Other Leads Dialer\n2025-11-03,SA2\n").unwrap();
        fs::write(dir.join(&files.checks), "Date,att\n2025-11-03,2\n").unwrap();
        let (data, reports) = load_dataset(&dir, &files).unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(data.attendance.len(), 1);
        assert!(data.oplans.is_empty());
        assert_eq!(data.checks.headers, vec!["Date", "att"]);
        fs::remove_dir_all(&dir).ok();
    }
}
