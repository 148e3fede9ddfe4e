use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names of the canonical fields and the source column names that map onto them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub date_field: String,
    pub agent_field: String,
    /// Matched case-insensitively.
    pub date_aliases: Vec<String>,
    /// Matched exactly; spreadsheet exports are inconsistent about casing and
    /// the known variants are listed individually.
    pub agent_aliases: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            date_field: "created time".to_string(),
            agent_field: "dialer".to_string(),
            date_aliases: to_strings(&[
                "created time",
                "Created Time",
                "Created time",
                "Date",
                "date",
                "Timestamp",
            ]),
            agent_aliases: to_strings(&[
                "dialer",
                "Dialer",
                "Agent",
                "agent",
                "sales_rep",
                "Other Leads Dialer",
            ]),
        }
    }
}

/// Sales rows matching either list are returned/rejected leads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionRule {
    /// Case-insensitive substrings of the client column.
    pub disqualifying_clients: Vec<String>,
    /// Case-insensitive exact values of the closing status column.
    pub disqualified_statuses: Vec<String>,
}

impl Default for ExclusionRule {
    fn default() -> Self {
        Self {
            disqualifying_clients: to_strings(&["PPO-Braces chasing"]),
            disqualified_statuses: to_strings(&["Retransfer to client", "Rejected by client"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub attendance: String,
    pub sales: String,
    pub oplans: String,
    pub others: String,
    pub checks: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            attendance: "Dialers Attendance.csv".to_string(),
            sales: "sales.csv".to_string(),
            oplans: "O_Plan_Leads.csv".to_string(),
            others: "Other_Leads.csv".to_string(),
            checks: "sheet2.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub columns: ColumnAliases,
    pub exclusion: ExclusionRule,
    /// Upper-cased oplan statuses counted as a successful transfer.
    pub transfer_statuses: Vec<String>,
    pub others_pct_decimals: u32,
    pub years: Vec<i32>,
    pub default_month: u32,
    pub files: DataFiles,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            columns: ColumnAliases::default(),
            exclusion: ExclusionRule::default(),
            transfer_statuses: to_strings(&["TRANSFERRED", "GREEN FLAG", "RED FLAGS"]),
            others_pct_decimals: 1,
            years: vec![2025, 2026],
            default_month: 11,
            files: DataFiles::default(),
        }
    }
}

impl ReportConfig {
    /// Read a JSON config file. Missing keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.default_month) {
            return Err(ReportError::InvalidConfig(format!(
                "default_month {} is not a calendar month",
                self.default_month
            )));
        }
        if self.years.is_empty() {
            return Err(ReportError::InvalidConfig("years must not be empty".to_string()));
        }
        if self.columns.date_field.trim().is_empty() || self.columns.agent_field.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "canonical field names must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
