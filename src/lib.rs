//! # Dialer Report
//!
//! Normalisation, filtering and aggregation of call-center dialer records
//! (attendance, sales, lead-transfer "oplans", other leads and a check-count
//! sheet) into per-day, per-dialer trend series and KPI scalars.
//!
//! ## Pipeline
//!
//! raw table → [`reconcile`](reconcile::reconcile) → [`clean`](clean::clean)
//! → period → week → day → agent filters → sales exclusion (sales only)
//! → [`trend_series`](reports::trend_series) and the KPI builders in
//! [`reports`].
//!
//! Every stage borrows its input and returns a new [`Table`]; none of them
//! fails. Missing columns degrade the stage to a no-op or an empty result and
//! every KPI falls back to zero.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dialer_report::*;
//!
//! let config = ReportConfig::default();
//! let (data, _) = load_dataset("./data", &config.files)?;
//! let filters = ViewFilters {
//!     period: PeriodSelection::months_only(2025, MonthSelection::Single(11)),
//!     agents: AgentSelection::All,
//! };
//! let report = sales_report(&data, &filters, &config);
//! println!("{} sales", report.kpis.total_sales);
//! ```

pub mod calendar;
pub mod clean;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod filters;
pub mod loader;
pub mod output;
pub mod reconcile;
pub mod reports;
pub mod types;
pub mod util;

pub use calendar::{
    days_in_period, month_from_name, weeks_in_month, weeks_in_named_month, DayOption, WeekOption,
};
pub use config::{ColumnAliases, DataFiles, ExclusionRule, ReportConfig};
pub use error::{FilterError, ReportError, Result};
pub use loader::{load_dataset, load_table, LoadReport};
pub use reports::{
    agent_options, oplans_report, others_report, prepare, sales_report, trend_series, Dataset,
    OplansReport, OthersReport, SalesReport,
};
pub use types::*;
