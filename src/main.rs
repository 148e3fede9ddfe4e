// Entry point and interactive console flow.
//
// - Option [1] loads the five CSV exports and prints load diagnostics.
// - Options [2]-[4] ask for year, months, week, day and dialers, then print
//   the KPIs and trend of the Sales, Oplans or Others view and export them.
// - After a report the user can go back to the selection menu or exit.
use dialer_report::calendar::{days_in_period, labels, month_name, weeks_in_month};
use dialer_report::output;
use dialer_report::util::{format_int, parse_i32_safe};
use dialer_report::{
    agent_options, load_dataset, month_from_name, oplans_report, others_report, sales_report,
    AgentSelection, Dataset, DayToken, MonthSelection, PeriodSelection, ReportConfig, TrendPoint,
    ViewFilters, WeekToken,
};
use log::{info, warn};
use std::io::{self, Write};
use std::path::PathBuf;

const CONFIG_FILE: &str = "dialer_report.json";

/// Everything loaded at startup. Built once and handed to each report by
/// reference.
struct AppState {
    data_dir: PathBuf,
    config: ReportConfig,
    data: Option<Dataset>,
}

#[derive(Clone, Copy)]
enum View {
    Sales,
    Oplans,
    Others,
}

impl View {
    fn title(self) -> &'static str {
        match self {
            View::Sales => "Sales Performance",
            View::Oplans => "Oplans Performance",
            View::Others => "Others Performance",
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            View::Sales => "sales",
            View::Oplans => "oplans",
            View::Others => "others",
        }
    }
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Pick one entry of a numbered list; blank input picks the first entry.
fn pick_one(title: &str, options: &[String]) -> usize {
    println!("{}:", title);
    for (idx, opt) in options.iter().enumerate() {
        println!("  [{}] {}", idx, opt);
    }
    loop {
        let input = read_choice();
        if input.is_empty() {
            return 0;
        }
        match input.parse::<usize>() {
            Ok(idx) if idx < options.len() => return idx,
            _ => println!("Invalid choice. Enter a number between 0 and {}.", options.len() - 1),
        }
    }
}

fn load_state() -> AppState {
    let data_dir = std::env::var("DIALER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    let config_path = data_dir.join(CONFIG_FILE);
    let config = if config_path.exists() {
        match ReportConfig::load(&config_path) {
            Ok(c) => {
                info!("using config {}", config_path.display());
                c
            }
            Err(e) => {
                warn!("ignoring {}: {}", config_path.display(), e);
                ReportConfig::default()
            }
        }
    } else {
        ReportConfig::default()
    };
    AppState {
        data_dir,
        config,
        data: None,
    }
}

/// Handle option [1]: load the five CSV files.
fn handle_load(state: &mut AppState) {
    match load_dataset(&state.data_dir, &state.config.files) {
        Ok((data, reports)) => {
            for r in &reports {
                println!(
                    "{}: {} rows loaded ({} skipped due to parse errors)",
                    r.table,
                    format_int(r.loaded_rows),
                    format_int(r.parse_errors)
                );
            }
            println!();
            state.data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load files: {}\n", e);
        }
    }
}

fn ask_year(config: &ReportConfig) -> i32 {
    let options: Vec<String> = config.years.iter().map(|y| y.to_string()).collect();
    let idx = pick_one("Select Year", &options);
    parse_i32_safe(options.get(idx).map(String::as_str))
        .or_else(|| config.years.first().copied())
        .unwrap_or(2025)
}

fn ask_months(config: &ReportConfig) -> MonthSelection {
    let default = month_name(config.default_month).unwrap_or("November");
    loop {
        let input = prompt(&format!(
            "Select Month(s), comma separated [{}]: ",
            default
        ));
        if input.is_empty() {
            return MonthSelection::Single(config.default_month);
        }
        let parsed: Result<Vec<u32>, _> = input
            .split(',')
            .map(|m| {
                let m = m.trim();
                m.parse::<u32>().or_else(|_| month_from_name(m))
            })
            .collect();
        match parsed.map(MonthSelection::new) {
            Ok(Ok(months)) => return months,
            Ok(Err(e)) | Err(e) => println!("{}", e),
        }
    }
}

fn ask_filters(state: &AppState, data: &Dataset) -> ViewFilters {
    let config = &state.config;
    let year = ask_year(config);
    let months = ask_months(config);

    let (week, day) = match months.single() {
        Some(month) => {
            let weeks = weeks_in_month(year, month);
            let week = weeks[pick_one("Select Week", &labels(&weeks))].token;
            let days = days_in_period(year, month, &week);
            let day = days[pick_one("Select Day", &labels(&days))].token;
            (week, day)
        }
        None => {
            println!("Week and Day selection disabled for multiple months.");
            (WeekToken::All, DayToken::All)
        }
    };

    let dialers = agent_options(&data.attendance, year, &months, &config.columns);
    println!("Select Dialer(s):");
    for (idx, d) in dialers.iter().enumerate() {
        println!("  [{}] {}", idx, d);
    }
    let input = prompt("Enter choices, comma separated [0]: ");
    let chosen: Vec<&str> = input
        .split(',')
        .filter_map(|c| c.trim().parse::<usize>().ok())
        .filter_map(|idx| dialers.get(idx).map(String::as_str))
        .collect();

    ViewFilters {
        period: PeriodSelection::new(year, months, week, day),
        agents: AgentSelection::from_choices(chosen),
    }
}

fn export(state: &AppState, view: View, trend: &[TrendPoint], kpis: &impl serde::Serialize) {
    let trend_file = state.data_dir.join(format!("{}_trend.csv", view.file_stem()));
    if let Err(e) = output::write_csv(&trend_file, trend) {
        eprintln!("Write error: {}", e);
    }
    let kpi_file = state.data_dir.join(format!("{}_kpis.json", view.file_stem()));
    if let Err(e) = output::write_json(&kpi_file, kpis) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "(Full trend exported to {}, KPIs to {})\n",
        trend_file.display(),
        kpi_file.display()
    );
}

fn print_trend(view: View, trend: &[TrendPoint], period_label: &str) {
    if trend.is_empty() {
        println!(
            "No {} data found for the selected period ({}).\n",
            view.file_stem(),
            period_label
        );
        return;
    }
    println!("Trend ({}):", period_label);
    output::preview_table_rows(trend, 10);
}

/// Handle options [2]-[4]: ask for filters, then print and export one view.
fn handle_report(state: &AppState, view: View) {
    let Some(data) = state.data.as_ref() else {
        println!("Error: No data loaded. Please load the files first (option 1).\n");
        return;
    };
    let filters = ask_filters(state, data);
    println!("\n{}\n", view.title());
    match view {
        View::Sales => {
            let report = sales_report(data, &filters, &state.config);
            output::preview_table_rows(&[report.kpis.clone()], 1);
            print_trend(view, &report.trend, &report.period_label);
            export(state, view, &report.trend, &report.kpis);
        }
        View::Oplans => {
            let report = oplans_report(data, &filters, &state.config);
            output::preview_table_rows(&[report.kpis.clone()], 1);
            print_trend(view, &report.trend, &report.period_label);
            export(state, view, &report.trend, &report.kpis);
        }
        View::Others => {
            let report = others_report(data, &filters, &state.config);
            output::preview_table_rows(&[report.kpis.clone()], 1);
            print_trend(view, &report.trend, &report.period_label);
            export(state, view, &report.trend, &report.kpis);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let mut state = load_state();

    loop {
        println!("Dialers Performance");
        println!("[1] Load the files");
        println!("[2] Sales Performance");
        println!("[3] Oplans Performance");
        println!("[4] Others Performance\n");
        let view = match read_choice().as_str() {
            "1" => {
                handle_load(&mut state);
                continue;
            }
            "2" => View::Sales,
            "3" => View::Oplans,
            "4" => View::Others,
            _ => {
                println!("Invalid choice. Please enter 1, 2, 3 or 4.\n");
                continue;
            }
        };
        println!();
        handle_report(&state, view);
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
}
