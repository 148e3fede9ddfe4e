//! Removal of returned or rejected leads from the sales table.
use crate::config::ExclusionRule;
use crate::types::Table;
use log::debug;

/// First column whose header mentions "client".
pub fn find_client_column(table: &Table) -> Option<usize> {
    table.find_column(|h| h.contains("client"))
}

/// Closing status column: a header mentioning both "closing" and "status",
/// else one of the plain status spellings.
pub fn find_closing_status_column(table: &Table) -> Option<usize> {
    table
        .find_column(|h| h.contains("closing") && h.contains("status"))
        .or_else(|| {
            table.find_column(|h| {
                matches!(
                    h.trim(),
                    "closing status" | "closing_status" | "status" | "closingstatus"
                )
            })
        })
}

/// Drop sales rows whose client names a disqualifying campaign or whose
/// closing status marks the lead as returned. A missing column disables the
/// matching half of the rule.
pub fn exclude_disqualified_sales(table: &Table, rule: &ExclusionRule) -> Table {
    let client_col = find_client_column(table);
    let status_col = find_closing_status_column(table);
    let clients: Vec<String> = rule
        .disqualifying_clients
        .iter()
        .map(|c| c.to_lowercase())
        .collect();
    let statuses: Vec<String> = rule
        .disqualified_statuses
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let out = table.filtered(|r| {
        let bad_client = client_col
            .map(|col| {
                let value = table.cell(r, col).to_lowercase();
                clients.iter().any(|c| value.contains(c.as_str()))
            })
            .unwrap_or(false);
        let bad_status = status_col
            .map(|col| {
                let value = table.cell(r, col).to_lowercase();
                statuses.iter().any(|s| *s == value)
            })
            .unwrap_or(false);
        !(bad_client || bad_status)
    });
    debug!(
        "{}: excluded {} disqualified rows",
        table.name,
        table.len() - out.len()
    );
    out
}
