//! Column reconciliation: find the date-like and agent-like columns of a table
//! under whatever name the export used, and rename them to the canonical names.
use crate::config::ColumnAliases;
use crate::types::{CanonicalColumns, Table};
use log::debug;

/// Position of the first header matching a date alias, case-insensitively.
/// The canonical name itself always counts as a match.
pub fn find_date_column(table: &Table, aliases: &ColumnAliases) -> Option<usize> {
    let canonical = aliases.date_field.to_lowercase();
    std::iter::once(&canonical)
        .chain(aliases.date_aliases.iter())
        .find_map(|alias| {
            let alias = alias.to_lowercase();
            table.headers.iter().position(|h| h.to_lowercase() == alias)
        })
}

/// Position of the first header matching an agent alias exactly.
pub fn find_agent_column(table: &Table, aliases: &ColumnAliases) -> Option<usize> {
    std::iter::once(&aliases.agent_field)
        .chain(aliases.agent_aliases.iter())
        .find_map(|alias| table.headers.iter().position(|h| h == alias))
}

/// Return a copy of `table` with its date and agent columns renamed to the
/// canonical names. A column that cannot be found stays unmapped and the
/// later stages treat that axis as unfilterable.
pub fn reconcile(table: &Table, aliases: &ColumnAliases) -> Table {
    let mut out = table.clone();
    let date = find_date_column(table, aliases);
    let agent = find_agent_column(table, aliases).filter(|idx| Some(*idx) != date);

    if let Some(idx) = date {
        out.headers[idx] = aliases.date_field.clone();
    }
    if let Some(idx) = agent {
        out.headers[idx] = aliases.agent_field.clone();
    }
    out.canonical = CanonicalColumns { date, agent };

    if date.is_none() {
        debug!("{}: no date column among {:?}", table.name, table.headers);
    }
    if agent.is_none() {
        debug!("{}: no agent column among {:?}", table.name, table.headers);
    }
    out
}
