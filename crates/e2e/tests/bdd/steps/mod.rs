//! Step definitions, one module per feature area

mod forms;
mod homepage;
mod login;
mod order;
mod registration;

use cucumber::gherkin::Step;

/// Rows of a step table as maps keyed by the header row
pub(crate) fn table_rows(step: &Step) -> Vec<std::collections::HashMap<String, String>> {
    let table = step.table.as_ref().expect("Step requires a data table");
    let Some((header, rows)) = table.rows.split_first() else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| {
            header
                .iter()
                .cloned()
                .zip(row.iter().map(|cell| cell.trim().to_string()))
                .collect()
        })
        .collect()
}
