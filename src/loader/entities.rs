use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::loader::table::{read_csv_gz, RawTable};
use crate::loader::{parse_amount, parse_count};
use crate::models::Entity;
use crate::schema::{self, timeseries};

/// Load the entities table, degrading to an empty list on read failure.
/// The warning is user-visible; the rest of the run proceeds without the
/// dataset (spec'd silent-degrade behavior).
pub fn load(path: &Path) -> Vec<Entity> {
    match try_load(path) {
        Ok(entities) => entities,
        Err(e) => {
            eprintln!(
                "  {} failed to read {}: {}",
                "⚠".yellow(),
                path.display(),
                e
            );
            log::warn!("entities load failed for {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn try_load(path: &Path) -> Result<Vec<Entity>> {
    let mut table = read_csv_gz(path)?;
    schema::normalize(&mut table, schema::ENTITY_RULES);
    Ok(from_table(&table))
}

/// Map a normalized table to typed records. Canonical columns are present
/// after `normalize`, but the lookups stay defensive anyway.
fn from_table(table: &RawTable) -> Vec<Entity> {
    let (Some(name), Some(muni), Some(budget), Some(count), Some(risk), Some(annual)) = (
        table.column_index("entity_name"),
        table.column_index("municipality"),
        table.column_index("total_budget"),
        table.column_index("contract_count"),
        table.column_index("legal_risk_pct"),
        table.column_index("annual_budget"),
    ) else {
        log::warn!("entities table missing canonical columns after normalization");
        return Vec::new();
    };

    (0..table.len())
        .map(|row| Entity {
            name: non_empty(table.value(row, name), "Unknown"),
            municipality: non_empty(table.value(row, muni), "Indeterminate"),
            total_budget: parse_amount(table.value(row, budget)),
            contract_count: parse_count(table.value(row, count)),
            legal_risk_pct: parse_amount(table.value(row, risk)).clamp(0.0, 100.0),
            annual_budget: timeseries::parse_annual_budget(table.value(row, annual)),
        })
        .collect()
}

fn non_empty(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.trim().to_string()
    }
}
