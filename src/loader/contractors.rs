use anyhow::Result;
use colored::Colorize;

use crate::loader::table::{read_csv_gz, read_sqlite, RawTable};
use crate::models::{Contractor, ContractorSource, Verdict, FALLBACK_YEAR};
use crate::schema::{self, risk};

/// Load the contractor table from either source kind, degrading to an
/// empty list on read failure.
pub fn load(source: &ContractorSource) -> Vec<Contractor> {
    match try_load(source) {
        Ok(contractors) => contractors,
        Err(e) => {
            eprintln!("  {} failed to read {}: {}", "⚠".yellow(), source, e);
            log::warn!("contractors load failed for {}: {}", source, e);
            Vec::new()
        }
    }
}

fn try_load(source: &ContractorSource) -> Result<Vec<Contractor>> {
    let mut table = match source {
        ContractorSource::CsvGz(path) => read_csv_gz(path)?,
        ContractorSource::Sqlite(path) => read_sqlite(path)?,
    };
    schema::normalize(&mut table, schema::CONTRACTOR_RULES);
    Ok(from_table(&table))
}

fn from_table(table: &RawTable) -> Vec<Contractor> {
    let (Some(name), Some(tax), Some(alert), Some(affil), Some(regime), Some(entity), Some(year)) = (
        table.column_index("contractor_name"),
        table.column_index("tax_id"),
        table.column_index("risk_alert"),
        table.column_index("affiliation"),
        table.column_index("health_regime"),
        table.column_index("entity_ref"),
        table.column_index("last_contract_year"),
    ) else {
        log::warn!("contractor table missing canonical columns after normalization");
        return Vec::new();
    };

    (0..table.len())
        .map(|row| Contractor {
            name: non_empty(table.value(row, name), "Unknown"),
            tax_id: non_empty(table.value(row, tax), "No Data"),
            risk: risk::classify(Some(table.value(row, alert))),
            // Verdict is assigned by the policy pass in main.
            verdict: Verdict::Review,
            affiliation: non_empty(table.value(row, affil), "No Data"),
            health_regime: non_empty(table.value(row, regime), "No Data"),
            entity: non_empty(table.value(row, entity), "Unknown"),
            last_contract_year: parse_year(table.value(row, year)),
        })
        .collect()
}

fn parse_year(raw: &str) -> i32 {
    let trimmed = raw.trim();
    trimmed
        .parse::<i32>()
        .or_else(|_| trimmed.parse::<f64>().map(|f| f as i32))
        .ok()
        .filter(|y| (1990..=2100).contains(y))
        .unwrap_or(FALLBACK_YEAR)
}

fn non_empty(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::path::Path;

    fn write_csv_gz(path: &Path, content: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(content.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn test_load_csv_with_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contratista_final.csv.gz");
        write_csv_gz(
            &path,
            "nombre_contratista;nit;alerta;entidad_contratante;ultimo_ano_contrato\n\
             ACME SAS;900123-1;HIGH;Alcaldía de Pasto;2023\n\
             Beta Ltda;800456-7;sin alerta;Gobernación de Nariño;\n",
        );

        let contractors = load(&ContractorSource::CsvGz(path));
        assert_eq!(contractors.len(), 2);
        assert_eq!(contractors[0].risk, RiskLevel::High);
        assert_eq!(contractors[0].last_contract_year, 2023);
        // Unknown vocabulary collapses to OK; missing year takes the fallback
        assert_eq!(contractors[1].risk, RiskLevel::Ok);
        assert_eq!(contractors[1].last_contract_year, FALLBACK_YEAR);
        assert_eq!(contractors[1].affiliation, "No Data");
    }

    #[test]
    fn test_no_risk_column_all_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contratistas.csv.gz");
        write_csv_gz(
            &path,
            "nombre_contratista;nit\nUno;1\nDos;2\nTres;3\nCuatro;4\nCinco;5\n",
        );

        let contractors = load(&ContractorSource::CsvGz(path));
        assert_eq!(contractors.len(), 5);
        for c in &contractors {
            assert_eq!(c.risk, RiskLevel::Ok);
        }
    }

    #[test]
    fn test_load_from_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE contratistas (
                     nombre_contratista TEXT, nit TEXT, alerta TEXT,
                     entidad TEXT, anio_ultimo_contrato INTEGER
                 );
                 INSERT INTO contratistas VALUES
                     ('ACME SAS', '900123', 'CRITICAL', 'Alcaldía de Pasto', 2022);",
            )
            .unwrap();
        }

        let contractors = load(&ContractorSource::Sqlite(path));
        assert_eq!(contractors.len(), 1);
        assert_eq!(contractors[0].risk, RiskLevel::Critical);
        assert_eq!(contractors[0].entity, "Alcaldía de Pasto");
        assert_eq!(contractors[0].last_contract_year, 2022);
    }

    #[test]
    fn test_parse_year_bounds() {
        assert_eq!(parse_year("2023"), 2023);
        assert_eq!(parse_year("2023.0"), 2023);
        assert_eq!(parse_year("0"), FALLBACK_YEAR);
        assert_eq!(parse_year("yes"), FALLBACK_YEAR);
    }
}
