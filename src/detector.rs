use std::path::{Path, PathBuf};

use crate::models::ContractorSource;

/// Known filenames for the entities table, most specific first.
const ENTITY_FILES: [&str; 3] = ["entidad_final.csv.gz", "entidades.csv.gz", "entidad.csv.gz"];

/// Known filenames for the contractor table.
const CONTRACTOR_FILES: [&str; 3] = [
    "contratista_final.csv.gz",
    "contratistas.csv.gz",
    "contratista.csv.gz",
];

/// SQLite alternatives for the contractor table (later dataset revisions).
const CONTRACTOR_DBS: [&str; 3] = ["contratista_final.db", "contratistas.db", "datos.db"];

/// Branding image shown on the PDF cover when present.
const BRANDING_FILE: &str = "logo.png";

/// Dataset files found in a data directory. Any of them may be absent;
/// loading degrades per dataset rather than failing the run.
#[derive(Debug)]
pub struct DataSources {
    pub entities: Option<PathBuf>,
    pub contractors: Option<ContractorSource>,
    pub branding: Option<PathBuf>,
}

impl DataSources {
    /// True when neither table was found at all.
    pub fn is_empty(&self) -> bool {
        self.entities.is_none() && self.contractors.is_none()
    }
}

/// Probe the data directory for known dataset filenames.
///
/// For each dataset the first existing candidate wins. The delimited file
/// is preferred over the SQLite store when both are present.
pub fn detect_sources(dir: &Path) -> DataSources {
    let entities = first_existing(dir, &ENTITY_FILES);

    let contractors = first_existing(dir, &CONTRACTOR_FILES)
        .map(ContractorSource::CsvGz)
        .or_else(|| first_existing(dir, &CONTRACTOR_DBS).map(ContractorSource::Sqlite));

    let branding = Some(dir.join(BRANDING_FILE)).filter(|p| p.exists());

    DataSources {
        entities,
        contractors,
        branding,
    }
}

fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|n| dir.join(n)).find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let sources = detect_sources(dir.path());
        assert!(sources.is_empty());
        assert!(sources.branding.is_none());
    }

    #[test]
    fn test_candidate_priority() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("entidades.csv.gz"), b"x").unwrap();
        std::fs::write(dir.path().join("entidad_final.csv.gz"), b"x").unwrap();

        let sources = detect_sources(dir.path());
        assert_eq!(
            sources.entities,
            Some(dir.path().join("entidad_final.csv.gz"))
        );
    }

    #[test]
    fn test_sqlite_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("datos.db"), b"x").unwrap();

        let sources = detect_sources(dir.path());
        assert_eq!(
            sources.contractors,
            Some(ContractorSource::Sqlite(dir.path().join("datos.db")))
        );
    }

    #[test]
    fn test_csv_preferred_over_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("datos.db"), b"x").unwrap();
        std::fs::write(dir.path().join("contratista_final.csv.gz"), b"x").unwrap();

        let sources = detect_sources(dir.path());
        assert_eq!(
            sources.contractors,
            Some(ContractorSource::CsvGz(
                dir.path().join("contratista_final.csv.gz")
            ))
        );
    }
}
