//! Schema normalization: map unpredictable source column names onto the
//! canonical columns the rest of the tool depends on.
//!
//! Each canonical field carries an ordered candidate list; the first source
//! column that matches wins. When nothing matches, the column is synthesized
//! with a fixed default instead of failing — data quality problems degrade
//! the output, they never abort it.

pub mod risk;
pub mod timeseries;

use crate::loader::table::RawTable;

/// How a candidate source column is recognised. Matching is done on the
/// folded (lowercased, accent-stripped) column name.
#[derive(Debug)]
pub enum Candidate {
    /// Folded name equals this string.
    Exact(&'static str),
    /// Folded name contains every one of these fragments.
    Contains(&'static [&'static str]),
}

impl Candidate {
    fn matches(&self, folded: &str) -> bool {
        match self {
            Candidate::Exact(name) => folded == *name,
            Candidate::Contains(parts) => parts.iter().all(|p| folded.contains(p)),
        }
    }
}

/// Resolution rule for one canonical field.
#[derive(Debug)]
pub struct FieldRule {
    pub canonical: &'static str,
    pub candidates: &'static [Candidate],
    pub default: &'static str,
}

/// Canonical fields for the entities table.
pub const ENTITY_RULES: &[FieldRule] = &[
    FieldRule {
        canonical: "entity_name",
        candidates: &[
            Candidate::Contains(&["nombre", "entidad"]),
            Candidate::Exact("entidad"),
            Candidate::Exact("nombre"),
        ],
        default: "Unknown",
    },
    FieldRule {
        canonical: "municipality",
        candidates: &[
            Candidate::Exact("municipio"),
            Candidate::Exact("departamento"),
            Candidate::Contains(&["municip"]),
            Candidate::Contains(&["depart"]),
        ],
        default: "Indeterminate",
    },
    FieldRule {
        canonical: "total_budget",
        candidates: &[
            Candidate::Contains(&["presupuesto", "total"]),
            Candidate::Contains(&["valor", "total"]),
            Candidate::Exact("presupuesto"),
        ],
        default: "0",
    },
    FieldRule {
        canonical: "contract_count",
        candidates: &[
            Candidate::Contains(&["num", "contratos"]),
            Candidate::Contains(&["contratos"]),
        ],
        default: "0",
    },
    FieldRule {
        canonical: "legal_risk_pct",
        candidates: &[
            Candidate::Contains(&["riesgo", "juridico"]),
            Candidate::Contains(&["riesgo", "legal"]),
            Candidate::Contains(&["riesgo"]),
        ],
        default: "0",
    },
    FieldRule {
        canonical: "annual_budget",
        candidates: &[
            Candidate::Contains(&["presupuesto", "anual"]),
            Candidate::Contains(&["presupuesto", "historico"]),
            Candidate::Contains(&["historico"]),
        ],
        default: "{}",
    },
];

/// Canonical fields for the contractor table.
pub const CONTRACTOR_RULES: &[FieldRule] = &[
    FieldRule {
        canonical: "contractor_name",
        candidates: &[
            Candidate::Contains(&["nombre", "contratista"]),
            Candidate::Contains(&["razon", "social"]),
            Candidate::Exact("contratista"),
            Candidate::Exact("proveedor"),
            Candidate::Exact("nombre"),
        ],
        default: "Unknown",
    },
    FieldRule {
        canonical: "tax_id",
        candidates: &[
            Candidate::Exact("nit"),
            Candidate::Contains(&["documento"]),
            Candidate::Contains(&["identificacion"]),
        ],
        default: "No Data",
    },
    FieldRule {
        canonical: "risk_alert",
        candidates: &[
            Candidate::Exact("alerta"),
            Candidate::Contains(&["alerta"]),
            Candidate::Contains(&["riesgo"]),
        ],
        // Classifies to OK downstream.
        default: "",
    },
    FieldRule {
        canonical: "affiliation",
        candidates: &[
            Candidate::Contains(&["afiliacion"]),
            Candidate::Contains(&["estado", "afil"]),
        ],
        default: "No Data",
    },
    FieldRule {
        canonical: "health_regime",
        candidates: &[
            Candidate::Contains(&["regimen"]),
            Candidate::Contains(&["salud"]),
        ],
        default: "No Data",
    },
    FieldRule {
        canonical: "entity_ref",
        candidates: &[
            Candidate::Contains(&["entidad", "contratante"]),
            Candidate::Contains(&["entidad"]),
        ],
        default: "Unknown",
    },
    FieldRule {
        canonical: "last_contract_year",
        candidates: &[
            Candidate::Contains(&["ultimo", "ano"]),
            Candidate::Contains(&["ano", "contrato"]),
            Candidate::Contains(&["anio"]),
            Candidate::Contains(&["year"]),
        ],
        default: "2024",
    },
];

/// Lowercase and strip the accents that show up in the source headers.
/// The files arrive in mixed encodings, so headers like `Año` and `AÑO`
/// must land on the same key.
pub fn fold(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            'ü' => 'u',
            _ => c,
        })
        .collect()
}

/// Index of the source column satisfying `rule`, if any.
///
/// The canonical name itself always matches first, so re-normalizing an
/// already-normalized table is a no-op.
pub fn resolve(table: &RawTable, rule: &FieldRule) -> Option<usize> {
    let folded: Vec<String> = table.columns.iter().map(|c| fold(c)).collect();

    if let Some(i) = folded.iter().position(|c| c == rule.canonical) {
        return Some(i);
    }
    for candidate in rule.candidates {
        if let Some(i) = folded.iter().position(|c| candidate.matches(c)) {
            return Some(i);
        }
    }
    None
}

/// Add every canonical column named by `rules` to the table.
///
/// Resolved fields are duplicated under their canonical name; unresolved
/// fields are synthesized with the rule default. Source columns are never
/// removed or renamed, so nothing downstream can lose data it did not ask
/// for.
pub fn normalize(table: &mut RawTable, rules: &[FieldRule]) {
    for rule in rules {
        match resolve(table, rule) {
            Some(i) if fold(&table.columns[i]) == rule.canonical => {}
            Some(i) => {
                let values: Vec<String> = (0..table.len())
                    .map(|r| table.value(r, i).to_string())
                    .collect();
                table.push_column(rule.canonical, values);
            }
            None => {
                log::warn!(
                    "no source column for '{}'; synthesizing default '{}'",
                    rule.canonical,
                    rule.default
                );
                let values = vec![rule.default.to_string(); table.len()];
                table.push_column(rule.canonical, values);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_exact_canonical_wins() {
        let t = table(&["entity_name", "nombre_entidad"], &[&["a", "b"]]);
        let i = resolve(&t, &ENTITY_RULES[0]).unwrap();
        assert_eq!(t.columns[i], "entity_name");
    }

    #[test]
    fn test_fallback_contains_match() {
        let t = table(&["id", "entidad_nombre"], &[&["1", "Alcaldía de Pasto"]]);
        let i = resolve(&t, &ENTITY_RULES[0]).unwrap();
        assert_eq!(t.columns[i], "entidad_nombre");
    }

    #[test]
    fn test_accented_header_matches() {
        let t = table(&["AÑO ÚLTIMO CONTRATO"], &[&["2023"]]);
        let rule = &CONTRACTOR_RULES[6];
        assert_eq!(rule.canonical, "last_contract_year");
        assert!(resolve(&t, rule).is_some());
    }

    #[test]
    fn test_missing_column_synthesized() {
        let mut t = table(&["entidad_nombre"], &[&["a"], &["b"]]);
        normalize(&mut t, ENTITY_RULES);

        let i = t.column_index("municipality").unwrap();
        assert_eq!(t.value(0, i), "Indeterminate");
        assert_eq!(t.value(1, i), "Indeterminate");
    }

    #[test]
    fn test_source_columns_preserved() {
        let mut t = table(&["entidad_nombre", "extra"], &[&["a", "x"]]);
        let before = t.columns.clone();
        normalize(&mut t, ENTITY_RULES);

        for col in before {
            assert!(t.column_index(&col).is_some(), "lost column {}", col);
        }
        assert_eq!(t.value(0, t.column_index("entity_name").unwrap()), "a");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut t = table(&["entidad_nombre"], &[&["a"]]);
        normalize(&mut t, ENTITY_RULES);
        let cols = t.columns.len();
        normalize(&mut t, ENTITY_RULES);
        assert_eq!(t.columns.len(), cols);
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold("  AÑO Jurídico "), "ano juridico");
    }
}
