use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Contractor, Entity, RiskLevel, Verdict, VALID_YEARS};
use crate::schema::fold;

/// Record filters — the CLI surface of the dashboard's sidebar controls.
#[derive(Debug, Default)]
pub struct Filters {
    pub municipality: Option<String>,
    pub risks: Vec<RiskLevel>,
    pub entity: Option<String>,
}

impl Filters {
    pub fn is_active(&self) -> bool {
        self.municipality.is_some() || !self.risks.is_empty() || self.entity.is_some()
    }
}

/// Apply filters to both record sets.
///
/// Municipality narrows entities; risk narrows contractors; the entity-name
/// filter narrows both (contractors through their back-reference).
pub fn apply_filters(
    entities: &[Entity],
    contractors: &[Contractor],
    filters: &Filters,
) -> (Vec<Entity>, Vec<Contractor>) {
    let muni = filters.municipality.as_deref().map(fold);
    let needle = filters.entity.as_deref().map(fold);

    let entities: Vec<Entity> = entities
        .iter()
        .filter(|e| muni.as_deref().map_or(true, |m| fold(&e.municipality) == m))
        .filter(|e| needle.as_deref().map_or(true, |n| fold(&e.name).contains(n)))
        .cloned()
        .collect();

    let contractors: Vec<Contractor> = contractors
        .iter()
        .filter(|c| filters.risks.is_empty() || filters.risks.contains(&c.risk))
        .filter(|c| needle.as_deref().map_or(true, |n| fold(&c.entity).contains(n)))
        .cloned()
        .collect();

    (entities, contractors)
}

/// Whether a contractor's free-text entity field refers to this entity.
///
/// Case-insensitive substring match in either direction — the datasets
/// carry no stable key, so this inherits the source heuristic as observed,
/// false positives and all.
pub fn is_linked(contractor_entity: &str, entity_name: &str) -> bool {
    let a = fold(contractor_entity);
    let b = fold(entity_name);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

#[derive(Debug, Serialize)]
pub struct TopEntity {
    pub name: String,
    pub municipality: String,
    pub total_budget: f64,
    pub contract_count: u64,
    pub legal_risk_pct: f64,
    pub linked_contractors: usize,
}

/// The KPI block every report format renders from.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub entity_count: usize,
    pub contractor_count: usize,
    pub linked_contractors: usize,
    pub total_budget: f64,
    pub avg_legal_risk_pct: f64,
    /// Count per risk label, every level present even at zero.
    pub risk_counts: BTreeMap<String, usize>,
    pub verdict_counts: BTreeMap<String, usize>,
    /// Aggregated budget per whitelisted year.
    pub annual_budget: BTreeMap<String, f64>,
    pub top_entities: Vec<TopEntity>,
}

pub fn summarize(entities: &[Entity], contractors: &[Contractor], top: usize) -> Summary {
    let total_budget: f64 = entities.iter().map(|e| e.total_budget).sum();
    let avg_legal_risk_pct = if entities.is_empty() {
        0.0
    } else {
        entities.iter().map(|e| e.legal_risk_pct).sum::<f64>() / entities.len() as f64
    };

    let mut risk_counts: BTreeMap<String, usize> = RiskLevel::ALL
        .iter()
        .map(|r| (r.to_string(), 0))
        .collect();
    for c in contractors {
        *risk_counts.entry(c.risk.to_string()).or_insert(0) += 1;
    }

    let mut verdict_counts = BTreeMap::new();
    for v in [Verdict::Flag, Verdict::Review, Verdict::Clear] {
        verdict_counts.insert(
            v.to_string(),
            contractors.iter().filter(|c| c.verdict == v).count(),
        );
    }

    let mut annual_budget: BTreeMap<String, f64> =
        VALID_YEARS.iter().map(|y| (y.to_string(), 0.0)).collect();
    for e in entities {
        for (year, amount) in &e.annual_budget {
            if let Some(total) = annual_budget.get_mut(year) {
                *total += amount;
            }
        }
    }

    let linked_contractors = contractors
        .iter()
        .filter(|c| entities.iter().any(|e| is_linked(&c.entity, &e.name)))
        .count();

    let mut by_budget: Vec<&Entity> = entities.iter().collect();
    by_budget.sort_by(|a, b| {
        b.total_budget
            .partial_cmp(&a.total_budget)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let top_entities = by_budget
        .into_iter()
        .take(top)
        .map(|e| TopEntity {
            name: e.name.clone(),
            municipality: e.municipality.clone(),
            total_budget: e.total_budget,
            contract_count: e.contract_count,
            legal_risk_pct: e.legal_risk_pct,
            linked_contractors: contractors
                .iter()
                .filter(|c| is_linked(&c.entity, &e.name))
                .count(),
        })
        .collect();

    Summary {
        entity_count: entities.len(),
        contractor_count: contractors.len(),
        linked_contractors,
        total_budget,
        avg_legal_risk_pct,
        risk_counts,
        verdict_counts,
        annual_budget,
        top_entities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{apply_policy, Config};
    use crate::detector::detect_sources;
    use crate::loader;
    use crate::models::ContractorSource;
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

    fn entity(name: &str, muni: &str, budget: f64) -> Entity {
        Entity {
            name: name.to_string(),
            municipality: muni.to_string(),
            total_budget: budget,
            contract_count: 1,
            legal_risk_pct: 10.0,
            annual_budget: BTreeMap::new(),
        }
    }

    fn contractor(name: &str, entity: &str, risk: RiskLevel) -> Contractor {
        Contractor {
            name: name.to_string(),
            tax_id: "1".to_string(),
            risk,
            verdict: Verdict::Review,
            affiliation: "No Data".to_string(),
            health_regime: "No Data".to_string(),
            entity: entity.to_string(),
            last_contract_year: 2023,
        }
    }

    #[test]
    fn test_is_linked_substring_both_directions() {
        assert!(is_linked("ALCALDIA DE PASTO", "Alcaldía de Pasto"));
        assert!(is_linked("Pasto", "Alcaldía de Pasto"));
        assert!(is_linked("Alcaldía de Pasto - Secretaría", "Alcaldía de Pasto"));
        assert!(!is_linked("Gobernación de Nariño", "Alcaldía de Pasto"));
        assert!(!is_linked("", "Alcaldía de Pasto"));
    }

    #[test]
    fn test_filters() {
        let entities = vec![entity("A", "Pasto", 1.0), entity("B", "Cali", 2.0)];
        let contractors = vec![
            contractor("X", "A", RiskLevel::High),
            contractor("Y", "B", RiskLevel::Ok),
        ];

        let filters = Filters {
            municipality: Some("pasto".to_string()),
            risks: vec![RiskLevel::High],
            entity: None,
        };
        let (es, cs) = apply_filters(&entities, &contractors, &filters);
        assert_eq!(es.len(), 1);
        assert_eq!(cs.len(), 1);
        assert_eq!(cs[0].name, "X");
    }

    #[test]
    fn test_annual_budget_aggregation_whitelist_only() {
        let mut a = entity("A", "Pasto", 0.0);
        a.annual_budget.insert("2021".to_string(), 10.0);
        a.annual_budget.insert("2022".to_string(), 5.0);
        let mut b = entity("B", "Cali", 0.0);
        b.annual_budget.insert("2021".to_string(), 2.5);

        let summary = summarize(&[a, b], &[], 10);
        assert_eq!(summary.annual_budget["2021"], 12.5);
        assert_eq!(summary.annual_budget["2022"], 5.0);
        assert_eq!(summary.annual_budget["2023"], 0.0);
        assert_eq!(summary.annual_budget.len(), VALID_YEARS.len());
    }

    // End-to-end: detect → load → classify → policy → summarize over a
    // 3-entity / 5-contractor fixture with idiosyncratic column names.
    #[test]
    fn test_pipeline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write_csv_gz(
            &dir.path().join("entidad_final.csv.gz"),
            "entidad_nombre;municipio;presupuesto_total;num_contratos;riesgo_juridico;presupuesto_anual\n\
             Alcaldía de Pasto;Pasto;1000;10;20;{'2021': 100.0, '2022': 200.0}\n\
             Gobernación de Nariño;Pasto;2500;5;40;{'2021': 50.0}\n\
             Hospital Departamental;Cali;500;2;60;{}\n",
        );
        write_csv_gz(
            &dir.path().join("contratista_final.csv.gz"),
            "nombre_contratista;nit;alerta;entidad_contratante;ultimo_ano_contrato\n\
             ACME SAS;1;CRITICAL;Alcaldía de Pasto;2023\n\
             Beta Ltda;2;HIGH;Gobernación de Nariño;2022\n\
             Gamma SA;3;ok;Alcaldía de Pasto;2024\n\
             Delta SAS;4;desconocido;Hospital Departamental;2021\n\
             Omega Group;5;;Entidad Fantasma;2020\n",
        );

        let sources = detect_sources(dir.path());
        let entities = loader::entities::load(sources.entities.as_deref().unwrap());
        let source = sources.contractors.clone().unwrap();
        assert!(matches!(source, ContractorSource::CsvGz(_)));
        let mut contractors = loader::contractors::load(&source);

        let cfg = Config::default();
        for c in &mut contractors {
            c.verdict = apply_policy(&cfg, c.risk);
        }

        let summary = summarize(&entities, &contractors, 10);
        assert_eq!(summary.entity_count, 3);
        assert_eq!(summary.contractor_count, 5);
        assert_eq!(summary.total_budget, 4000.0);
        assert_eq!(summary.avg_legal_risk_pct, 40.0);
        assert_eq!(summary.risk_counts["CRITICAL"], 1);
        assert_eq!(summary.risk_counts["HIGH"], 1);
        // Unknown vocabulary and empty alerts all collapse to OK
        assert_eq!(summary.risk_counts["OK"], 3);
        assert_eq!(summary.verdict_counts["flag"], 2);
        assert_eq!(summary.verdict_counts["clear"], 3);
        assert_eq!(summary.annual_budget["2021"], 150.0);
        assert_eq!(summary.annual_budget["2022"], 200.0);
        // "Entidad Fantasma" matches no entity
        assert_eq!(summary.linked_contractors, 4);
        assert_eq!(summary.top_entities[0].name, "Gobernación de Nariño");
    }
}
