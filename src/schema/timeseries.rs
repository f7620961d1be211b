use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::VALID_YEARS;

/// Parse the embedded per-entity annual-budget field.
///
/// The source serializes a year → amount mapping with non-standard quoting,
/// e.g. `{'2021': 1500000.0, '2022': 2300000.5}`; some revisions use double
/// quotes, some quote the amounts too. Quoted year keys and their numeric
/// values are extracted pairwise; everything else is ignored.
///
/// Only years in [`VALID_YEARS`] are kept. Malformed input yields an empty
/// map — parse problems degrade the chart, they never fail the load.
pub fn parse_annual_budget(raw: &str) -> BTreeMap<String, f64> {
    static PAIR: OnceLock<Option<Regex>> = OnceLock::new();
    // '2021': 123.45  |  "2021": "123.45"
    let pair = PAIR.get_or_init(|| {
        Regex::new(r#"["']([0-9]{4})["']\s*:\s*["']?(-?[0-9]+(?:\.[0-9]+)?)"#).ok()
    });

    let mut out = BTreeMap::new();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return out;
    }
    let Some(pair) = pair else {
        return out;
    };

    for caps in pair.captures_iter(trimmed) {
        let year = &caps[1];
        if !VALID_YEARS.contains(&year) {
            continue;
        }
        match caps[2].parse::<f64>() {
            Ok(amount) => {
                out.insert(year.to_string(), amount);
            }
            Err(e) => {
                log::debug!("unparsable annual-budget amount '{}': {}", &caps[2], e);
            }
        }
    }

    if out.is_empty() && !trimmed.is_empty() && trimmed != "{}" {
        log::debug!("annual-budget field yielded no usable pairs: {:.60}", trimmed);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quoted() {
        let map = parse_annual_budget("{'2021': 1500000.0, '2022': 2300000.5}");
        assert_eq!(map.len(), 2);
        assert_eq!(map["2021"], 1_500_000.0);
        assert_eq!(map["2022"], 2_300_000.5);
    }

    #[test]
    fn test_double_quoted_values() {
        let map = parse_annual_budget(r#"{"2023": "750000", "2024": "125.5"}"#);
        assert_eq!(map["2023"], 750_000.0);
        assert_eq!(map["2024"], 125.5);
    }

    #[test]
    fn test_non_whitelisted_years_dropped() {
        let map = parse_annual_budget("{'2019': 10.0, '2021': 20.0, '2030': 30.0}");
        assert_eq!(map.len(), 1);
        assert_eq!(map["2021"], 20.0);
    }

    #[test]
    fn test_malformed_is_empty() {
        assert!(parse_annual_budget("").is_empty());
        assert!(parse_annual_budget("{}").is_empty());
        assert!(parse_annual_budget("not a mapping at all").is_empty());
        assert!(parse_annual_budget("{2021: }").is_empty());
        assert!(parse_annual_budget("{'sin datos': 'n/a'}").is_empty());
    }

    #[test]
    fn test_values_preserved_exactly() {
        let map = parse_annual_budget("{'2022': 0.1}");
        assert_eq!(map["2022"], 0.1);
        let map = parse_annual_budget("{'2022': -500}");
        assert_eq!(map["2022"], -500.0);
    }
}
