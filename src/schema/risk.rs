use crate::models::RiskLevel;

/// Classify a raw alert/risk value into the bounded risk enum.
///
/// Matching is case-insensitive on the trimmed value. Anything outside the
/// known vocabulary — including an absent or empty value — collapses to
/// [`RiskLevel::Ok`]. The source alert vocabulary drifts between dataset
/// revisions; unknown means "no known risk", never a dropped record.
pub fn classify(raw: Option<&str>) -> RiskLevel {
    let value = match raw {
        Some(v) => v.trim().to_uppercase(),
        None => return RiskLevel::Ok,
    };

    match value.as_str() {
        "CRITICAL" => RiskLevel::Critical,
        "HIGH" => RiskLevel::High,
        "MEDIUM" => RiskLevel::Medium,
        "LOW" => RiskLevel::Low,
        "OK" => RiskLevel::Ok,
        _ => RiskLevel::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels() {
        assert_eq!(classify(Some("CRITICAL")), RiskLevel::Critical);
        assert_eq!(classify(Some("HIGH")), RiskLevel::High);
        assert_eq!(classify(Some("MEDIUM")), RiskLevel::Medium);
        assert_eq!(classify(Some("LOW")), RiskLevel::Low);
        assert_eq!(classify(Some("OK")), RiskLevel::Ok);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify(Some("critical")), RiskLevel::Critical);
        assert_eq!(classify(Some("  High  ")), RiskLevel::High);
    }

    #[test]
    fn test_unknown_collapses_to_ok() {
        assert_eq!(classify(Some("SEVERE")), RiskLevel::Ok);
        assert_eq!(classify(Some("ALERTA ROJA")), RiskLevel::Ok);
        assert_eq!(classify(Some("3")), RiskLevel::Ok);
    }

    #[test]
    fn test_absent_is_ok() {
        assert_eq!(classify(None), RiskLevel::Ok);
        assert_eq!(classify(Some("")), RiskLevel::Ok);
        assert_eq!(classify(Some("   ")), RiskLevel::Ok);
    }
}
