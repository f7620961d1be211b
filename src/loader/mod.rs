pub mod contractors;
pub mod entities;
pub mod table;

/// Parse a monetary amount out of the messy source formats.
///
/// Handles `$` prefixes, spaces, and both regional conventions:
/// `1.500.000,50` (dot thousands, comma decimal) and `1500000.50`.
/// Anything unparsable becomes 0.0.
pub(crate) fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    let normalized = if cleaned.contains(',') {
        // Comma present → treat dots as thousands separators.
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    match normalized.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            log::debug!("unparsable amount '{}', defaulting to 0", raw);
            0.0
        }
    }
}

/// Parse an integer-ish field (`"12"`, `"12.0"`), defaulting on failure.
pub(crate) fn parse_count(raw: &str) -> u64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed
        .parse::<u64>()
        .or_else(|_| trimmed.parse::<f64>().map(|f| f.max(0.0) as u64))
        .unwrap_or_else(|_| {
            log::debug!("unparsable count '{}', defaulting to 0", raw);
            0
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_regional() {
        assert_eq!(parse_amount("1.500.000,50"), 1_500_000.5);
        assert_eq!(parse_amount("1500000.5"), 1_500_000.5);
        assert_eq!(parse_amount("$ 2.000,00"), 2000.0);
    }

    #[test]
    fn test_parse_amount_defaults() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("sin datos"), 0.0);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count("12.0"), 12);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
    }
}
