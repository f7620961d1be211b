use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{Contractor, RiskLevel, Verdict, VALID_YEARS};
use crate::report::format_money;
use crate::summary::Summary;

/// Render a colored terminal report.
pub fn render(
    summary: &Summary,
    contractors: &[Contractor],
    path: &Path,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let flag_count = summary.verdict_counts.get("flag").copied().unwrap_or(0);
    let review_count = summary.verdict_counts.get("review").copied().unwrap_or(0);
    let clear_count = summary.verdict_counts.get("clear").copied().unwrap_or(0);

    if quiet {
        println!(
            "Entities: {}  Contractors: {}  Flag: {}  Review: {}  Clear: {}",
            summary.entity_count,
            summary.contractor_count,
            flag_count.to_string().red(),
            review_count.to_string().yellow(),
            clear_count.to_string().green(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "tender-checkr".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Data directory: {}\n", path.display());

    let flag_levels = summarize_levels(contractors, Verdict::Flag);
    let review_levels = summarize_levels(contractors, Verdict::Review);

    println!(" ┌────────────────────────────────────────────────────────┐");
    println!(" │  {:<52} │", "SUMMARY".bold());
    println!(
        " │  {:<52} │",
        format!("Entities           : {}", summary.entity_count)
    );
    println!(
        " │  {:<52} │",
        format!(
            "Contractors        : {}  ({} linked to an entity)",
            summary.contractor_count, summary.linked_contractors
        )
    );
    println!(
        " │  {:<52} │",
        format!(
            "Historical budget  : {}",
            format_money(summary.total_budget)
        )
    );
    println!(
        " │  {:<52} │",
        format!(
            "Avg legal exposure : {:.1}%",
            summary.avg_legal_risk_pct
        )
    );
    println!(
        " │  {:<52} │",
        format!(
            "{}  Flag           : {:>4}  {}",
            "✗".red(),
            flag_count,
            flag_levels
        )
    );
    println!(
        " │  {:<52} │",
        format!(
            "{}  Review         : {:>4}  {}",
            "⚠".yellow(),
            review_count,
            review_levels
        )
    );
    println!(
        " │  {:<52} │",
        format!("{}  Clear          : {:>4}", "✓".green(), clear_count)
    );
    println!(" └────────────────────────────────────────────────────────┘\n");

    render_annual_budget(summary);

    if flag_count > 0 {
        println!(
            " {} Contractors requiring attention:\n",
            "[FLAG]".red().bold()
        );
        render_contractor_table(contractors, Verdict::Flag);
        println!();
    }

    if review_count > 0 {
        println!(" {} Contractors to review:\n", "[REVIEW]".yellow().bold());
        render_contractor_table(contractors, Verdict::Review);
        println!();
    }

    if verbose && clear_count > 0 {
        println!(" {} Clear contractors:\n", "[CLEAR]".green().bold());
        render_contractor_table(contractors, Verdict::Clear);
        println!();
    }

    if !summary.top_entities.is_empty() {
        println!(" {} Entities by historical budget:\n", "[TOP]".cyan().bold());
        render_entity_table(summary);
        println!();
    }

    Ok(())
}

/// One bar line per whitelisted year, scaled to the largest aggregate.
fn render_annual_budget(summary: &Summary) {
    let max = summary
        .annual_budget
        .values()
        .cloned()
        .fold(0.0f64, f64::max);
    if max <= 0.0 {
        return;
    }

    println!(" Annual budget ({}–{}):\n", VALID_YEARS[0], VALID_YEARS[3]);
    const BAR_WIDTH: f64 = 32.0;
    for year in VALID_YEARS {
        let amount = summary.annual_budget.get(year).copied().unwrap_or(0.0);
        let filled = ((amount / max) * BAR_WIDTH).round() as usize;
        println!(
            "   {}  {:<32}  {}",
            year.dimmed(),
            "▇".repeat(filled).cyan(),
            format_money(amount)
        );
    }
    println!();
}

fn render_contractor_table(contractors: &[Contractor], verdict_filter: Verdict) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Contractor").add_attribute(Attribute::Bold),
            Cell::new("Tax ID").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
            Cell::new("Entity").add_attribute(Attribute::Bold),
            Cell::new("Last Year").add_attribute(Attribute::Bold),
            Cell::new("Verdict").add_attribute(Attribute::Bold),
        ]);

    for c in contractors.iter().filter(|c| c.verdict == verdict_filter) {
        let (verdict_str, verdict_color) = match c.verdict {
            Verdict::Flag => ("✗ flag", Color::Red),
            Verdict::Review => ("⚠ review", Color::Yellow),
            Verdict::Clear => ("✓ clear", Color::Green),
        };

        let risk_color = match c.risk {
            RiskLevel::Critical => Color::Red,
            RiskLevel::High => Color::Magenta,
            RiskLevel::Medium => Color::Yellow,
            RiskLevel::Low => Color::Blue,
            RiskLevel::Ok => Color::Green,
        };

        table.add_row(vec![
            Cell::new(&c.name),
            Cell::new(&c.tax_id),
            Cell::new(c.risk.to_string()).fg(risk_color),
            Cell::new(&c.entity),
            Cell::new(c.last_contract_year.to_string()).set_alignment(CellAlignment::Center),
            Cell::new(verdict_str)
                .fg(verdict_color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}

fn render_entity_table(summary: &Summary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Entity").add_attribute(Attribute::Bold),
            Cell::new("Municipality").add_attribute(Attribute::Bold),
            Cell::new("Budget").add_attribute(Attribute::Bold),
            Cell::new("Contracts").add_attribute(Attribute::Bold),
            Cell::new("Contractors").add_attribute(Attribute::Bold),
            Cell::new("Legal Risk").add_attribute(Attribute::Bold),
        ]);

    for e in &summary.top_entities {
        let risk_color = if e.legal_risk_pct >= 60.0 {
            Color::Red
        } else if e.legal_risk_pct >= 30.0 {
            Color::Yellow
        } else {
            Color::Green
        };

        table.add_row(vec![
            Cell::new(&e.name),
            Cell::new(&e.municipality),
            Cell::new(format_money(e.total_budget)).set_alignment(CellAlignment::Right),
            Cell::new(e.contract_count.to_string()).set_alignment(CellAlignment::Center),
            Cell::new(e.linked_contractors.to_string()).set_alignment(CellAlignment::Center),
            Cell::new(format!("{:.1}%", e.legal_risk_pct))
                .fg(risk_color)
                .set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
}

/// Top risk levels inside one verdict bucket, e.g. `[CRITICAL (3), HIGH (1)]`.
fn summarize_levels(contractors: &[Contractor], verdict: Verdict) -> String {
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for c in contractors.iter().filter(|c| c.verdict == verdict) {
        *counts.entry(c.risk.to_string()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(String, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1));

    let parts: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(level, count)| format!("{} ({})", level, count))
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contractor(risk: RiskLevel, verdict: Verdict) -> Contractor {
        Contractor {
            name: "X".to_string(),
            tax_id: "1".to_string(),
            risk,
            verdict,
            affiliation: "No Data".to_string(),
            health_regime: "No Data".to_string(),
            entity: "E".to_string(),
            last_contract_year: 2023,
        }
    }

    #[test]
    fn test_summarize_levels() {
        let contractors = vec![
            contractor(RiskLevel::Critical, Verdict::Flag),
            contractor(RiskLevel::Critical, Verdict::Flag),
            contractor(RiskLevel::High, Verdict::Flag),
            contractor(RiskLevel::Ok, Verdict::Clear),
        ];
        let s = summarize_levels(&contractors, Verdict::Flag);
        assert!(s.starts_with("[CRITICAL (2)"));
        assert!(s.contains("HIGH (1)"));
    }

    #[test]
    fn test_summarize_levels_empty() {
        assert_eq!(summarize_levels(&[], Verdict::Flag), "");
    }
}
