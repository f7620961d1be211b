use std::path::Path;

use anyhow::{Context, Result};
use image::GenericImageView;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Rgb,
};

use crate::models::{Contractor, RiskLevel, Verdict};
use crate::report::chart::{budget_chart_rgb, CHART_H, CHART_W};
use crate::report::format_money;
use crate::summary::Summary;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const HEADER_H: f32 = 68.0;

// ── Palette ───────────────────────────────────────────────────────────────────
const BG: (f32, f32, f32) = (1.00, 1.00, 1.00);
const PANEL: (f32, f32, f32) = (1.00, 1.00, 1.00);
const PANEL_ALT: (f32, f32, f32) = (0.95, 0.97, 0.97);
const BORDER: (f32, f32, f32) = (0.84, 0.88, 0.89);
const ACCENT_TEAL: (f32, f32, f32) = (0.05, 0.49, 0.47);
const ACCENT_NAVY: (f32, f32, f32) = (0.10, 0.23, 0.42);
const INK: (f32, f32, f32) = (0.08, 0.10, 0.13);
const INK_SOFT: (f32, f32, f32) = (0.38, 0.43, 0.49);
const INK_MUTED: (f32, f32, f32) = (0.58, 0.63, 0.68);
const WHITE: (f32, f32, f32) = (1.00, 1.00, 1.00);
const WHITE_DIM: (f32, f32, f32) = (0.83, 0.92, 0.91);

const CRIT_BG: (f32, f32, f32) = (1.00, 0.90, 0.90);
const CRIT_FG: (f32, f32, f32) = (0.73, 0.10, 0.12);
const HIGH_BG: (f32, f32, f32) = (1.00, 0.92, 0.86);
const HIGH_FG: (f32, f32, f32) = (0.78, 0.33, 0.05);
const MED_BG: (f32, f32, f32) = (1.00, 0.96, 0.85);
const MED_FG: (f32, f32, f32) = (0.66, 0.47, 0.02);
const LOW_BG: (f32, f32, f32) = (0.89, 0.93, 1.00);
const LOW_FG: (f32, f32, f32) = (0.17, 0.33, 0.72);
const OK_BG: (f32, f32, f32) = (0.89, 0.97, 0.91);
const OK_FG: (f32, f32, f32) = (0.07, 0.50, 0.24);

const R_PANEL: f32 = 2.5;
const R_BADGE: f32 = 1.5;

fn risk_colors(risk: RiskLevel) -> ((f32, f32, f32), (f32, f32, f32)) {
    match risk {
        RiskLevel::Critical => (CRIT_BG, CRIT_FG),
        RiskLevel::High => (HIGH_BG, HIGH_FG),
        RiskLevel::Medium => (MED_BG, MED_FG),
        RiskLevel::Low => (LOW_BG, LOW_FG),
        RiskLevel::Ok => (OK_BG, OK_FG),
    }
}

fn risk_description(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Critical => {
            "Active compliance alert. Contracts with these vendors need immediate review."
        }
        RiskLevel::High => {
            "Serious alert on record. Verify standing before awarding further contracts."
        }
        RiskLevel::Medium => "Irregularities reported. Keep under periodic observation.",
        RiskLevel::Low => "Minor observations only. No action usually required.",
        RiskLevel::Ok => "No known alert. Includes records whose source value was unrecognized.",
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render the PDF report: cover → risk summary → budget chart → contractor
/// table. The branding logo is embedded on the cover when available.
pub fn render(
    summary: &Summary,
    contractors: &[Contractor],
    data_path: &Path,
    branding: Option<&Path>,
    output_path: &Path,
) -> Result<()> {
    let dataset_name = data_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("procurement data");

    let doc = PdfDocument::empty("Procurement Risk Report");

    add_cover_page(&doc, summary, dataset_name, branding)?;
    add_risk_summary_page(&doc, summary, contractors)?;
    add_budget_chart_page(&doc, summary)?;
    add_contractor_pages(&doc, contractors)?;

    let bytes = doc.save_to_bytes()?;
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", output_path.display()))?;

    println!("PDF report written to: {}", output_path.display());
    Ok(())
}

// ── Cover page ────────────────────────────────────────────────────────────────

fn add_cover_page(
    doc: &PdfDocumentReference,
    summary: &Summary,
    dataset_name: &str,
    branding: Option<&Path>,
) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Cover");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    let hdr_bot = PAGE_H - HEADER_H;
    gradient_h(&layer, 0.0, hdr_bot, PAGE_W, HEADER_H, ACCENT_NAVY, ACCENT_TEAL, 26);

    set_color(&layer, WHITE_DIM);
    layer.use_text(
        format!("tender-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5,
        Mm(PAGE_W - MARGIN - 42.0),
        Mm(PAGE_H - 10.5),
        &font_r,
    );

    set_color(&layer, WHITE);
    layer.use_text("Procurement Risk", 28.0, Mm(MARGIN), Mm(PAGE_H - 26.0), &font_b);
    set_color(&layer, WHITE_DIM);
    layer.use_text("Report", 28.0, Mm(MARGIN), Mm(PAGE_H - 41.0), &font_b);

    // Branding logo, tolerated-missing: any load failure just leaves the
    // cover without it.
    if let Some(logo_path) = branding {
        if let Err(e) = embed_logo(&layer, logo_path) {
            log::warn!("skipping branding asset {}: {}", logo_path.display(), e);
        }
    }

    // Dataset chip
    let chip_y = hdr_bot - 18.0;
    let chip_h = 12.0f32;
    let chip_w = 106.0f32;
    rrect_fill(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, PANEL);
    rrect_stroke(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, BORDER);
    rect(&layer, MARGIN, chip_y, 2.5, chip_h, ACCENT_TEAL);

    set_color(&layer, INK_MUTED);
    layer.use_text("DATASET", 6.0, Mm(MARGIN + 5.0), Mm(chip_y + chip_h - 3.8), &font_b);
    set_color(&layer, INK);
    layer.use_text(
        truncate(dataset_name, 34),
        9.5,
        Mm(MARGIN + 5.0),
        Mm(chip_y + 2.8),
        &font_b,
    );

    set_color(&layer, INK_SOFT);
    layer.use_text(
        format!("Generated  {}", today()),
        9.0,
        Mm(MARGIN),
        Mm(chip_y - 8.0),
        &font_r,
    );

    let rule_y = chip_y - 16.5;
    hline(&layer, MARGIN, PAGE_W - MARGIN, rule_y, BORDER);
    set_color(&layer, INK_MUTED);
    layer.use_text("OVERVIEW", 6.5, Mm(MARGIN), Mm(rule_y - 7.0), &font_b);

    // Stat cards
    let flagged = summary.verdict_counts.get("flag").copied().unwrap_or(0);
    let critical = summary.risk_counts.get("CRITICAL").copied().unwrap_or(0);

    let card_y = rule_y - 42.0;
    let card_h = 26.0f32;
    let gap = 4.0f32;
    let card_w = (PAGE_W - 2.0 * MARGIN - gap * 3.0) / 4.0;

    let cards: [(&str, String, (f32, f32, f32)); 4] = [
        ("ENTITIES", summary.entity_count.to_string(), ACCENT_NAVY),
        ("CONTRACTORS", summary.contractor_count.to_string(), ACCENT_TEAL),
        ("FLAGGED", flagged.to_string(), HIGH_FG),
        ("CRITICAL", critical.to_string(), CRIT_FG),
    ];
    for (i, (label, value, accent)) in cards.iter().enumerate() {
        let cx = MARGIN + (card_w + gap) * i as f32;
        stat_card(&layer, cx, card_y, card_w, card_h, label, value, *accent, &font_r, &font_b);
    }

    // Budget strip under the cards
    let strip_y = card_y - 16.0;
    set_color(&layer, INK_SOFT);
    layer.use_text(
        format!(
            "Historical budget {}   ·   Average legal exposure {:.1}%   ·   {} contractors linked to an entity",
            format_money(summary.total_budget),
            summary.avg_legal_risk_pct,
            summary.linked_contractors
        ),
        8.5,
        Mm(MARGIN),
        Mm(strip_y),
        &font_r,
    );

    // Contents
    let section_y = strip_y - 10.0;
    hline(&layer, MARGIN, PAGE_W - MARGIN, section_y, BORDER);
    set_color(&layer, INK_MUTED);
    layer.use_text("WHAT'S IN THIS REPORT", 6.5, Mm(MARGIN), Mm(section_y - 7.5), &font_b);

    let items = [
        ("Risk Summary", "Contractors grouped by alert severity"),
        ("Annual Budget", "Year-over-year budget across all entities"),
        ("All Contractors", "Full records with risk level and policy verdict"),
    ];
    for (j, (title, desc)) in items.iter().enumerate() {
        let iy = section_y - 15.0 - j as f32 * 10.0;
        rrect_fill(&layer, MARGIN, iy + 2.0, 2.0, 2.0, 1.0, ACCENT_TEAL);
        set_color(&layer, INK);
        layer.use_text(*title, 8.5, Mm(MARGIN + 5.0), Mm(iy + 2.0), &font_b);
        set_color(&layer, INK_SOFT);
        layer.use_text(*desc, 8.0, Mm(MARGIN + 5.0), Mm(iy - 3.5), &font_r);
    }

    footer(&layer, &font_r);
    Ok(())
}

fn embed_logo(layer: &PdfLayerReference, path: &Path) -> Result<()> {
    let dynamic = image::open(path)?;
    let px_h = dynamic.height().max(1);

    // Scale so the logo lands 16mm tall in the header's top-right.
    const LOGO_H_MM: f32 = 16.0;
    let dpi = px_h as f32 * 25.4 / LOGO_H_MM;
    let logo_w_mm = dynamic.width() as f32 * 25.4 / dpi;

    let pdf_image = Image::from_dynamic_image(&dynamic);
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(PAGE_W - MARGIN - logo_w_mm)),
            translate_y: Some(Mm(PAGE_H - MARGIN - LOGO_H_MM - 2.0)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn stat_card(
    layer: &PdfLayerReference,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    label: &str,
    value: &str,
    accent: (f32, f32, f32),
    font_r: &IndirectFontRef,
    font_b: &IndirectFontRef,
) {
    rrect_fill(layer, x, y, w, h, R_BADGE, PANEL);
    rrect_stroke(layer, x, y, w, h, R_BADGE, BORDER);
    rect(layer, x, y + h - 2.0, w, 2.0, accent);

    set_color(layer, accent);
    layer.use_text(value, 20.0, Mm(x + 5.0), Mm(y + h * 0.38), font_b);
    set_color(layer, INK_MUTED);
    layer.use_text(label, 6.5, Mm(x + 5.0), Mm(y + 3.5), font_r);
}

// ── Risk summary page ─────────────────────────────────────────────────────────

fn add_risk_summary_page(
    doc: &PdfDocumentReference,
    summary: &Summary,
    contractors: &[Contractor],
) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Risk Summary");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    gradient_h(&layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_NAVY, ACCENT_TEAL, 21);

    set_color(&layer, INK);
    layer.use_text("Risk Summary", 20.0, Mm(MARGIN), Mm(278.5), &font_b);
    set_color(&layer, INK_SOFT);
    layer.use_text(
        "All contractors grouped by alert severity",
        9.0,
        Mm(MARGIN),
        Mm(271.5),
        &font_r,
    );
    hline(&layer, MARGIN, PAGE_W - MARGIN, 267.5, BORDER);

    const COL_DESC: f32 = MARGIN + 44.0;
    const COL_NAMES: f32 = MARGIN + 120.0;
    const LINE_H: f32 = 4.8;
    const ROW_PAD: f32 = 4.5;
    const HDR_H: f32 = 9.0;
    const BADGE_W: f32 = 36.0;
    const BADGE_H: f32 = 6.5;
    const DESC_WRAP: usize = 38;
    const NAMES_WRAP: usize = 26;
    const NAMES_MAX_LINES: usize = 4;

    struct Row {
        label: String,
        bg: (f32, f32, f32),
        fg: (f32, f32, f32),
        desc_lines: Vec<String>,
        name_lines: Vec<String>,
        height: f32,
    }

    let rows: Vec<Row> = RiskLevel::ALL
        .iter()
        .map(|level| {
            let names: Vec<String> = contractors
                .iter()
                .filter(|c| c.risk == *level)
                .map(|c| c.name.clone())
                .collect();
            let (bg, fg) = risk_colors(*level);
            let desc_lines = wrap_text(risk_description(*level), DESC_WRAP);
            let mut name_lines = name_count_list(&names, NAMES_WRAP);
            if name_lines.len() > NAMES_MAX_LINES {
                let count_line = name_lines.last().cloned().unwrap_or_default();
                name_lines.truncate(NAMES_MAX_LINES - 1);
                name_lines.push(count_line);
            }
            let n = desc_lines.len().max(name_lines.len()).max(2) as f32;
            Row {
                label: level.to_string(),
                bg,
                fg,
                desc_lines,
                name_lines,
                height: n * LINE_H + ROW_PAD * 2.0,
            }
        })
        .collect();

    const TABLE_TOP: f32 = 258.0;
    let table_w = PAGE_W - 2.0 * MARGIN;
    let total_h = HDR_H + rows.iter().map(|r| r.height).sum::<f32>();

    rrect_fill(&layer, MARGIN, TABLE_TOP - total_h, table_w, total_h, R_PANEL, PANEL);
    rrect_stroke(&layer, MARGIN, TABLE_TOP - total_h, table_w, total_h, R_PANEL, BORDER);

    set_color(&layer, INK_SOFT);
    layer.use_text("RISK LEVEL", 7.0, Mm(MARGIN + 4.0), Mm(TABLE_TOP - 6.2), &font_b);
    layer.use_text("WHAT IT MEANS", 7.0, Mm(COL_DESC + 2.0), Mm(TABLE_TOP - 6.2), &font_b);
    layer.use_text("CONTRACTORS", 7.0, Mm(COL_NAMES + 2.0), Mm(TABLE_TOP - 6.2), &font_b);
    hline(&layer, MARGIN + R_PANEL, PAGE_W - MARGIN - R_PANEL, TABLE_TOP - HDR_H, BORDER);

    let mut y_top = TABLE_TOP - HDR_H;
    for (i, row) in rows.iter().enumerate() {
        let y_bot = y_top - row.height;

        if i % 2 == 1 {
            rect(&layer, MARGIN, y_bot, table_w, row.height, PANEL_ALT);
        }

        let badge_x = MARGIN + 3.0;
        let badge_y = y_top - ROW_PAD - BADGE_H;
        rrect_fill(&layer, badge_x, badge_y, BADGE_W, BADGE_H, R_BADGE, row.bg);
        set_color(&layer, row.fg);
        layer.use_text(&row.label, 8.0, Mm(badge_x + 4.0), Mm(badge_y + 1.8), &font_b);

        set_color(&layer, INK_SOFT);
        for (j, line) in row.desc_lines.iter().enumerate() {
            let ly = y_top - ROW_PAD - (j as f32 + 0.9) * LINE_H;
            layer.use_text(line.as_str(), 8.0, Mm(COL_DESC + 2.0), Mm(ly), &font_r);
        }

        let last = row.name_lines.len().saturating_sub(1);
        for (j, line) in row.name_lines.iter().enumerate() {
            let ly = y_top - ROW_PAD - (j as f32 + 0.9) * LINE_H;
            if j == last {
                set_color(&layer, INK);
                layer.use_text(line.as_str(), 9.0, Mm(COL_NAMES + 2.0), Mm(ly), &font_b);
            } else {
                set_color(&layer, INK_MUTED);
                layer.use_text(line.as_str(), 7.0, Mm(COL_NAMES + 2.0), Mm(ly), &font_r);
            }
        }

        if i < rows.len() - 1 {
            hline(&layer, MARGIN + R_PANEL, PAGE_W - MARGIN - R_PANEL, y_bot, BORDER);
        }
        y_top = y_bot;
    }

    // Verdict recap under the table
    let recap_y = TABLE_TOP - total_h - 12.0;
    set_color(&layer, INK_SOFT);
    layer.use_text(
        format!(
            "Policy verdicts:  {} flagged  ·  {} to review  ·  {} clear",
            summary.verdict_counts.get("flag").copied().unwrap_or(0),
            summary.verdict_counts.get("review").copied().unwrap_or(0),
            summary.verdict_counts.get("clear").copied().unwrap_or(0),
        ),
        9.0,
        Mm(MARGIN),
        Mm(recap_y),
        &font_r,
    );

    footer(&layer, &font_r);
    Ok(())
}

// ── Budget chart page ─────────────────────────────────────────────────────────

fn add_budget_chart_page(doc: &PdfDocumentReference, summary: &Summary) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Annual Budget");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    gradient_h(&layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_NAVY, ACCENT_TEAL, 21);

    set_color(&layer, INK);
    layer.use_text("Annual Budget", 20.0, Mm(MARGIN), Mm(278.5), &font_b);
    set_color(&layer, INK_SOFT);
    layer.use_text(
        "Aggregated across all entities",
        9.0,
        Mm(MARGIN),
        Mm(271.5),
        &font_r,
    );
    hline(&layer, MARGIN, PAGE_W - MARGIN, 267.5, BORDER);

    let buf = budget_chart_rgb(&summary.annual_budget)?;
    let rgb = image::RgbImage::from_raw(CHART_W, CHART_H, buf)
        .context("chart buffer has unexpected size")?;
    let dynamic = image::DynamicImage::ImageRgb8(rgb);

    // 1100px at 165 dpi → ~169mm wide, centered under the heading.
    const CHART_DPI: f32 = 165.0;
    let chart_w_mm = CHART_W as f32 * 25.4 / CHART_DPI;
    let chart_h_mm = CHART_H as f32 * 25.4 / CHART_DPI;
    let chart_x = (PAGE_W - chart_w_mm) / 2.0;
    let chart_y = 255.0 - chart_h_mm;

    let pdf_image = Image::from_dynamic_image(&dynamic);
    pdf_image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(chart_x)),
            translate_y: Some(Mm(chart_y)),
            dpi: Some(CHART_DPI),
            ..Default::default()
        },
    );

    // Numeric recap under the chart
    let mut ty = chart_y - 12.0;
    set_color(&layer, INK_MUTED);
    layer.use_text("BY YEAR", 6.5, Mm(MARGIN), Mm(ty + 6.0), &font_b);
    for (year, amount) in &summary.annual_budget {
        set_color(&layer, INK);
        layer.use_text(year.as_str(), 9.0, Mm(MARGIN), Mm(ty), &font_b);
        set_color(&layer, INK_SOFT);
        layer.use_text(format_money(*amount), 9.0, Mm(MARGIN + 18.0), Mm(ty), &font_r);
        ty -= 6.0;
    }

    footer(&layer, &font_r);
    Ok(())
}

// ── Contractor table pages ────────────────────────────────────────────────────

fn add_contractor_pages(doc: &PdfDocumentReference, contractors: &[Contractor]) -> Result<()> {
    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    const ROW_H: f32 = 7.0;
    const HDR_Y: f32 = 268.5;
    const FIRST_Y: f32 = 259.5;
    const BOT_MARGIN: f32 = 25.0;

    //  NAME      TAX ID    RISK      ENTITY     YEAR     VERDICT
    let col_x = [
        MARGIN,
        MARGIN + 46.0,
        MARGIN + 68.0,
        MARGIN + 90.0,
        MARGIN + 138.0,
        MARGIN + 152.0,
    ];
    let headers = ["NAME", "TAX ID", "RISK", "ENTITY", "YEAR", "VERDICT"];

    let mut cur_y = FIRST_Y;
    let mut layer: Option<PdfLayerReference> = None;
    let mut page_num: u32 = 0;

    for (row_idx, c) in contractors.iter().enumerate() {
        let needs_new_page = layer.is_none() || cur_y - ROW_H < BOT_MARGIN;

        if needs_new_page {
            page_num += 1;
            let (pi, li) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Contractors");
            let page_layer = doc.get_page(pi).get_layer(li);

            rect(&page_layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
            gradient_h(&page_layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_NAVY, ACCENT_TEAL, 21);

            set_color(&page_layer, INK);
            page_layer.use_text("All Contractors", 14.0, Mm(MARGIN), Mm(282.5), &font_b);
            set_color(&page_layer, INK_MUTED);
            page_layer.use_text(
                format!("Page {}", page_num),
                8.0,
                Mm(PAGE_W - MARGIN - 14.0),
                Mm(283.0),
                &font_r,
            );
            hline(&page_layer, MARGIN, PAGE_W - MARGIN, 277.5, BORDER);

            rrect_fill(&page_layer, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, PANEL);
            rrect_stroke(&page_layer, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, BORDER);
            set_color(&page_layer, INK_MUTED);
            for (i, h) in headers.iter().enumerate() {
                page_layer.use_text(*h, 7.0, Mm(col_x[i] + 1.5), Mm(HDR_Y - 4.0), &font_b);
            }

            footer(&page_layer, &font_r);

            cur_y = FIRST_Y;
            layer = Some(page_layer);
        }

        let Some(page_layer) = &layer else {
            continue;
        };

        if row_idx % 2 == 0 {
            rect(page_layer, MARGIN, cur_y - ROW_H + 1.5, PAGE_W - 2.0 * MARGIN, ROW_H, PANEL_ALT);
        }

        let text_y = cur_y - 4.0;
        let (_, risk_fg) = risk_colors(c.risk);

        set_color(page_layer, INK);
        page_layer.use_text(truncate(&c.name, 26), 8.0, Mm(col_x[0] + 1.5), Mm(text_y), &font_r);
        set_color(page_layer, INK_SOFT);
        page_layer.use_text(truncate(&c.tax_id, 12), 8.0, Mm(col_x[1] + 1.5), Mm(text_y), &font_r);
        set_color(page_layer, risk_fg);
        page_layer.use_text(c.risk.to_string(), 8.0, Mm(col_x[2] + 1.5), Mm(text_y), &font_b);
        set_color(page_layer, INK_SOFT);
        page_layer.use_text(truncate(&c.entity, 28), 8.0, Mm(col_x[3] + 1.5), Mm(text_y), &font_r);
        page_layer.use_text(
            c.last_contract_year.to_string(),
            8.0,
            Mm(col_x[4] + 1.5),
            Mm(text_y),
            &font_r,
        );

        let (verdict_str, verdict_fg, verdict_bg) = match c.verdict {
            Verdict::Flag => ("FLAG", CRIT_FG, CRIT_BG),
            Verdict::Review => ("REVIEW", MED_FG, MED_BG),
            Verdict::Clear => ("CLEAR", OK_FG, OK_BG),
        };
        let badge_x = col_x[5] + 1.5;
        let badge_y = cur_y - ROW_H + 2.2;
        rrect_fill(page_layer, badge_x, badge_y, 20.0, 4.8, R_BADGE, verdict_bg);
        set_color(page_layer, verdict_fg);
        page_layer.use_text(verdict_str, 7.0, Mm(badge_x + 3.0), Mm(badge_y + 1.1), &font_b);

        hline(page_layer, MARGIN, PAGE_W - MARGIN, cur_y - ROW_H + 1.5, BORDER);
        cur_y -= ROW_H;
    }

    Ok(())
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

fn set_color(layer: &PdfLayerReference, (r, g, b): (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb { r, g, b, icc_profile: None }));
}

fn rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: (f32, f32, f32)) {
    set_color(layer, color);
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y + h)), false),
            (Point::new(Mm(x), Mm(y + h)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
    set_color(layer, (0.0, 0.0, 0.0));
}

/// Rounded-rectangle ring, 6 segments per corner arc, clockwise.
fn rrect_ring(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<(Point, bool)> {
    let r = r.min(w / 2.0).min(h / 2.0);
    const SEGS: usize = 6;
    let corners = [
        (x + w - r, y + r, 270.0f32),
        (x + w - r, y + h - r, 0.0f32),
        (x + r, y + h - r, 90.0f32),
        (x + r, y + r, 180.0f32),
    ];

    let mut pts = Vec::with_capacity(4 * (SEGS + 1));
    for (cx, cy, start) in &corners {
        for i in 0..=SEGS {
            let angle = (start + 90.0 * i as f32 / SEGS as f32).to_radians();
            pts.push((
                Point::new(Mm(cx + r * angle.cos()), Mm(cy + r * angle.sin())),
                false,
            ));
        }
    }
    pts
}

fn rrect_fill(
    layer: &PdfLayerReference,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    r: f32,
    color: (f32, f32, f32),
) {
    set_color(layer, color);
    layer.add_polygon(Polygon {
        rings: vec![rrect_ring(x, y, w, h, r)],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
    set_color(layer, (0.0, 0.0, 0.0));
}

fn rrect_stroke(
    layer: &PdfLayerReference,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    r: f32,
    (cr, cg, cb): (f32, f32, f32),
) {
    layer.set_outline_color(Color::Rgb(Rgb { r: cr, g: cg, b: cb, icc_profile: None }));
    layer.set_outline_thickness(0.4);
    layer.add_polygon(Polygon {
        rings: vec![rrect_ring(x, y, w, h, r)],
        mode: PaintMode::Stroke,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_outline_color(Color::Rgb(Rgb { r: 0.0, g: 0.0, b: 0.0, icc_profile: None }));
    layer.set_outline_thickness(1.0);
}

fn hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32, (r, g, b): (f32, f32, f32)) {
    layer.set_outline_color(Color::Rgb(Rgb { r, g, b, icc_profile: None }));
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
    layer.set_outline_color(Color::Rgb(Rgb { r: 0.0, g: 0.0, b: 0.0, icc_profile: None }));
    layer.set_outline_thickness(1.0);
}

/// Left-to-right gradient via overlapping vertical strips.
#[allow(clippy::too_many_arguments)]
fn gradient_h(
    layer: &PdfLayerReference,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    from: (f32, f32, f32),
    to: (f32, f32, f32),
    steps: usize,
) {
    let step_w = w / steps as f32;
    for i in 0..steps {
        let t = i as f32 / (steps - 1).max(1) as f32;
        let color = (
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
            from.2 + (to.2 - from.2) * t,
        );
        rect(layer, x + i as f32 * step_w, y, step_w + 0.6, h, color);
    }
}

fn footer(layer: &PdfLayerReference, font_r: &IndirectFontRef) {
    hline(layer, MARGIN, PAGE_W - MARGIN, 22.0, BORDER);
    set_color(layer, INK_MUTED);
    layer.use_text(
        format!("tender-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5,
        Mm(MARGIN),
        Mm(15.0),
        font_r,
    );
    layer.use_text(today(), 7.5, Mm(PAGE_W - MARGIN - 22.0), Mm(15.0), font_r);
}

// ── Text helpers ──────────────────────────────────────────────────────────────

fn truncate(s: &str, max: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > max {
        format!("{}…", chars[..max - 1].iter().collect::<String>())
    } else {
        s.to_string()
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.len() <= max_chars {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() > max_chars {
            lines.push(current.clone());
            current = word.to_string();
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Names wrapped into lines, then `<N> contractor(s)` as the final line.
fn name_count_list(names: &[String], max_chars: usize) -> Vec<String> {
    if names.is_empty() {
        return vec!["—".to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for name in names {
        let sep = if current.is_empty() { "" } else { ", " };
        let candidate = format!("{}{}", sep, name);
        if !current.is_empty() && current.len() + candidate.len() > max_chars {
            lines.push(current.clone());
            current = name.clone();
        } else {
            current.push_str(&candidate);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.push(format!(
        "{} contractor{}",
        names.len(),
        if names.len() == 1 { "" } else { "s" }
    ));
    lines
}

// ── Date helper ───────────────────────────────────────────────────────────────

fn today() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let days = secs / 86400;
    let year = 1970 + days / 365;
    let doy = days % 365;
    let month = (doy / 30) + 1;
    let day = (doy % 30) + 1;
    format!("{:04}-{:02}-{:02}", year, month.min(12), day.min(31))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long contractor name", 10), "a very lo…");
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four five", 9);
        assert!(lines.iter().all(|l| l.len() <= 9));
        assert_eq!(lines.join(" "), "one two three four five");
    }

    #[test]
    fn test_name_count_list() {
        let names = vec!["A".to_string(), "B".to_string()];
        let lines = name_count_list(&names, 20);
        assert_eq!(lines.last().map(String::as_str), Some("2 contractors"));
        assert_eq!(name_count_list(&[], 20)[0], "—");
    }
}
