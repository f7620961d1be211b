use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use plotters::prelude::*;

use crate::models::VALID_YEARS;

pub const CHART_W: u32 = 1100;
pub const CHART_H: u32 = 640;

const BAR_COLOR: RGBColor = RGBColor(38, 109, 211);

/// Render the aggregated annual budget as a bar chart into an RGB pixel
/// buffer (`CHART_W × CHART_H × 3` bytes), ready for PDF embedding.
pub fn budget_chart_rgb(annual: &BTreeMap<String, f64>) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; (CHART_W * CHART_H * 3) as usize];

    let amounts: Vec<f64> = VALID_YEARS
        .iter()
        .map(|y| annual.get(*y).copied().unwrap_or(0.0))
        .collect();
    let max = amounts.iter().cloned().fold(0.0f64, f64::max);
    // Flat data still deserves axes; give the chart a nominal range.
    let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };

    {
        let root = BitMapBackend::with_buffer(&mut buf, (CHART_W, CHART_H)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("chart fill: {e}"))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Annual budget by year", ("sans-serif", 34))
            .margin(24)
            .x_label_area_size(48)
            .y_label_area_size(110)
            .build_cartesian_2d(0f64..VALID_YEARS.len() as f64, 0f64..y_max)
            .map_err(|e| anyhow!("chart build: {e}"))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(VALID_YEARS.len())
            .x_label_formatter(&|x| {
                let i = x.floor() as usize;
                VALID_YEARS.get(i).map(|y| y.to_string()).unwrap_or_default()
            })
            .y_label_formatter(&|v| format!("{:.0}", v))
            .label_style(("sans-serif", 20))
            .draw()
            .map_err(|e| anyhow!("chart mesh: {e}"))?;

        chart
            .draw_series(amounts.iter().enumerate().map(|(i, amount)| {
                Rectangle::new(
                    [(i as f64 + 0.18, 0.0), (i as f64 + 0.82, *amount)],
                    BAR_COLOR.filled(),
                )
            }))
            .map_err(|e| anyhow!("chart bars: {e}"))?;

        root.present().map_err(|e| anyhow!("chart present: {e}"))?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_renders_expected_buffer() {
        let mut annual = BTreeMap::new();
        annual.insert("2021".to_string(), 100.0);
        annual.insert("2023".to_string(), 300.0);

        let buf = budget_chart_rgb(&annual).unwrap();
        assert_eq!(buf.len(), (CHART_W * CHART_H * 3) as usize);
        // Background fill means the buffer cannot be all zeros
        assert!(buf.iter().any(|b| *b != 0));
    }

    #[test]
    fn test_chart_handles_empty_data() {
        let buf = budget_chart_rgb(&BTreeMap::new()).unwrap();
        assert_eq!(buf.len(), (CHART_W * CHART_H * 3) as usize);
    }
}
