//! Chart drawing with plotters' SVG backend.
//!
//! Each function draws one complete chart into `path`. Inputs are plain
//! vectors so the functions know nothing about tables or summaries.

use crate::table::millis_to_datetime;
use anyhow::{Result, bail};
use plotters::prelude::*;
use std::path::Path;

const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(52, 101, 164);
const MISSING_CELL: RGBColor = RGBColor(220, 220, 220);
const NEGATIVE: (f64, f64, f64) = (59.0, 76.0, 192.0);
const POSITIVE: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Sturges' rule, capped so wide columns stay readable.
pub(crate) fn bin_count(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    let bins = ((n as f64).log2() + 1.0).ceil() as usize;
    bins.clamp(1, 50)
}

/// Equal-width bin counts over `[min, max]`; the last bin is closed.
pub(crate) fn bin_values(values: &[f64], bins: usize, min: f64, max: f64) -> Vec<usize> {
    let mut counts = vec![0usize; bins.max(1)];
    let width = (max - min) / counts.len() as f64;
    for value in values {
        let index = if width > 0.0 {
            (((value - min) / width).floor() as usize).min(counts.len() - 1)
        } else {
            0
        };
        counts[index] += 1;
    }
    counts
}

fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Diverging blue-white-red color for a coefficient in [-1, 1].
pub(crate) fn correlation_color(r: f64) -> RGBColor {
    let t = r.clamp(-1.0, 1.0).abs();
    let (cr, cg, cb) = if r < 0.0 { NEGATIVE } else { POSITIVE };
    let mix = |c: f64| (255.0 + (c - 255.0) * t).round() as u8;
    RGBColor(mix(cr), mix(cg), mix(cb))
}

pub(crate) fn histogram(path: &Path, size: (u32, u32), title: &str, values: &[f64]) -> Result<()> {
    let Some((min, max)) = min_max(values.iter().copied()) else {
        bail!("no values to plot");
    };
    let bins = bin_count(values.len());
    let counts = bin_values(values, bins, min, max);
    let (x_min, x_max) = padded_range(min, max);
    let width = if max > min { (max - min) / bins as f64 } else { x_max - x_min };
    let start = if max > min { min } else { x_min };
    let y_max = counts.iter().copied().max().unwrap_or(0) as f64 * 1.1 + 1.0;

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Count")
        .x_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, count)| {
        let lo = start + width * i as f64;
        Rectangle::new([(lo, 0.0), (lo + width, *count as f64)], BAR_COLOR.mix(0.8).filled())
    }))?;

    root.present()?;
    Ok(())
}

pub(crate) fn bar_chart(path: &Path, size: (u32, u32), title: &str, bars: &[(String, usize)]) -> Result<()> {
    if bars.is_empty() {
        bail!("no categories to plot");
    }
    let labels: Vec<&str> = bars.iter().map(|(label, _)| label.as_str()).collect();
    let y_max = bars.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64 * 1.1 + 1.0;

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 28))
        .margin(15)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), 0f64..y_max)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Count")
        .x_labels(bars.len() + 1)
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, count))| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *count as f64)],
            BAR_COLOR.filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;

    root.present()?;
    Ok(())
}

pub(crate) fn heatmap(
    path: &Path,
    size: (u32, u32),
    columns: &[String],
    values: &[Vec<Option<f64>>],
) -> Result<()> {
    let n = columns.len() as i32;
    if n < 2 {
        bail!("heatmap needs at least two columns");
    }

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Between Numeric Variables", (FONT, 28))
        .margin(15)
        .x_label_area_size(80)
        .y_label_area_size(140)
        .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

    let label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => columns.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(columns.len() + 1)
        .y_labels(columns.len() + 1)
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .draw()?;

    let mut cells = Vec::new();
    let mut annotations = Vec::new();
    for (i, row) in values.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let (x, y) = (j as i32, i as i32);
            let color = value.map(correlation_color).unwrap_or(MISSING_CELL);
            cells.push(Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                color.filled(),
            ));
            let text = value.map(|r| format!("{r:.2}")).unwrap_or_else(|| "n/a".to_string());
            annotations.push(Text::new(
                text,
                (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                (FONT, 14).into_font(),
            ));
        }
    }
    chart.draw_series(cells)?;
    chart.draw_series(annotations)?;

    root.present()?;
    Ok(())
}

pub(crate) fn scatter(
    path: &Path,
    size: (u32, u32),
    (x_name, y_name): (&str, &str),
    points: &[(f64, f64)],
) -> Result<()> {
    let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (
        min_max(points.iter().map(|p| p.0)),
        min_max(points.iter().map(|p| p.1)),
    ) else {
        bail!("no complete rows to plot");
    };
    let (x_lo, x_hi) = padded_range(x_lo, x_hi);
    let (y_lo, y_hi) = padded_range(y_lo, y_hi);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Relationship between {x_name} and {y_name}"), (FONT, 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
    chart.configure_mesh().x_desc(x_name).y_desc(y_name).draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 4, BAR_COLOR.mix(0.6).filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Line chart of a numeric column over time; `points` are (epoch millis, value).
pub(crate) fn time_series(path: &Path, size: (u32, u32), value_name: &str, points: &[(i64, f64)]) -> Result<()> {
    let mut sorted: Vec<(f64, f64)> = points.iter().map(|(t, v)| (*t as f64, *v)).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (
        min_max(sorted.iter().map(|p| p.0)),
        min_max(sorted.iter().map(|p| p.1)),
    ) else {
        bail!("no dated values to plot");
    };
    let (x_lo, x_hi) = padded_range(x_lo, x_hi);
    let (y_lo, y_hi) = padded_range(y_lo, y_hi);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{value_name} over Time"), (FONT, 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .y_desc(value_name)
        .x_labels(6)
        .x_label_formatter(&|v| {
            millis_to_datetime(*v as i64)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .draw()?;

    chart.draw_series(LineSeries::new(sorted.iter().copied(), BAR_COLOR.stroke_width(2)))?;
    chart.draw_series(sorted.iter().map(|p| Circle::new(*p, 3, BAR_COLOR.filled())))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bin_count_sturges() {
        assert_eq!(bin_count(0), 1);
        assert_eq!(bin_count(1), 1);
        assert_eq!(bin_count(8), 4);
        assert_eq!(bin_count(100), 8);
        assert_eq!(bin_count(usize::MAX), 50);
    }

    #[test]
    fn test_bin_values_closed_last_bin() {
        let counts = bin_values(&[0.0, 1.0, 2.0, 3.0, 4.0], 2, 0.0, 4.0);
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(bin_values(&[5.0, 5.0], 3, 5.0, 5.0), vec![2, 0, 0]);
    }

    #[test]
    fn test_correlation_color_ends() {
        assert_eq!(correlation_color(0.0), RGBColor(255, 255, 255));
        assert_eq!(correlation_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(correlation_color(-1.0), RGBColor(59, 76, 192));
    }

    #[test]
    fn test_histogram_writes_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hist.svg");
        histogram(&path, (400, 300), "Distribution of score", &[1.0, 2.0, 2.5, 9.0]).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Distribution of score"));
    }

    #[test]
    fn test_histogram_single_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flat.svg");
        histogram(&path, (400, 300), "flat", &[3.0, 3.0]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_inputs_are_errors() {
        let dir = TempDir::new().unwrap();
        assert!(histogram(&dir.path().join("a.svg"), (400, 300), "a", &[]).is_err());
        assert!(bar_chart(&dir.path().join("b.svg"), (400, 300), "b", &[]).is_err());
        assert!(scatter(&dir.path().join("c.svg"), (400, 300), ("x", "y"), &[]).is_err());
    }

    #[test]
    fn test_heatmap_and_bar_chart_write_files() {
        let dir = TempDir::new().unwrap();
        let heat = dir.path().join("heat.svg");
        heatmap(
            &heat,
            (400, 400),
            &["a".to_string(), "b".to_string()],
            &[vec![Some(1.0), Some(-0.5)], vec![Some(-0.5), Some(1.0)]],
        )
        .unwrap();
        assert!(std::fs::read_to_string(&heat).unwrap().contains("-0.50"));

        let bars = dir.path().join("bars.svg");
        bar_chart(
            &bars,
            (400, 300),
            "Categories in course",
            &[("rust".to_string(), 3), ("go".to_string(), 1)],
        )
        .unwrap();
        assert!(std::fs::read_to_string(&bars).unwrap().contains("rust"));
    }
}
