//! Chart rendering.
//!
//! [`ChartRenderer`] is the seam between chart selection and image production. The default
//! [`SvgChartRenderer`] draws a plain SVG and returns it as a base64 data URL.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use crate::chart::{BoxSummary, ChartSpec};
use crate::error::RenderError;

/// Turns a [`ChartSpec`] into an encoded image (normally a `data:` URL).
pub trait ChartRenderer: Send + Sync {
    fn render(&self, spec: &ChartSpec) -> Result<String, RenderError>;
}

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 80.0;
const FILL: &str = "steelblue";

/// Renders charts as standalone SVG documents.
#[derive(Debug, Clone, Default)]
pub struct SvgChartRenderer;

impl SvgChartRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders `spec` to SVG markup without encoding it.
    pub fn render_svg(&self, spec: &ChartSpec) -> Result<String, RenderError> {
        let mut body = String::new();
        match spec {
            ChartSpec::Histogram { bins, .. } => {
                if bins.is_empty() {
                    return Err(RenderError::NoData("histogram has no bins".to_string()));
                }
                let bars: Vec<(String, f64)> = bins
                    .iter()
                    .map(|b| (format!("{:.2}", b.lower), b.count as f64))
                    .collect();
                draw_bars(&mut body, &bars);
            }
            ChartSpec::Bar { categories, .. } => {
                if categories.is_empty() {
                    return Err(RenderError::NoData("no category values".to_string()));
                }
                let bars: Vec<(String, f64)> = categories
                    .iter()
                    .map(|c| (c.value.clone(), c.count as f64))
                    .collect();
                draw_bars(&mut body, &bars);
            }
            ChartSpec::Scatter { points, .. } => {
                if points.is_empty() {
                    return Err(RenderError::NoData("no complete (x, y) pairs".to_string()));
                }
                draw_scatter(&mut body, points);
            }
            ChartSpec::BoxPlot { columns } => {
                if columns.is_empty() {
                    return Err(RenderError::NoData("no numeric columns".to_string()));
                }
                draw_boxes(&mut body, columns);
            }
            ChartSpec::Heatmap { columns, matrix } => {
                if columns.len() < 2 {
                    return Err(RenderError::NoData(
                        "need at least 2 columns for a heatmap".to_string(),
                    ));
                }
                draw_heatmap(&mut body, columns, matrix);
            }
        }

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="100%" height="100%" fill="white"/><text x="{cx}" y="30" text-anchor="middle" font-family="sans-serif" font-size="18" font-weight="bold">{title}</text>{body}</svg>"#,
            w = WIDTH,
            h = HEIGHT,
            cx = WIDTH / 2.0,
            title = escape(&spec.title()),
            body = body,
        );
        Ok(svg)
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<String, RenderError> {
        let svg = self.render_svg(spec)?;
        debug!(chart = spec.kind_name(), bytes = svg.len(), "Rendered chart");
        Ok(format!("data:image/svg+xml;base64,{}", BASE64.encode(svg)))
    }
}

fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

fn plot_height() -> f64 {
    HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

fn draw_axes(out: &mut String) {
    let x0 = MARGIN_LEFT;
    let y0 = HEIGHT - MARGIN_BOTTOM;
    let _ = write!(
        out,
        r#"<line x1="{x0}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="black"/><line x1="{x0}" y1="{y0}" x2="{x0}" y2="{top}" stroke="black"/>"#,
        x1 = WIDTH - MARGIN_RIGHT,
        top = MARGIN_TOP,
    );
}

fn axis_label(out: &mut String, x: f64, y: f64, text: &str) {
    let _ = write!(
        out,
        r#"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" font-family="sans-serif" font-size="11">{}</text>"#,
        escape(text)
    );
}

fn draw_bars(out: &mut String, bars: &[(String, f64)]) {
    draw_axes(out);
    let max = bars.iter().map(|b| b.1).fold(0.0, f64::max).max(1.0);
    let slot = plot_width() / bars.len() as f64;
    let base = HEIGHT - MARGIN_BOTTOM;
    for (i, (label, value)) in bars.iter().enumerate() {
        let h = value / max * plot_height();
        let x = MARGIN_LEFT + slot * i as f64;
        let _ = write!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{FILL}" fill-opacity="0.7" stroke="black"/>"#,
            x + slot * 0.05,
            base - h,
            slot * 0.9,
            h
        );
        axis_label(out, x + slot / 2.0, base - h - 4.0, &format!("{}", value));
        axis_label(out, x + slot / 2.0, base + 16.0, label);
    }
}

fn draw_scatter(out: &mut String, points: &[(f64, f64)]) {
    draw_axes(out);
    let (min_x, max_x) = extent(points.iter().map(|p| p.0));
    let (min_y, max_y) = extent(points.iter().map(|p| p.1));
    for (x, y) in points {
        let px = MARGIN_LEFT + scale(*x, min_x, max_x) * plot_width();
        let py = HEIGHT - MARGIN_BOTTOM - scale(*y, min_y, max_y) * plot_height();
        let _ = write!(
            out,
            r#"<circle cx="{px:.1}" cy="{py:.1}" r="4" fill="{FILL}" fill-opacity="0.6" stroke="black" stroke-width="0.5"/>"#
        );
    }
    axis_label(out, MARGIN_LEFT, HEIGHT - MARGIN_BOTTOM + 16.0, &format!("{:.2}", min_x));
    axis_label(out, WIDTH - MARGIN_RIGHT, HEIGHT - MARGIN_BOTTOM + 16.0, &format!("{:.2}", max_x));
}

fn draw_boxes(out: &mut String, columns: &[BoxSummary]) {
    draw_axes(out);
    let (lo, hi) = extent(columns.iter().flat_map(|c| [c.min, c.max]));
    let slot = plot_width() / columns.len() as f64;
    let y = |v: f64| HEIGHT - MARGIN_BOTTOM - scale(v, lo, hi) * plot_height();
    for (i, c) in columns.iter().enumerate() {
        let center = MARGIN_LEFT + slot * (i as f64 + 0.5);
        let half = slot * 0.25;
        let _ = write!(
            out,
            r#"<line x1="{center:.1}" y1="{:.1}" x2="{center:.1}" y2="{:.1}" stroke="black"/><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="lightblue" fill-opacity="0.7" stroke="black"/><line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="2"/>"#,
            y(c.min),
            y(c.max),
            center - half,
            y(c.q3),
            half * 2.0,
            (y(c.q1) - y(c.q3)).max(0.0),
            center - half,
            y(c.median),
            center + half,
            y(c.median),
        );
        axis_label(out, center, HEIGHT - MARGIN_BOTTOM + 16.0, &c.column);
    }
}

fn draw_heatmap(out: &mut String, columns: &[String], matrix: &[Vec<Option<f64>>]) {
    let n = columns.len() as f64;
    let cell = (plot_width().min(plot_height())) / n;
    for (i, row) in matrix.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            let x = MARGIN_LEFT + cell * j as f64;
            let y = MARGIN_TOP + cell * i as f64;
            let (color, label) = match value {
                Some(v) => (heat_color(*v), format!("{:.2}", v)),
                None => ("#dddddd".to_string(), "n/a".to_string()),
            };
            let _ = write!(
                out,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{cell:.1}" height="{cell:.1}" fill="{color}" stroke="white"/>"#
            );
            axis_label(out, x + cell / 2.0, y + cell / 2.0 + 4.0, &label);
        }
    }
    for (i, name) in columns.iter().enumerate() {
        axis_label(
            out,
            MARGIN_LEFT + cell * (i as f64 + 0.5),
            MARGIN_TOP + cell * n + 16.0,
            name,
        );
    }
}

/// Diverging blue-white-red scale for a coefficient in [-1, 1].
fn heat_color(v: f64) -> String {
    let t = v.clamp(-1.0, 1.0);
    let fade = |c: f64| (255.0 - (255.0 - c) * t.abs()).round() as u8;
    if t >= 0.0 {
        format!("#{:02x}{:02x}{:02x}", fade(180.0), fade(40.0), fade(40.0))
    } else {
        format!("#{:02x}{:02x}{:02x}", fade(40.0), fade(80.0), fade(180.0))
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn scale(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        (v - lo) / (hi - lo)
    } else {
        0.5
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::ValueCount;

    #[test]
    fn test_render_returns_svg_data_url() {
        let spec = ChartSpec::Bar {
            column: "dept".to_string(),
            categories: vec![ValueCount {
                value: "R&D".to_string(),
                count: 3,
            }],
        };
        let url = SvgChartRenderer::new().render(&spec).unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));

        let svg = SvgChartRenderer::new().render_svg(&spec).unwrap();
        assert!(svg.contains("R&amp;D"));
        assert!(svg.contains("Distribution of dept"));
    }

    #[test]
    fn test_render_empty_scatter_fails() {
        let spec = ChartSpec::Scatter {
            x: "a".to_string(),
            y: "b".to_string(),
            correlation: None,
            point_count: 0,
            points: Vec::new(),
        };
        assert!(matches!(
            SvgChartRenderer::new().render(&spec),
            Err(RenderError::NoData(_))
        ));
    }
}
