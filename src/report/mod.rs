//! Faceted comparison plot
//!
//! One facet per operation, one box per method inside each facet, elapsed
//! milliseconds on a shared log10 axis. Rendering produces a
//! device-independent scene ([`PlotArtifact`]); [`persist`] serializes it
//! to SVG or PDF depending on the file extension.

pub mod boxplot;
pub mod pdf;
pub mod scale;
pub mod svg;

use std::fs;
use std::path::Path;

use kurbo::{Circle, Line, Point, Rect};
use peniko::Color;
use tracing::{debug, info};

use crate::error::{BenchError, Result};
use crate::ops::OperationKind;
use crate::registry::Method;
use crate::results::ResultTable;

pub use boxplot::BoxStats;
pub use scale::{ScaleBand, ScaleLog};

/// Samples at or below zero are drawn at this value on the log axis
pub const MIN_PLOTTED_MS: f64 = 1e-6;

const BLACK: Color = Color::from_rgba8(0, 0, 0, 255);
const GRID: Color = Color::from_rgba8(220, 220, 220, 255);
const PANEL: Color = Color::from_rgba8(247, 247, 247, 255);
const STRIP: Color = Color::from_rgba8(217, 217, 217, 255);
const AXIS_TEXT: Color = Color::from_rgba8(77, 77, 77, 255);

/// Stable color per method
pub fn method_color(method: Method) -> Color {
    match method {
        Method::Native => Color::from_rgba8(78, 121, 167, 255),
        Method::Vectorized => Color::from_rgba8(242, 142, 43, 255),
        Method::Optimized => Color::from_rgba8(89, 161, 79, 255),
        Method::Other => Color::from_rgba8(176, 122, 161, 255),
    }
}

/// Blend toward white; `t = 0` keeps the color, `t = 1` is white
fn tint(color: Color, t: f64) -> Color {
    let c = color.to_rgba8();
    let mix = |v: u8| (f64::from(v) + (255.0 - f64::from(v)) * t).round() as u8;
    Color::from_rgba8(mix(c.r), mix(c.g), mix(c.b), c.a)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A drawing primitive in page coordinates (origin top-left, y down)
#[derive(Clone, Debug)]
pub enum Mark {
    Rect {
        rect: Rect,
        fill: Color,
        stroke: Option<Color>,
    },
    Line {
        line: Line,
        stroke: Color,
        width: f64,
    },
    Circle {
        circle: Circle,
        fill: Color,
    },
    /// `pos` is the baseline anchor; `angle` is in degrees, clockwise
    Text {
        pos: Point,
        text: String,
        size: f64,
        anchor: TextAnchor,
        angle: f64,
        fill: Color,
    },
}

/// One operation's panel
#[derive(Clone, Debug)]
pub struct Facet {
    pub operation: OperationKind,
    pub panel: Rect,
    pub boxes: Vec<(Method, BoxStats)>,
}

/// Rendered plot, ready to persist
#[derive(Clone, Debug)]
pub struct PlotArtifact {
    pub width: f64,
    pub height: f64,
    pub facets: Vec<Facet>,
    pub marks: Vec<Mark>,
    pub y_scale: ScaleLog,
}

impl PlotArtifact {
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// Text of every label, in draw order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().filter_map(|m| match m {
            Mark::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Axis label for a power of ten
pub fn tick_label(v: f64) -> String {
    let e = v.log10().round() as i32;
    if (-3..=4).contains(&e) {
        let decimals = (-e).max(0) as usize;
        format!("{:.*}", decimals, 10f64.powi(e))
    } else {
        format!("1e{}", e)
    }
}

/// Page layout and text for the comparison plot
#[derive(Clone, Debug)]
pub struct Reporter {
    pub width: f64,
    pub height: f64,
    pub title: String,
}

impl Default for Reporter {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 520.0,
            title: "Execution time by operation and method".into(),
        }
    }
}

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 130.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 50.0;
const FACET_GAP: f64 = 10.0;
const STRIP_HEIGHT: f64 = 22.0;
const MIN_FACET_WIDTH: f64 = 40.0;
const MIN_PANEL_HEIGHT: f64 = 60.0;

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Lay out the results as a faceted boxplot
    pub fn render(&self, results: &ResultTable) -> Result<PlotArtifact> {
        let operations = results.operations();
        let methods = results.methods();
        if operations.is_empty() {
            return Err(BenchError::Input("no results to plot".into()));
        }

        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for row in results.rows() {
            let v = row.elapsed_ms.max(MIN_PLOTTED_MS);
            lo = lo.min(v);
            hi = hi.max(v);
        }

        // Pages too small for the margins grow to fit every facet
        let n = operations.len() as f64;
        let width = self
            .width
            .max(MARGIN_LEFT + MARGIN_RIGHT + n * MIN_FACET_WIDTH + FACET_GAP * (n - 1.0));
        let height = self
            .height
            .max(MARGIN_TOP + STRIP_HEIGHT + MIN_PANEL_HEIGHT + MARGIN_BOTTOM);

        let plot_x0 = MARGIN_LEFT;
        let plot_x1 = width - MARGIN_RIGHT;
        let panel_y0 = MARGIN_TOP + STRIP_HEIGHT;
        let panel_y1 = height - MARGIN_BOTTOM;
        let facet_w = ((plot_x1 - plot_x0) - FACET_GAP * (n - 1.0)) / n;
        let y = ScaleLog::new(ScaleLog::decade_domain(lo, hi), (panel_y1, panel_y0));

        let mut marks = Vec::new();
        let mut facets = Vec::with_capacity(operations.len());
        marks.push(Mark::Text {
            pos: Point::new(plot_x0, MARGIN_TOP - 20.0),
            text: self.title.clone(),
            size: 16.0,
            anchor: TextAnchor::Start,
            angle: 0.0,
            fill: BLACK,
        });

        for (f, &operation) in operations.iter().enumerate() {
            let x0 = plot_x0 + f as f64 * (facet_w + FACET_GAP);
            let panel = Rect::new(x0, panel_y0, x0 + facet_w, panel_y1);
            marks.push(Mark::Rect {
                rect: panel,
                fill: PANEL,
                stroke: None,
            });
            marks.push(Mark::Rect {
                rect: Rect::new(x0, MARGIN_TOP, x0 + facet_w, panel_y0),
                fill: STRIP,
                stroke: None,
            });
            marks.push(Mark::Text {
                pos: Point::new(panel.center().x, MARGIN_TOP + 15.0),
                text: operation.name().into(),
                size: 12.0,
                anchor: TextAnchor::Middle,
                angle: 0.0,
                fill: BLACK,
            });
            for tick in y.ticks() {
                let ty = y.map(tick);
                marks.push(Mark::Line {
                    line: Line::new((panel.x0, ty), (panel.x1, ty)),
                    stroke: GRID,
                    width: 0.8,
                });
            }

            let band =
                ScaleBand::new((panel.x0, panel.x1), methods.len()).with_padding(0.3, 0.2);
            let mut boxes = Vec::new();
            for (i, &method) in methods.iter().enumerate() {
                let samples: Vec<f64> = results
                    .samples(operation, method)
                    .into_iter()
                    .map(|v| v.max(MIN_PLOTTED_MS))
                    .collect();
                marks.push(Mark::Text {
                    pos: Point::new(band.center(i), panel_y1 + 16.0),
                    text: method.label().into(),
                    size: 10.0,
                    anchor: TextAnchor::Middle,
                    angle: 0.0,
                    fill: AXIS_TEXT,
                });
                let Some(stats) = BoxStats::from_samples(&samples) else {
                    continue;
                };
                let color = method_color(method);
                box_marks(&mut marks, &stats, &y, (band.x(i), band.band_width()), color);
                boxes.push((method, stats));
            }
            facets.push(Facet {
                operation,
                panel,
                boxes,
            });
        }

        self.axis_marks(&mut marks, &y, panel_y0, panel_y1);
        self.legend_marks(&mut marks, &methods, plot_x1);
        debug!(facets = facets.len(), marks = marks.len(), "plot rendered");

        Ok(PlotArtifact {
            width,
            height,
            facets,
            marks,
            y_scale: y,
        })
    }

    fn axis_marks(&self, marks: &mut Vec<Mark>, y: &ScaleLog, panel_y0: f64, panel_y1: f64) {
        let x = MARGIN_LEFT;
        marks.push(Mark::Line {
            line: Line::new((x, panel_y0), (x, panel_y1)),
            stroke: AXIS_TEXT,
            width: 1.0,
        });
        for tick in y.ticks() {
            let ty = y.map(tick);
            marks.push(Mark::Line {
                line: Line::new((x - 4.0, ty), (x, ty)),
                stroke: AXIS_TEXT,
                width: 1.0,
            });
            marks.push(Mark::Text {
                pos: Point::new(x - 6.0, ty + 3.5),
                text: tick_label(tick),
                size: 10.0,
                anchor: TextAnchor::End,
                angle: 0.0,
                fill: AXIS_TEXT,
            });
        }
        marks.push(Mark::Text {
            pos: Point::new(18.0, (panel_y0 + panel_y1) / 2.0),
            text: "elapsed (ms, log scale)".into(),
            size: 11.0,
            anchor: TextAnchor::Middle,
            angle: -90.0,
            fill: BLACK,
        });
    }

    fn legend_marks(&self, marks: &mut Vec<Mark>, methods: &[Method], plot_x1: f64) {
        let x = plot_x1 + 20.0;
        let mut ty = MARGIN_TOP + STRIP_HEIGHT + 10.0;
        marks.push(Mark::Text {
            pos: Point::new(x, ty),
            text: "method".into(),
            size: 11.0,
            anchor: TextAnchor::Start,
            angle: 0.0,
            fill: BLACK,
        });
        for &method in methods {
            ty += 20.0;
            let color = method_color(method);
            marks.push(Mark::Rect {
                rect: Rect::new(x, ty - 10.0, x + 12.0, ty + 2.0),
                fill: tint(color, 0.4),
                stroke: Some(color),
            });
            marks.push(Mark::Text {
                pos: Point::new(x + 18.0, ty),
                text: method.label().into(),
                size: 10.0,
                anchor: TextAnchor::Start,
                angle: 0.0,
                fill: BLACK,
            });
        }
    }
}

/// Whiskers, box, median and outlier points for one method
fn box_marks(
    marks: &mut Vec<Mark>,
    stats: &BoxStats,
    y: &ScaleLog,
    (x0, width): (f64, f64),
    color: Color,
) {
    let cx = x0 + width / 2.0;
    let cap = width / 4.0;
    for (from, to) in [(stats.q3, stats.upper_whisker), (stats.q1, stats.lower_whisker)] {
        marks.push(Mark::Line {
            line: Line::new((cx, y.map(from)), (cx, y.map(to))),
            stroke: color,
            width: 1.0,
        });
        marks.push(Mark::Line {
            line: Line::new((cx - cap, y.map(to)), (cx + cap, y.map(to))),
            stroke: color,
            width: 1.0,
        });
    }
    marks.push(Mark::Rect {
        rect: Rect::new(x0, y.map(stats.q3), x0 + width, y.map(stats.q1)),
        fill: tint(color, 0.4),
        stroke: Some(color),
    });
    let my = y.map(stats.median);
    marks.push(Mark::Line {
        line: Line::new((x0, my), (x0 + width, my)),
        stroke: BLACK,
        width: 1.5,
    });
    for &v in &stats.outliers {
        marks.push(Mark::Circle {
            circle: Circle::new((cx, y.map(v)), 2.0),
            fill: color,
        });
    }
}

/// Write the artifact; `.pdf` gives PDF, anything else SVG
pub fn persist(artifact: &PlotArtifact, path: &Path) -> Result<()> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    let bytes = if is_pdf {
        pdf::to_pdf(artifact)
    } else {
        svg::to_svg(artifact).into_bytes()
    };
    fs::write(path, &bytes).map_err(|e| BenchError::io(path, e))?;
    info!(
        path = %path.display(),
        format = if is_pdf { "pdf" } else { "svg" },
        bytes = bytes.len(),
        "plot written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Aggregator;
    use std::time::Duration;

    fn results() -> ResultTable {
        let mut agg = Aggregator::new();
        for op in OperationKind::ALL {
            for (m, base) in [(Method::Native, 900), (Method::Optimized, 40)] {
                let samples: Vec<Duration> =
                    (0..10).map(|i| Duration::from_micros(base + i * 7)).collect();
                agg.record(op, m, &samples);
            }
        }
        agg.finalize()
    }

    #[test]
    fn test_one_facet_per_operation_in_catalog_order() {
        let artifact = Reporter::new().render(&results()).unwrap();
        assert_eq!(artifact.facet_count(), 5);
        let ops: Vec<_> = artifact.facets.iter().map(|f| f.operation).collect();
        assert_eq!(ops, OperationKind::ALL.to_vec());
        assert!(artifact.facets.iter().all(|f| f.boxes.len() == 2));
    }

    #[test]
    fn test_facets_share_y_axis() {
        let artifact = Reporter::new().render(&results()).unwrap();
        let (lo, hi) = artifact.y_scale.domain();
        assert!((lo - 0.01).abs() < 1e-12);
        assert!((hi - 1.0).abs() < 1e-9);
        let panels: Vec<_> = artifact
            .facets
            .iter()
            .map(|f| (f.panel.y0, f.panel.y1))
            .collect();
        assert!(panels.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_labels_present() {
        let artifact = Reporter::new().render(&results()).unwrap();
        let labels: Vec<_> = artifact.labels().collect();
        assert!(labels.contains(&"group_aggregate"));
        assert!(labels.contains(&"optimized"));
        assert!(labels.contains(&"0.1"));
    }

    #[test]
    fn test_custom_size_and_title() {
        let artifact = Reporter::new()
            .with_size(640.0, 360.0)
            .with_title("mtcars timings")
            .render(&results())
            .unwrap();
        assert_eq!((artifact.width, artifact.height), (640.0, 360.0));
        assert!(artifact.labels().any(|l| l == "mtcars timings"));
    }

    #[test]
    fn test_tiny_page_grows_to_fit() {
        let artifact = Reporter::new()
            .with_size(100.0, 100.0)
            .render(&results())
            .unwrap();
        assert!(artifact.width > 100.0 && artifact.height > 100.0);
        assert!(artifact.facets.iter().all(|f| f.panel.width() > 0.0));
        assert!(artifact.marks.iter().all(|m| match m {
            Mark::Rect { rect, .. } => rect.width() >= 0.0 && rect.height() >= 0.0,
            _ => true,
        }));
        assert!(!svg::to_svg(&artifact).contains("width=\"-"));
    }

    #[test]
    fn test_empty_results_rejected() {
        assert!(Reporter::new().render(&ResultTable::default()).is_err());
    }

    #[test]
    fn test_tick_label() {
        assert_eq!(tick_label(0.001), "0.001");
        assert_eq!(tick_label(1.0), "1");
        assert_eq!(tick_label(100.0), "100");
        assert_eq!(tick_label(1e-5), "1e-5");
        assert_eq!(tick_label(1e6), "1e6");
    }

    #[test]
    fn test_persist_by_extension() {
        let artifact = Reporter::new().render(&results()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let pdf_path = dir.path().join("plot.pdf");
        persist(&artifact, &pdf_path).unwrap();
        assert!(fs::read(&pdf_path).unwrap().starts_with(b"%PDF-"));

        let svg_path = dir.path().join("plot.svg");
        persist(&artifact, &svg_path).unwrap();
        assert!(fs::read_to_string(&svg_path).unwrap().starts_with("<svg"));
    }

    #[test]
    fn test_persist_unwritable_path() {
        let artifact = Reporter::new().render(&results()).unwrap();
        let err = persist(&artifact, Path::new("/nonexistent/dir/plot.pdf")).unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }
}
