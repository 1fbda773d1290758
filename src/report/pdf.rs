//! Single-page PDF serialization of a plot scene
//!
//! Writes PDF 1.4 with one uncompressed content stream and the built-in
//! Helvetica font. Page units are points; the scene's y-down coordinates
//! are flipped per coordinate rather than with a page transform so text
//! stays upright without a compensating matrix.

use std::fmt::Write;

use kurbo::{PathEl, Point, Shape};
use peniko::Color;

use super::{Mark, PlotArtifact, TextAnchor};

/// Average Helvetica advance, in em, for anchor placement
const AVG_GLYPH_EM: f64 = 0.52;

/// Compact number for content streams: at most two decimals
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".into()
    } else {
        s.into()
    }
}

fn rgb(color: Color) -> String {
    let c = color.to_rgba8();
    let unit = |v: u8| num(f64::from(v) / 255.0);
    format!("{} {} {}", unit(c.r), unit(c.g), unit(c.b))
}

/// Text string literal; non-ASCII is replaced since Helvetica has no glyphs for it
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

struct Page {
    height: f64,
    ops: String,
}

impl Page {
    fn pt(&self, p: Point) -> (String, String) {
        (num(p.x), num(self.height - p.y))
    }

    fn path(&mut self, shape: &impl Shape) {
        let mut last = Point::ZERO;
        for el in shape.path_elements(0.1) {
            match el {
                PathEl::MoveTo(p) => {
                    let (x, y) = self.pt(p);
                    let _ = writeln!(self.ops, "{x} {y} m");
                    last = p;
                }
                PathEl::LineTo(p) => {
                    let (x, y) = self.pt(p);
                    let _ = writeln!(self.ops, "{x} {y} l");
                    last = p;
                }
                PathEl::QuadTo(c, p) => {
                    // elevate to cubic
                    let c1 = last + (c - last) * (2.0 / 3.0);
                    let c2 = p + (c - p) * (2.0 / 3.0);
                    self.curve(c1, c2, p);
                    last = p;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    self.curve(c1, c2, p);
                    last = p;
                }
                PathEl::ClosePath => self.ops.push_str("h\n"),
            }
        }
    }

    fn curve(&mut self, c1: Point, c2: Point, p: Point) {
        let (x1, y1) = self.pt(c1);
        let (x2, y2) = self.pt(c2);
        let (x3, y3) = self.pt(p);
        let _ = writeln!(self.ops, "{x1} {y1} {x2} {y2} {x3} {y3} c");
    }

    fn mark(&mut self, mark: &Mark) {
        match mark {
            Mark::Rect { rect, fill, stroke } => {
                let _ = writeln!(self.ops, "{} rg", rgb(*fill));
                self.path(rect);
                match stroke {
                    Some(s) => {
                        let _ = writeln!(self.ops, "{} RG 1 w B", rgb(*s));
                    }
                    None => self.ops.push_str("f\n"),
                }
            }
            Mark::Line {
                line,
                stroke,
                width,
            } => {
                let _ = writeln!(self.ops, "{} RG {} w", rgb(*stroke), num(*width));
                self.path(line);
                self.ops.push_str("S\n");
            }
            Mark::Circle { circle, fill } => {
                let _ = writeln!(self.ops, "{} rg", rgb(*fill));
                self.path(circle);
                self.ops.push_str("f\n");
            }
            Mark::Text {
                pos,
                text,
                size,
                anchor,
                angle,
                fill,
            } => {
                let advance = AVG_GLYPH_EM * size * text.chars().count() as f64;
                let shift = match anchor {
                    TextAnchor::Start => 0.0,
                    TextAnchor::Middle => -advance / 2.0,
                    TextAnchor::End => -advance,
                };
                // clockwise in the scene is counter-clockwise on the page
                let (sin, cos) = (-angle).to_radians().sin_cos();
                let x = pos.x + shift * cos;
                let y = self.height - pos.y + shift * sin;
                let _ = writeln!(
                    self.ops,
                    "BT {} rg /F1 {} Tf {} {} {} {} {} {} Tm {} Tj ET",
                    rgb(*fill),
                    num(*size),
                    num(cos),
                    num(sin),
                    num(-sin),
                    num(cos),
                    num(x),
                    num(y),
                    pdf_string(text)
                );
            }
        }
    }
}

/// Serialize to a complete PDF document
pub fn to_pdf(artifact: &PlotArtifact) -> Vec<u8> {
    let mut page = Page {
        height: artifact.height,
        ops: String::new(),
    };
    page.ops.push_str("1 1 1 rg\n");
    page.path(&kurbo::Rect::new(0.0, 0.0, artifact.width, artifact.height));
    page.ops.push_str("f\n");
    for mark in &artifact.marks {
        page.mark(mark);
    }

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>",
            num(artifact.width),
            num(artifact.height)
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            page.ops.len(),
            page.ops
        ),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
    }
    let xref = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        let _ = write!(out, "{:010} 00000 n \n", off);
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    );
    out.into_bytes()
}
