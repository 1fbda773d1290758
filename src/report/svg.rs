//! SVG serialization of a plot scene

use std::fmt::Write;

use peniko::Color;

use super::{Mark, PlotArtifact, TextAnchor};

fn svg_paint(color: Color) -> (String, Option<f64>) {
    let rgba = color.to_rgba8();
    let value = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
    let opacity = if rgba.a == 255 {
        None
    } else {
        Some(f64::from(rgba.a) / 255.0)
    };
    (value, opacity)
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    let (value, opacity) = svg_paint(color);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn to_svg(artifact: &PlotArtifact) -> String {
    let (w, h) = (artifact.width, artifact.height);
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="Helvetica, Arial, sans-serif">"#
    );
    let _ = writeln!(out, r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##);

    for mark in &artifact.marks {
        match mark {
            Mark::Rect { rect, fill, stroke } => {
                let _ = write!(
                    out,
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}""#,
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height()
                );
                write_paint_attr(&mut out, "fill", *fill);
                if let Some(stroke) = stroke {
                    write_paint_attr(&mut out, "stroke", *stroke);
                }
                out.push_str("/>\n");
            }
            Mark::Line {
                line,
                stroke,
                width,
            } => {
                let _ = write!(
                    out,
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke-width="{}""#,
                    line.p0.x, line.p0.y, line.p1.x, line.p1.y, width
                );
                write_paint_attr(&mut out, "stroke", *stroke);
                out.push_str("/>\n");
            }
            Mark::Circle { circle, fill } => {
                let _ = write!(
                    out,
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{}""#,
                    circle.center.x, circle.center.y, circle.radius
                );
                write_paint_attr(&mut out, "fill", *fill);
                out.push_str("/>\n");
            }
            Mark::Text {
                pos,
                text,
                size,
                anchor,
                angle,
                fill,
            } => {
                let _ = write!(
                    out,
                    r#"<text x="{:.2}" y="{:.2}" font-size="{}""#,
                    pos.x, pos.y, size
                );
                if *angle != 0.0 {
                    let _ = write!(
                        out,
                        r#" transform="rotate({} {:.2} {:.2})""#,
                        angle, pos.x, pos.y
                    );
                }
                out.push_str(match anchor {
                    TextAnchor::Start => r#" text-anchor="start""#,
                    TextAnchor::Middle => r#" text-anchor="middle""#,
                    TextAnchor::End => r#" text-anchor="end""#,
                });
                write_paint_attr(&mut out, "fill", *fill);
                out.push('>');
                out.push_str(&escape_xml(text));
                out.push_str("</text>\n");
            }
        }
    }

    out.push_str("</svg>\n");
    out
}
