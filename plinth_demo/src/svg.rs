// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turns recorded draw commands into SVG.

use std::fmt::Write as _;

use kurbo::Size;
use peniko::Brush;
use plinth_layout::DrawCommand;

/// One rendered frame.
#[derive(Debug)]
pub(crate) struct SvgFrame {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl SvgFrame {
    pub(crate) fn new(size: Size, commands: Vec<DrawCommand>) -> Self {
        Self { size, commands }
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
            w = self.size.width,
            h = self.size.height,
        );

        // Decoration boxes sit under everything a widget draws.
        for command in &self.commands {
            if let DrawCommand::Box { class, rect } = command {
                let _ = writeln!(
                    out,
                    r##"<rect class="{}" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="#d0d0d0"/>"##,
                    escape_xml(class),
                    rect.x0,
                    rect.y0,
                    rect.width(),
                    rect.height(),
                );
            }
        }

        for command in &self.commands {
            match command {
                DrawCommand::FillRect { rect, brush } => {
                    let _ = write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                        rect.x0,
                        rect.y0,
                        rect.width(),
                        rect.height(),
                    );
                    write_paint_attr(&mut out, "fill", brush);
                    out.push_str("/>\n");
                }
                DrawCommand::Text {
                    origin,
                    text,
                    font_size,
                    brush,
                } => {
                    let _ = write!(
                        out,
                        r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="hanging""#,
                        origin.x, origin.y, font_size
                    );
                    write_paint_attr(&mut out, "fill", brush);
                    out.push('>');
                    out.push_str(&escape_xml(text));
                    out.push_str("</text>\n");
                }
                DrawCommand::Box { .. } => {}
            }
        }

        out.push_str("</svg>\n");
        out
    }
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            let fill = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let fill_opacity = if rgba.a == 255 {
                None
            } else {
                Some(f64::from(rgba.a) / 255.0)
            };
            (fill, fill_opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

fn escape_xml(s: &str) -> String {
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

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};
    use peniko::color::palette::css;

    use super::*;

    #[test]
    fn boxes_are_drawn_first_and_text_is_escaped() {
        let frame = SvgFrame::new(
            Size::new(100.0, 50.0),
            vec![
                DrawCommand::Text {
                    origin: Point::new(1.0, 2.0),
                    text: "a < b".to_string(),
                    font_size: 10.0,
                    brush: Brush::Solid(css::BLACK),
                },
                DrawCommand::Box {
                    class: "frame".to_string(),
                    rect: Rect::new(0.0, 0.0, 100.0, 50.0),
                },
            ],
        );

        let svg = frame.to_svg_string();

        let rect_at = svg.find("<rect").expect("box rect");
        let text_at = svg.find("<text").expect("text");
        assert!(rect_at < text_at);
        assert!(svg.contains("a &lt; b"));
        assert!(svg.contains(r##"fill="#000000""##));
    }
}
