//! Drawable surfaces.
//!
//! Renderers draw through the [`Canvas`] trait so they can be driven without a
//! real display. [`RecordingCanvas`] keeps the current picture as a display list
//! that presenters turn into SVG or terminal glyphs.

use crate::error::RenderError;
use crate::render::color::Color;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

/// Linear gradient in surface coordinates, from `start` to `end`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn vertical(height: f64, top: Color, bottom: Color) -> Self {
        Self {
            start: Point::new(0.0, 0.0),
            end: Point::new(0.0, height),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: top,
                },
                GradientStop {
                    offset: 1.0,
                    color: bottom,
                },
            ],
        }
    }
}

/// Soft outer shadow applied to subsequent fills and strokes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Glow {
    pub color: Color,
    pub blur: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Closed polygon filled with a gradient.
    Fill {
        points: Vec<Point>,
        paint: LinearGradient,
        glow: Option<Glow>,
    },
    /// Open polyline.
    Stroke {
        points: Vec<Point>,
        color: Color,
        width: f64,
        glow: Option<Glow>,
    },
}

pub trait Canvas {
    fn size(&self) -> (f64, f64);

    /// Resizes the surface. Like an HTML canvas, resizing discards the content.
    fn set_size(&mut self, width: f64, height: f64) -> Result<(), RenderError>;

    fn clear(&mut self) -> Result<(), RenderError>;

    /// Sets or removes the glow used by later fill/stroke calls.
    fn set_glow(&mut self, glow: Option<Glow>);

    fn fill_path(&mut self, points: &[Point], paint: &LinearGradient) -> Result<(), RenderError>;

    fn stroke_path(&mut self, points: &[Point], color: Color, width: f64)
        -> Result<(), RenderError>;
}

/// In-memory surface that stores what was drawn since the last clear.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    #[serde(skip)]
    glow: Option<Glow>,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_blank(&self) -> bool {
        self.ops.is_empty()
    }

    /// Renders the display list as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let (w, h) = (self.width, self.height);
        let mut defs = String::new();
        let mut body = String::new();

        for (i, op) in self.ops.iter().enumerate() {
            let glow = match op {
                DrawOp::Fill { glow, .. } | DrawOp::Stroke { glow, .. } => glow,
            };
            let filter_attr = match glow {
                Some(g) => {
                    // Canvas shadowBlur is roughly twice the Gaussian deviation.
                    let _ = write!(
                        defs,
                        r#"<filter id="glow{i}" x="-50%" y="-50%" width="200%" height="200%"><feDropShadow dx="0" dy="0" stdDeviation="{}" flood-color="{}" flood-opacity="{:.3}"/></filter>"#,
                        g.blur / 2.0,
                        g.color.rgb_hex(),
                        g.color.opacity()
                    );
                    format!(r#" filter="url(#glow{i})""#)
                }
                None => String::new(),
            };

            match op {
                DrawOp::Fill { points, paint, .. } => {
                    let _ = write!(
                        defs,
                        r#"<linearGradient id="paint{i}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">"#,
                        paint.start.x, paint.start.y, paint.end.x, paint.end.y
                    );
                    for stop in &paint.stops {
                        let _ = write!(
                            defs,
                            r#"<stop offset="{}" stop-color="{}" stop-opacity="{:.3}"/>"#,
                            stop.offset,
                            stop.color.rgb_hex(),
                            stop.color.opacity()
                        );
                    }
                    defs.push_str("</linearGradient>");
                    let _ = write!(
                        body,
                        r#"<path d="{}" fill="url(#paint{i})"{filter_attr}/>"#,
                        path_data(points, true)
                    );
                }
                DrawOp::Stroke {
                    points,
                    color,
                    width,
                    ..
                } => {
                    let _ = write!(
                        body,
                        r#"<path d="{}" fill="none" stroke="{}" stroke-opacity="{:.3}" stroke-width="{width}" stroke-linejoin="round"{filter_attr}/>"#,
                        path_data(points, false),
                        color.rgb_hex(),
                        color.opacity()
                    );
                }
            }
        }

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><defs>{defs}</defs>{body}</svg>"#
        )
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        self.width = width;
        self.height = height;
        self.ops.clear();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.ops.clear();
        Ok(())
    }

    fn set_glow(&mut self, glow: Option<Glow>) {
        self.glow = glow;
    }

    fn fill_path(&mut self, points: &[Point], paint: &LinearGradient) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Fill {
            points: points.to_vec(),
            paint: paint.clone(),
            glow: self.glow,
        });
        Ok(())
    }

    fn stroke_path(
        &mut self,
        points: &[Point],
        color: Color,
        width: f64,
    ) -> Result<(), RenderError> {
        self.ops.push(DrawOp::Stroke {
            points: points.to_vec(),
            color,
            width,
            glow: self.glow,
        });
        Ok(())
    }
}

fn path_data(points: &[Point], close: bool) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{:.2},{:.2} ", p.x, p.y);
    }
    if close && !points.is_empty() {
        d.push('Z');
    }
    d.trim_end().to_string()
}
