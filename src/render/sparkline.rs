//! Rolling-window trend chart.
//!
//! Samples are right-aligned: the newest sample sits on the right edge and a
//! partially filled window leaves the left side blank.

use crate::error::RenderError;
use crate::render::canvas::{Canvas, Glow, LinearGradient, Point};
use crate::render::color::Color;
use crate::storage::{SampleBuffer, SPARK_MAX};

pub const FALLBACK_WIDTH: f64 = 260.0;
pub const SPARK_HEIGHT: f64 = 40.0;
pub const GLOW_BLUR: f64 = 8.0;
pub const LINE_WIDTH: f64 = 1.5;
/// Top alpha of the area fill (0x44 ≈ 27%).
pub const AREA_ALPHA: u8 = 0x44;
/// Vertical inset keeping 0% and 100% off the surface edges.
const INSET: f64 = 2.0;

#[derive(Clone, Copy, Debug)]
pub struct TrendStyle {
    pub color: Color,
    pub glow: Color,
    pub capacity: usize,
}

impl TrendStyle {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            glow: color,
            capacity: SPARK_MAX,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

pub struct TrendRenderer<C> {
    canvas: C,
    style: TrendStyle,
    buffer: SampleBuffer,
}

impl<C: Canvas> TrendRenderer<C> {
    /// Binds the renderer to `canvas` and sizes it from the container's width.
    pub fn new(
        canvas: C,
        style: TrendStyle,
        container_width: Option<f64>,
    ) -> Result<Self, RenderError> {
        let mut renderer = Self {
            canvas,
            style,
            buffer: SampleBuffer::new(style.capacity),
        };
        renderer.resize(container_width)?;
        Ok(renderer)
    }

    /// Viewport change handler. Keeps the buffered samples.
    pub fn resize(&mut self, container_width: Option<f64>) -> Result<(), RenderError> {
        let width = container_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(FALLBACK_WIDTH);
        self.canvas.set_size(width, SPARK_HEIGHT)?;
        self.draw()
    }

    pub fn push(&mut self, value: f64) -> Result<(), RenderError> {
        self.buffer.push(value);
        self.draw()
    }

    /// Surface coordinates of the buffered samples, oldest first.
    pub fn points(&self) -> Vec<Point> {
        let (w, h) = self.canvas.size();
        let capacity = self.buffer.capacity();
        let n = self.buffer.len();
        let step = w / (capacity.saturating_sub(1).max(1)) as f64;
        self.buffer
            .values()
            .enumerate()
            .map(|(i, v)| Point {
                x: (capacity - n + i) as f64 * step,
                y: h - (v / 100.0) * (h - 2.0 * INSET) - INSET,
            })
            .collect()
    }

    pub fn draw(&mut self) -> Result<(), RenderError> {
        self.canvas.clear()?;
        if self.buffer.len() < 2 {
            return Ok(());
        }

        let (_, h) = self.canvas.size();
        let points = self.points();
        let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) else {
            return Ok(());
        };

        self.canvas.set_glow(Some(Glow {
            color: self.style.glow,
            blur: GLOW_BLUR,
        }));

        let mut area = Vec::with_capacity(points.len() + 2);
        area.push(Point::new(first.x, h));
        area.extend_from_slice(&points);
        area.push(Point::new(last.x, h));
        let paint = LinearGradient::vertical(
            h,
            self.style.color.with_alpha(AREA_ALPHA),
            self.style.color.with_alpha(0),
        );
        let result = self
            .canvas
            .fill_path(&area, &paint)
            .and_then(|_| self.canvas.stroke_path(&points, self.style.color, LINE_WIDTH));

        self.canvas.set_glow(None);
        result
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }
}
