// Half-circle gauge image of the latest node count.
//
// Layout: the scale runs from 0 (left) to `max` (right) along the upper half circle.
// Zones [0, min] and [min, value] are filled in warm colours, [value, max] in grey,
// with a blue bar from 0 to the value on top. SVG when the path ends in `.svg`,
// PNG bitmap otherwise.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::instrument;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 500;

const BELOW_MIN: RGBColor = RGBColor(255, 215, 0);
const MIN_TO_VALUE: RGBColor = YELLOW;
const ABOVE_VALUE: RGBColor = RGBColor(128, 128, 128);
const BAR: RGBColor = RGBColor(0, 191, 255);
const THRESHOLD: RGBColor = RGBColor(128, 128, 128);

/// Segments per radian when approximating arcs.
const ARC_RESOLUTION: f64 = 90.0 / PI;
const SCALE_TICKS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid gauge scale: {0}")]
    InvalidScale(String),
    #[error("drawing gauge {path}: {message}")]
    Draw { path: PathBuf, message: String },
}

/// What the gauge shows: the current value between a lower mark and the scale ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeReading {
    value: f64,
    min: f64,
    max: f64,
}

impl GaugeReading {
    pub fn new(value: f64, min: f64, max: f64) -> Result<Self, RenderError> {
        if !(value.is_finite() && min.is_finite() && max.is_finite()) {
            return Err(RenderError::InvalidScale(format!(
                "non-finite input (value={value}, min={min}, max={max})"
            )));
        }
        if max <= 0.0 {
            return Err(RenderError::InvalidScale(format!(
                "ceiling must be > 0, got {max}"
            )));
        }
        if min < 0.0 || min > max {
            return Err(RenderError::InvalidScale(format!(
                "min must be within [0, {max}], got {min}"
            )));
        }
        Ok(Self { value, min, max })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Position of `v` along the scale, clamped to [0, 1].
    pub fn fraction(&self, v: f64) -> f64 {
        (v / self.max).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GaugeRenderer {
    width: u32,
    height: u32,
}

impl Default for GaugeRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Pixel geometry derived from the canvas size.
struct Dial {
    cx: f64,
    cy: f64,
    outer: f64,
    inner: f64,
}

impl Dial {
    fn for_canvas(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        let outer = (w * 0.38).min(h * 0.55);
        let cy = (h * 0.16 + outer + 18.0).min(h * 0.85);
        Self {
            cx: w / 2.0,
            cy,
            outer,
            inner: outer * 0.62,
        }
    }

    /// Angle of a scale fraction: 0 sits at the left (pi), 1 at the right (0).
    fn angle(fraction: f64) -> f64 {
        PI * (1.0 - fraction)
    }

    fn point(&self, radius: f64, angle: f64) -> (i32, i32) {
        (
            (self.cx + radius * angle.cos()).round() as i32,
            (self.cy - radius * angle.sin()).round() as i32,
        )
    }

    fn arc(&self, radius: f64, from: f64, to: f64) -> Vec<(i32, i32)> {
        let steps = (((to - from).abs() * ARC_RESOLUTION).ceil() as usize).max(2);
        (0..=steps)
            .map(|i| {
                let a = from + (to - from) * (i as f64 / steps as f64);
                self.point(radius, a)
            })
            .collect()
    }

    /// Closed outline of the ring segment between two scale fractions.
    fn sector(&self, r_in: f64, r_out: f64, from: f64, to: f64) -> Vec<(i32, i32)> {
        let (a0, a1) = (Self::angle(from), Self::angle(to));
        let mut points = self.arc(r_out, a0, a1);
        let mut inner = self.arc(r_in, a1, a0);
        points.append(&mut inner);
        points
    }
}

impl GaugeRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw `reading` to `path`, replacing any existing file.
    #[instrument(skip(self), fields(operation = "render_gauge"))]
    pub fn render(&self, reading: &GaugeReading, path: &Path) -> Result<(), RenderError> {
        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        let size = (self.width, self.height);
        let result = if is_svg {
            let root = SVGBackend::new(path, size).into_drawing_area();
            self.draw(&root, reading)
                .and_then(|_| root.present())
                .map_err(|e| e.to_string())
        } else {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            self.draw(&root, reading)
                .and_then(|_| root.present())
                .map_err(|e| e.to_string())
        };
        result.map_err(|message| RenderError::Draw {
            path: path.to_path_buf(),
            message,
        })
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        reading: &GaugeReading,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let dial = Dial::for_canvas(self.width, self.height);
        let band = dial.outer - dial.inner;
        let value = reading.fraction(reading.value());
        let min = reading.fraction(reading.min());

        root.fill(&BLACK)?;

        let zones = [
            (0.0, min, BELOW_MIN),
            (min, value, MIN_TO_VALUE),
            (value, 1.0, ABOVE_VALUE),
        ];
        for (from, to, color) in zones {
            if to > from {
                root.draw(&Polygon::new(
                    dial.sector(dial.inner, dial.outer, from, to),
                    color.filled(),
                ))?;
            }
        }

        if value > 0.0 {
            root.draw(&Polygon::new(
                dial.sector(
                    dial.inner + band * 0.25,
                    dial.outer - band * 0.25,
                    0.0,
                    value,
                ),
                BAR.filled(),
            ))?;
        }

        let border = WHITE.stroke_width(2);
        root.draw(&PathElement::new(
            dial.arc(dial.outer, PI, 0.0),
            border,
        ))?;
        root.draw(&PathElement::new(
            dial.arc(dial.inner, PI, 0.0),
            border,
        ))?;

        let ceiling = Dial::angle(1.0);
        root.draw(&PathElement::new(
            vec![
                dial.point(dial.inner + band * 0.125, ceiling),
                dial.point(dial.outer - band * 0.125, ceiling),
            ],
            THRESHOLD.stroke_width(4),
        ))?;

        let centered = Pos::new(HPos::Center, VPos::Center);
        let label_style = ("sans-serif", 14).into_font().color(&WHITE).pos(centered);
        for i in 0..=SCALE_TICKS {
            let fraction = i as f64 / SCALE_TICKS as f64;
            let angle = Dial::angle(fraction);
            root.draw(&PathElement::new(
                vec![
                    dial.point(dial.outer, angle),
                    dial.point(dial.outer + 6.0, angle),
                ],
                WHITE.stroke_width(1),
            ))?;
            root.draw(&Text::new(
                format!("{:.0}", reading.max() * fraction),
                dial.point(dial.outer + 20.0, angle),
                label_style.clone(),
            ))?;
        }

        let title_style = ("sans-serif", 24).into_font().color(&WHITE).pos(centered);
        root.draw(&Text::new(
            "Node Count".to_string(),
            (dial.cx as i32, (self.height as f64 * 0.07) as i32),
            title_style,
        ))?;

        let value_style = ("sans-serif", 44).into_font().color(&WHITE).pos(centered);
        root.draw(&Text::new(
            format!("{:.2}", reading.value()),
            dial.point(dial.inner * 0.35, PI / 2.0),
            value_style,
        ))?;

        Ok(())
    }
}
