//! Semicircular gauge: arc fill length and severity color for a percentage.

use crate::render::canvas::Glow;
use crate::render::color::{palette, Color};
use crate::render::target::{ArcElement, TextElement};
use serde::Serialize;
use std::f64::consts::PI;

pub const ARC_RADIUS: f64 = 80.0;
/// Length of the half circle, π·r.
pub const ARC_LEN: f64 = PI * ARC_RADIUS;
pub const GLOW_BLUR: f64 = 6.0;
const GLOW_ALPHA: u8 = 0x80;

pub const DEFAULT_WARN: f64 = 85.0;
pub const DEFAULT_CRIT: f64 = 95.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    pub warn: f64,
    pub crit: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn: DEFAULT_WARN,
            crit: DEFAULT_CRIT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warn,
    Crit,
}

impl Thresholds {
    /// Each boundary belongs to the higher severity.
    pub fn classify(&self, pct: f64) -> Severity {
        if pct >= self.crit {
            Severity::Crit
        } else if pct >= self.warn {
            Severity::Warn
        } else {
            Severity::Normal
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GaugeStyle {
    /// Color used below the warn threshold.
    pub identity: Color,
    pub thresholds: Thresholds,
}

impl GaugeStyle {
    pub fn new(identity: Color) -> Self {
        Self {
            identity,
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn reading(&self, pct: f64) -> GaugeReading {
        let severity = self.thresholds.classify(pct);
        let color = match severity {
            Severity::Crit => palette::CRIT_RED,
            Severity::Warn => palette::WARN_AMBER,
            Severity::Normal => self.identity,
        };
        GaugeReading {
            fill: pct / 100.0 * ARC_LEN,
            severity,
            color,
            label: format!("{pct:.1}%"),
        }
    }
}

/// Everything a gauge shows for one value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GaugeReading {
    pub fill: f64,
    pub severity: Severity,
    pub color: Color,
    pub label: String,
}

impl GaugeReading {
    /// Dash pattern: visible fill, then a gap long enough to hide the rest.
    pub fn dash(&self) -> [f64; 2] {
        [self.fill, ARC_LEN]
    }

    pub fn glow(&self) -> Glow {
        Glow {
            color: self.color.with_alpha(GLOW_ALPHA),
            blur: GLOW_BLUR,
        }
    }
}

/// Writes `pct` into a gauge's arc and label.
///
/// Layouts may omit a gauge; if either slot is absent nothing is touched.
pub fn render_gauge(
    arc: Option<&mut ArcElement>,
    label: Option<&mut TextElement>,
    pct: f64,
    style: &GaugeStyle,
) {
    let (Some(arc), Some(label)) = (arc, label) else {
        return;
    };
    let reading = style.reading(pct);
    arc.dash = Some(reading.dash());
    arc.stroke = Some(reading.color);
    arc.glow = Some(reading.glow());
    label.set(reading.label);
}

/// SVG for a gauge: dim track plus the filled arc from `arc`.
pub fn gauge_svg(arc: &ArcElement, label: Option<&TextElement>) -> String {
    const PATH: &str = "M20,100 A80,80 0 0 1 180,100";
    let track = format!(
        r##"<path d="{PATH}" fill="none" stroke="#1c2740" stroke-width="12" stroke-linecap="round"/>"##
    );
    let fill = match (arc.dash, arc.stroke) {
        (Some([fill, gap]), Some(stroke)) => {
            let filter = match arc.glow {
                Some(g) => format!(
                    r#" style="filter: drop-shadow(0 0 {}px {})""#,
                    g.blur, g.color
                ),
                None => String::new(),
            };
            format!(
                r#"<path d="{PATH}" fill="none" stroke="{stroke}" stroke-width="12" stroke-linecap="round" stroke-dasharray="{fill:.2} {gap:.2}"{filter}/>"#
            )
        }
        _ => String::new(),
    };
    let text = label
        .map(|l| {
            format!(
                r##"<text x="100" y="95" text-anchor="middle" font-family="monospace" font-size="22" fill="#e5e7eb">{}</text>"##,
                l.text
            )
        })
        .unwrap_or_default();
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="110" viewBox="0 0 200 110">{track}{fill}{text}</svg>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-2;

    fn cpu() -> GaugeStyle {
        GaugeStyle::new(palette::CPU_GREEN)
    }

    #[test]
    fn threshold_boundaries_take_higher_severity() {
        let style = cpu();
        assert_eq!(style.reading(84.9).color, palette::CPU_GREEN);
        assert_eq!(style.reading(85.0).color, palette::WARN_AMBER);
        assert_eq!(style.reading(94.9).color, palette::WARN_AMBER);
        assert_eq!(style.reading(95.0).color, palette::CRIT_RED);
        assert_eq!(style.reading(95.0).severity, Severity::Crit);
    }

    #[test]
    fn identity_color_is_per_gauge() {
        let ram = GaugeStyle::new(palette::RAM_BLUE);
        assert_eq!(ram.reading(10.0).color, palette::RAM_BLUE);
        assert_eq!(ram.reading(90.0).color, palette::WARN_AMBER);
    }

    #[test]
    fn arc_fill_is_proportional() {
        let style = cpu();
        assert!((style.reading(50.0).fill - 125.66).abs() < EPS);
        assert!((style.reading(100.0).fill - 251.33).abs() < EPS);
        assert_eq!(style.reading(0.0).fill, 0.0);
        assert_eq!(style.reading(50.0).dash()[1], ARC_LEN);
    }

    #[test]
    fn label_has_one_decimal() {
        assert_eq!(cpu().reading(42.26).label, "42.3%");
        assert_eq!(cpu().reading(7.0).label, "7.0%");
    }

    #[test]
    fn custom_thresholds() {
        let style = cpu().with_thresholds(Thresholds {
            warn: 50.0,
            crit: 70.0,
        });
        assert_eq!(style.reading(60.0).severity, Severity::Warn);
        assert_eq!(style.reading(70.0).severity, Severity::Crit);
    }

    #[test]
    fn writes_arc_and_label() {
        let mut arc = ArcElement::default();
        let mut label = TextElement::default();
        render_gauge(Some(&mut arc), Some(&mut label), 96.0, &cpu());
        assert_eq!(arc.stroke, Some(palette::CRIT_RED));
        assert_eq!(arc.glow.unwrap().color, palette::CRIT_RED.with_alpha(0x80));
        assert_eq!(label.text, "96.0%");
    }

    #[test]
    fn missing_slot_is_a_no_op() {
        let mut arc = ArcElement::default();
        let mut label = TextElement::default();
        render_gauge(Some(&mut arc), None, 50.0, &cpu());
        render_gauge(None, Some(&mut label), 50.0, &cpu());
        assert_eq!(arc, ArcElement::default());
        assert_eq!(label, TextElement::default());
    }

    #[test]
    fn svg_carries_dash_pattern() {
        let mut arc = ArcElement::default();
        let mut label = TextElement::default();
        render_gauge(Some(&mut arc), Some(&mut label), 50.0, &cpu());
        let svg = gauge_svg(&arc, Some(&label));
        assert!(svg.contains(r#"stroke-dasharray="125.66 251.33""#));
        assert!(svg.contains("50.0%"));
    }
}
