//! Element slots the renderers write into.

use crate::render::canvas::Glow;
use crate::render::color::Color;
use crate::render::grid::GridContent;
use serde::Serialize;

/// Stroked arc whose visible length is set through a dash pattern.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ArcElement {
    pub dash: Option<[f64; 2]>,
    pub stroke: Option<Color>,
    pub glow: Option<Glow>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TextElement {
    pub text: String,
}

impl TextElement {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Container holding the device cards.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CardContainer {
    pub content: GridContent,
}

/// Arc plus value label for one gauge. Either part may be missing from a layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GaugeSlots {
    pub arc: Option<ArcElement>,
    pub label: Option<TextElement>,
}

impl GaugeSlots {
    pub fn present() -> Self {
        Self {
            arc: Some(ArcElement::default()),
            label: Some(TextElement::default()),
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}
