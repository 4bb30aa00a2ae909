use serde::{Serialize, Serializer};
use std::fmt;

/// Palette used by the dashboard widgets.
pub mod palette {
    use super::Color;

    pub const CPU_GREEN: Color = Color::rgb(0x00, 0xe5, 0xa0); // #00e5a0
    pub const RAM_BLUE: Color = Color::rgb(0x40, 0x90, 0xe0); // #4090e0
    pub const WARN_AMBER: Color = Color::rgb(0xe0, 0xa0, 0x30); // #e0a030
    pub const CRIT_RED: Color = Color::rgb(0xff, 0x40, 0x40); // #ff4040
}

/// An sRGB color with straight alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Opacity in [0, 1].
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// `#rrggbb` without the alpha channel.
    pub fn rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "{}", self.rgb_hex())
        } else {
            write!(f, "{}{:02x}", self.rgb_hex(), self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
