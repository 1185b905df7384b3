//! CSS color strings and their RGBA8 form.

use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<csscolorparser::Color> for SerializableColor {
    fn from(color: csscolorparser::Color) -> Self {
        let [r, g, b, a] = color.to_rgba8();
        Self::new(r, g, b, a)
    }
}

/// Parse any CSS color string (hex, `rgb()`/`rgba()` in comma or space
/// syntax, `hsl()`, `hwb()`, named colors, `transparent`).
pub fn parse_css_color(color: &str) -> Option<SerializableColor> {
    match csscolorparser::parse(color.trim()) {
        Ok(parsed) => Some(parsed.into()),
        Err(e) => {
            log::trace!("Rejected color {color:?}: {e}");
            None
        }
    }
}
