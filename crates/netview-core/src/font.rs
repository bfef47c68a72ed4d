use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FontFamily {
    #[default]
    Proportional,
    Monospace,
}

/// Text rendering font, in scene units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub family: FontFamily,
    pub size: f32,
    pub bold: bool,
}

impl Font {
    pub fn proportional(size: f32) -> Self {
        Self {
            family: FontFamily::Proportional,
            size,
            bold: false,
        }
    }

    pub fn monospace(size: f32) -> Self {
        Self {
            family: FontFamily::Monospace,
            size,
            bold: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::proportional(12.0)
    }
}
