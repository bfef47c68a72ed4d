//! Network Style System
//!
//! Named themes supplying node fill, outline, text color and font, with
//! optional per-state overrides (e.g. `"selected"`).

use netview_core::{Color, Font, Pen, STATE_SELECTED, StyleError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source of node appearance, keyed by an optional visual state.
///
/// State lookups return `None` when the theme does not define that state;
/// callers fall back to the node's own appearance.
pub trait StyleProvider {
    fn name(&self) -> &str;
    fn node_fill(&self) -> Color;
    fn node_outline(&self) -> Pen;
    fn node_text_color(&self) -> Color;
    fn node_font(&self) -> Font;
    fn state_fill(&self, state: &str) -> Option<Color>;
    fn state_outline(&self, state: &str) -> Option<Pen>;
    fn state_text_color(&self, state: &str) -> Option<Color>;
    fn edge_pen(&self) -> Pen;
    fn background(&self) -> Color;
}

// ============================================================================
// Color Constants
// ============================================================================

// Bright theme
pub const COLOR_BRIGHT_BACKGROUND: Color = Color::rgb(255, 255, 255);
pub const COLOR_BRIGHT_NODE_FILL: Color = Color::rgb(214, 214, 214);
pub const COLOR_BRIGHT_NODE_BORDER: Color = Color::rgb(60, 60, 60);
pub const COLOR_BRIGHT_NODE_TEXT: Color = Color::rgb(0, 0, 0);
pub const COLOR_BRIGHT_EDGE: Color = Color::rgb(135, 135, 135);

// Dark theme
pub const COLOR_DARK_BACKGROUND: Color = Color::rgb(39, 39, 40);
pub const COLOR_DARK_NODE_FILL: Color = Color::rgb(90, 90, 90);
pub const COLOR_DARK_NODE_BORDER: Color = Color::rgb(195, 195, 195);
pub const COLOR_DARK_NODE_TEXT: Color = Color::rgb(247, 247, 247);
pub const COLOR_DARK_EDGE: Color = Color::rgb(160, 160, 160);

// Selection
pub const COLOR_SELECTED_FILL: Color = Color::rgb(255, 200, 100);
pub const COLOR_SELECTED_BORDER: Color = Color::rgb(170, 130, 60);
pub const COLOR_SELECTED_TEXT: Color = Color::rgb(0, 0, 0);

/// Default overlay palette (category10).
pub const PIE_COLORS: [Color; 10] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
    Color::rgb(0xe3, 0x77, 0xc2),
    Color::rgb(0x7f, 0x7f, 0x7f),
    Color::rgb(0xbc, 0xbd, 0x22),
    Color::rgb(0x17, 0xbe, 0xcf),
];

/// Appearance of a node in its default state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub fill: Color,
    pub outline: Pen,
    pub text: Color,
    pub font: Font,
}

/// Partial override for a named visual state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateStyle {
    pub fill: Option<Color>,
    pub outline: Option<Pen>,
    pub text: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub pen: Pen,
}

/// Complete theme for a network view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkStyle {
    pub name: String,
    pub background: Color,
    pub node: NodeStyle,
    pub states: BTreeMap<String, StateStyle>,
    pub edge: EdgeStyle,
}

impl Default for NetworkStyle {
    fn default() -> Self {
        Self::bright()
    }
}

impl NetworkStyle {
    pub const BUILTIN: [&'static str; 3] = ["bright", "dark", "print"];

    pub fn bright() -> Self {
        Self {
            name: "bright".to_string(),
            background: COLOR_BRIGHT_BACKGROUND,
            node: NodeStyle {
                fill: COLOR_BRIGHT_NODE_FILL,
                outline: Pen::new(COLOR_BRIGHT_NODE_BORDER, 1.0),
                text: COLOR_BRIGHT_NODE_TEXT,
                font: Font::proportional(12.0),
            },
            states: selected_state(),
            edge: EdgeStyle {
                pen: Pen::new(COLOR_BRIGHT_EDGE, 1.0),
            },
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: COLOR_DARK_BACKGROUND,
            node: NodeStyle {
                fill: COLOR_DARK_NODE_FILL,
                outline: Pen::new(COLOR_DARK_NODE_BORDER, 1.0),
                text: COLOR_DARK_NODE_TEXT,
                font: Font::proportional(12.0),
            },
            states: selected_state(),
            edge: EdgeStyle {
                pen: Pen::new(COLOR_DARK_EDGE, 1.0),
            },
        }
    }

    /// Black on white with no selection highlight, for exported figures.
    pub fn print() -> Self {
        Self {
            name: "print".to_string(),
            background: Color::WHITE,
            node: NodeStyle {
                fill: Color::WHITE,
                outline: Pen::new(Color::BLACK, 1.5),
                text: Color::BLACK,
                font: Font::proportional(11.0),
            },
            states: BTreeMap::new(),
            edge: EdgeStyle {
                pen: Pen::new(Color::BLACK, 1.0),
            },
        }
    }

    pub fn from_name(name: &str) -> Result<Self, StyleError> {
        match name.to_ascii_lowercase().as_str() {
            "bright" | "light" => Ok(Self::bright()),
            "dark" => Ok(Self::dark()),
            "print" => Ok(Self::print()),
            _ => Err(StyleError::UnknownTheme(name.to_string())),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        serde_json::from_str(json).map_err(|e| StyleError::InvalidTheme(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, StyleError> {
        serde_json::to_string_pretty(self).map_err(|e| StyleError::InvalidTheme(e.to_string()))
    }
}

fn selected_state() -> BTreeMap<String, StateStyle> {
    let mut states = BTreeMap::new();
    states.insert(
        STATE_SELECTED.to_string(),
        StateStyle {
            fill: Some(COLOR_SELECTED_FILL),
            outline: Some(Pen::new(COLOR_SELECTED_BORDER, 2.0)),
            text: Some(COLOR_SELECTED_TEXT),
        },
    );
    states
}

impl StyleProvider for NetworkStyle {
    fn name(&self) -> &str {
        &self.name
    }

    fn node_fill(&self) -> Color {
        self.node.fill
    }

    fn node_outline(&self) -> Pen {
        self.node.outline
    }

    fn node_text_color(&self) -> Color {
        self.node.text
    }

    fn node_font(&self) -> Font {
        self.node.font.clone()
    }

    fn state_fill(&self, state: &str) -> Option<Color> {
        self.states.get(state).and_then(|s| s.fill)
    }

    fn state_outline(&self, state: &str) -> Option<Pen> {
        self.states.get(state).and_then(|s| s.outline)
    }

    fn state_text_color(&self, state: &str) -> Option<Color> {
        self.states.get(state).and_then(|s| s.text)
    }

    fn edge_pen(&self) -> Pen {
        self.edge.pen
    }

    fn background(&self) -> Color {
        self.background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_themes_resolve() {
        for name in NetworkStyle::BUILTIN {
            assert_eq!(NetworkStyle::from_name(name).unwrap().name, name);
        }
        assert!(matches!(
            NetworkStyle::from_name("neon"),
            Err(StyleError::UnknownTheme(_))
        ));
    }

    #[test]
    fn test_selected_state_lookup() {
        let style = NetworkStyle::bright();
        assert_eq!(style.state_fill(STATE_SELECTED), Some(COLOR_SELECTED_FILL));
        assert_eq!(style.state_fill("hovered"), None);
        assert_eq!(NetworkStyle::print().state_fill(STATE_SELECTED), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let style = NetworkStyle::dark();
        let json = style.to_json().unwrap();
        assert_eq!(NetworkStyle::from_json(&json).unwrap(), style);
    }

    #[test]
    fn test_partial_json_falls_back_to_bright() {
        let style = NetworkStyle::from_json(r##"{"name": "custom", "background": "#101010"}"##)
            .unwrap();
        assert_eq!(style.name, "custom");
        assert_eq!(style.background, Color::rgb(16, 16, 16));
        assert_eq!(style.node, NetworkStyle::bright().node);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(
            NetworkStyle::from_json(r##"{"background": "#nothex"}"##),
            Err(StyleError::InvalidTheme(_))
        ));
    }
}
