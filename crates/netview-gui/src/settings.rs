use std::path::{Path, PathBuf};

use anyhow::Context;
use netview_graph::{NetworkStyle, RenderSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Built-in theme name, used unless `custom_theme` loads.
    pub theme: String,
    /// JSON theme file overriding `theme`.
    pub custom_theme: Option<PathBuf>,
    pub show_pie_charts: bool,
    pub demo_nodes: usize,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub render: RenderSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: "bright".to_string(),
            custom_theme: None,
            show_pie_charts: true,
            demo_nodes: 120,
            min_zoom: 0.05,
            max_zoom: 4.0,
            render: RenderSettings::default(),
        }
    }
}

impl AppSettings {
    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("netview").join("settings.json"))
    }

    pub fn load() -> Self {
        if let Some(path) = Self::default_path() {
            tracing::info!("Loading settings from {:?}", path);
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(settings) => {
                        tracing::info!("Settings loaded successfully: {:?}", settings);
                        return settings;
                    }
                    Err(e) => tracing::error!("Failed to load settings: {:#}", e),
                }
            } else {
                tracing::info!("Settings file not found, using defaults");
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self) {
        if let Some(path) = Self::default_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::error!("Failed to save settings: {:#}", e);
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    /// Resolve the configured theme, falling back to the default.
    pub fn network_style(&self) -> NetworkStyle {
        if let Some(path) = &self.custom_theme {
            let loaded = std::fs::read_to_string(path)
                .map_err(anyhow::Error::from)
                .and_then(|json| NetworkStyle::from_json(&json).map_err(anyhow::Error::from));
            match loaded {
                Ok(style) => return style,
                Err(e) => tracing::warn!("Ignoring theme file {:?}: {:#}", path, e),
            }
        }
        NetworkStyle::from_name(&self.theme).unwrap_or_else(|e| {
            tracing::warn!("{}", e);
            NetworkStyle::default()
        })
    }

    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            theme: "dark".to_string(),
            demo_nodes: 7,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "show_pie_charts": false }"#).unwrap();
        let settings = AppSettings::load_from(&path).unwrap();
        assert!(!settings.show_pie_charts);
        assert_eq!(settings.demo_nodes, AppSettings::default().demo_nodes);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let settings = AppSettings {
            theme: "neon".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.network_style(), NetworkStyle::default());
    }

    #[test]
    fn test_custom_theme_file_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("theme.json");
        let mut style = NetworkStyle::print();
        style.name = "exported".to_string();
        std::fs::write(&path, style.to_json().unwrap()).unwrap();

        let settings = AppSettings {
            theme: "dark".to_string(),
            custom_theme: Some(path),
            ..Default::default()
        };
        assert_eq!(settings.network_style().name, "exported");
    }

    #[test]
    fn test_broken_theme_file_uses_named_theme() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, "{ not json").unwrap();
        let settings = AppSettings {
            theme: "dark".to_string(),
            custom_theme: Some(path),
            ..Default::default()
        };
        assert_eq!(settings.network_style().name, "dark");
    }
}
