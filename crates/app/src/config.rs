use anyhow::{bail, Context, Result};
use hotkey::BindingPlan;
use overlay::{RenderStyle, SelectionLimits};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where captures are written; `images/` next to the executable if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,

    #[serde(default = "default_min_size")]
    pub min_width: i32,

    #[serde(default = "default_min_size")]
    pub min_height: i32,

    /// Pointer distance (px) at which an edge or corner is grabbed
    #[serde(default = "default_edge_tolerance")]
    pub edge_tolerance: i32,

    #[serde(default = "default_handle_size")]
    pub handle_size: i32,

    /// Opacity of the mask outside the selection, 0-255
    #[serde(default = "default_dim_alpha")]
    pub dim_alpha: u8,

    /// Pause between hiding the overlay and grabbing the screen
    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: u64,

    #[serde(default = "default_show_key")]
    pub show_key: String,

    #[serde(default = "default_hide_key")]
    pub hide_key: String,

    /// Tried in order; every one that registers triggers a capture
    #[serde(default = "default_capture_keys")]
    pub capture_keys: Vec<String>,
}

fn default_min_size() -> i32 {
    overlay::selection::MIN_SELECTION_SIZE
}

fn default_edge_tolerance() -> i32 {
    overlay::selection::EDGE_TOLERANCE
}

fn default_handle_size() -> i32 {
    overlay::render::HANDLE_SIZE
}

fn default_dim_alpha() -> u8 {
    overlay::render::DIM_ALPHA
}

fn default_hide_delay_ms() -> u64 {
    120
}

fn default_show_key() -> String {
    "F7".to_string()
}

fn default_hide_key() -> String {
    "F8".to_string()
}

fn default_capture_keys() -> Vec<String> {
    ["/", "Shift+/", "Numpad /", "F9"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_dir: None,
            min_width: default_min_size(),
            min_height: default_min_size(),
            edge_tolerance: default_edge_tolerance(),
            handle_size: default_handle_size(),
            dim_alpha: default_dim_alpha(),
            hide_delay_ms: default_hide_delay_ms(),
            show_key: default_show_key(),
            hide_key: default_hide_key(),
            capture_keys: default_capture_keys(),
        }
    }
}

impl AppConfig {
    /// `<config_dir>/snapcrop/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not locate the user config directory")?
            .join("snapcrop");

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::debug!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Reject limits that let corner and edge zones overlap, and bad keys
    pub fn validate(&self) -> Result<()> {
        if self.edge_tolerance <= 0 {
            bail!("edge_tolerance must be positive, got {}", self.edge_tolerance);
        }
        if self.handle_size <= 0 {
            bail!("handle_size must be positive, got {}", self.handle_size);
        }
        self.selection_limits()?;
        self.binding_plan()?;
        Ok(())
    }

    pub fn selection_limits(&self) -> Result<SelectionLimits> {
        SelectionLimits::new(self.min_width, self.min_height, self.edge_tolerance)
            .context("Invalid selection limits")
    }

    pub fn binding_plan(&self) -> Result<BindingPlan> {
        BindingPlan::parse(&self.show_key, &self.hide_key, &self.capture_keys)
            .context("Invalid hotkey in config")
    }

    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            handle_size: self.handle_size,
            dim_alpha: self.dim_alpha,
            ..RenderStyle::default()
        }
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn save_dir(&self) -> PathBuf {
        if let Some(dir) = &self.save_dir {
            return dir.clone();
        }
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("images")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotkey::KeyCombo;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.save_dir.is_none());
        assert_eq!((config.min_width, config.min_height), (20, 20));
        assert_eq!(config.edge_tolerance, 6);
        assert_eq!(config.hide_delay(), Duration::from_millis(120));
        assert_eq!(config.binding_plan().unwrap(), BindingPlan::default());
        assert!(config.save_dir().ends_with("images"));
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            save_dir = "D:/shots"
            hide_delay_ms = 250
            capture_keys = ["Ctrl+Shift+S"]
            "#,
        )
        .unwrap();
        assert_eq!(config.save_dir(), PathBuf::from("D:/shots"));
        assert_eq!(config.hide_delay_ms, 250);
        assert_eq!(config.min_width, 20);
        assert_eq!(config.show_key, "F7");
        assert_eq!(
            config.binding_plan().unwrap().capture,
            vec![KeyCombo::parse("Ctrl+Shift+S").unwrap()]
        );
    }

    #[test]
    fn test_render_style_from_config() {
        let config = AppConfig {
            handle_size: 5,
            dim_alpha: 200,
            ..AppConfig::default()
        };
        let style = config.render_style();
        assert_eq!(style.handle_size, 5);
        assert_eq!(style.dim_alpha, 200);
        assert_eq!(style.accent, RenderStyle::default().accent);
    }

    #[test]
    fn test_validate_rejects_overlapping_zones() {
        let config = AppConfig {
            min_width: 12,
            edge_tolerance: 6,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            edge_tolerance: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_keys() {
        let config = AppConfig {
            capture_keys: vec!["/".into(), "Hyper+Q".into()],
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_creates_defaults_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let first = AppConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(first, AppConfig::default());

        let edited = AppConfig {
            save_dir: Some(dir.path().join("out")),
            show_key: "Ctrl+F7".into(),
            ..first
        };
        edited.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), edited);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "min_height = 4\n").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }
}
