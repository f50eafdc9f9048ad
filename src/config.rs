use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "WorldConfig::default_width")]
    pub width: f32,
    #[serde(default = "WorldConfig::default_height")]
    pub height: f32,
    #[serde(default)]
    pub hard_mode: bool,
    #[serde(default = "WorldConfig::default_player_start")]
    pub player_start: [f32; 2],
}

impl WorldConfig {
    const fn default_width() -> f32 {
        1024.0
    }

    const fn default_height() -> f32 {
        768.0
    }

    const fn default_player_start() -> [f32; 2] {
        [100.0, 100.0]
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            hard_mode: false,
            player_start: Self::default_player_start(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    #[serde(default = "ScriptConfig::default_dir")]
    pub dir: PathBuf,
}

impl ScriptConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("assets/scripts")
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self { dir: Self::default_dir() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub scripts: ScriptConfig,
    #[serde(default = "AppConfig::default_tick_hz")]
    pub tick_hz: f32,
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            scripts: ScriptConfig::default(),
            tick_hz: Self::default_tick_hz(),
            max_ticks: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub scripts_dir: Option<PathBuf>,
    pub hard_mode: Option<bool>,
    pub max_ticks: Option<u64>,
}

impl AppConfig {
    const fn default_tick_hz() -> f32 {
        60.0
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(dir) = &overrides.scripts_dir {
            self.scripts.dir = dir.clone();
        }
        if let Some(hard_mode) = overrides.hard_mode {
            self.world.hard_mode = hard_mode;
        }
        if let Some(max_ticks) = overrides.max_ticks {
            self.max_ticks = Some(max_ticks);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.tick_hz, 60.0);
        assert_eq!(cfg.scripts.dir, PathBuf::from("assets/scripts"));
        assert!(cfg.max_ticks.is_none());
        assert!(!cfg.world.hard_mode);
    }

    #[test]
    fn overrides_replace_only_what_they_name() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(&AppConfigOverrides {
            scripts_dir: Some(PathBuf::from("mods")),
            hard_mode: Some(true),
            max_ticks: None,
        });
        assert_eq!(cfg.scripts.dir, PathBuf::from("mods"));
        assert!(cfg.world.hard_mode);
        assert!(cfg.max_ticks.is_none());
        assert_eq!(cfg.tick_hz, 60.0);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"world": {"hard_mode": true}}"#)
            .expect("partial config should parse");
        assert!(cfg.world.hard_mode);
        assert_eq!(cfg.world.width, 1024.0);
        assert_eq!(cfg.tick_hz, 60.0);
    }
}
