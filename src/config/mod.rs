use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::schedule::{RenderMapper, TimeGrid};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host of the operations console serving `/api/schedule`
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_grid_start_hour")]
    pub grid_start_hour: u8,
    #[serde(default = "default_grid_rows")]
    pub grid_rows: u8,
    #[serde(default = "default_px_per_hour")]
    pub px_per_hour: f32,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_grid_start_hour() -> u8 {
    6  // 6am
}

fn default_grid_rows() -> u8 {
    17  // through the 10pm row
}

fn default_px_per_hour() -> f32 {
    60.0
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            poll_interval_secs: default_poll_interval_secs(),
            grid_start_hour: default_grid_start_hour(),
            grid_rows: default_grid_rows(),
            px_per_hour: default_px_per_hour(),
            font_scale: default_font_scale(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .context("Failed to read config file")?;
            serde_json::from_str(&contents)
                .context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.trim().is_empty()
    }

    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "crewboard", "crewboard")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    pub fn base_url(&self) -> String {
        let url = self.api_base_url.trim().trim_end_matches('/');
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        }
    }

    pub fn time_grid(&self) -> TimeGrid {
        TimeGrid::new(self.grid_start_hour, self.grid_rows)
    }

    pub fn render_mapper(&self) -> RenderMapper {
        let px_per_hour = if self.px_per_hour > 0.0 { self.px_per_hour } else { default_px_per_hour() };
        RenderMapper::new(px_per_hour, self.time_grid().start_hour)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(5))
    }
}
