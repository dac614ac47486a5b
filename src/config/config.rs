use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_true")]
    pub show_progress: bool,
    #[serde(default)]
    pub default_window_size: Option<f64>,
    #[serde(default = "default_true")]
    pub span_normalise: bool,
    #[serde(default = "default_true")]
    pub time_normalise: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_progress: default_true(),
            default_window_size: None,
            span_normalise: default_true(),
            time_normalise: default_true(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("org", "tseda", "tseda-gnn") {
            let config_path = proj_dirs.config_dir().join("config.toml");

            if config_path.exists() {
                if let Ok(content) = fs::read_to_string(&config_path) {
                    match toml::from_str(&content) {
                        Ok(config) => return config,
                        Err(e) => log::warn!(
                            "Ignoring unreadable config {}: {}",
                            config_path.display(),
                            e
                        ),
                    }
                }
            }
        }
        Config::default()
    }
}
