use crate::error::{GridError, Result};
use crate::session::ReplanPolicy;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";

/// Largest accepted `grid.size`; keeps the cell count well inside `i32`
pub const MAX_GRID_SIZE: i32 = 1024;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Movement model. Only 4-directional movement is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum Connectivity {
    #[default]
    #[serde(rename = "4-directional")]
    FourDirectional,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_size")]
    pub size: i32,
    #[serde(default)]
    pub connectivity: Connectivity,
}

#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_heuristic_weight")]
    pub heuristic_weight: f64,
    /// Cancel a search after this many steps
    #[serde(default)]
    pub max_steps: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_obstacle_density")]
    pub obstacle_density: f64,
    #[serde(default = "default_spawn_probability")]
    pub spawn_probability: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub replan_policy: ReplanPolicy,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    #[serde(default = "default_steps_per_frame")]
    pub steps_per_frame: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_action_log: bool,
    #[serde(default = "default_action_log_path")]
    pub action_log_path: String,
}

// Default values
fn default_grid_size() -> i32 { 30 }
fn default_heuristic_weight() -> f64 { 1.0 }
fn default_obstacle_density() -> f64 { 0.2 }
fn default_spawn_probability() -> f64 { 0.05 }
fn default_visibility() -> f64 { 0.9 }
fn default_window_title() -> String { "Maze Solver AI - A* Pathfinding".to_string() }
fn default_cell_size() -> f32 { 20.0 }
fn default_steps_per_frame() -> usize { 4 }
fn default_log_level() -> String { "info".to_string() }
fn default_action_log_path() -> String { "action_log.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
            connectivity: Connectivity::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic_weight: default_heuristic_weight(),
            max_steps: None,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            obstacle_density: default_obstacle_density(),
            spawn_probability: default_spawn_probability(),
            visibility: default_visibility(),
            seed: None,
            replan_policy: ReplanPolicy::default(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            cell_size: default_cell_size(),
            steps_per_frame: default_steps_per_frame(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_action_log: false,
            action_log_path: default_action_log_path(),
        }
    }
}

impl Config {
    /// Read a config file. `Ok(None)` means the file does not exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load `config.toml`, or use defaults if it is missing or invalid.
    ///
    /// The error behind a fallback is handed back rather than logged, since
    /// the log level itself comes from the loaded config.
    pub fn load() -> (Self, Option<GridError>) {
        match Self::load_from(CONFIG_PATH) {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(e) => (Config::default(), Some(e)),
        }
    }

    /// Report how `load` went. Needs an installed subscriber to be seen.
    pub fn log_load_outcome(&self, error: Option<&GridError>) {
        match error {
            Some(e) => warn!("Failed to load {}: {}; using default configuration", CONFIG_PATH, e),
            None => info!(path = CONFIG_PATH, size = self.grid.size, "configuration ready"),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_GRID_SIZE).contains(&self.grid.size) {
            return Err(GridError::Config(format!(
                "grid.size must be within [2, {}], got {}",
                MAX_GRID_SIZE, self.grid.size
            )));
        }
        // Any other weight breaks admissibility and with it path optimality
        if self.search.heuristic_weight != 1.0 {
            return Err(GridError::Config(format!(
                "search.heuristic_weight must be 1.0, got {}",
                self.search.heuristic_weight
            )));
        }
        let env = &self.environment;
        for (name, value) in [
            ("obstacle_density", env.obstacle_density),
            ("spawn_probability", env.spawn_probability),
            ("visibility", env.visibility),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GridError::Config(format!(
                    "environment.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.visual.steps_per_frame == 0 {
            return Err(GridError::Config("visual.steps_per_frame must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.grid.size, 30);
        assert_eq!(config.grid.connectivity, Connectivity::FourDirectional);
        assert_eq!(config.search.heuristic_weight, 1.0);
        assert_eq!(config.search.max_steps, None);
        assert_eq!(config.environment.visibility, 0.9);
        assert_eq!(config.environment.replan_policy, ReplanPolicy::Manual);
        assert!(!config.logging.enable_action_log);
    }

    #[test]
    fn test_parse_sections() {
        let config = Config::from_toml_str(
            r#"
            [grid]
            size = 12
            connectivity = "4-directional"

            [search]
            max_steps = 500

            [environment]
            seed = 42
            replan_policy = "on_path_blocked"
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.size, 12);
        assert_eq!(config.search.max_steps, Some(500));
        assert_eq!(config.environment.seed, Some(42));
        assert_eq!(config.environment.replan_policy, ReplanPolicy::OnPathBlocked);
    }

    #[test]
    fn test_rejects_unknown_connectivity() {
        let err = Config::from_toml_str("[grid]\nconnectivity = \"8-directional\"\n");
        assert!(matches!(err, Err(GridError::Config(_))));
    }

    #[test]
    fn test_rejects_inadmissible_weight() {
        let err = Config::from_toml_str("[search]\nheuristic_weight = 1.5\n");
        assert!(matches!(err, Err(GridError::Config(_))));
    }

    #[test]
    fn test_rejects_grid_size_out_of_range() {
        for size in [1, MAX_GRID_SIZE + 1, 46341] {
            let err = Config::from_toml_str(&format!("[grid]\nsize = {}\n", size));
            assert!(matches!(err, Err(GridError::Config(_))), "size = {}", size);
        }
        let config = Config::from_toml_str(&format!("[grid]\nsize = {}\n", MAX_GRID_SIZE)).unwrap();
        assert_eq!(config.grid.size, MAX_GRID_SIZE);
    }

    #[test]
    fn test_load_from_reports_invalid_file() {
        let path = std::env::temp_dir().join(format!("maze_solver_bad_{}.toml", std::process::id()));
        fs::write(&path, "[search]\nheuristic_weight = 1.5\n").unwrap();
        let result = Config::load_from(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(GridError::Config(_))));
    }

    #[test]
    fn test_load_from_missing_file_is_none() {
        let path = std::env::temp_dir().join("maze_solver_no_such_config.toml");
        assert!(matches!(Config::load_from(&path), Ok(None)));
    }

    #[test]
    fn test_load_from_reads_valid_file() {
        let path = std::env::temp_dir().join(format!("maze_solver_good_{}.toml", std::process::id()));
        fs::write(&path, "[grid]\nsize = 9\n").unwrap();
        let result = Config::load_from(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(result.unwrap().map(|config| config.grid.size), Some(9));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Config::from_toml_str("[environment]\nvisibility = 1.2\n");
        assert!(matches!(err, Err(GridError::Config(_))));
    }
}
