//! Game configuration.
//!
//! Settings are loaded from an INI file; compiled-in defaults keep startup
//! safe when the file or a key is missing. The config is passed explicitly to
//! whatever needs it, so independent simulations can run side by side.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! target_tps = 60
//!
//! [battlefield]
//! width = 2000
//! height = 1200
//!
//! [robot]
//! pixel_size = 32
//! group_size = 5
//!
//! [edit]
//! grid_num = 8
//! ```

use std::path::PathBuf;
use std::time::Duration;

use configparser::ini::Ini;
use log::info;

use crate::error::{EngineError, Result};

/// Default safe values for startup
const DEFAULT_TARGET_TPS: u32 = 60;
const DEFAULT_BATTLEFIELD_WIDTH: f64 = 2000.0;
const DEFAULT_BATTLEFIELD_HEIGHT: f64 = 1200.0;
const DEFAULT_ROBOT_PIXEL_SIZE: u32 = 32;
const DEFAULT_ROBOT_GROUP_SIZE: usize = 5;
const DEFAULT_EDIT_GRID_NUM: i32 = 8;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Simulation ticks per second.
    pub target_tps: u32,
    pub battlefield_width: f64,
    pub battlefield_height: f64,
    /// Side of a robot node, in battlefield units.
    pub robot_pixel_size: u32,
    /// Robots per player group.
    pub robot_group_size: usize,
    /// Cells per side of the square robot edit grid.
    pub edit_grid_num: i32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Narrow an INI integer to the field's type, rejecting values that do not fit.
fn narrow<T: TryFrom<u64>>(value: u64, key: &str) -> Result<T> {
    T::try_from(value).map_err(|_| EngineError::Config(format!("{} is out of range: {}", key, value)))
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            target_tps: DEFAULT_TARGET_TPS,
            battlefield_width: DEFAULT_BATTLEFIELD_WIDTH,
            battlefield_height: DEFAULT_BATTLEFIELD_HEIGHT,
            robot_pixel_size: DEFAULT_ROBOT_PIXEL_SIZE,
            robot_group_size: DEFAULT_ROBOT_GROUP_SIZE,
            edit_grid_num: DEFAULT_EDIT_GRID_NUM,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is out of range.
    pub fn load_from_file(&mut self) -> Result<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| EngineError::Config(format!("failed to load config file: {}", e)))?;

        // [simulation] section
        if let Some(tps) = config.getuint("simulation", "target_tps").ok().flatten() {
            if tps == 0 {
                return Err(EngineError::Config("simulation.target_tps must be positive".into()));
            }
            self.target_tps = narrow(tps, "simulation.target_tps")?;
        }

        // [battlefield] section
        if let Some(width) = config.getfloat("battlefield", "width").ok().flatten() {
            self.battlefield_width = width;
        }
        if let Some(height) = config.getfloat("battlefield", "height").ok().flatten() {
            self.battlefield_height = height;
        }

        // [robot] section
        if let Some(size) = config.getuint("robot", "pixel_size").ok().flatten() {
            self.robot_pixel_size = narrow(size, "robot.pixel_size")?;
        }
        if let Some(size) = config.getuint("robot", "group_size").ok().flatten() {
            self.robot_group_size = narrow(size, "robot.group_size")?;
        }

        // [edit] section
        if let Some(num) = config.getuint("edit", "grid_num").ok().flatten() {
            if num == 0 {
                return Err(EngineError::Config("edit.grid_num must be positive".into()));
            }
            self.edit_grid_num = narrow(num, "edit.grid_num")?;
        }

        info!(
            "Loaded config: tps={}, field={}x{}, robot size={}, group={}, grid={}",
            self.target_tps,
            self.battlefield_width,
            self.battlefield_height,
            self.robot_pixel_size,
            self.robot_group_size,
            self.edit_grid_num
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<()> {
        let mut config = Ini::new();

        config.set("simulation", "target_tps", Some(self.target_tps.to_string()));
        config.set("battlefield", "width", Some(self.battlefield_width.to_string()));
        config.set("battlefield", "height", Some(self.battlefield_height.to_string()));
        config.set("robot", "pixel_size", Some(self.robot_pixel_size.to_string()));
        config.set("robot", "group_size", Some(self.robot_group_size.to_string()));
        config.set("edit", "grid_num", Some(self.edit_grid_num.to_string()));

        config.write(&self.config_path)?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Wall-clock budget of one tick.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_tps.max(1) as f64)
    }
}
