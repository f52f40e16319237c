//! Configuration options

use crate::{
    core::{LayoutMode, MAX_DESKTOPS},
    error::Error,
    geometry::Rectangle,
    input::Button,
    utils::deserialize_shellexpand,
};
use anyhow::{Context, Result};
use colored::Colorize;
use directories::BaseDirs;
use format_serde_error::SerdeError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Configuration file name
const CONFIG_FILE: &str = "tilestack.yml";

/// Default configuration written when none exists
const DEFAULT_CONFIG: &str = include_str!("../example/tilestack.yml");

// =============== TaskbarPosition ================ [[[

/// Screen edge the taskbar is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TaskbarPosition {
    /// Strip along the top edge
    Top,
    /// Strip along the bottom edge
    Bottom,
    /// No taskbar
    None,
}

// ]]] === TaskbarPosition ===

// =============== GlobalSettings ================= [[[

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct GlobalSettings {
    /// Whether logs should be written to a file
    #[serde(alias = "log-to-file")]
    pub(crate) log_to_file: bool,

    /// The directory to write the log to
    #[serde(alias = "log-dir", deserialize_with = "deserialize_shellexpand")]
    pub(crate) log_dir: Option<PathBuf>,

    // ====================== Window Manager Specific ======================
    /// Name of the desktops
    pub(crate) desktops: Vec<String>,

    /// Arrangement a desktop starts with
    #[serde(alias = "layout-mode")]
    pub(crate) layout_mode: LayoutMode,

    /// Share of the work area width given to the main column
    #[serde(alias = "main-ratio")]
    pub(crate) main_ratio: f32,

    /// Share of the work area width given to the fixed column
    #[serde(alias = "fixed-ratio")]
    pub(crate) fixed_ratio: f32,

    /// Number of clients the main column holds
    #[serde(alias = "main-area-n")]
    pub(crate) main_area_n: usize,

    /// Gap between tiled windows
    #[serde(alias = "window-gap")]
    pub(crate) window_gap: u32,

    /// Size of the border around the window
    #[serde(alias = "border-width")]
    pub(crate) border_width: u32,

    /// Height of the title bar above the window
    #[serde(alias = "titlebar-height")]
    pub(crate) titlebar_height: u32,

    /// Bounds of the screen
    pub(crate) screen: Rectangle,

    /// Edge the taskbar is docked to
    pub(crate) taskbar: TaskbarPosition,

    /// Height of the taskbar strip
    #[serde(alias = "taskbar-height")]
    pub(crate) taskbar_height: u32,

    /// Apply ICCCM window size hints
    #[serde(alias = "honor-size-hints")]
    pub(crate) honor_size_hints: bool,

    /// Focus windows as soon as they are managed
    #[serde(alias = "focus-new")]
    pub(crate) focus_new: bool,

    /// Button that drags windows around
    #[serde(alias = "drag-button")]
    pub(crate) drag_button: Button,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            log_to_file: false,
            log_dir:     None,

            desktops:    vec!["1", "2", "3", "4"]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            layout_mode: LayoutMode::Tile,
            main_ratio:  0.5_f32,
            fixed_ratio: 0.0_f32,
            main_area_n: 1_usize,

            window_gap:      4_u32,
            border_width:    1_u32,
            titlebar_height: 18_u32,

            screen:         Rectangle::new(0, 0, 1920, 1080),
            taskbar:        TaskbarPosition::Bottom,
            taskbar_height: 24_u32,

            honor_size_hints: true,
            focus_new:        true,
            drag_button:      Button::Left,
        }
    }
}

impl GlobalSettings {
    /// Screen region available to clients. The taskbar strip is excluded
    pub(crate) fn work_area(&self) -> Rectangle {
        let mut area = self.screen;
        let strip = self.taskbar_height.min(area.dimension.height);

        match self.taskbar {
            TaskbarPosition::Top => {
                area.point.y += strip as i32;
                area.dimension.height -= strip;
            },
            TaskbarPosition::Bottom => area.dimension.height -= strip,
            TaskbarPosition::None => {},
        }

        area
    }
}

// ]]] === Global Settings ===

// =============== DesktopOverride ================ [[[

/// Settings that differ on one desktop
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DesktopOverride {
    /// Arrangement this desktop starts with
    #[serde(alias = "layout-mode")]
    pub(crate) layout_mode: Option<LayoutMode>,

    /// Share of the width given to the main column
    #[serde(alias = "main-ratio")]
    pub(crate) main_ratio: Option<f32>,

    /// Share of the width given to the fixed column
    #[serde(alias = "fixed-ratio")]
    pub(crate) fixed_ratio: Option<f32>,

    /// Number of clients the main column holds
    #[serde(alias = "main-area-n")]
    pub(crate) main_area_n: Option<usize>,
}

// ]]] === DesktopOverride ===

// =================== Config ===================== [[[

/// Configuration file to parse
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub(crate) struct Config {
    /// Global settings
    #[serde(flatten)]
    pub(crate) global: GlobalSettings,

    /// Per-desktop settings, keyed by desktop name
    #[serde(default)]
    pub(crate) overrides: IndexMap<String, DesktopOverride>,
}

/// Reject a ratio outside of `0.0..=1.0`
fn check_ratio(name: &'static str, value: f32) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidRatio { name, value })
    }
}

/// Reject ratios that leave no room for the second column
fn check_ratios(main: f32, fixed: f32) -> Result<(), Error> {
    check_ratio("main_ratio", main)?;
    check_ratio("fixed_ratio", fixed)?;

    if main + fixed > 1.0 {
        return Err(Error::RatiosTooLarge(main + fixed));
    }

    Ok(())
}

impl Config {
    /// Create the default configuration file
    pub(crate) fn create_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::debug!("Creating configuration path: {}", path.display());
            fs::create_dir_all(path).context("unable to create configuration directory")?;
        }

        let path = path.join(CONFIG_FILE);
        log::debug!("{}: {}", "Configuration path".bright_blue(), path.display());

        if !path.is_file() {
            let mut config_file: fs::File = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .open(&path)
                .with_context(|| {
                    format!("could not create tilestack config: '{}'", path.display())
                })?;

            config_file
                .write_all(DEFAULT_CONFIG.as_bytes())
                .with_context(|| {
                    format!("could not create tilestack config: '{}'", path.display())
                })?;
            config_file.flush()?;
        }

        Self::load(path)
    }

    /// Load the configuration file from a given path
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: '{}'", path.display()))?;

        Self::from_yaml(file)
    }

    /// Parse and validate a configuration document
    pub(crate) fn from_yaml(file: String) -> Result<Self> {
        let config: Self = serde_yaml::from_str(&file).map_err(|e| SerdeError::new(file, e))?;
        config.validate()?;

        Ok(config)
    }

    /// Load the default configuration file
    pub(crate) fn load_default() -> Result<Self> {
        let path = PROJECT_DIRS
            .as_ref()
            .context("could not detect user home directory to place program files")?
            .config_dir();
        log::debug!("loading default config: {}", path.display());
        Self::create_default(path)
    }

    /// Check that every value is usable
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let global = &self.global;
        let count = global.desktops.len();

        if count == 0 || count > MAX_DESKTOPS {
            return Err(Error::DesktopCount {
                found: count,
                max:   MAX_DESKTOPS,
            });
        }

        check_ratios(global.main_ratio, global.fixed_ratio)?;

        for (name, desktop) in &self.overrides {
            if !global.desktops.contains(name) {
                return Err(Error::UnknownDesktopName(name.clone()));
            }

            check_ratios(
                desktop.main_ratio.unwrap_or(global.main_ratio),
                desktop.fixed_ratio.unwrap_or(global.fixed_ratio),
            )?;
        }

        Ok(())
    }

    /// The override of a desktop, if any
    pub(crate) fn desktop_override(&self, desktop: usize) -> DesktopOverride {
        self.global
            .desktops
            .get(desktop)
            .and_then(|name| self.overrides.get(name))
            .copied()
            .unwrap_or_default()
    }
}

// ]]] === Config ===

// ================ Project Dirs ================== [[[

/// Get the base [`TilestackDirs`]
pub(crate) static PROJECT_DIRS: Lazy<Option<TilestackDirs>> = Lazy::new(TilestackDirs::new);

/// Get the project directories relevant to [`tilestack`]
#[derive(Debug, Clone)]
pub(crate) struct TilestackDirs {
    /// User's `$XDG_CONFIG_HOME/tilestack` directory
    config_dir: PathBuf,
}

impl TilestackDirs {
    /// Create a new [`TilestackDirs`]
    fn new() -> Option<Self> {
        Some(Self {
            config_dir: Self::get_dir("TILESTACK_CONFIG_DIR", "XDG_CONFIG_HOME", ".config")?,
        })
    }

    /// Wrapper function that makes it easier to get directories
    fn get_dir(env_var: &str, var: &str, join: &str) -> Option<PathBuf> {
        let fallback = || {
            env::var_os(var)
                .map(PathBuf::from)
                .filter(|p| p.is_absolute())
                .or_else(|| BaseDirs::new().map(|p| p.home_dir().join(join)))
                .map(|p| p.join(env!("CARGO_PKG_NAME")))
        };

        // Custom env var is set
        env::var_os(env_var)
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .or_else(fallback)
    }

    /// Get configuration directory
    #[must_use]
    pub(crate) fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

// ]]] === Project Dirs ===

#[cfg(test)]
mod tests {
    use super::{Config, TaskbarPosition, DEFAULT_CONFIG};
    use crate::{core::LayoutMode, geometry::Rectangle};
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_default_parses() {
        let config = Config::from_yaml(DEFAULT_CONFIG.to_owned()).expect("default config loads");
        assert_eq!(config.global.desktops.len(), 4);
        assert_eq!(config.global.layout_mode, LayoutMode::Tile);
        assert_eq!(config.desktop_override(3).layout_mode, Some(LayoutMode::Stack));
        assert_eq!(config.desktop_override(0).layout_mode, None);
    }

    #[test]
    fn rejects_bad_ratios() {
        let err = Config::from_yaml(String::from("main_ratio: 0.8\nfixed_ratio: 0.4\n"));
        assert!(err.is_err());

        let err = Config::from_yaml(String::from("main_ratio: 1.5\n"));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_unknown_override() {
        let yaml = "desktops: [a, b]\noverrides:\n  c:\n    main_area_n: 2\n";
        assert!(Config::from_yaml(String::from(yaml)).is_err());
    }

    #[test]
    fn rejects_desktop_counts() {
        assert!(Config::from_yaml(String::from("desktops: []\n")).is_err());

        let many = (0..32).map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
        assert!(Config::from_yaml(format!("desktops: [{}]\n", many)).is_err());
    }

    #[test]
    fn work_area_excludes_taskbar() {
        let mut config = Config::default();
        config.global.screen = Rectangle::new(0, 0, 1000, 800);
        config.global.taskbar_height = 30;

        config.global.taskbar = TaskbarPosition::Bottom;
        assert_eq!(config.global.work_area(), Rectangle::new(0, 0, 1000, 770));

        config.global.taskbar = TaskbarPosition::Top;
        assert_eq!(config.global.work_area(), Rectangle::new(0, 30, 1000, 770));

        config.global.taskbar = TaskbarPosition::None;
        assert_eq!(config.global.work_area(), Rectangle::new(0, 0, 1000, 800));
    }
}
