//! Configuration management (config.toml)
//!
//! Settings are stored in TOML format in the platform-specific config
//! directory. Every field has a serde default so partial files load cleanly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use retrocmd_shared::{DEFAULT_NETWORK_CMD_ADDR, DEFAULT_NETWORK_CMD_PORT};

use crate::services::device;

/// Frontend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub command: CommandConfig,
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub savestate: SaveStateConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub rewind: RewindConfig,
    #[serde(default)]
    pub netplay: NetplayConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub achievements: AchievementsConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Remote command transports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Listen for commands on UDP (default: false)
    #[serde(default)]
    pub network_enable: bool,
    /// UDP port (default: 55355)
    #[serde(default = "default_cmd_port")]
    pub network_port: u16,
    /// Bind address (default: 0.0.0.0)
    #[serde(default = "default_cmd_addr")]
    pub network_addr: String,
    /// Read commands from stdin (default: false)
    #[serde(default)]
    pub stdin_enable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Core library to load at startup
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Apply per-core/per-game override files on load (default: true)
    #[serde(default = "default_true")]
    pub auto_overrides_enable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveStateConfig {
    /// Current state slot, -1 is the auto slot (default: 0)
    #[serde(default)]
    pub slot: i32,
    /// Bump the slot before every save (default: false)
    #[serde(default)]
    pub auto_index: bool,
    /// Save `<name>.state.auto` when content is unloaded (default: false)
    #[serde(default)]
    pub auto_save: bool,
    /// Load `<name>.state.auto` after content is loaded (default: false)
    #[serde(default)]
    pub auto_load: bool,
    /// Save state directory; defaults to the content directory
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Save RAM directory; defaults to the content directory
    #[serde(default)]
    pub savefile_directory: Option<PathBuf>,
    /// Periodic save RAM flush in seconds, 0 disables (default: 0)
    #[serde(default)]
    pub autosave_interval: u32,
    /// Never write save RAM (default: false)
    #[serde(default)]
    pub sram_save_disable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
    /// Volume in dB (default: 0.0, range: -80.0 to 12.0)
    #[serde(default)]
    pub volume_db: f32,
    #[serde(default)]
    pub mute: bool,
    /// DSP filter plugin
    #[serde(default)]
    pub dsp_plugin: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default)]
    pub fullscreen: bool,
    /// Directory scanned for shader presets
    #[serde(default)]
    pub shader_dir: Option<PathBuf>,
    /// Preset applied at startup and restored by "restore default shader"
    #[serde(default)]
    pub shader_preset: Option<PathBuf>,
    #[serde(default)]
    pub screenshot_directory: Option<PathBuf>,
    /// Show the on-screen frame counter (default: false)
    #[serde(default)]
    pub fps_show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Number of controller ports (default: 4)
    #[serde(default = "default_max_users")]
    pub max_users: u32,
    /// Device id per port; missing entries default to a joypad
    #[serde(default)]
    pub devices: Vec<u32>,
    /// Load per-core/per-game remap files (default: false)
    #[serde(default)]
    pub auto_remaps_enable: bool,
    #[serde(default)]
    pub overlay_enable: bool,
    #[serde(default)]
    pub overlay: Option<PathBuf>,
    /// Stop audio while the menu is open (default: true)
    #[serde(default = "default_true")]
    pub pause_on_menu: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewindConfig {
    #[serde(default)]
    pub enable: bool,
    /// Rewind buffer size in megabytes (default: 20)
    #[serde(default = "default_rewind_buffer_mb")]
    pub buffer_size_mb: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetplayConfig {
    /// Host to connect to; `None` hosts a session
    #[serde(default)]
    pub host: Option<String>,
    /// Netplay port (default: 55435)
    #[serde(default = "default_netplay_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enable: bool,
    /// History playlist file; defaults to `history.lpl` in the config directory
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Maximum entries kept (default: 100)
    #[serde(default = "default_history_size")]
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AchievementsConfig {
    /// Hardcore mode disables save states, cheats, rewind and memory writes
    #[serde(default)]
    pub hardcore_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    /// Where new per-core config files are written
    #[serde(default)]
    pub config_directory: Option<PathBuf>,
    /// Movie and AV recording output
    #[serde(default)]
    pub recording_directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}
fn default_cmd_port() -> u16 {
    DEFAULT_NETWORK_CMD_PORT
}
fn default_cmd_addr() -> String {
    DEFAULT_NETWORK_CMD_ADDR.to_string()
}
fn default_max_users() -> u32 {
    4
}
fn default_rewind_buffer_mb() -> u32 {
    20
}
fn default_netplay_port() -> u16 {
    55435
}
fn default_history_size() -> usize {
    100
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            network_enable: false,
            network_port: default_cmd_port(),
            network_addr: default_cmd_addr(),
            stdin_enable: false,
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            auto_overrides_enable: default_true(),
        }
    }
}

impl Default for SaveStateConfig {
    fn default() -> Self {
        Self {
            slot: 0,
            auto_index: false,
            auto_save: false,
            auto_load: false,
            directory: None,
            savefile_directory: None,
            autosave_interval: 0,
            sram_save_disable: false,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable: default_true(),
            volume_db: 0.0,
            mute: false,
            dsp_plugin: None,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fullscreen: false,
            shader_dir: None,
            shader_preset: None,
            screenshot_directory: None,
            fps_show: false,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_users: default_max_users(),
            devices: Vec::new(),
            auto_remaps_enable: false,
            overlay_enable: false,
            overlay: None,
            pause_on_menu: default_true(),
        }
    }
}

impl Default for RewindConfig {
    fn default() -> Self {
        Self {
            enable: false,
            buffer_size_mb: default_rewind_buffer_mb(),
        }
    }
}

impl Default for NetplayConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_netplay_port(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enable: default_true(),
            path: None,
            size: default_history_size(),
        }
    }
}

impl InputConfig {
    /// Device bound to `port`.
    pub fn device(&self, port: u32) -> u32 {
        self.devices
            .get(port as usize)
            .copied()
            .unwrap_or(device::JOYPAD)
    }
}

/// Errors from reading or writing a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Config {
    /// Read and parse a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write this config as pretty TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)
    }

    /// Value of a named setting, as reported by `GET_CONFIG_PARAM`.
    pub fn param(&self, name: &str) -> Option<String> {
        let path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        let value = match name {
            "video_fullscreen" => self.video.fullscreen.to_string(),
            "video_shader_dir" => path(&self.video.shader_dir),
            "screenshot_directory" => path(&self.video.screenshot_directory),
            "audio_volume" => format!("{:.1}", self.audio.volume_db),
            "audio_mute_enable" => self.audio.mute.to_string(),
            "savestate_directory" => path(&self.savestate.directory),
            "savefile_directory" => path(&self.savestate.savefile_directory),
            "state_slot" => self.savestate.slot.to_string(),
            "savestate_auto_index" => self.savestate.auto_index.to_string(),
            "rewind_enable" => self.rewind.enable.to_string(),
            "network_cmd_port" => self.command.network_port.to_string(),
            "netplay_ip_port" => self.netplay.port.to_string(),
            "input_max_users" => self.input.max_users.to_string(),
            "cheevos_hardcore_mode_enable" => self.achievements.hardcore_mode.to_string(),
            "recording_output_directory" => path(&self.paths.recording_directory),
            _ => return None,
        };
        Some(value)
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.retrocmd", "", "retrocmd")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory (saves, states, history).
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.retrocmd", "", "retrocmd")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Default location of the main config file.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Loads the configuration from the default location.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = default_config_path() else {
        return Config::default();
    };
    match Config::load_from(&path) {
        Ok(config) => config,
        Err(ConfigError::Read { .. }) => Config::default(),
        Err(e) => {
            tracing::warn!("{e}, using defaults");
            Config::default()
        }
    }
}

/// Saves the configuration to the default location.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    match default_config_path() {
        Some(path) => config.save_to(&path),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.command.network_enable);
        assert_eq!(config.command.network_port, 55355);
        assert_eq!(config.command.network_addr, "0.0.0.0");
        assert_eq!(config.savestate.slot, 0);
        assert!(config.core.auto_overrides_enable);
        assert_eq!(config.input.max_users, 4);
        assert_eq!(config.history.size, 100);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_section() {
        let toml_str = r#"
[command]
network_enable = true
stdin_enable = true

[savestate]
slot = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.command.network_enable);
        assert!(config.command.stdin_enable);
        assert_eq!(config.command.network_port, 55355);
        assert_eq!(config.savestate.slot, 3);
        assert!(!config.savestate.auto_index);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.audio.volume_db = -6.0;
        config.netplay.host = Some("10.0.0.2".into());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load_from(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[audio\nvolume_db = ").unwrap();
        assert!(matches!(
            Config::load_from(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_param_lookup() {
        let mut config = Config::default();
        config.savestate.slot = 7;
        config.video.fullscreen = true;
        assert_eq!(config.param("state_slot").as_deref(), Some("7"));
        assert_eq!(config.param("video_fullscreen").as_deref(), Some("true"));
        assert_eq!(config.param("audio_volume").as_deref(), Some("0.0"));
        assert_eq!(config.param("savestate_directory").as_deref(), Some(""));
        assert_eq!(config.param("no_such_setting"), None);
    }

    #[test]
    fn test_device_defaults_to_joypad() {
        let input = InputConfig {
            devices: vec![device::NONE],
            ..InputConfig::default()
        };
        assert_eq!(input.device(0), device::NONE);
        assert_eq!(input.device(3), device::JOYPAD);
    }
}
