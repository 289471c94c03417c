use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV_PREFIX: &str = "GOSHORTS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_sync_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: default_sync_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_sync_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("goshorts/{}", crate::VERSION)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_splash_delay", with = "humantime_serde")]
    pub splash_delay: Duration,
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            splash_delay: default_splash_delay(),
            swipe_threshold: default_swipe_threshold(),
        }
    }
}

fn default_theme() -> String {
    "sunset".into()
}

fn default_splash_delay() -> Duration {
    Duration::from_millis(1500)
}

fn default_swipe_threshold() -> f64 {
    crate::gesture::DEFAULT_SWIPE_THRESHOLD
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerConfig {
    #[serde(default = "default_video_command")]
    pub video_command: Vec<String>,
    #[serde(default)]
    pub autoplay: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            video_command: default_video_command(),
            autoplay: false,
        }
    }
}

fn default_video_command() -> Vec<String> {
    vec![
        "mpv".into(),
        "--loop-file=inf".into(),
        "--mute=yes".into(),
        "--really-quiet".into(),
        "--force-window=yes".into(),
        "%URL%".into(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("goshorts").join("goshorts.log"))
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = apply_env(cfg, &env_overrides(prefix));

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.sync.endpoint.is_empty() {
        base.sync.endpoint = other.sync.endpoint;
    }
    if !other.sync.timeout.is_zero() {
        base.sync.timeout = other.sync.timeout;
    }
    if !other.sync.user_agent.is_empty() {
        base.sync.user_agent = other.sync.user_agent;
    }

    if !other.ui.theme.is_empty() {
        base.ui.theme = other.ui.theme;
    }
    base.ui.splash_delay = other.ui.splash_delay;
    if other.ui.swipe_threshold > 0.0 {
        base.ui.swipe_threshold = other.ui.swipe_threshold;
    }

    if !other.player.video_command.is_empty() {
        base.player.video_command = other.player.video_command;
    }
    base.player.autoplay = other.player.autoplay;

    if !other.logging.level.is_empty() {
        base.logging.level = other.logging.level;
    }
    if other.logging.file.is_some() {
        base.logging.file = other.logging.file;
    }

    base
}

fn env_overrides(prefix: &str) -> HashMap<String, String> {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }
    map
}

fn apply_env(mut cfg: Config, overrides: &HashMap<String, String>) -> Config {
    for (key, value) in overrides {
        apply_env_value(&mut cfg, key, value.clone());
    }
    cfg
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "sync.endpoint" => cfg.sync.endpoint = value,
        "sync.user_agent" => cfg.sync.user_agent = value,
        "sync.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.sync.timeout = duration;
            }
        }
        "ui.theme" => cfg.ui.theme = value,
        "ui.splash_delay" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.ui.splash_delay = duration;
            }
        }
        "ui.swipe_threshold" => {
            if let Ok(parsed) = value.parse::<f64>() {
                if parsed > 0.0 {
                    cfg.ui.swipe_threshold = parsed;
                }
            }
        }
        "player.video_command" => {
            cfg.player.video_command = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "player.autoplay" => {
            cfg.player.autoplay = matches!(value.as_str(), "1" | "true" | "TRUE" | "True");
        }
        "logging.level" => cfg.logging.level = value,
        "logging.file" => cfg.logging.file = Some(PathBuf::from(value)),
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("goshorts").join("config.yaml"))
}

/// Persist the sync endpoint so the next launch mirrors state to it.
pub fn save_sync_endpoint(path: Option<PathBuf>, endpoint: &str) -> Result<PathBuf> {
    let endpoint = endpoint.trim();
    anyhow::ensure!(!endpoint.is_empty(), "config: sync.endpoint is required");
    url::Url::parse(endpoint)
        .with_context(|| format!("config: sync.endpoint {endpoint:?} is not a URL"))?;

    let path = if let Some(path) = path {
        path
    } else {
        default_config_path().context("config: unable to determine default config path")?
    };

    // Work on the raw document so defaults never get written out.
    let mut doc = if path.exists() {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("config: failed to read file {}", path.display()))?;
        serde_yaml::from_str::<serde_yaml::Value>(&contents)
            .with_context(|| format!("config: failed to parse file {}", path.display()))?
    } else {
        serde_yaml::Value::Null
    };
    set_key(&mut doc, "sync", "endpoint", endpoint);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("config: failed to create directory {}", parent.display()))?;
    }

    let contents = serde_yaml::to_string(&doc).context("config: failed to serialize config")?;
    fs::write(&path, contents)
        .with_context(|| format!("config: failed to write file {}", path.display()))?;

    Ok(path)
}

fn set_key(doc: &mut serde_yaml::Value, table: &str, key: &str, value: &str) {
    use serde_yaml::{Mapping, Value};

    if !doc.is_mapping() {
        *doc = Value::Mapping(Mapping::new());
    }
    let Value::Mapping(root) = doc else { return };
    let section = root
        .entry(Value::from(table))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !section.is_mapping() {
        *section = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(section) = section {
        section.insert(Value::from(key), Value::from(value));
    }
}
