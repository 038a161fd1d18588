use crate::automation::AutomationSettings;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "STUDENTFLOW_CONFIG_PATH";
const APP_DIR: &str = "studentflow";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
    colored: bool,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }

    /// Paints a course label with its catalog colour token.
    pub fn course(&self, text: &str, color_token: &str) -> String {
        if !self.colored {
            return text.to_string();
        }
        let code = match color_token {
            "yellow" => "\x1b[38;5;178m",
            "blue" => "\x1b[38;5;33m",
            "purple" => "\x1b[38;5;135m",
            "pink" => "\x1b[38;5;205m",
            "green" => "\x1b[38;5;71m",
            _ => return text.to_string(),
        };
        format!("{}{}{}", code, text, self.reset)
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match canonical_theme_name_option(theme) {
        Some(ref name) if name == "noir" => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
            colored: true,
        },
        Some(ref name) if name == "solarized" => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
            colored: true,
        },
        _ => Palette {
            accent: "",
            muted: "",
            reset: "",
            colored: false,
        },
    }
}

fn canonical_theme_name_option(theme: Option<&str>) -> Option<String> {
    theme.and_then(canonical_theme_name)
}

pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let cleaned = canonical_key(raw);
    if cleaned.is_empty() {
        return Some("default".into());
    }

    match cleaned.as_str() {
        "vanilla" | "light" => Some("default".to_string()),
        "dark" | "dark_mode" | "darkmode" => Some("noir".to_string()),
        other => Some(other.to_string()),
    }
}

/// Lowercases and collapses every non-alphanumeric run into one `_`.
pub fn canonical_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default = "default_reminder_delay_ms")]
    pub reminder_delay_ms: u64,
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,
    #[serde(default)]
    pub cancel_reminders_on_delete: bool,
}

fn default_reminder_delay_ms() -> u64 {
    1000
}

fn default_due_soon_days() -> i64 {
    3
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            reminder_delay_ms: default_reminder_delay_ms(),
            due_soon_days: default_due_soon_days(),
            cancel_reminders_on_delete: false,
        }
    }
}

impl AutomationConfig {
    pub fn settings(&self) -> AutomationSettings {
        AutomationSettings {
            reminder_delay: Duration::from_millis(self.reminder_delay_ms),
            due_soon_days: self.due_soon_days,
            cancel_reminders_on_delete: self.cancel_reminders_on_delete,
        }
    }
}

fn default_seed_demo() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub notifications: bool,
    #[serde(default = "default_seed_demo")]
    pub seed_demo: bool,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            aliases: HashMap::new(),
            notifications: false,
            seed_demo: default_seed_demo(),
            assistant: AssistantConfig::default(),
            automation: AutomationConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub aliases: HashMap<String, String>,
    pub notifications: Option<bool>,
    pub seed_demo: Option<bool>,
    pub assistant_model: Option<String>,
    pub assistant_api_base: Option<String>,
    pub reminder_delay_ms: Option<u64>,
    pub due_soon_days: Option<i64>,
    pub cancel_reminders_on_delete: Option<bool>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR).join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config_theme(config))
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && let Some(normalized) = canonical_theme_name(theme)
    {
        merged.theme = Some(normalized);
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    if let Some(notifications) = overrides.notifications {
        merged.notifications = notifications;
    }
    if let Some(seed_demo) = overrides.seed_demo {
        merged.seed_demo = seed_demo;
    }
    if let Some(model) = overrides.assistant_model.as_ref() {
        merged.assistant.model = model.clone();
    }
    if let Some(api_base) = overrides.assistant_api_base.as_ref() {
        merged.assistant.api_base = api_base.clone();
    }
    if let Some(delay) = overrides.reminder_delay_ms {
        merged.automation.reminder_delay_ms = delay;
    }
    if let Some(days) = overrides.due_soon_days {
        merged.automation.due_soon_days = days;
    }
    if let Some(cancel) = overrides.cancel_reminders_on_delete {
        merged.automation.cancel_reminders_on_delete = cancel;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, canonical_theme_name, load_config_from_path,
        load_config_with_fallback_from_path, merge_overrides, palette_for_theme,
    };
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("studentflow-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
        assert!(result.config.seed_demo);
        assert_eq!(result.config.automation.due_soon_days, 3);
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.map(|err| err.code()), Some("invalid_data"));
    }

    #[test]
    fn load_config_reads_valid_file_and_fills_defaults() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "theme": "Dark Mode",
            "aliases": {"ls": "list"},
            "assistant": {"model": "gemini-pro"},
            "automation": {"reminder_delay_ms": 250}
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.theme.as_deref(), Some("noir"));
        assert_eq!(loaded.aliases.get("ls").map(String::as_str), Some("list"));
        assert_eq!(loaded.assistant.model, "gemini-pro");
        assert_eq!(loaded.assistant.api_key_env, "GEMINI_API_KEY");
        assert_eq!(
            loaded.automation.settings().reminder_delay,
            Duration::from_millis(250)
        );
        assert!(!loaded.automation.cancel_reminders_on_delete);
    }

    #[test]
    fn merge_overrides_updates_every_field() {
        let base = Config {
            theme: Some("light".into()),
            aliases: [("ls".into(), "list".into())].into_iter().collect(),
            ..Config::default()
        };

        let overrides = ConfigOverrides {
            theme: Some("noir".into()),
            aliases: [("st".into(), "stats".into())].into_iter().collect(),
            notifications: Some(true),
            seed_demo: Some(false),
            assistant_model: Some("gemini-pro".into()),
            assistant_api_base: Some("http://localhost:9".into()),
            reminder_delay_ms: Some(10),
            due_soon_days: Some(7),
            cancel_reminders_on_delete: Some(true),
        };

        let merged = merge_overrides(&base, &overrides);
        assert_eq!(merged.theme.as_deref(), Some("noir"));
        assert_eq!(merged.aliases.len(), 2);
        assert!(merged.notifications);
        assert!(!merged.seed_demo);
        assert_eq!(merged.assistant.model, "gemini-pro");
        assert_eq!(merged.assistant.api_base, "http://localhost:9");
        assert_eq!(merged.automation.reminder_delay_ms, 10);
        assert_eq!(merged.automation.due_soon_days, 7);
        assert!(merged.automation.cancel_reminders_on_delete);

        assert_eq!(base.theme.as_deref(), Some("light"));
        assert!(base.seed_demo);
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            theme: Some("default".into()),
            ..Config::default()
        };

        let merged = merge_overrides(&base, &ConfigOverrides::default());

        assert_eq!(merged, base);
    }

    #[test]
    fn canonical_theme_name_maps_variants() {
        assert_eq!(canonical_theme_name("Vanilla"), Some("default".into()));
        assert_eq!(canonical_theme_name("Noir"), Some("noir".into()));
        assert_eq!(canonical_theme_name("Solarized"), Some("solarized".into()));
        assert_eq!(canonical_theme_name("dark-mode"), Some("noir".into()));
        assert_eq!(canonical_theme_name("  "), Some("default".into()));
    }

    #[test]
    fn palette_for_theme_colors_courses_only_when_themed() {
        let plain = palette_for_theme(Some("vanilla"));
        assert!(plain.accent.is_empty());
        assert_eq!(plain.course("Math 202", "blue"), "Math 202");

        let noir = palette_for_theme(Some("noir"));
        assert_eq!(noir.accent, "\x1b[38;5;208m");
        assert!(noir.course("Math 202", "blue").starts_with("\x1b[38;5;33m"));
        assert_eq!(noir.course("Art", "unknown"), "Art");
    }
}
