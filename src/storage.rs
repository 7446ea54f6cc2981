// Filesystem layout and shared app state for channel-switcher
// Channel files live in a user-chosen config dir, preferences in ~/.channel-switcher/

use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{Preferences, PreferencesUpdate};
use crate::system_env::{ActiveKeyStore, platformEnvStore};

pub const ACTIVE_SETTINGS_FILE: &str = "settings.json";
pub const CHANNEL_FILE_PREFIX: &str = "settings-";
pub const CHANNEL_FILE_SUFFIX: &str = ".json";
pub const SOFT_DELETE_SUFFIX: &str = ".del";
pub const DROID_KEYS_FILE: &str = "key.txt";
pub const FACTORY_API_KEY_VAR: &str = "FACTORY_API_KEY";

// ============================================
// PATH HELPERS
// ============================================

pub fn homeDir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::Internal("Failed to get home directory".to_string()))
}

/// Preferences directory (~/.channel-switcher/)
pub fn preferencesDir() -> AppResult<PathBuf> {
    Ok(homeDir()?.join(".channel-switcher"))
}

pub fn preferencesPath() -> AppResult<PathBuf> {
    Ok(preferencesDir()?.join("config.md"))
}

/// Default channel config dir (~/.claude)
pub fn defaultConfigDir() -> AppResult<PathBuf> {
    Ok(homeDir()?.join(".claude"))
}

pub fn activeSettingsPath(configDir: &Path) -> PathBuf {
    configDir.join(ACTIVE_SETTINGS_FILE)
}

/// settings-<name>.json
pub fn channelPath(configDir: &Path, name: &str) -> PathBuf {
    configDir.join(format!("{}{}{}", CHANNEL_FILE_PREFIX, name, CHANNEL_FILE_SUFFIX))
}

/// settings-<name>.json.del
pub fn softDeletedPath(configDir: &Path, name: &str) -> PathBuf {
    configDir.join(format!("{}{}{}{}", CHANNEL_FILE_PREFIX, name, CHANNEL_FILE_SUFFIX, SOFT_DELETE_SUFFIX))
}

pub fn droidKeysPath(configDir: &Path) -> PathBuf {
    configDir.join(DROID_KEYS_FILE)
}

/// Channel name from a filename ("settings-prod.json" -> "prod")
pub fn parseChannelFilename(filename: &str) -> Option<&str> {
    filename
        .strip_prefix(CHANNEL_FILE_PREFIX)?
        .strip_suffix(CHANNEL_FILE_SUFFIX)
        .filter(|name| !name.is_empty())
}

// ============================================
// FRONTMATTER PARSING
// ============================================

/// Parse YAML frontmatter from markdown content
pub fn parseFrontmatter<T: serde::de::DeserializeOwned>(content: &str) -> Option<(T, String)> {
    let content = content.trim();
    let rest = content.strip_prefix("---")?;
    let end = rest.find("\n---")?;
    let yaml = rest[..end].trim();
    let body = rest[end + 4..].trim().to_string();

    let frontmatter: T = serde_yaml::from_str(yaml).ok()?;
    Some((frontmatter, body))
}

/// Serialize frontmatter + body to markdown
pub fn toMarkdown<T: serde::Serialize>(frontmatter: &T, body: &str) -> AppResult<String> {
    let yaml = serde_yaml::to_string(frontmatter)
        .map_err(|e| AppError::Internal(format!("YAML error: {}", e)))?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

// ============================================
// PREFERENCES
// ============================================

const PREFERENCES_BODY: &str = "# Channel Switcher\n\nPreferences are stored in the frontmatter above.\n";

/// Load preferences, falling back to defaults when the file is missing or unreadable
pub fn loadPreferences(path: &Path) -> Preferences {
    debug!("[loadPreferences] Path: {:?}", path);

    if !path.exists() {
        debug!("[loadPreferences] No preferences file, using defaults");
        return Preferences::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("[loadPreferences] Failed to read {:?}: {}", path, e);
            return Preferences::default();
        }
    };

    parseFrontmatter::<Preferences>(&content)
        .map(|(prefs, _)| prefs)
        .unwrap_or_else(|| {
            warn!("[loadPreferences] Failed to parse frontmatter, using defaults");
            Preferences::default()
        })
}

pub fn savePreferences(path: &Path, prefs: &Preferences) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    let content = toMarkdown(prefs, PREFERENCES_BODY)?;
    fs::write(path, content).map_err(|e| AppError::io(path, e))
}

// ============================================
// APP STATE
// ============================================

/// State owned by the Tauri runtime and handed to commands
pub struct AppState {
    pub preferencesPath: PathBuf,
    pub preferences: RwLock<Preferences>,
    pub activeKey: ActiveKeyStore,
}

impl AppState {
    pub fn new(preferencesPath: PathBuf, activeKey: ActiveKeyStore) -> Self {
        info!("[AppState::new] Loading preferences from {:?}", preferencesPath);
        let preferences = loadPreferences(&preferencesPath);
        info!(
            "[AppState::new] theme: {:?}, language: {}, terminal: {}",
            preferences.theme, preferences.language.code(), preferences.terminal
        );
        Self {
            preferencesPath,
            preferences: RwLock::new(preferences),
            activeKey,
        }
    }

    /// Config dir from preferences, or ~/.claude
    pub fn configDir(&self) -> AppResult<PathBuf> {
        match self.preferences.read().configPath.clone() {
            Some(p) => Ok(PathBuf::from(p)),
            None => defaultConfigDir(),
        }
    }

    /// Terminal working dir from preferences, or the home dir
    pub fn terminalDir(&self) -> AppResult<PathBuf> {
        match self.preferences.read().terminalDir.clone() {
            Some(p) => Ok(PathBuf::from(p)),
            None => homeDir(),
        }
    }

    pub fn terminal(&self) -> String {
        self.preferences.read().terminal.clone()
    }

    /// Apply a partial update and persist it
    pub fn updatePreferences(&self, update: &PreferencesUpdate) -> AppResult<Preferences> {
        let updated = self.preferences.read().withUpdate(update);
        savePreferences(&self.preferencesPath, &updated)?;
        *self.preferences.write() = updated.clone();
        Ok(updated)
    }
}

pub type StateHandle = Arc<AppState>;

pub fn initState() -> AppResult<StateHandle> {
    let activeKey = ActiveKeyStore::new(FACTORY_API_KEY_VAR, platformEnvStore());
    Ok(Arc::new(AppState::new(preferencesPath()?, activeKey)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Theme;
    use crate::system_env::UnsupportedEnvStore;

    #[test]
    fn test_parse_channel_filename() {
        assert_eq!(parseChannelFilename("settings-prod.json"), Some("prod"));
        assert_eq!(parseChannelFilename("settings-a-b.json"), Some("a-b"));
        assert_eq!(parseChannelFilename("settings.json"), None);
        assert_eq!(parseChannelFilename("settings-.json"), None);
        assert_eq!(parseChannelFilename("settings-prod.json.del"), None);
    }

    #[test]
    fn test_channel_paths() {
        let dir = Path::new("/cfg");
        assert_eq!(channelPath(dir, "prod"), PathBuf::from("/cfg/settings-prod.json"));
        assert_eq!(softDeletedPath(dir, "prod"), PathBuf::from("/cfg/settings-prod.json.del"));
        assert_eq!(activeSettingsPath(dir), PathBuf::from("/cfg/settings.json"));
    }

    #[test]
    fn test_preferences_round_trip_through_frontmatter() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.md");

        assert_eq!(loadPreferences(&path), Preferences::default());

        let prefs = Preferences {
            theme: Theme::Light,
            configPath: Some("/home/me/.claude".into()),
            ..Default::default()
        };
        savePreferences(&path, &prefs).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("---\n"));
        assert_eq!(loadPreferences(&path), prefs);
    }

    #[test]
    fn test_garbage_preferences_fall_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.md");
        fs::write(&path, "not frontmatter at all").unwrap();
        assert_eq!(loadPreferences(&path), Preferences::default());
    }

    #[test]
    fn test_update_preferences_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.md");
        let activeKey = ActiveKeyStore::new("CHANNEL_SWITCHER_TEST_STATE", Box::new(UnsupportedEnvStore));
        let state = AppState::new(path.clone(), activeKey);

        state.updatePreferences(&PreferencesUpdate {
            terminal: Some("pwsh".into()),
            configPath: Some("/tmp/claude".into()),
            ..Default::default()
        }).unwrap();

        assert_eq!(state.terminal(), "pwsh");
        assert_eq!(state.configDir().unwrap(), PathBuf::from("/tmp/claude"));
        assert_eq!(loadPreferences(&path).terminal, "pwsh");
    }
}
