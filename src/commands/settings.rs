// Preference commands plus the home-dir and directory-picker helpers

use rfd::FileDialog;
use tauri::State;
use tracing::info;

use crate::models::{Preferences, PreferencesUpdate};
use crate::storage::{self, StateHandle};
use super::common::CommandResult;

#[derive(serde::Serialize)]
pub struct PreferencesInfo {
    pub theme: String,
    pub language: String,
    pub terminal: String,
    pub configPath: String,
    pub terminalDir: String,
}

impl PreferencesInfo {
    /// Fill unset paths with their effective defaults
    fn resolve(prefs: Preferences) -> Self {
        let home = storage::homeDir().map(|p| p.to_string_lossy().to_string()).unwrap_or_default();
        let defaultConfig = storage::defaultConfigDir()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            theme: prefs.theme.code().to_string(),
            language: prefs.language.code().to_string(),
            terminal: prefs.terminal,
            configPath: prefs.configPath.unwrap_or(defaultConfig),
            terminalDir: prefs.terminalDir.unwrap_or(home),
        }
    }
}

#[tauri::command]
pub fn getPreferences(state: State<'_, StateHandle>) -> CommandResult<PreferencesInfo> {
    info!("[getPreferences] Called");
    let prefs = state.preferences.read().clone();
    CommandResult::ok(PreferencesInfo::resolve(prefs))
}

#[tauri::command]
pub fn updatePreferences(state: State<'_, StateHandle>, input: PreferencesUpdate) -> CommandResult<PreferencesInfo> {
    info!(
        "[updatePreferences] theme: {:?}, language: {:?}, terminal: {:?}, configPath: {:?}, terminalDir: {:?}",
        input.theme, input.language, input.terminal, input.configPath, input.terminalDir
    );
    let result = state.updatePreferences(&input).map(PreferencesInfo::resolve);
    CommandResult::fromResult("updatePreferences", result)
}

#[tauri::command]
pub fn getHomeDir() -> CommandResult<String> {
    let result = storage::homeDir().map(|p| p.to_string_lossy().to_string());
    CommandResult::fromResult("getHomeDir", result)
}

#[tauri::command]
pub fn selectDirectory(title: Option<String>) -> CommandResult<Option<String>> {
    info!("[selectDirectory] Called");

    let result = FileDialog::new()
        .set_title(title.as_deref().unwrap_or("Select Directory"))
        .pick_folder()
        .map(|p| p.to_string_lossy().to_string());

    info!("[selectDirectory] Result: {:?}", result);
    CommandResult::ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Theme;

    #[test]
    fn test_resolve_fills_defaults() {
        let info = PreferencesInfo::resolve(Preferences { theme: Theme::Light, ..Default::default() });
        assert_eq!(info.theme, "light");
        assert_eq!(info.language, "zh-CN");
        assert!(info.configPath.ends_with(".claude") || storage::homeDir().is_err());
    }

    #[test]
    fn test_resolve_keeps_explicit_paths() {
        let info = PreferencesInfo::resolve(Preferences {
            configPath: Some("/cfg".into()),
            terminalDir: Some("/work".into()),
            ..Default::default()
        });
        assert_eq!(info.configPath, "/cfg");
        assert_eq!(info.terminalDir, "/work");
    }
}
