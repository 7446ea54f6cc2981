// Preferences model
// Stored as YAML frontmatter in ~/.channel-switcher/config.md

use serde::{Deserialize, Serialize};
use super::common::{Language, Theme};

/// Persisted UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "defaultTerminal")]
    pub terminal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configPath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminalDir: Option<String>,
}

/// A windowed terminal per OS; plain shells are only used when picked explicitly
pub fn defaultTerminal() -> String {
    if cfg!(target_os = "windows") {
        "wt".to_string()
    } else if cfg!(target_os = "macos") {
        "terminal".to_string()
    } else {
        "x-terminal-emulator".to_string()
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: Language::default(),
            terminal: defaultTerminal(),
            configPath: None,
            terminalDir: None,
        }
    }
}

/// Partial preferences (all fields optional)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreferencesUpdate {
    pub theme: Option<Theme>,
    pub language: Option<Language>,
    pub terminal: Option<String>,
    pub configPath: Option<String>,
    pub terminalDir: Option<String>,
}

impl Preferences {
    /// Merge a partial update; empty path strings clear the stored path
    pub fn withUpdate(&self, update: &PreferencesUpdate) -> Self {
        let pick = |new: &Option<String>, old: &Option<String>| match new {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.clone()),
            None => old.clone(),
        };

        Self {
            theme: update.theme.unwrap_or(self.theme),
            language: update.language.unwrap_or(self.language),
            terminal: update.terminal.clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| self.terminal.clone()),
            configPath: pick(&update.configPath, &self.configPath),
            terminalDir: pick(&update.terminalDir, &self.terminalDir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_update_merges_fields() {
        let prefs = Preferences {
            configPath: Some("/old".into()),
            terminalDir: Some("/work".into()),
            ..Default::default()
        };
        let merged = prefs.withUpdate(&PreferencesUpdate {
            theme: Some(Theme::Light),
            terminalDir: Some("".into()),
            terminal: Some("  ".into()),
            ..Default::default()
        });

        assert_eq!(merged.theme, Theme::Light);
        assert_eq!(merged.language, prefs.language);
        assert_eq!(merged.terminal, prefs.terminal);
        assert_eq!(merged.configPath.as_deref(), Some("/old"));
        assert_eq!(merged.terminalDir, None);
    }
}
