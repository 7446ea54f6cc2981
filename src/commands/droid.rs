// Droid channel commands
// Activation is FACTORY_API_KEY, not a file copy

use tauri::State;
use tracing::info;

use crate::droid_store;
use crate::error::AppResult;
use crate::storage::{AppState, StateHandle};
use crate::system_env::Persistence;
use crate::validation;
use super::common::{CommandResult, maskSecret, pickDir};

#[derive(serde::Serialize)]
pub struct DroidChannelInfo {
    pub name: String,
    pub apiKey: String,
    pub isActive: bool,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct SaveDroidChannelInput {
    pub configPath: Option<String>,
    pub name: String,
    pub apiKey: String,
    pub oldName: String,
}

pub(crate) fn listDroidChannelsWith(state: &AppState, configPath: Option<String>) -> AppResult<Vec<DroidChannelInfo>> {
    let dir = pickDir(configPath, || state.configDir())?;
    let channels = droid_store::listDroidChannels(&dir)?;
    let currentKey = state.activeKey.getCurrentActiveKey();
    let activeName = droid_store::findActiveDroidChannel(&channels, &currentKey).map(|c| c.name.clone());

    Ok(channels.into_iter().map(|c| DroidChannelInfo {
        isActive: activeName.as_deref() == Some(c.name.as_str()),
        name: c.name,
        apiKey: c.apiKey,
    }).collect())
}

pub(crate) fn saveDroidChannelWith(state: &AppState, input: SaveDroidChannelInput) -> AppResult<()> {
    let name = input.name.trim();
    let apiKey = input.apiKey.trim();
    validation::validateDroidName(name)?;
    validation::validateDroidKey(apiKey)?;

    let dir = pickDir(input.configPath.clone(), || state.configDir())?;
    let oldName = Some(input.oldName.trim()).filter(|o| !o.is_empty());
    info!("[saveDroidChannel] '{}' key: {}, editing: {:?}", name, maskSecret(apiKey), oldName);
    droid_store::saveDroidChannel(&dir, name, apiKey, oldName)
}

#[tauri::command]
pub fn getDroidChannels(state: State<'_, StateHandle>, configPath: Option<String>) -> CommandResult<Vec<DroidChannelInfo>> {
    info!("[getDroidChannels] Called");
    CommandResult::fromResult("getDroidChannels", listDroidChannelsWith(&state, configPath))
}

#[tauri::command]
pub fn getCurrentFactoryApiKey(state: State<'_, StateHandle>) -> CommandResult<String> {
    info!("[getCurrentFactoryApiKey] Called");
    CommandResult::ok(state.activeKey.getCurrentActiveKey())
}

#[tauri::command]
pub fn switchDroidChannel(state: State<'_, StateHandle>, apiKey: String) -> CommandResult<Persistence> {
    info!("[switchDroidChannel] Called with key {}", maskSecret(&apiKey));
    let result = validation::validateDroidKey(&apiKey)
        .and_then(|_| state.activeKey.setActiveKey(apiKey.trim()));
    CommandResult::fromResult("switchDroidChannel", result)
}

#[tauri::command]
pub fn saveDroidChannel(state: State<'_, StateHandle>, input: SaveDroidChannelInput) -> CommandResult<()> {
    info!("[saveDroidChannel] Called for '{}'", input.name);
    CommandResult::fromResult("saveDroidChannel", saveDroidChannelWith(&state, input))
}

#[tauri::command]
pub fn deleteDroidChannel(state: State<'_, StateHandle>, configPath: Option<String>, name: String) -> CommandResult<()> {
    info!("[deleteDroidChannel] Called for '{}'", name);
    let result = pickDir(configPath, || state.configDir())
        .and_then(|dir| droid_store::deleteDroidChannel(&dir, &name));
    CommandResult::fromResult("deleteDroidChannel", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::system_env::{ActiveKeyStore, UnsupportedEnvStore};

    #[test]
    fn test_list_marks_active_by_env_key() {
        let tmp = tempfile::tempdir().unwrap();
        let activeKey = ActiveKeyStore::new("CHANNEL_SWITCHER_TEST_DROID_CMD", Box::new(UnsupportedEnvStore));
        let state = AppState::new(tmp.path().join("config.md"), activeKey);
        let dir = Some(tmp.path().to_string_lossy().to_string());

        for (name, key) in [("a", "fk-1"), ("b", "fk-2")] {
            saveDroidChannelWith(&state, SaveDroidChannelInput {
                configPath: dir.clone(),
                name: name.into(),
                apiKey: key.into(),
                ..Default::default()
            }).unwrap();
        }

        state.activeKey.setActiveKey("fk-2").unwrap();
        let listed = listDroidChannelsWith(&state, dir.clone()).unwrap();
        let active: Vec<_> = listed.iter().filter(|c| c.isActive).map(|c| c.name.as_str()).collect();
        assert_eq!(active, vec!["b"]);

        let dup = saveDroidChannelWith(&state, SaveDroidChannelInput {
            configPath: dir,
            name: "b".into(),
            apiKey: "fk-3".into(),
            oldName: "a".into(),
        });
        assert!(matches!(dup, Err(AppError::DuplicateName(_))));
    }
}
