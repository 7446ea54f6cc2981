// Channel commands for the primary CLI

use tauri::{AppHandle, Manager, State};
use tracing::info;

use crate::balance;
use crate::channel_store::{self, ChannelListing};
use crate::error::{AppError, AppResult};
use crate::models::{BalanceApi, ChannelConfig, ChannelDraft};
use crate::storage::{AppState, StateHandle};
use crate::validation;
use super::common::{CommandResult, maskSecret, pickDir};

pub const DEFAULT_BALANCE_ERROR_TEXT: &str = "query failed";

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct SaveChannelInput {
    pub configPath: Option<String>,
    pub channelName: String,
    pub token: String,
    pub url: String,
    pub model: String,
    pub oldName: String,
    pub balanceUrl: String,
    pub balanceMethod: String,
    pub balanceField: String,
}

fn configDirFor(state: &AppState, configPath: Option<String>) -> AppResult<std::path::PathBuf> {
    pickDir(configPath, || state.configDir())
}

pub(crate) fn saveChannelWith(state: &AppState, input: SaveChannelInput) -> AppResult<()> {
    let name = input.channelName.trim().to_string();
    validation::validateChannelName(&name)?;
    validation::validateToken(&input.token)?;
    validation::validateUrl(&input.url)?;
    let method = validation::validateBalanceQuery(&input.balanceUrl, &input.balanceMethod, &input.balanceField)?;

    let dir = configDirFor(state, input.configPath.clone())?;
    let oldName = Some(input.oldName.trim().to_string()).filter(|o| !o.is_empty());

    let existing = channel_store::listChannels(&dir)?;
    let editingSelf = oldName.as_deref() == Some(name.as_str());
    if existing.channels.contains_key(&name) && !editingSelf {
        return Err(AppError::DuplicateName(name));
    }
    // An unreadable settings-<name>.json still owns the name until it is deleted
    if existing.invalid.iter().any(|c| c.name == name) {
        return Err(AppError::DuplicateName(format!("{} (existing file could not be read)", name)));
    }

    let draft = ChannelDraft {
        authToken: input.token.trim().to_string(),
        baseUrl: Some(input.url.trim().to_string()),
        model: Some(input.model.trim().to_string()),
        balanceQuery: method.map(|method| BalanceApi {
            url: input.balanceUrl.trim().to_string(),
            method,
            field: input.balanceField.trim().to_string(),
        }),
        oldName,
    };
    info!(
        "[saveChannel] '{}' token: {}, rename from: {:?}",
        name, maskSecret(&draft.authToken), draft.oldName
    );
    channel_store::saveChannel(&dir, &name, &draft)
}

pub(crate) fn queryChannelBalanceTarget(state: &AppState, configPath: Option<String>, channelName: &str) -> AppResult<(BalanceApi, String)> {
    let dir = configDirFor(state, configPath)?;
    let listing = channel_store::listChannels(&dir)?;
    let entry = listing.channels.get(channelName)
        .ok_or_else(|| AppError::NotFound(format!("channel '{}'", channelName)))?;
    let api = entry.config.balanceApi.clone()
        .filter(|b| !b.url.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("channel '{}' has no balance API", channelName)))?;
    let token = balance::requireToken(entry.config.authToken())?.to_string();
    Ok((api, token))
}

#[tauri::command]
pub fn getChannels(state: State<'_, StateHandle>, configPath: Option<String>) -> CommandResult<ChannelListing> {
    info!("[getChannels] Called with configPath: {:?}", configPath);
    let result = configDirFor(&state, configPath).and_then(|dir| channel_store::listChannels(&dir));
    CommandResult::fromResult("getChannels", result)
}

#[tauri::command]
pub fn getActiveChannel(state: State<'_, StateHandle>, configPath: Option<String>) -> CommandResult<ChannelConfig> {
    info!("[getActiveChannel] Called");
    let result = configDirFor(&state, configPath).and_then(|dir| channel_store::getActiveChannel(&dir));
    CommandResult::fromResult("getActiveChannel", result)
}

#[tauri::command]
pub fn getActiveChannelName(state: State<'_, StateHandle>, configPath: Option<String>) -> CommandResult<Option<String>> {
    info!("[getActiveChannelName] Called");
    let result = configDirFor(&state, configPath).and_then(|dir| channel_store::resolveActiveChannel(&dir));
    CommandResult::fromResult("getActiveChannelName", result)
}

#[tauri::command]
pub fn saveChannel(state: State<'_, StateHandle>, input: SaveChannelInput) -> CommandResult<()> {
    info!("[saveChannel] Called for '{}'", input.channelName);
    CommandResult::fromResult("saveChannel", saveChannelWith(&state, input))
}

#[tauri::command]
pub fn deleteChannel(state: State<'_, StateHandle>, configPath: Option<String>, channelName: String) -> CommandResult<()> {
    info!("[deleteChannel] Called for '{}'", channelName);
    let result = configDirFor(&state, configPath).and_then(|dir| channel_store::deleteChannel(&dir, &channelName));
    CommandResult::fromResult("deleteChannel", result)
}

#[tauri::command]
pub fn switchChannel(state: State<'_, StateHandle>, configPath: Option<String>, channelName: String) -> CommandResult<()> {
    info!("[switchChannel] Called for '{}'", channelName);
    let result = configDirFor(&state, configPath).and_then(|dir| channel_store::switchChannel(&dir, &channelName));
    CommandResult::fromResult("switchChannel", result)
}

/// Query the channel's balance endpoint and render the configured field
#[tauri::command]
pub async fn queryChannelBalance(
    app: AppHandle,
    configPath: Option<String>,
    channelName: String,
    errorText: Option<String>,
) -> CommandResult<String> {
    info!("[queryChannelBalance] Called for '{}'", channelName);
    let state = app.state::<StateHandle>().inner().clone();
    let errorText = errorText.unwrap_or_else(|| DEFAULT_BALANCE_ERROR_TEXT.to_string());

    let result = async {
        let (api, token) = queryChannelBalanceTarget(&state, configPath, &channelName)?;
        let body = balance::queryBalance(&api.url, api.method, &token).await?;
        Ok::<_, AppError>(balance::renderBalance(&body, &api.field, &errorText))
    }.await;

    CommandResult::fromResult("queryChannelBalance", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BalanceMethod;
    use crate::system_env::{ActiveKeyStore, UnsupportedEnvStore};

    fn stateIn(tmp: &tempfile::TempDir) -> AppState {
        let activeKey = ActiveKeyStore::new("CHANNEL_SWITCHER_TEST_CHANNEL_CMD", Box::new(UnsupportedEnvStore));
        AppState::new(tmp.path().join("prefs").join("config.md"), activeKey)
    }

    fn input(dir: &std::path::Path, name: &str, token: &str) -> SaveChannelInput {
        SaveChannelInput {
            configPath: Some(dir.to_string_lossy().to_string()),
            channelName: name.to_string(),
            token: token.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_rejects_duplicate_name() {
        let tmp = tempfile::tempdir().unwrap();
        let state = stateIn(&tmp);
        saveChannelWith(&state, input(tmp.path(), "prod", "t1")).unwrap();

        let err = saveChannelWith(&state, input(tmp.path(), "prod", "t2")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(_)));

        let mut edit = input(tmp.path(), "prod", "t3");
        edit.oldName = "prod".to_string();
        saveChannelWith(&state, edit).unwrap();
    }

    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let state = stateIn(&tmp);
        let broken = tmp.path().join("settings-prod.json");
        std::fs::write(&broken, "{ half written").unwrap();

        let err = saveChannelWith(&state, input(tmp.path(), "prod", "t1")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(_)));
        assert_eq!(std::fs::read_to_string(&broken).unwrap(), "{ half written");

        channel_store::deleteChannel(tmp.path(), "prod").unwrap();
        saveChannelWith(&state, input(tmp.path(), "prod", "t1")).unwrap();
    }

    #[test]
    fn test_rename_into_existing_name_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let state = stateIn(&tmp);
        saveChannelWith(&state, input(tmp.path(), "a", "t1")).unwrap();
        saveChannelWith(&state, input(tmp.path(), "b", "t2")).unwrap();

        let mut rename = input(tmp.path(), "a", "t2");
        rename.oldName = "b".to_string();
        assert!(matches!(saveChannelWith(&state, rename), Err(AppError::DuplicateName(_))));
    }

    #[test]
    fn test_validation_happens_before_write() {
        let tmp = tempfile::tempdir().unwrap();
        let state = stateIn(&tmp);

        let mut bad = input(tmp.path(), "x", "t");
        bad.url = "not a url".to_string();
        assert!(matches!(saveChannelWith(&state, bad), Err(AppError::InvalidInput(_))));

        let mut noField = input(tmp.path(), "x", "t");
        noField.balanceUrl = "https://b.example.com".to_string();
        assert!(saveChannelWith(&state, noField).is_err());

        assert!(saveChannelWith(&state, input(tmp.path(), "x", " ")).is_err());
        assert!(channel_store::listChannels(tmp.path()).unwrap().channels.is_empty());
    }

    #[test]
    fn test_balance_target_lookup() {
        let tmp = tempfile::tempdir().unwrap();
        let state = stateIn(&tmp);
        let dir = Some(tmp.path().to_string_lossy().to_string());

        let mut withBalance = input(tmp.path(), "paid", "sk-1");
        withBalance.balanceUrl = "https://b.example.com/q".to_string();
        withBalance.balanceMethod = "get".to_string();
        withBalance.balanceField = "data.left".to_string();
        saveChannelWith(&state, withBalance).unwrap();
        saveChannelWith(&state, input(tmp.path(), "plain", "sk-2")).unwrap();

        let (api, token) = queryChannelBalanceTarget(&state, dir.clone(), "paid").unwrap();
        assert_eq!(api.method, BalanceMethod::Get);
        assert_eq!(api.field, "data.left");
        assert_eq!(token, "sk-1");

        assert!(matches!(queryChannelBalanceTarget(&state, dir.clone(), "plain"), Err(AppError::InvalidInput(_))));
        assert!(matches!(queryChannelBalanceTarget(&state, dir, "ghost"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_config_dir_falls_back_to_preferences() {
        let tmp = tempfile::tempdir().unwrap();
        let state = stateIn(&tmp);
        let channels = tmp.path().join("claude");
        state.updatePreferences(&crate::models::PreferencesUpdate {
            configPath: Some(channels.to_string_lossy().to_string()),
            ..Default::default()
        }).unwrap();

        let mut viaPrefs = input(tmp.path(), "p", "t");
        viaPrefs.configPath = None;
        saveChannelWith(&state, viaPrefs).unwrap();
        assert!(channels.join("settings-p.json").exists());
    }
}
