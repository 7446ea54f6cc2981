// Channel store: one settings-<name>.json per channel plus the active settings.json
// "Active" is never stored explicitly; it is derived by matching credentials

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{ChannelConfig, ChannelDraft, ChannelEntry, Credentials, InvalidChannel};
use crate::storage::{activeSettingsPath, channelPath, parseChannelFilename, softDeletedPath};

/// Result of scanning a config dir
#[derive(Debug, Default, serde::Serialize)]
pub struct ChannelListing {
    pub channels: BTreeMap<String, ChannelEntry>,
    pub invalid: Vec<InvalidChannel>,
}

fn readChannelFile(path: &Path) -> AppResult<ChannelConfig> {
    let content = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| AppError::parse(path, e))
}

fn modifiedMillis(path: &Path) -> i64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).timestamp_millis())
        .unwrap_or(0)
}

/// List every channel in `configDir`
///
/// A missing directory is an empty listing. A file that cannot be read or
/// parsed lands in `invalid` and the scan carries on.
pub fn listChannels(configDir: &Path) -> AppResult<ChannelListing> {
    let mut listing = ChannelListing::default();

    if !configDir.exists() {
        debug!("[listChannels] {:?} does not exist", configDir);
        return Ok(listing);
    }

    let entries = fs::read_dir(configDir).map_err(|e| AppError::io(configDir, e))?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().to_string();
        let Some(name) = parseChannelFilename(&filename) else {
            continue;
        };

        match readChannelFile(&path) {
            Ok(config) => {
                let mtime = modifiedMillis(&path);
                listing.channels.insert(name.to_string(), ChannelEntry { config, mtime });
            }
            Err(e) => {
                warn!("[listChannels] Skipping {}: {}", filename, e);
                listing.invalid.push(InvalidChannel { name: name.to_string(), error: e.to_string() });
            }
        }
    }

    listing.invalid.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("[listChannels] {} channels, {} invalid", listing.channels.len(), listing.invalid.len());
    Ok(listing)
}

/// Read the active settings.json
pub fn getActiveChannel(configDir: &Path) -> AppResult<ChannelConfig> {
    let path = activeSettingsPath(configDir);
    if !path.exists() {
        return Err(AppError::NotFound(path.display().to_string()));
    }
    readChannelFile(&path)
}

/// First channel (in name order) whose credential pair equals `active`
pub fn findChannelByCredentials<'a>(
    channels: &'a BTreeMap<String, ChannelEntry>,
    active: &Credentials,
) -> Option<&'a str> {
    active.authToken.as_ref()?;
    channels
        .iter()
        .find(|(_, entry)| entry.config.credentials() == *active)
        .map(|(name, _)| name.as_str())
}

/// Name of the channel currently copied into settings.json, if any
pub fn resolveActiveChannel(configDir: &Path) -> AppResult<Option<String>> {
    let active = match getActiveChannel(configDir) {
        Ok(config) => config,
        Err(e) => {
            debug!("[resolveActiveChannel] No usable active settings: {}", e);
            return Ok(None);
        }
    };
    let listing = listChannels(configDir)?;
    Ok(findChannelByCredentials(&listing.channels, &active.credentials()).map(str::to_string))
}

/// Names that differ only in letter case share one file on NTFS and APFS
fn isCaseOnlyRename(oldName: &str, name: &str) -> bool {
    oldName != name && oldName.to_lowercase() == name.to_lowercase()
}

/// Write settings-<name>.json
///
/// A rename writes the new file and then removes the old one. A rename that
/// only changes letter case moves the file first instead, since on a
/// case-insensitive filesystem both names open the same file.
pub fn saveChannel(configDir: &Path, name: &str, draft: &ChannelDraft) -> AppResult<()> {
    fs::create_dir_all(configDir).map_err(|e| AppError::io(configDir, e))?;

    let config = ChannelConfig::fromDraft(draft);
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| AppError::Internal(format!("JSON error: {}", e)))?;

    let path = channelPath(configDir, name);
    let renamedFrom = draft.oldName.as_deref().filter(|o| !o.is_empty() && *o != name);

    if let Some(oldName) = renamedFrom.filter(|o| isCaseOnlyRename(o, name)) {
        let oldPath = channelPath(configDir, oldName);
        match fs::rename(&oldPath, &path) {
            Ok(()) => info!("[saveChannel] Moved {:?} -> {:?}", oldPath, path),
            Err(e) => warn!("[saveChannel] Failed to move {:?}: {}", oldPath, e),
        }
        fs::write(&path, json).map_err(|e| AppError::io(&path, e))?;
        info!("[saveChannel] Wrote {:?}", path);
        return Ok(());
    }

    fs::write(&path, json).map_err(|e| AppError::io(&path, e))?;
    info!("[saveChannel] Wrote {:?}", path);

    if let Some(oldName) = renamedFrom {
        let oldPath = channelPath(configDir, oldName);
        match fs::remove_file(&oldPath) {
            Ok(()) => info!("[saveChannel] Removed renamed channel file {:?}", oldPath),
            Err(e) => warn!("[saveChannel] Failed to remove old file {:?}: {}", oldPath, e),
        }
    }

    Ok(())
}

/// Soft delete: settings-<name>.json -> settings-<name>.json.del
pub fn deleteChannel(configDir: &Path, name: &str) -> AppResult<()> {
    let source = channelPath(configDir, name);
    let target = softDeletedPath(configDir, name);
    fs::rename(&source, &target).map_err(|e| AppError::io(&source, e))?;
    info!("[deleteChannel] {:?} -> {:?}", source, target);
    Ok(())
}

/// Byte-copy settings-<name>.json onto settings.json
pub fn switchChannel(configDir: &Path, name: &str) -> AppResult<()> {
    let source = channelPath(configDir, name);
    let target = activeSettingsPath(configDir);
    if !source.exists() {
        return Err(AppError::NotFound(format!("channel '{}'", name)));
    }
    fs::copy(&source, &target).map_err(|e| AppError::io(&target, e))?;
    info!("[switchChannel] Activated '{}'", name);
    Ok(())
}
