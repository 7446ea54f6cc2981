// Droid channel store: "<name> <apiKey>" lines in key.txt
// The whole file is rewritten on every change

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::DroidChannel;
use crate::storage::droidKeysPath;

const ACTIVE_MARKER: &str = "[active]";

/// Parse key.txt content; lines without a space separator are dropped
pub fn parseDroidChannels(content: &str) -> Vec<DroidChannel> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let line = line.strip_suffix(ACTIVE_MARKER).unwrap_or(line).trim_end();
            let (name, apiKey) = line.split_once(' ')?;
            let apiKey = apiKey.trim();
            if name.is_empty() || apiKey.is_empty() {
                return None;
            }
            Some(DroidChannel::new(name, apiKey))
        })
        .collect()
}

pub fn serializeDroidChannels(channels: &[DroidChannel]) -> String {
    channels
        .iter()
        .map(|c| format!("{} {}\n", c.name, c.apiKey))
        .collect()
}

pub fn listDroidChannels(configDir: &Path) -> AppResult<Vec<DroidChannel>> {
    let path = droidKeysPath(configDir);
    if !path.exists() {
        debug!("[listDroidChannels] {:?} does not exist", path);
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?;
    Ok(parseDroidChannels(&content))
}

fn writeDroidChannels(configDir: &Path, channels: &[DroidChannel]) -> AppResult<()> {
    fs::create_dir_all(configDir).map_err(|e| AppError::io(configDir, e))?;
    let path = droidKeysPath(configDir);
    fs::write(&path, serializeDroidChannels(channels)).map_err(|e| AppError::io(&path, e))
}

/// Create (no `oldName`) or edit the entry named `oldName`
pub fn saveDroidChannel(configDir: &Path, name: &str, apiKey: &str, oldName: Option<&str>) -> AppResult<()> {
    let mut channels = listDroidChannels(configDir)?;
    let oldName = oldName.filter(|o| !o.is_empty());

    if channels.iter().any(|c| c.name == name && Some(c.name.as_str()) != oldName) {
        return Err(AppError::DuplicateName(name.to_string()));
    }

    match oldName {
        None => {
            channels.push(DroidChannel::new(name, apiKey));
            info!("[saveDroidChannel] Created '{}'", name);
        }
        Some(old) => {
            let existing = channels
                .iter_mut()
                .find(|c| c.name == old)
                .ok_or_else(|| AppError::NotFound(format!("droid channel '{}'", old)))?;
            existing.name = name.to_string();
            existing.apiKey = apiKey.to_string();
            info!("[saveDroidChannel] Updated '{}' -> '{}'", old, name);
        }
    }

    writeDroidChannels(configDir, &channels)
}

pub fn deleteDroidChannel(configDir: &Path, name: &str) -> AppResult<()> {
    let mut channels = listDroidChannels(configDir)?;
    let before = channels.len();
    channels.retain(|c| c.name != name);
    if channels.len() == before {
        return Err(AppError::NotFound(format!("droid channel '{}'", name)));
    }
    writeDroidChannels(configDir, &channels)?;
    info!("[deleteDroidChannel] Removed '{}' ({} -> {})", name, before, channels.len());
    Ok(())
}

/// First stored channel whose key equals the current FACTORY_API_KEY
pub fn findActiveDroidChannel<'a>(channels: &'a [DroidChannel], currentKey: &str) -> Option<&'a DroidChannel> {
    if currentKey.is_empty() {
        return None;
    }
    channels.iter().find(|c| c.apiKey == currentKey)
}
