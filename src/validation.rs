// Input checks run by commands before anything touches the disk

use reqwest::Url;

use crate::error::{AppError, AppResult};
use crate::models::BalanceMethod;

pub const MAX_CHANNEL_NAME_LEN: usize = 50;

fn invalid(msg: impl Into<String>) -> AppError {
    AppError::InvalidInput(msg.into())
}

/// Names become part of a filename or a key.txt line
fn rejectPathChars(name: &str) -> AppResult<()> {
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(invalid("name cannot contain path separators"));
    }
    Ok(())
}

pub fn validateChannelName(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(invalid("channel name is required"));
    }
    if name.chars().count() > MAX_CHANNEL_NAME_LEN {
        return Err(invalid(format!("channel name cannot exceed {} characters", MAX_CHANNEL_NAME_LEN)));
    }
    rejectPathChars(name)
}

pub fn validateToken(token: &str) -> AppResult<()> {
    if token.trim().is_empty() {
        return Err(invalid("auth token is required"));
    }
    Ok(())
}

/// Empty is allowed (the URL is optional)
pub fn validateUrl(url: &str) -> AppResult<()> {
    if url.trim().is_empty() {
        return Ok(());
    }
    Url::parse(url.trim()).map(|_| ()).map_err(|e| invalid(format!("invalid URL '{}': {}", url, e)))
}

/// A balance URL needs a field path and a known method
pub fn validateBalanceQuery(url: &str, method: &str, field: &str) -> AppResult<Option<BalanceMethod>> {
    if url.trim().is_empty() {
        return Ok(None);
    }
    validateUrl(url)?;
    if field.trim().is_empty() {
        return Err(invalid("balance field is required when a balance URL is set"));
    }
    BalanceMethod::parse(method)
        .map(Some)
        .ok_or_else(|| invalid(format!("unsupported balance method '{}'", method)))
}

pub fn validateDroidName(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(invalid("droid channel name is required"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("droid channel name cannot contain spaces"));
    }
    rejectPathChars(name)
}

pub fn validateDroidKey(apiKey: &str) -> AppResult<()> {
    if apiKey.trim().is_empty() {
        return Err(invalid("API key is required"));
    }
    if apiKey.contains(['\n', '\r']) {
        return Err(invalid("API key cannot contain line breaks"));
    }
    Ok(())
}
