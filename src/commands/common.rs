// Common helpers for commands
// Every command answers with {success, data?, error?} instead of rejecting

use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn err(error: impl ToString) -> Self {
        Self { success: false, data: None, error: Some(error.to_string()) }
    }

    /// Log failures under the command name and flatten into the response shape
    pub fn fromResult(command: &str, result: AppResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                warn!("[{}] ERROR: {}", command, e);
                Self::err(e)
            }
        }
    }
}

/// Directory passed by the frontend, or the preference-backed fallback when empty
pub fn pickDir(explicit: Option<String>, fallback: impl FnOnce() -> AppResult<PathBuf>) -> AppResult<PathBuf> {
    match explicit.filter(|p| !p.trim().is_empty()) {
        Some(p) => Ok(PathBuf::from(p)),
        None => fallback(),
    }
}

/// Show only the edges of a secret in logs
pub fn maskSecret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
