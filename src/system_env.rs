// Active droid key: FACTORY_API_KEY for this session, optionally persisted per user
// Persistence is per OS; platforms without a user-level store report Unsupported

use parking_lot::RwLock;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Per-user persistent environment (survives the app and new terminals)
pub trait SystemEnvStore: Send + Sync {
    fn readUserVar(&self, name: &str) -> AppResult<Option<String>>;
    fn writeUserVar(&self, name: &str, value: &str) -> AppResult<()>;
}

/// HKCU\Environment through PowerShell
pub struct WindowsEnvStore;

/// Anything that is not Windows
pub struct UnsupportedEnvStore;

fn psQuote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn runPowerShell(script: &str) -> AppResult<String> {
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-NonInteractive", "-Command", script]);
    #[cfg(target_os = "windows")]
    cmd.creation_flags(CREATE_NO_WINDOW);

    let output = cmd.output().map_err(|e| AppError::Spawn { program: "powershell".to_string(), source: e })?;
    if !output.status.success() {
        return Err(AppError::Internal(String::from_utf8_lossy(&output.stderr).trim().to_string()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

impl SystemEnvStore for WindowsEnvStore {
    fn readUserVar(&self, name: &str) -> AppResult<Option<String>> {
        let script = format!("[Environment]::GetEnvironmentVariable({}, 'User')", psQuote(name));
        let value = runPowerShell(&script)?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    fn writeUserVar(&self, name: &str, value: &str) -> AppResult<()> {
        let script = format!(
            "[Environment]::SetEnvironmentVariable({}, {}, 'User')",
            psQuote(name),
            psQuote(value)
        );
        runPowerShell(&script).map(|_| ())
    }
}

impl SystemEnvStore for UnsupportedEnvStore {
    fn readUserVar(&self, _name: &str) -> AppResult<Option<String>> {
        Err(AppError::Unsupported("user-level environment variables".to_string()))
    }

    fn writeUserVar(&self, _name: &str, _value: &str) -> AppResult<()> {
        Err(AppError::Unsupported("user-level environment variables".to_string()))
    }
}

pub fn platformEnvStore() -> Box<dyn SystemEnvStore> {
    if cfg!(target_os = "windows") {
        Box::new(WindowsEnvStore)
    } else {
        Box::new(UnsupportedEnvStore)
    }
}

/// Whether setActiveKey reached the per-user store
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    Persisted,
    Unsupported,
}

/// The process environment is only read; a key switched during this session
/// lives in `sessionKey` and reaches launched terminals through `launchEnv`
pub struct ActiveKeyStore {
    varName: String,
    sessionKey: RwLock<Option<String>>,
    system: Box<dyn SystemEnvStore>,
}

impl ActiveKeyStore {
    pub fn new(varName: impl Into<String>, system: Box<dyn SystemEnvStore>) -> Self {
        Self { varName: varName.into(), sessionKey: RwLock::new(None), system }
    }

    /// Session value, then the inherited process value, then the per-user store;
    /// empty string when unset
    pub fn getCurrentActiveKey(&self) -> String {
        if let Some(value) = self.sessionKey.read().clone() {
            return value;
        }
        if let Some(value) = std::env::var(&self.varName).ok().filter(|v| !v.is_empty()) {
            return value;
        }

        match self.system.readUserVar(&self.varName) {
            Ok(value) => value.unwrap_or_default(),
            Err(AppError::Unsupported(_)) => String::new(),
            Err(e) => {
                warn!("[getCurrentActiveKey] Failed to read user variable {}: {}", self.varName, e);
                String::new()
            }
        }
    }

    pub fn setActiveKey(&self, apiKey: &str) -> AppResult<Persistence> {
        *self.sessionKey.write() = Some(apiKey.to_string());
        debug!("[setActiveKey] Set {} for this session", self.varName);

        match self.system.writeUserVar(&self.varName, apiKey) {
            Ok(()) => {
                info!("[setActiveKey] Persisted {} for the current user", self.varName);
                Ok(Persistence::Persisted)
            }
            Err(AppError::Unsupported(what)) => {
                info!("[setActiveKey] Not persisted: {} unsupported here", what);
                Ok(Persistence::Unsupported)
            }
            Err(e) => Err(e),
        }
    }

    /// Variables for a launched terminal, so it sees a key switched in this session
    pub fn launchEnv(&self) -> Vec<(String, String)> {
        self.sessionKey
            .read()
            .clone()
            .map(|key| vec![(self.varName.clone(), key)])
            .unwrap_or_default()
    }
}
