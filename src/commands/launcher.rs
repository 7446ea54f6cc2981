// Launch commands: open the configured terminal running claude or droid

use tauri::State;
use tracing::info;

use crate::error::AppResult;
use crate::launcher::{self, CliTarget, TerminalKind};
use crate::storage::{AppState, StateHandle};
use super::common::{CommandResult, pickDir};

fn launchWith(state: &AppState, terminal: Option<String>, terminalDir: Option<String>, target: CliTarget) -> AppResult<()> {
    let terminal = terminal.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| state.terminal());
    let dir = pickDir(terminalDir, || state.terminalDir())?;
    info!("[launch{:?}] terminal: {}, dir: {:?}", target, terminal, dir);
    launcher::launch(&TerminalKind::parse(&terminal), &dir, target, &state.activeKey.launchEnv())
}

#[tauri::command]
pub fn launchClaude(state: State<'_, StateHandle>, terminal: Option<String>, terminalDir: Option<String>) -> CommandResult<()> {
    CommandResult::fromResult("launchClaude", launchWith(&state, terminal, terminalDir, CliTarget::Claude))
}

#[tauri::command]
pub fn launchDroid(state: State<'_, StateHandle>, terminal: Option<String>, terminalDir: Option<String>) -> CommandResult<()> {
    CommandResult::fromResult("launchDroid", launchWith(&state, terminal, terminalDir, CliTarget::Droid))
}

#[tauri::command]
pub fn checkTerminalAvailable(terminal: String) -> CommandResult<bool> {
    let available = launcher::isTerminalAvailable(&TerminalKind::parse(&terminal));
    info!("[checkTerminalAvailable] {}: {}", terminal, available);
    CommandResult::ok(available)
}
