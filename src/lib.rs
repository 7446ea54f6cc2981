// Allow non-snake_case names for JSON serialization compatibility with the web frontend
#![allow(non_snake_case)]

mod balance;
mod channel_store;
mod commands;
mod droid_store;
mod error;
mod launcher;
mod models;
mod storage;
mod system_env;
mod validation;

use tracing::info;

fn initLogging() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .try_init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    initLogging();

    tauri::Builder::default()
        .setup(|app| {
            use tauri::Manager;

            let state = storage::initState()?;
            match state.configDir() {
                Ok(dir) => info!("Channel config dir: {:?}", dir),
                Err(e) => info!("Channel config dir unavailable: {}", e),
            }
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Channels
            commands::channel::getChannels,
            commands::channel::getActiveChannel,
            commands::channel::getActiveChannelName,
            commands::channel::saveChannel,
            commands::channel::deleteChannel,
            commands::channel::switchChannel,
            commands::channel::queryChannelBalance,
            // Droid channels
            commands::droid::getDroidChannels,
            commands::droid::getCurrentFactoryApiKey,
            commands::droid::switchDroidChannel,
            commands::droid::saveDroidChannel,
            commands::droid::deleteDroidChannel,
            // Launch
            commands::launcher::launchClaude,
            commands::launcher::launchDroid,
            commands::launcher::checkTerminalAvailable,
            // Preferences
            commands::settings::getPreferences,
            commands::settings::updatePreferences,
            commands::settings::getHomeDir,
            commands::settings::selectDirectory,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
