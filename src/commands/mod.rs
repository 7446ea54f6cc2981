// Commands module - exports all command handlers
// Submodules must be public for Tauri's generate_handler! macro

pub mod channel;
pub mod common;
pub mod droid;
pub mod launcher;
pub mod settings;
