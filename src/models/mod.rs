// Models module for channel-switcher
// Field names are camelCase to match the on-disk JSON and the frontend

pub mod channel;
pub mod common;
pub mod config;
pub mod droid;

pub use channel::{
    BalanceApi, BalanceMethod, ChannelConfig, ChannelDraft, ChannelEntry, Credentials, InvalidChannel,
};
pub use config::{Preferences, PreferencesUpdate};
pub use droid::DroidChannel;
