// Droid channel model
// Stored as "<name> <apiKey>" lines in key.txt

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroidChannel {
    pub name: String,
    pub apiKey: String,
}

impl DroidChannel {
    pub fn new(name: impl Into<String>, apiKey: impl Into<String>) -> Self {
        Self { name: name.into(), apiKey: apiKey.into() }
    }
}
