// Channel model for the primary CLI
// One settings-<name>.json per channel, same shape as the CLI's own settings.json

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ENV_AUTH_TOKEN: &str = "ANTHROPIC_AUTH_TOKEN";
pub const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const ENV_DISABLE_TRAFFIC: &str = "CLAUDE_CODE_DISABLE_NONESSENTIAL_TRAFFIC";

/// HTTP method used by a balance query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalanceMethod {
    Get,
    #[default]
    Post,
}

impl BalanceMethod {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "" => Some(Self::default()),
            _ => None,
        }
    }

    pub fn asStr(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Per-channel balance endpoint (stored as `balanceApi`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceApi {
    pub url: String,
    #[serde(default)]
    pub method: BalanceMethod,
    #[serde(default)]
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Permissions {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Contents of a channel file (or of the active settings.json)
///
/// Keys this app does not manage are kept in `extra` / `env` so that reading
/// a file written by the CLI never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    #[serde(default)]
    pub env: Map<String, Value>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balanceApi: Option<BalanceApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alwaysThinkingEnabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Credential pair used to decide which channel is active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub authToken: Option<String>,
    pub baseUrl: String, // empty when unset
}

/// Input for saving a channel
#[derive(Debug, Clone, Default)]
pub struct ChannelDraft {
    pub authToken: String,
    pub baseUrl: Option<String>,
    pub model: Option<String>,
    pub balanceQuery: Option<BalanceApi>,
    pub oldName: Option<String>,
}

impl ChannelConfig {
    /// Build the fixed-shape record written on every save
    pub fn fromDraft(draft: &ChannelDraft) -> Self {
        let mut env = Map::new();
        env.insert(ENV_AUTH_TOKEN.to_string(), Value::String(draft.authToken.clone()));
        env.insert(ENV_DISABLE_TRAFFIC.to_string(), Value::String("1".to_string()));
        if let Some(url) = draft.baseUrl.as_deref().filter(|u| !u.is_empty()) {
            env.insert(ENV_BASE_URL.to_string(), Value::String(url.to_string()));
        }

        Self {
            env,
            permissions: Permissions::default(),
            model: draft.model.clone().filter(|m| !m.is_empty()),
            balanceApi: draft.balanceQuery.clone().filter(|b| !b.url.is_empty()),
            alwaysThinkingEnabled: Some(true),
            extra: Map::new(),
        }
    }

    pub fn authToken(&self) -> Option<&str> {
        self.env.get(ENV_AUTH_TOKEN).and_then(Value::as_str)
    }

    pub fn baseUrl(&self) -> Option<&str> {
        self.env.get(ENV_BASE_URL).and_then(Value::as_str)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            authToken: self.authToken().map(str::to_string),
            baseUrl: self.baseUrl().unwrap_or_default().to_string(),
        }
    }
}

/// A stored channel plus the file's modification time (ms since epoch)
#[derive(Debug, Clone, Serialize)]
pub struct ChannelEntry {
    #[serde(flatten)]
    pub config: ChannelConfig,
    pub mtime: i64,
}

/// A channel file that could not be read or parsed
#[derive(Debug, Clone, Serialize)]
pub struct InvalidChannel {
    pub name: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_omits_empty_optionals() {
        let config = ChannelConfig::fromDraft(&ChannelDraft {
            authToken: "sk-ant-abc".to_string(),
            baseUrl: Some(String::new()),
            ..Default::default()
        });
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["env"][ENV_AUTH_TOKEN], "sk-ant-abc");
        assert_eq!(json["env"][ENV_DISABLE_TRAFFIC], "1");
        assert!(json["env"].get(ENV_BASE_URL).is_none());
        assert!(json.get("model").is_none());
        assert!(json.get("balanceApi").is_none());
        assert_eq!(json["alwaysThinkingEnabled"], true);
        assert_eq!(json["permissions"], serde_json::json!({"allow": [], "deny": []}));
    }

    #[test]
    fn test_unknown_keys_survive_a_read() {
        let raw = r#"{"env":{"ANTHROPIC_AUTH_TOKEN":"t","MAX_TOKENS":"100"},"statusLine":{"type":"command"}}"#;
        let config: ChannelConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.authToken(), Some("t"));
        assert_eq!(config.baseUrl(), None);
        assert_eq!(config.alwaysThinkingEnabled, None);

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["env"]["MAX_TOKENS"], "100");
        assert_eq!(back["statusLine"]["type"], "command");
    }

    #[test]
    fn test_balance_method_parse() {
        assert_eq!(BalanceMethod::parse("get"), Some(BalanceMethod::Get));
        assert_eq!(BalanceMethod::parse(""), Some(BalanceMethod::Post));
        assert_eq!(BalanceMethod::parse("PUT"), None);
    }

    #[test]
    fn test_credentials_default_empty_url() {
        let config: ChannelConfig = serde_json::from_str(r#"{"env":{"ANTHROPIC_AUTH_TOKEN":"t"}}"#).unwrap();
        assert_eq!(config.credentials(), Credentials { authToken: Some("t".into()), baseUrl: String::new() });
    }
}
