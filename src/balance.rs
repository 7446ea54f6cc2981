// Balance query: one HTTP call, then a best-effort field lookup in the body
// The body may be JSON or text with a JSON object embedded in it

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::BalanceMethod;

const MAX_SEARCH_DEPTH: usize = 10;

/// Outermost `{...}` span in a text body
static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("embedded object pattern is valid"));

/// Send the request with a bearer token and return the raw body
pub async fn queryBalance(url: &str, method: BalanceMethod, authToken: &str) -> AppResult<String> {
    info!("[queryBalance] {} {}", method.asStr(), url);

    let client = reqwest::Client::new();
    let request = match method {
        BalanceMethod::Get => client.get(url),
        BalanceMethod::Post => client.post(url),
    };

    let response = request.bearer_auth(authToken).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!("[queryBalance] Received {} bytes", body.len());
    Ok(body)
}

/// Strict parse first, then the outermost `{...}` span
pub fn parseLenient(body: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Some(value);
    }
    let span = EMBEDDED_OBJECT.find(body)?;
    serde_json::from_str(span.as_str()).ok()
}

fn resolvePath<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(*key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Dotted path on `value`, else the first nested object/array where it resolves
///
/// Depth-first, in array-index / key-insertion order. The first hit wins.
pub fn findField<'a>(value: &'a Value, field: &str, depth: usize) -> Option<&'a Value> {
    if depth > MAX_SEARCH_DEPTH || !(value.is_object() || value.is_array()) {
        return None;
    }

    let keys: Vec<&str> = field.split('.').collect();
    if let Some(found) = resolvePath(value, &keys) {
        return Some(found);
    }

    match value {
        Value::Array(items) => items.iter().find_map(|child| findField(child, field, depth + 1)),
        Value::Object(map) => map.values().find_map(|child| findField(child, field, depth + 1)),
        _ => None,
    }
}

/// Largest float that still prints as an exact integer
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Strings raw, whole-valued floats without a trailing `.0`, everything else as JSON
pub fn displayValue(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Extract `field` from a response body, or `errorText` when it cannot be found
pub fn extractBalanceValue(body: &str, field: &str, errorText: &str) -> String {
    parseLenient(body)
        .as_ref()
        .and_then(|json| findField(json, field, 0))
        .map(displayValue)
        .unwrap_or_else(|| errorText.to_string())
}

/// Text shown for a balance: the extracted field, or the raw body when no field is set
pub fn renderBalance(body: &str, field: &str, errorText: &str) -> String {
    if field.trim().is_empty() {
        body.to_string()
    } else {
        extractBalanceValue(body, field.trim(), errorText)
    }
}

pub fn requireToken(token: Option<&str>) -> AppResult<&str> {
    token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidInput("channel has no auth token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::HeaderMap, routing::{get, post}};

    const ERR: &str = "query failed";

    #[test]
    fn test_direct_path() {
        assert_eq!(extractBalanceValue(r#"{"data":{"balance":42.5}}"#, "data.balance", ERR), "42.5");
    }

    #[test]
    fn test_recovers_embedded_object() {
        assert_eq!(extractBalanceValue("prefix {\"x\":1} suffix", "x", ERR), "1");
    }

    #[test]
    fn test_absent_field_returns_sentinel() {
        assert_eq!(extractBalanceValue(r#"{"a":{"b":1}}"#, "a.c", ERR), ERR);
        assert_eq!(extractBalanceValue("no json here", "a", ERR), ERR);
    }

    #[test]
    fn test_nested_search_first_hit_wins() {
        let body = r#"{"meta":{"ok":true},"items":[{"info":{"left":"9.90"}},{"info":{"left":"1.00"}}]}"#;
        assert_eq!(extractBalanceValue(body, "info.left", ERR), "9.90");
    }

    #[test]
    fn test_array_index_in_path() {
        assert_eq!(extractBalanceValue(r#"{"list":[{"v":3},{"v":4}]}"#, "list.1.v", ERR), "4");
    }

    #[test]
    fn test_null_counts_as_found() {
        assert_eq!(extractBalanceValue(r#"{"balance":null}"#, "balance", ERR), "null");
    }

    #[test]
    fn test_depth_limit() {
        let mut body = String::from(r#"{"target":7}"#);
        for _ in 0..12 {
            body = format!(r#"{{"n":{}}}"#, body);
        }
        assert_eq!(extractBalanceValue(&body, "target", ERR), ERR);
    }

    #[test]
    fn test_whole_floats_drop_trailing_zero() {
        assert_eq!(extractBalanceValue(r#"{"b":100.00}"#, "b", ERR), "100");
        assert_eq!(extractBalanceValue(r#"{"b":-3.0}"#, "b", ERR), "-3");
        assert_eq!(extractBalanceValue(r#"{"b":12.5}"#, "b", ERR), "12.5");
        assert_eq!(extractBalanceValue(r#"{"b":7}"#, "b", ERR), "7");
    }

    #[test]
    fn test_render_without_field_is_raw() {
        assert_eq!(renderBalance("plain 12", "", ERR), "plain 12");
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn echoAuth(headers: HeaderMap) -> String {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or("");
        format!(r#"{{"data":{{"balance":12.5,"auth":"{}"}}}}"#, auth)
    }

    #[tokio::test]
    async fn test_query_sends_bearer_and_method() {
        let app = Router::new()
            .route("/post", post(|h: HeaderMap| async move { echoAuth(h) }))
            .route("/get", get(|h: HeaderMap| async move { echoAuth(h) }));
        let base = serve(app).await;

        let body = queryBalance(&format!("{}/post", base), BalanceMethod::Post, "sk-1").await.unwrap();
        assert_eq!(extractBalanceValue(&body, "data.auth", ERR), "Bearer sk-1");
        assert_eq!(extractBalanceValue(&body, "balance", ERR), "12.5");

        let body = queryBalance(&format!("{}/get", base), BalanceMethod::Get, "sk-2").await.unwrap();
        assert_eq!(extractBalanceValue(&body, "auth", ERR), "Bearer sk-2");

        // POST-only route rejects GET with 405
        let err = queryBalance(&format!("{}/post", base), BalanceMethod::Get, "sk-3").await;
        assert!(matches!(err, Err(AppError::Http(_))));
    }
}
