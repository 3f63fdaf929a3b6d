//! Provider catalog and per-family payload/response handling (spec
//! §4.10 step 4/6). Each configured provider names a family; the family
//! decides the request shape, auth header, and response/delta parsing.
//! New provider families are added here, not by branching on name.

use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    OpenAi,
    Azure,
    Anthropic,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub family: ProviderFamily,
    pub base_url: String,
    pub api_key: String,
    pub default_model: String,
}

#[derive(Debug, Default, Clone)]
pub struct ProviderCatalog {
    providers: HashMap<String, ProviderConfig>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, config: ProviderConfig) {
        self.providers.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }
}

pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// Merges `options`' top-level keys into `body`, without overwriting
/// keys the builder itself set (spec §4.10 step 4: `{model, messages,
/// stream, ...options}` — the fixed fields win).
fn merge_options(mut body: Value, options: Option<&Value>) -> Value {
    if let Some(Value::Object(extra)) = options {
        if let Value::Object(map) = &mut body {
            for (key, value) in extra {
                map.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
    body
}

/// Builds the provider-specific request. `model` falls back to the
/// provider's `default_model` when the caller doesn't name one.
pub fn build_payload(
    config: &ProviderConfig,
    model: Option<&str>,
    messages: &[(String, String)],
    stream: bool,
    options: Option<&Value>,
) -> OutboundRequest {
    let model = model.unwrap_or(&config.default_model);
    let base = config.base_url.trim_end_matches('/');

    match config.family {
        ProviderFamily::OpenAi | ProviderFamily::Azure => OutboundRequest {
            url: format!("{base}/v1/chat/completions"),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", config.api_key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: merge_options(
                json!({
                    "model": model,
                    "messages": messages.iter().map(|(role, content)| json!({"role": role, "content": content})).collect::<Vec<_>>(),
                    "stream": stream,
                }),
                options,
            ),
        },
        ProviderFamily::Anthropic => {
            let (system, rest): (Vec<_>, Vec<_>) =
                messages.iter().partition(|(role, _)| role == "system");
            let system_prompt = system.first().map(|(_, content)| content.clone());
            let mut body = json!({
                "model": model,
                "max_tokens": 4096,
                "messages": rest.iter().map(|(role, content)| json!({"role": role, "content": content})).collect::<Vec<_>>(),
                "stream": stream,
            });
            if let Some(system_prompt) = system_prompt {
                body["system"] = json!(system_prompt);
            }
            OutboundRequest {
                url: format!("{base}/v1/messages"),
                headers: vec![
                    ("x-api-key".to_string(), config.api_key.clone()),
                    ("anthropic-version".to_string(), "2023-06-01".to_string()),
                    ("Content-Type".to_string(), "application/json".to_string()),
                ],
                body: merge_options(body, options),
            }
        }
        ProviderFamily::Fallback => OutboundRequest {
            url: base.to_string(),
            headers: vec![
                ("Authorization".to_string(), format!("Bearer {}", config.api_key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: merge_options(
                json!({
                    "model": model,
                    "messages": messages.iter().map(|(role, content)| json!({"role": role, "content": content})).collect::<Vec<_>>(),
                    "stream": stream,
                }),
                options,
            ),
        },
    }
}

/// Extracts the assistant reply from a non-streaming JSON response.
pub fn parse_response_body(family: ProviderFamily, body: &Value) -> Option<String> {
    match family {
        ProviderFamily::OpenAi | ProviderFamily::Azure | ProviderFamily::Fallback => body
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
            .map(|s| s.to_string()),
        ProviderFamily::Anthropic => body
            .get("content")?
            .get(0)?
            .get("text")?
            .as_str()
            .map(|s| s.to_string()),
    }
}

/// Extracts the incremental delta text from one decoded SSE `data: {...}`
/// JSON payload. Returns `None` for frames that carry no text delta
/// (e.g. Anthropic's `message_start`/`message_stop` events).
pub fn parse_sse_delta(family: ProviderFamily, frame: &Value) -> Option<String> {
    match family {
        ProviderFamily::OpenAi | ProviderFamily::Azure | ProviderFamily::Fallback => frame
            .get("choices")?
            .get(0)?
            .get("delta")?
            .get("content")?
            .as_str()
            .map(|s| s.to_string()),
        ProviderFamily::Anthropic => {
            if frame.get("type")?.as_str()? != "content_block_delta" {
                return None;
            }
            frame
                .get("delta")?
                .get("text")?
                .as_str()
                .map(|s| s.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_config() -> ProviderConfig {
        ProviderConfig {
            family: ProviderFamily::OpenAi,
            base_url: "https://api.openai.com".to_string(),
            api_key: "sk-test".to_string(),
            default_model: "gpt-4o-mini".to_string(),
        }
    }

    #[test]
    fn openai_payload_targets_chat_completions() {
        let config = openai_config();
        let req = build_payload(&config, None, &[("user".to_string(), "hi".to_string())], false, None);
        assert_eq!(req.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(req.body["model"], "gpt-4o-mini");
    }

    #[test]
    fn anthropic_payload_uses_system_field_and_x_api_key() {
        let config = ProviderConfig {
            family: ProviderFamily::Anthropic,
            base_url: "https://api.anthropic.com".to_string(),
            api_key: "ant-test".to_string(),
            default_model: "claude-3-5-sonnet".to_string(),
        };
        let messages = vec![
            ("system".to_string(), "be terse".to_string()),
            ("user".to_string(), "hi".to_string()),
        ];
        let req = build_payload(&config, None, &messages, false, None);
        assert_eq!(req.url, "https://api.anthropic.com/v1/messages");
        assert_eq!(req.body["system"], "be terse");
        assert_eq!(req.body["messages"].as_array().unwrap().len(), 1);
        assert!(req.headers.iter().any(|(k, _)| k == "x-api-key"));
    }

    #[test]
    fn parses_openai_sse_delta() {
        let frame = json!({"choices": [{"delta": {"content": "hel"}}]});
        assert_eq!(
            parse_sse_delta(ProviderFamily::OpenAi, &frame),
            Some("hel".to_string())
        );
    }

    #[test]
    fn parses_anthropic_sse_delta() {
        let frame = json!({"type": "content_block_delta", "delta": {"text": "lo"}});
        assert_eq!(
            parse_sse_delta(ProviderFamily::Anthropic, &frame),
            Some("lo".to_string())
        );
    }

    #[test]
    fn anthropic_message_start_frame_has_no_delta() {
        let frame = json!({"type": "message_start"});
        assert_eq!(parse_sse_delta(ProviderFamily::Anthropic, &frame), None);
    }

    #[test]
    fn options_are_spread_into_the_body_without_overriding_fixed_fields() {
        let config = openai_config();
        let options = json!({"temperature": 0.2, "model": "should-not-win"});
        let req = build_payload(
            &config,
            None,
            &[("user".to_string(), "hi".to_string())],
            false,
            Some(&options),
        );
        assert_eq!(req.body["temperature"], 0.2);
        assert_eq!(req.body["model"], "gpt-4o-mini");
    }
}
