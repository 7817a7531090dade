//! Gemini implementation of the code-fix capability

use crate::config::AnalysisConfig;
use autopatch_core::{BugReport, CodeFixer, FixError, FixResult};
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;

/// Fallback environment variable for the API key
const FALLBACK_API_KEY_ENV: &str = "API_KEY";

const SYSTEM_INSTRUCTION: &str = "You are an expert debugger. Analyze the code and the error. \
Return a JSON object with two keys: fixedCode (the full corrected code string, maintaining \
original indentation where possible) and explanation (a short summary of what you fixed). \
Do not include markdown code blocks in the fixedCode string, just the raw code.";

/// Gemini `generateContent` client
pub struct GeminiFixer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiFixer {
    /// Create a client, reading the API key from the configured environment variable
    pub fn new(config: &AnalysisConfig) -> Result<Self, FixError> {
        let api_key = resolve_api_key(&config.api_key_env, |name| std::env::var(name).ok())?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(
        config: &AnalysisConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, FixError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FixError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl CodeFixer for GeminiFixer {
    fn fix(&self, report: &BugReport) -> Result<FixResult, FixError> {
        tracing::info!(model = %self.model, file = %report.file_name, "Requesting fix");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(report))
            .send()
            .map_err(|e| FixError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| FixError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(FixError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

/// Look up the API key in `env_name`, then in the fallback variable
fn resolve_api_key(
    env_name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, FixError> {
    [env_name, FALLBACK_API_KEY_ENV]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            FixError::MissingApiKey(format!("{env_name} or {FALLBACK_API_KEY_ENV}"))
        })
}

/// User prompt sent alongside the system instruction
pub fn prompt(report: &BugReport) -> String {
    format!(
        "File Code:\n{}\n\nError Log:\n{}\n",
        report.original_code, report.error_log
    )
}

fn request_body(report: &BugReport) -> Value {
    json!({
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_INSTRUCTION }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt(report) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "fixedCode": {
                        "type": "STRING",
                        "description": "The complete fixed source code."
                    },
                    "explanation": {
                        "type": "STRING",
                        "description": "A concise explanation of the bug and the fix."
                    }
                },
                "required": ["fixedCode", "explanation"]
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extract the fix from a raw `generateContent` response body
fn parse_response(body: &str) -> Result<FixResult, FixError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let mut result = FixResult::from_json(strip_code_fence(&text))?;
    result.fixed_code = strip_code_fence(&result.fixed_code).to_string();
    Ok(result)
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*```[\w+#.-]*[ \t]*\r?\n(.*?)```\s*\z").expect("valid regex")
    })
}

/// Remove a markdown code fence wrapping the whole text, if any.
/// The newline ending the last line inside the fence is kept.
fn strip_code_fence(text: &str) -> &str {
    fence_regex()
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> BugReport {
        BugReport {
            file_name: "Main.java".into(),
            original_code: "int x = 1 / 0;\n".into(),
            error_log: "ArithmeticException".into(),
        }
    }

    #[test]
    fn test_prompt_layout() {
        assert_eq!(
            prompt(&report()),
            "File Code:\nint x = 1 / 0;\n\n\nError Log:\nArithmeticException\n"
        );
    }

    #[test]
    fn test_request_body_requires_both_keys() {
        let body = request_body(&report());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["fixedCode", "explanation"])
        );
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("ArithmeticException"));
    }

    #[test]
    fn test_parse_response() {
        let inner = json!({"fixedCode": "int x = 1;\n", "explanation": "Avoid division by zero."});
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": inner.to_string() }], "role": "model" },
                "finishReason": "STOP"
            }]
        });

        let result = parse_response(&body.to_string()).unwrap();
        assert_eq!(result.fixed_code, "int x = 1;\n");
        assert_eq!(result.explanation, "Avoid division by zero.");
    }

    #[test]
    fn test_parse_response_without_candidates() {
        let err = parse_response(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, FixError::EmptyResponse));
    }

    #[test]
    fn test_parse_response_not_json() {
        assert!(matches!(
            parse_response("<html>"),
            Err(FixError::Malformed(_))
        ));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```java\nint x;\n```"), "int x;\n");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```\n"), "{\"a\":1}\n");
        assert_eq!(strip_code_fence("```\r\nint x;\r\n```"), "int x;\r\n");
        assert_eq!(strip_code_fence("```js\nlet a = 1;```"), "let a = 1;");
        assert_eq!(strip_code_fence("int x;\n"), "int x;\n");
        assert_eq!(strip_code_fence("a ``` b"), "a ``` b");
    }

    #[test]
    fn test_fenced_fixed_code_is_unwrapped() {
        let inner = json!({"fixedCode": "```python\nprint(1)\n```", "explanation": "ok"});
        let body = json!({"candidates": [{"content": {"parts": [{"text": inner.to_string()}]}}]});

        let result = parse_response(&body.to_string()).unwrap();
        assert_eq!(result.fixed_code, "print(1)\n");
    }

    #[test]
    fn test_fenced_fix_keeps_final_newline_in_diff() {
        let inner = json!({"fixedCode": "```rust\nfn main() {}\n```", "explanation": "ok"});
        let body = json!({"candidates": [{"content": {"parts": [{"text": inner.to_string()}]}}]});

        let result = parse_response(&body.to_string()).unwrap();
        assert_eq!(result.fixed_code, "fn main() {}\n");
        assert!(!result.diff("fn main() {}\n").has_changes());
    }

    #[test]
    fn test_missing_api_key_names_both_variables() {
        let err = resolve_api_key("GEMINI_API_KEY", |_| None).unwrap_err();
        assert!(matches!(err, FixError::MissingApiKey(_)));
        assert_eq!(
            err.to_string(),
            "Missing API key: set GEMINI_API_KEY or API_KEY"
        );
    }

    #[test]
    fn test_api_key_falls_back() {
        let key = resolve_api_key("GEMINI_API_KEY", |name| match name {
            "GEMINI_API_KEY" => Some("  ".into()),
            "API_KEY" => Some("secret".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(key, "secret");
    }

    #[test]
    fn test_url() {
        let config = AnalysisConfig {
            endpoint: "http://localhost:9000/v1beta/".into(),
            ..AnalysisConfig::default()
        };
        let fixer = GeminiFixer::with_api_key(&config, "k").unwrap().with_model("m");
        assert_eq!(fixer.url(), "http://localhost:9000/v1beta/models/m:generateContent");
    }
}
