//! Optional remote abbreviation suggestions.
//!
//! The abbreviator only sees the [`AbbreviationOracle`] trait. Any closure of the right shape
//! implements it, which is how tests script answers without touching the network.

use std::path::Path;

use crate::config::OracleConfig;

/// One suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleRequest<'a> {
    /// Normalized (lowercase, trimmed) label.
    pub label: &'a str,
    pub max_length: usize,
    /// Flavor-specific instruction text.
    pub instructions: &'a str,
}

/// Best-effort source of abbreviation suggestions.
///
/// Implementations return `None` on every failure; callers fall through to their heuristic.
pub trait AbbreviationOracle {
    fn suggest(&self, request: &OracleRequest<'_>) -> Option<String>;
}

impl<F> AbbreviationOracle for F
where
    F: Fn(&OracleRequest<'_>) -> Option<String>,
{
    fn suggest(&self, request: &OracleRequest<'_>) -> Option<String> {
        self(request)
    }
}

/// Look up the API key: environment variable first, then the `openai_api_key` entry of a TOML
/// secrets file. Absence is not an error.
pub fn resolve_api_key(env_var: &str, secrets_path: &Path) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    let raw = std::fs::read_to_string(secrets_path).ok()?;
    let secrets: toml::Table = match raw.parse() {
        Ok(secrets) => secrets,
        Err(err) => {
            log::debug!(
                "ignoring unreadable secrets file {}: {err}",
                secrets_path.display()
            );
            return None;
        }
    };
    secrets
        .get("openai_api_key")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(feature = "openai")]
pub use openai::OpenAiOracle;

#[cfg(feature = "openai")]
mod openai {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use super::{resolve_api_key, AbbreviationOracle, OracleRequest};
    use crate::config::OracleConfig;

    #[derive(Debug, Serialize)]
    struct ChatMessage<'a> {
        role: &'static str,
        content: &'a str,
    }

    #[derive(Debug, Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: Vec<ChatMessage<'a>>,
        max_tokens: u32,
        temperature: f32,
    }

    #[derive(Debug, Deserialize)]
    struct ChatResponse {
        choices: Vec<ChatChoice>,
    }

    #[derive(Debug, Deserialize)]
    struct ChatChoice {
        message: ChatReply,
    }

    #[derive(Debug, Deserialize)]
    struct ChatReply {
        content: Option<String>,
    }

    /// Chat-completions backed oracle using a blocking HTTP client with a bounded timeout.
    pub struct OpenAiOracle {
        client: reqwest::blocking::Client,
        endpoint: String,
        model: String,
        api_key: String,
    }

    impl std::fmt::Debug for OpenAiOracle {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OpenAiOracle")
                .field("endpoint", &self.endpoint)
                .field("model", &self.model)
                .finish_non_exhaustive()
        }
    }

    impl OpenAiOracle {
        pub fn new(api_key: String, config: &OracleConfig) -> Option<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|err| log::debug!("abbreviation oracle disabled: {err}"))
                .ok()?;
            Some(Self {
                client,
                endpoint: config.endpoint.clone(),
                model: config.model.clone(),
                api_key,
            })
        }

        /// Build an oracle when enabled and credentials are available, otherwise `None`.
        pub fn from_config(config: &OracleConfig) -> Option<Self> {
            if !config.enabled {
                return None;
            }
            let Some(api_key) = resolve_api_key(&config.api_key_env, &config.secrets_path) else {
                log::debug!("no abbreviation oracle credentials; using heuristics only");
                return None;
            };
            Self::new(api_key, config)
        }
    }

    impl AbbreviationOracle for OpenAiOracle {
        fn suggest(&self, request: &OracleRequest<'_>) -> Option<String> {
            let body = ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: request.instructions,
                    },
                    ChatMessage {
                        role: "user",
                        content: request.label,
                    },
                ],
                max_tokens: 10,
                temperature: 0.3,
            };

            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
            {
                Ok(response) => response,
                Err(err) => {
                    log::debug!("abbreviation oracle request failed: {err}");
                    return None;
                }
            };

            if response.status() != reqwest::StatusCode::OK {
                log::debug!("abbreviation oracle returned {}", response.status());
                return None;
            }

            let parsed: ChatResponse = match response.json() {
                Ok(parsed) => parsed,
                Err(err) => {
                    log::debug!("malformed abbreviation oracle response: {err}");
                    return None;
                }
            };

            let content = parsed.choices.into_iter().next()?.message.content?;
            let content = content.trim();
            (!content.is_empty()).then(|| content.to_string())
        }
    }
}

/// Construct the configured oracle, if any.
pub fn oracle_from_config(config: &OracleConfig) -> Option<Box<dyn AbbreviationOracle>> {
    #[cfg(feature = "openai")]
    {
        OpenAiOracle::from_config(config).map(|o| Box::new(o) as Box<dyn AbbreviationOracle>)
    }

    #[cfg(not(feature = "openai"))]
    {
        if config.enabled {
            log::debug!("built without the `openai` feature; using heuristics only");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn closures_act_as_oracles() {
        let oracle = |req: &OracleRequest<'_>| Some(format!("{}{}", req.label, req.max_length));
        let request = OracleRequest {
            label: "lobby",
            max_length: 4,
            instructions: "",
        };
        assert_eq!(oracle.suggest(&request).as_deref(), Some("lobby4"));
    }

    #[test]
    fn api_key_falls_back_to_secrets_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "other = 1\nopenai_api_key = \"sk-test\"").unwrap();

        let key = resolve_api_key("ASSETID_TEST_KEY_THAT_IS_NEVER_SET", file.path());
        assert_eq!(key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn missing_or_unparsable_secrets_mean_no_key() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("secrets.toml");
        assert_eq!(
            resolve_api_key("ASSETID_TEST_KEY_THAT_IS_NEVER_SET", &missing),
            None
        );

        std::fs::write(&missing, "openai_api_key = ").unwrap();
        assert_eq!(
            resolve_api_key("ASSETID_TEST_KEY_THAT_IS_NEVER_SET", &missing),
            None
        );
    }
}
