//! Local language-model connectivity check.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use mycourses::Summary;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Sent on every check; asks for JSON so a sensible answer is easy to spot.
pub const TEST_PROMPT: &str = "List 3 common elements found on an academic course website, \
                               formatted as JSON with 'name' and 'description' fields.";

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("{} not found", .0.display())]
    ConfigMissing(PathBuf),

    #[error("invalid JSON in {}: {source}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unable to read {}: {source}", .path.display())]
    ConfigUnreadable { path: PathBuf, source: io::Error },

    #[error("config is missing the 'ollama' section")]
    SectionMissing,

    #[error("config is missing required keys in the 'ollama' section: {}", .0.join(", "))]
    KeysMissing(Vec<&'static str>),

    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("connection failed to Ollama")]
    Connect(#[source] reqwest::Error),

    #[error("request timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("{message}")]
    Response {
        status: StatusCode,
        message: String,
        model: String,
    },

    #[error("unexpected error: {0}")]
    Other(#[source] reqwest::Error),
}

/// Where the model is served and which model to ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    pub url: Url,
    pub model: String,
}

impl OllamaConfig {
    /// Read the `ollama` section of the JSON config file at `path`.
    ///
    /// Unlike the credential store this is strict: a missing or broken file
    /// is an error.
    ///
    /// # Errors
    ///
    /// Any of the configuration variants of [`OllamaError`].
    pub fn load(path: &Path) -> Result<Self, OllamaError> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => OllamaError::ConfigMissing(path.to_owned()),
            _ => OllamaError::ConfigUnreadable {
                path: path.to_owned(),
                source: e,
            },
        })?;

        let config = serde_json::from_str(&contents).map_err(|e| OllamaError::ConfigInvalid {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_config(&config)
    }

    /// # Errors
    ///
    /// When the section or one of its keys is missing or unusable.
    pub fn from_config(config: &Value) -> Result<Self, OllamaError> {
        let section = config
            .get("ollama")
            .and_then(Value::as_object)
            .ok_or(OllamaError::SectionMissing)?;

        let missing = ["url", "model"]
            .into_iter()
            .filter(|key| !section.contains_key(*key))
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(OllamaError::KeysMissing(missing));
        }

        let url = section["url"]
            .as_str()
            .and_then(|s| s.parse::<Url>().ok())
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| OllamaError::InvalidValue(format!("url = {}", section["url"])))?;

        let model = section["model"]
            .as_str()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .ok_or_else(|| OllamaError::InvalidValue(format!("model = {}", section["model"])))?
            .to_owned();

        Ok(Self { url, model })
    }

    fn generate_url(&self) -> Result<Url, OllamaError> {
        let base = self.url.as_str().trim_end_matches('/');

        format!("{base}/api/generate")
            .parse()
            .map_err(|e| OllamaError::InvalidValue(format!("url: {e}")))
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Result of a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub elapsed: Duration,
    pub timeout: Duration,
    pub response: String,
}

impl CheckReport {
    #[must_use]
    pub fn within_timeout(&self) -> bool {
        self.elapsed < self.timeout
    }

    #[must_use]
    pub fn summarize(&self) -> Summary {
        let secs = self.elapsed.as_secs_f64();
        let limit = self.timeout.as_secs();
        let time = if self.within_timeout() {
            format!("{secs:.1}s (< {limit}s ✓)")
        } else {
            format!("{secs:.1}s (>= {limit}s ⚠)")
        };

        let mut summary = Summary::new("OLLAMA RESPONSE");
        summary
            .push("Response", self.response.trim())
            .push("Result", "✅ Test PASSED")
            .push("Response time", time)
            .push(
                "Response length",
                format!("{} characters", self.response.chars().count()),
            );
        summary
    }
}

fn transport_error(e: reqwest::Error, started: Instant) -> OllamaError {
    if e.is_timeout() {
        OllamaError::Timeout(started.elapsed())
    } else if e.is_connect() {
        OllamaError::Connect(e)
    } else {
        OllamaError::Other(e)
    }
}

/// Send [`TEST_PROMPT`] to the configured model once and time the answer.
///
/// # Errors
///
/// Transport failures, timeouts and error responses from the server.
#[instrument(skip(config), fields(url = %config.url, model = %config.model))]
pub async fn check(config: &OllamaConfig, timeout: Duration) -> Result<CheckReport, OllamaError> {
    let url = config.generate_url()?;
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(OllamaError::Other)?;

    let started = Instant::now();

    let res = client
        .post(url)
        .json(&GenerateRequest {
            model: &config.model,
            prompt: TEST_PROMPT,
            stream: false,
        })
        .send()
        .await
        .map_err(|e| transport_error(e, started))?;

    let status = res.status();
    debug!(?status);

    if !status.is_success() {
        let message = match res.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        return Err(OllamaError::Response {
            status,
            message,
            model: config.model.clone(),
        });
    }

    let body = res
        .json::<GenerateResponse>()
        .await
        .map_err(|e| transport_error(e, started))?;

    Ok(CheckReport {
        elapsed: started.elapsed(),
        timeout,
        response: body.response,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_section() {
        let config = OllamaConfig::from_config(&json!({
            "MoodleSession": "abc",
            "ollama": { "url": "http://localhost:11434", "model": "gemma3" }
        }))
        .unwrap();

        assert_eq!(config.url.as_str(), "http://localhost:11434/");
        assert_eq!(config.model, "gemma3");
        assert_eq!(
            config.generate_url().unwrap().as_str(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn missing_section() {
        let err = OllamaConfig::from_config(&json!({ "MoodleSession": "abc" })).unwrap_err();
        assert!(matches!(err, OllamaError::SectionMissing));

        let err = OllamaConfig::from_config(&json!({ "ollama": "gemma3" })).unwrap_err();
        assert!(matches!(err, OllamaError::SectionMissing));
    }

    #[test]
    fn lists_missing_keys() {
        let err = OllamaConfig::from_config(&json!({ "ollama": {} })).unwrap_err();
        assert!(matches!(err, OllamaError::KeysMissing(ref keys) if keys == &["url", "model"]));

        let err = OllamaConfig::from_config(&json!({ "ollama": { "url": "http://localhost:11434" } }))
            .unwrap_err();
        assert!(matches!(err, OllamaError::KeysMissing(ref keys) if keys == &["model"]));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = OllamaConfig::from_config(&json!({
            "ollama": { "url": "localhost:11434", "model": "gemma3" }
        }))
        .unwrap_err();
        assert!(matches!(err, OllamaError::InvalidValue(_)));
    }

    #[test]
    fn keeps_base_path() {
        let config = OllamaConfig::from_config(&json!({
            "ollama": { "url": "http://gpu-box:8080/ollama/", "model": "gemma3" }
        }))
        .unwrap();

        assert_eq!(
            config.generate_url().unwrap().as_str(),
            "http://gpu-box:8080/ollama/api/generate"
        );
    }

    #[test]
    fn load_distinguishes_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert!(matches!(
            OllamaConfig::load(&path),
            Err(OllamaError::ConfigMissing(_))
        ));

        fs::write(&path, r#"{"ollama": {"url": "x",}}"#).unwrap();
        assert!(matches!(
            OllamaConfig::load(&path),
            Err(OllamaError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn slow_answer_is_flagged() {
        let report = CheckReport {
            elapsed: Duration::from_secs(31),
            timeout: Duration::from_secs(30),
            response: "[]".to_owned(),
        };

        assert!(!report.within_timeout());
        assert_eq!(report.summarize().get("Response time"), Some("31.0s (>= 30s ⚠)"));
        assert_eq!(report.summarize().get("Response length"), Some("2 characters"));
    }
}
