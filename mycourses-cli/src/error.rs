use mycourses::{ConfigError, Error as PortalError, NetworkError};
use reqwest::StatusCode;
use thiserror::Error;

use crate::ollama::OllamaError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error("could not set up the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Ollama(#[from] OllamaError),
}

impl AppError {
    /// What the operator can do about it, one line each.
    #[must_use]
    pub fn guidance(&self) -> Vec<String> {
        match self {
            AppError::Portal(e) => portal_guidance(e),
            AppError::Http(_) => Vec::new(),
            AppError::Ollama(e) => ollama_guidance(e),
        }
    }
}

fn lines(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|&l| l.to_owned()).collect()
}

fn portal_guidance(e: &PortalError) -> Vec<String> {
    match e {
        PortalError::Config(ConfigError::FeedUrlMissing(path)) => {
            let mut out = lines(&[
                "",
                "To create this file:",
                "1. Go to MyCourses (https://mycourses.aalto.fi)",
                "2. Navigate to Calendar",
                "3. Click 'Export calendar' or find the export option",
                "4. Copy the export URL",
            ]);
            out.push(format!("5. Create a file named '{}'", path.display()));
            out.push("6. Paste the URL into that file".to_owned());
            out
        }
        PortalError::Config(ConfigError::FeedUrlEmpty(path)) => {
            vec![format!("Paste your calendar export URL into {}", path.display())]
        }
        PortalError::Config(ConfigError::InvalidFeedUrl(_)) => {
            lines(&["URL should start with http:// or https://"])
        }
        PortalError::Config(ConfigError::Unreadable { path, .. }) => {
            vec![format!("Check that {} is a readable text file", path.display())]
        }
        PortalError::Config(ConfigError::EmptyToken(key)) => {
            vec![format!("Run again and paste the {key} cookie value when asked")]
        }
        PortalError::Config(ConfigError::MissingToken(key)) => vec![format!(
            "Run again without --no-prompt to enter the {key} cookie value"
        )],
        PortalError::Network(NetworkError::Timeout) => {
            lines(&["Please check your internet connection and try again"])
        }
        PortalError::Network(NetworkError::Status(status))
            if *status == StatusCode::UNAUTHORIZED =>
        {
            lines(&[
                "Your auth token may have expired. Get a new export URL from MyCourses",
            ])
        }
        PortalError::Network(NetworkError::Status(status)) if *status == StatusCode::NOT_FOUND => {
            lines(&["Please check that the URL is correct"])
        }
        PortalError::Network(NetworkError::Status(_)) => Vec::new(),
        PortalError::Network(NetworkError::Connect(_) | NetworkError::Other(_)) => {
            lines(&["Please check your internet connection"])
        }
        PortalError::AuthFailure { purged } => {
            let mut out = lines(&[
                "The portal rejected the session cookie.",
                "Please obtain a fresh cookie and try again.",
            ]);
            if *purged {
                out.push("The invalid cookie was removed from the config file.".to_owned());
            }
            out
        }
        PortalError::Parse { debug_file, .. } => match debug_file {
            Some(path) => vec![format!("Raw ICS data saved to {} for inspection", path.display())],
            None => lines(&["Could not save the raw ICS data"]),
        },
        PortalError::Io(_) => Vec::new(),
    }
}

const EXPECTED_SECTION: &str = r#"{
  "ollama": {
    "url": "http://localhost:11434",
    "model": "gemma3"
  }
}"#;

fn ollama_guidance(e: &OllamaError) -> Vec<String> {
    match e {
        OllamaError::ConfigMissing(_) => {
            lines(&["Create the file with an 'ollama' section and try again."])
        }
        OllamaError::ConfigInvalid { .. } => lines(&[
            "Fix the JSON syntax (a trailing comma is a common issue) and try again.",
        ]),
        OllamaError::ConfigUnreadable { .. } => Vec::new(),
        OllamaError::SectionMissing => {
            let mut out = lines(&["Expected structure:"]);
            out.extend(EXPECTED_SECTION.lines().map(str::to_owned));
            out
        }
        OllamaError::KeysMissing(_) => {
            lines(&["Update the config file with the required keys and try again."])
        }
        OllamaError::InvalidValue(_) => lines(&[
            "Check the 'url' value in the config file and ensure it is a valid HTTP(S) URL.",
        ]),
        OllamaError::Connect(_) => lines(&[
            "",
            "Possible causes:",
            "   1. Ollama service is not running",
            "   2. Ollama is running on a different port or host",
            "",
            "To fix this:",
            "   - Check if Ollama is running: ollama list",
            "   - Start Ollama if needed: ollama serve",
            "   - Confirm the 'url' in the config file points to the correct Ollama endpoint",
        ]),
        OllamaError::Timeout(_) => lines(&[
            "",
            "The model may be:",
            "   - Still loading (first run can be slow)",
            "   - Too slow for this timeout setting",
            "",
            "Try:",
            "   - Running the test again (subsequent runs are faster)",
            "   - Raising the limit with --timeout",
        ]),
        OllamaError::Response { status, model, .. } if *status == StatusCode::NOT_FOUND => vec![
            String::new(),
            "To fix this, run:".to_owned(),
            format!("   ollama pull {model}"),
        ],
        OllamaError::Response { .. } | OllamaError::Other(_) => Vec::new(),
    }
}

pub type AppResult<T> = Result<T, AppError>;
