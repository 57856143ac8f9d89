//! Session-token persistence.
//!
//! Tokens live in a local JSON object next to other optional configuration
//! keys. The store never caches: every operation reads the file again, so the
//! file is the only state that outlives a run.

use std::{
    ffi::OsString,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{ConfigError, Result};

/// The configuration mapping held in the credentials file.
pub type Mapping = Map<String, Value>;

/// Operator input, injected so runs can be scripted.
pub trait Prompt {
    /// Show `instructions`, then read a single answer to `question`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    fn ask(&mut self, instructions: &str, question: &str) -> io::Result<String>;
}

/// How to obtain a token when the store has none.
pub enum Population<'p> {
    /// Only use what is already in the file.
    LoadFromFile,
    /// Ask the operator and persist the answer.
    PromptOperator(&'p mut dyn Prompt),
}

impl fmt::Debug for Population<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFromFile => f.write_str("LoadFromFile"),
            Self::PromptOperator(_) => f.write_str("PromptOperator"),
        }
    }
}

/// Where a session token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Read from the credentials file.
    Stored,
    /// Entered by the operator during this run (and saved).
    Prompted,
}

/// A session token ready to be sent to the portal.
#[derive(Debug)]
pub struct Session {
    key: String,
    token: SecretString,
    origin: Origin,
}

impl Session {
    /// A session for the cookie named `key`.
    pub fn new(key: impl Into<String>, token: SecretString, origin: Origin) -> Self {
        Self {
            key: key.into(),
            token,
            origin,
        }
    }

    /// Name of the cookie, which is also the key in the store.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Where the token came from.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub(crate) fn cookie_header(&self) -> String {
        format!("{}={}", self.key, self.token.expose_secret())
    }
}

/// A local key-value file holding at most one token per key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// A store backed by the file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping.
    ///
    /// A missing, unreadable or malformed file reads as an empty mapping.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    #[must_use]
    pub fn load(&self) -> Mapping {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no credentials file");
                return Mapping::new();
            }
            Err(e) => {
                warn!("{} could not be read: {e}", self.path.display());
                return Mapping::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(Value::Object(mapping)) => mapping,
            Ok(_) => {
                warn!("{} is not a JSON object", self.path.display());
                Mapping::new()
            }
            Err(e) => {
                warn!("{} exists but is not valid JSON: {e}", self.path.display());
                Mapping::new()
            }
        }
    }

    /// Replace the file with `mapping`.
    ///
    /// The new contents go to a sibling file first and are renamed over the
    /// old one, so readers see either the old or the new mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, mapping: &Mapping) -> io::Result<()> {
        let mut json = serde_json::to_string_pretty(mapping)?;
        json.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(keys = mapping.len(), "saved credentials");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("credentials"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// The token stored under `key`, if it is a non-empty string.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<SecretString> {
        match self.load().get(key) {
            Some(Value::String(token)) if !token.trim().is_empty() => {
                Some(SecretString::new(token.trim().to_owned()))
            }
            _ => None,
        }
    }

    /// Store `token` under `key`, keeping every other key.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn insert(&self, key: &str, token: &SecretString) -> io::Result<()> {
        let mut mapping = self.load();
        mapping.insert(key.to_owned(), Value::String(token.expose_secret().clone()));
        self.save(&mapping)
    }

    /// Drop the token stored under `key`. Returns whether there was one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten.
    #[instrument(skip(self))]
    pub fn purge(&self, key: &str) -> io::Result<bool> {
        let mut mapping = self.load();

        if mapping.remove(key).is_none() {
            return Ok(false);
        }

        self.save(&mapping)?;
        debug!("purged token");
        Ok(true)
    }

    /// The stored token for `key`, or one requested from the operator and
    /// persisted before returning.
    ///
    /// # Errors
    ///
    /// Fails if the answer is empty or cannot be read, or the file cannot
    /// be written.
    pub fn get_or_prompt(&self, key: &str, prompt: &mut dyn Prompt) -> Result<SecretString> {
        Ok(self.session(key, Population::PromptOperator(prompt))?.token)
    }

    /// A session for `key`, populated according to `population` when the
    /// store has no token.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::MissingToken`] when nothing is stored and
    /// prompting is not allowed, and as [`CredentialStore::get_or_prompt`]
    /// otherwise.
    #[instrument(skip(self))]
    pub fn session(&self, key: &str, population: Population<'_>) -> Result<Session> {
        if let Some(token) = self.get(key) {
            debug!("using stored token");
            return Ok(Session::new(key, token, Origin::Stored));
        }

        let prompt = match population {
            Population::LoadFromFile => return Err(ConfigError::MissingToken(key.to_owned()).into()),
            Population::PromptOperator(prompt) => prompt,
        };

        let answer = prompt.ask(&instructions(key), &format!("Enter your {key} cookie value"))?;
        let answer = answer.trim();

        if answer.is_empty() {
            return Err(ConfigError::EmptyToken(key.to_owned()).into());
        }

        let token = SecretString::new(answer.to_owned());
        self.insert(key, &token)?;

        Ok(Session::new(key, token, Origin::Prompted))
    }
}

fn instructions(key: &str) -> String {
    let rule = "=".repeat(60);
    format!(
        "\n{rule}\n\
         {key} cookie not found in the credentials file\n\
         {rule}\n\n\
         To get your session cookie:\n\
         1. Log into MyCourses in your browser (complete 2FA)\n\
         2. Press F12 to open DevTools\n\
         3. Go to Application/Storage -> Cookies -> the MyCourses site\n\
         4. Find and copy the '{key}' cookie value\n\n\
         {rule}\n"
    )
}
