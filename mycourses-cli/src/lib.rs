use std::{path::PathBuf, time::Duration};

use chrono_tz::Tz;
use mycourses::credentials::CredentialStore;
use reqwest::Url;

pub mod commands;
pub mod error;
pub mod ollama;
pub mod prompt;

#[derive(Debug, clap::Parser)]
#[clap(name = "mycourses", version, about = "Small tools for the MyCourses portal")]
pub struct Opt {
    #[clap(flatten)]
    pub settings: Settings,

    #[clap(subcommand)]
    pub command: Command,
}

/// Everything a run needs to know, parsed once at startup.
#[derive(Debug, Clone, clap::Args)]
pub struct Settings {
    /// JSON file holding the session cookie and other configuration.
    #[clap(long, env = "MYCOURSES_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// File containing the calendar export URL.
    #[clap(
        long,
        env = "MYCOURSES_FEED_URL_FILE",
        default_value = "calendar_feed_url.txt"
    )]
    pub feed_url_file: PathBuf,

    /// Where an unparseable calendar feed is saved.
    #[clap(long, env = "MYCOURSES_DEBUG_FILE", default_value = "debug_calendar.ics")]
    pub debug_file: PathBuf,

    /// Course page fetched by `scrape`.
    #[clap(
        long,
        env = "MYCOURSES_COURSE_URL",
        default_value = "https://mycourses.aalto.fi/course/view.php?id=47384"
    )]
    pub course_url: Url,

    /// Name of the session cookie, also its key in the config file.
    #[clap(long, env = "MYCOURSES_COOKIE_NAME", default_value = "MoodleSession")]
    pub cookie_name: String,

    /// Landing on a URL containing this means the session was rejected.
    #[clap(long, env = "MYCOURSES_LOGIN_MARKER", default_value = "login")]
    pub login_marker: String,

    /// Portal request timeout in seconds.
    #[clap(long, env = "MYCOURSES_TIMEOUT", default_value = "10")]
    pub timeout: u64,

    /// Time zone event times are shown in.
    #[clap(long, env = "MYCOURSES_TIMEZONE", default_value = "Europe/Helsinki")]
    pub timezone: Tz,
}

impl Settings {
    /// The portal request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// The credential store backed by the config file.
    #[must_use]
    pub fn store(&self) -> CredentialStore {
        CredentialStore::new(self.config.clone())
    }
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Fetch the calendar export feed and list its events.
    Calendar,

    /// Fetch the course page with the stored session cookie.
    Scrape {
        /// Fail instead of asking when no cookie is stored.
        #[clap(long)]
        no_prompt: bool,
    },

    /// Check that the local Ollama instance answers.
    Ollama {
        /// Seconds to wait for the model.
        #[clap(long, env = "MYCOURSES_OLLAMA_TIMEOUT", default_value = "30")]
        timeout: u64,
    },
}
