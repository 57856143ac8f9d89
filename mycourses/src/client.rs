use std::time::Duration;

use reqwest::{header::COOKIE, StatusCode, Url};
use tracing::{debug, instrument, trace, warn};

use crate::{
    credentials::{CredentialStore, Session},
    Error, NetworkError, Result,
};

/// A wrapper around [`reqwest::Client`] that identifies as a regular browser
/// and gives up on requests after a fixed timeout.
#[derive(Debug, Clone)]
pub struct Client(reqwest::Client);

impl Client {
    /// Intialize a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying [`reqwest::Client`] initialization fails.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self(client))
    }

    /// Fetch a portal page with the session cookie attached.
    ///
    /// A 401, or ending up on a URL containing `login_marker`, means the
    /// token is no longer valid: it is purged from `store` and
    /// [`Error::AuthFailure`] is returned. Nothing is retried.
    ///
    /// # Errors
    ///
    /// [`Error::AuthFailure`] as above, [`Error::Network`] for transport
    /// failures and other non-2xx statuses.
    #[instrument(skip(self, session, store), fields(url = %url))]
    pub async fn fetch(
        &self,
        url: &Url,
        session: &Session,
        store: &CredentialStore,
        login_marker: &str,
    ) -> Result<String> {
        trace!("GET {url}");

        let res = self
            .0
            .get(url.clone())
            .header(COOKIE, session.cookie_header())
            .send()
            .await?;

        trace!(status = ?res.status(), final_url = %res.url());

        match classify(res.status(), res.url(), login_marker) {
            Outcome::Success => Ok(res.text().await?),
            Outcome::AuthFailure => {
                let purged = store.purge(session.key()).unwrap_or_else(|e| {
                    warn!("could not remove rejected token from {}: {e}", store.path().display());
                    false
                });
                debug!(purged, "session rejected");
                Err(Error::AuthFailure { purged })
            }
            Outcome::HttpError(status) => Err(NetworkError::Status(status).into()),
        }
    }

    /// Fetch a document that needs no session, such as a calendar export
    /// whose token is part of the URL.
    ///
    /// # Errors
    ///
    /// [`Error::Network`] for transport failures and non-2xx statuses.
    #[instrument(level = "trace", skip(self), fields(url = %url))]
    pub async fn fetch_feed(&self, url: &Url) -> Result<String> {
        let res = self.0.get(url.clone()).send().await?;

        trace!(status = ?res.status());

        Ok(res.error_for_status()?.text().await?)
    }
}

/// How a portal response should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The body is the requested document.
    Success,
    /// The session token was rejected.
    AuthFailure,
    /// Any other non-2xx status.
    HttpError(StatusCode),
}

/// Classify a response by its status and the URL it finally came from.
#[must_use]
pub fn classify(status: StatusCode, final_url: &Url, login_marker: &str) -> Outcome {
    if status == StatusCode::UNAUTHORIZED || is_login_page(final_url, login_marker) {
        Outcome::AuthFailure
    } else if status.is_success() {
        Outcome::Success
    } else {
        Outcome::HttpError(status)
    }
}

fn is_login_page(url: &Url, marker: &str) -> bool {
    !marker.is_empty()
        && url
            .as_str()
            .to_lowercase()
            .contains(&marker.to_lowercase())
}

/// User agent used by the client 🥸
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
