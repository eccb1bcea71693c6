use std::path::Path;

use log::{debug, warn};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::prize::{default_prizes, Prize};

/// Errors from the backend prize store. Authorization failures are kept
/// distinct from transport failures so the UI can word them differently.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no active session")]
    NoSession,
    #[error("insufficient permission")]
    Forbidden,
    #[error("backend rejected the request: {0}")]
    Backend(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Session state as reported by `GET /api/check_auth`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthStatus {
    pub is_admin: bool,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(default)]
    url: String,
}

/// Loads and saves the prize set against the community-site backend.
///
/// Every call is a single request/response with no retry. Load degrades to
/// the built-in defaults rather than failing; save requires a session and
/// submits the full set with overwrite semantics.
pub struct PrizeStore {
    client: Client,
    base_url: String,
    session_cookie: Option<String>,
}

impl PrizeStore {
    pub fn new(base_url: impl Into<String>, session_cookie: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            session_cookie,
        }
    }

    pub fn has_session(&self) -> bool {
        self.session_cookie.is_some()
    }

    fn with_session(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => builder.header(reqwest::header::COOKIE, cookie.clone()),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn check_status(status: StatusCode) -> Result<(), StoreError> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(StoreError::Forbidden)
        } else if !status.is_success() {
            Err(StoreError::Backend(status.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn check_auth(&self) -> Result<AuthStatus, StoreError> {
        let response = self
            .with_session(self.client.get(self.url("/api/check_auth")))
            .send()?;
        Self::check_status(response.status())?;
        Ok(response.json()?)
    }

    /// Fetch the user's prize set, falling back to the built-in defaults on
    /// any failure or when no session exists. Never fails: a missing backend
    /// only degrades the wheel, it does not block it.
    pub fn load(&self) -> Vec<Prize> {
        if !self.has_session() {
            warn!("no session, using the default prize set");
            return default_prizes();
        }
        match self.fetch_prizes() {
            Ok(prizes) if !prizes.is_empty() => {
                debug!("loaded {} prizes from the backend", prizes.len());
                prizes
            }
            Ok(_) => {
                warn!("backend returned an empty prize set, using defaults");
                default_prizes()
            }
            Err(err) => {
                warn!("failed to load prizes ({err}), using defaults");
                default_prizes()
            }
        }
    }

    fn fetch_prizes(&self) -> Result<Vec<Prize>, StoreError> {
        let response = self
            .with_session(self.client.get(self.url("/api/user/prizes")))
            .send()?;
        Self::check_status(response.status())?;
        Ok(response.json()?)
    }

    /// Persist the full prize set (overwrite semantics). Requires a session.
    pub fn save(&self, prizes: &[Prize]) -> Result<(), StoreError> {
        if !self.has_session() {
            return Err(StoreError::NoSession);
        }
        let response = self
            .with_session(self.client.post(self.url("/api/user/prizes")))
            .json(prizes)
            .send()?;
        Self::check_status(response.status())
    }

    /// Upload an image for a prize, returning the URL assigned by the
    /// backend.
    pub fn upload_image(&self, path: &Path) -> Result<String, StoreError> {
        if !self.has_session() {
            return Err(StoreError::NoSession);
        }
        let form = multipart::Form::new().file("file", path)?;
        let response = self
            .with_session(self.client.post(self.url("/api/upload")))
            .multipart(form)
            .send()?;
        Self::check_status(response.status())?;
        let body: UploadResponse = response.json()?;
        if body.success {
            Ok(body.url)
        } else {
            Err(StoreError::Backend("upload rejected".to_string()))
        }
    }
}
