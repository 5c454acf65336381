use async_trait::async_trait;
use openbook_application::AccessDirectory;
use openbook_core::{AppError, AppResult, Identity, SessionToken};
use openbook_domain::AccessGrants;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::access_payload::{AccessPayload, IdentityPayload};

const IDENTITY_PATH: &str = "auth/me";
const ACCESS_PATH: &str = "auth/me/access";

/// HTTP adapter for the OpenBook backend's session endpoints.
///
/// Timeouts are configured on the injected client.
#[derive(Clone)]
pub struct HttpAccessDirectory {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpAccessDirectory {
    /// Creates a directory rooted at the backend API base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(path.as_str());
        }

        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("invalid backend endpoint '{path}': {error}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &SessionToken,
        path: &str,
    ) -> AppResult<T> {
        let url = self.endpoint(path)?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|error| {
                AppError::UpstreamUnavailable(format!("request to '{path}' failed: {error}"))
            })?;

        check_status(response.status(), path)?;

        response.json::<T>().await.map_err(|error| {
            AppError::UpstreamUnavailable(format!("malformed response from '{path}': {error}"))
        })
    }
}

/// Maps upstream statuses onto the session error contract.
fn check_status(status: StatusCode, path: &str) -> AppResult<()> {
    if status.is_success() {
        return Ok(());
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(AppError::Unauthorized(format!(
            "backend rejected session on '{path}' with status {status}"
        )));
    }

    Err(AppError::UpstreamUnavailable(format!(
        "backend answered '{path}' with status {status}"
    )))
}

#[async_trait]
impl AccessDirectory for HttpAccessDirectory {
    async fn fetch_identity(&self, token: &SessionToken) -> AppResult<Identity> {
        let payload: IdentityPayload = self.get_json(token, IDENTITY_PATH).await?;
        Ok(payload.into_identity())
    }

    async fn fetch_access_grants(
        &self,
        token: &SessionToken,
        identity: &Identity,
    ) -> AppResult<AccessGrants> {
        let payload: AccessPayload = self.get_json(token, ACCESS_PATH).await?;
        debug!(identity_id = identity.id(), "fetched access grants from backend");
        Ok(payload.into_grants())
    }
}
