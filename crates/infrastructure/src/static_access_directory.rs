use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use openbook_application::AccessDirectory;
use openbook_core::{AppError, AppResult, Identity, SessionToken};
use openbook_domain::AccessGrants;
use serde::Deserialize;
use tracing::info;

use crate::access_payload::{AccessPayload, IdentityPayload};

#[derive(Debug, Deserialize)]
struct StaticDirectoryFile {
    #[serde(default)]
    sessions: HashMap<String, StaticSession>,
}

#[derive(Debug, Deserialize)]
struct StaticSession {
    identity: IdentityPayload,
    #[serde(default)]
    access: AccessPayload,
}

/// File-backed access directory for local development.
///
/// The file maps session tokens to the same payloads the backend serves:
/// `{ "sessions": { "<token>": { "identity": {..}, "access": {..} } } }`.
#[derive(Debug)]
pub struct StaticAccessDirectory {
    sessions: HashMap<String, StaticSession>,
}

impl StaticAccessDirectory {
    /// Parses a directory from JSON text.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let file: StaticDirectoryFile = serde_json::from_str(json).map_err(|error| {
            AppError::Validation(format!("invalid static access directory: {error}"))
        })?;

        Ok(Self {
            sessions: file.sessions,
        })
    }

    /// Loads a directory from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read static access directory '{}': {error}",
                path.display()
            ))
        })?;

        let directory = Self::from_json(json.as_str())?;
        info!(
            path = %path.display(),
            sessions = directory.sessions.len(),
            "loaded static access directory"
        );
        Ok(directory)
    }

    fn session(&self, token: &SessionToken) -> AppResult<&StaticSession> {
        self.sessions
            .get(token.expose())
            .ok_or_else(|| AppError::Unauthorized("unknown session token".to_owned()))
    }
}

#[async_trait]
impl AccessDirectory for StaticAccessDirectory {
    async fn fetch_identity(&self, token: &SessionToken) -> AppResult<Identity> {
        Ok(self.session(token)?.identity.clone().into_identity())
    }

    async fn fetch_access_grants(
        &self,
        token: &SessionToken,
        _identity: &Identity,
    ) -> AppResult<AccessGrants> {
        Ok(self.session(token)?.access.clone().into_grants())
    }
}
