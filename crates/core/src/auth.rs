use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

/// Authenticated principal as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    is_super_admin: bool,
    is_active: bool,
}

impl Identity {
    /// Creates an identity from upstream account data.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        is_super_admin: bool,
        is_active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            is_super_admin,
            is_active,
        }
    }

    /// Returns the stable identity id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Returns the last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Returns "first last", falling back to the email when both are blank.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full_name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return self.email.clone();
        }

        full_name.to_owned()
    }

    /// Returns whether the identity bypasses all grant checks.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Opaque bearer token identifying one upstream session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token, returning `None` for blank values.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Returns the raw token for forwarding to the upstream service.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the hex SHA-256 digest of the token, used as the session version.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        use std::fmt::Write;

        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let result = hasher.finalize();

        result
            .iter()
            .fold(String::with_capacity(64), |mut acc, byte| {
                let _ = write!(acc, "{byte:02x}");
                acc
            })
    }
}

impl Debug for SessionToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("SessionToken(<redacted>)")
    }
}
