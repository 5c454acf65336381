use std::fmt::{Display, Formatter};
use std::str::FromStr;

use openbook_core::{AppError, AppResult, CopropiedadId};
use serde::{Deserialize, Serialize};

use crate::ModuleCode;

/// Fine-grained capability identified as `<module>:<action>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode {
    module: ModuleCode,
    action: String,
}

impl PermissionCode {
    /// Builds a permission code from its parts.
    pub fn new(module: ModuleCode, action: impl Into<String>) -> AppResult<Self> {
        let action = action.into();
        if action.is_empty() || action.contains(':') || action.contains(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "invalid action '{action}' for permission on module '{module}'"
            )));
        }

        Ok(Self { module, action })
    }

    /// Returns the module part.
    #[must_use]
    pub fn module(&self) -> &ModuleCode {
        &self.module
    }

    /// Returns the action part.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }
}

impl FromStr for PermissionCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((module, action)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "permission code '{value}' must have the form '<module>:<action>'"
            )));
        };

        Self::new(ModuleCode::new(module)?, action)
    }
}

impl TryFrom<String> for PermissionCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.to_string()
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.module, self.action)
    }
}

/// Breadth of a permission, totally ordered `Own < Copropiedad < All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    /// Limited to the grantee's own records.
    Own,
    /// Limited to one condominium.
    Copropiedad,
    /// Unrestricted.
    All,
}

impl ScopeLevel {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Copropiedad => "copropiedad",
            Self::All => "all",
        }
    }
}

impl FromStr for ScopeLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "own" => Ok(Self::Own),
            "copropiedad" => Ok(Self::Copropiedad),
            "all" => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown permission scope '{value}'"
            ))),
        }
    }
}

/// Scope attached to a single permission grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "scope_id", rename_all = "snake_case")]
pub enum PermissionScope {
    /// Grantee's own records.
    Own,
    /// Records of one copropiedad.
    Copropiedad(CopropiedadId),
    /// Every record.
    All,
}

impl PermissionScope {
    /// Builds a scope from its transport parts.
    ///
    /// A `copropiedad` scope requires a scope id; other scopes ignore it.
    pub fn from_parts(scope: &str, scope_id: Option<&str>) -> AppResult<Self> {
        match ScopeLevel::from_str(scope)? {
            ScopeLevel::Own => Ok(Self::Own),
            ScopeLevel::All => Ok(Self::All),
            ScopeLevel::Copropiedad => {
                let scope_id = scope_id.ok_or_else(|| {
                    AppError::Validation("copropiedad scope requires a scope id".to_owned())
                })?;
                Ok(Self::Copropiedad(CopropiedadId::new(scope_id)?))
            }
        }
    }

    /// Returns the ordered level of this scope.
    #[must_use]
    pub fn level(&self) -> ScopeLevel {
        match self {
            Self::Own => ScopeLevel::Own,
            Self::Copropiedad(_) => ScopeLevel::Copropiedad,
            Self::All => ScopeLevel::All,
        }
    }

    /// Returns the copropiedad id for copropiedad-scoped grants.
    #[must_use]
    pub fn copropiedad_id(&self) -> Option<&CopropiedadId> {
        match self {
            Self::Copropiedad(id) => Some(id),
            Self::Own | Self::All => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{PermissionCode, PermissionScope, ScopeLevel};

    #[test]
    fn permission_code_roundtrips_through_display() {
        let parsed = PermissionCode::from_str("aportes:create");
        assert_eq!(
            parsed.map(|code| code.to_string()).ok().as_deref(),
            Some("aportes:create")
        );
    }

    #[test]
    fn permission_code_requires_both_parts() {
        assert!(PermissionCode::from_str("aportes").is_err());
        assert!(PermissionCode::from_str("aportes:").is_err());
        assert!(PermissionCode::from_str(":read").is_err());
        assert!(PermissionCode::from_str("aportes:read:all").is_err());
    }

    #[test]
    fn scope_levels_are_ordered_from_own_to_all() {
        assert!(ScopeLevel::Own < ScopeLevel::Copropiedad);
        assert!(ScopeLevel::Copropiedad < ScopeLevel::All);
    }

    #[test]
    fn copropiedad_scope_without_id_is_rejected() {
        assert!(PermissionScope::from_parts("copropiedad", None).is_err());
        assert!(PermissionScope::from_parts("copropiedad", Some("  ")).is_err());
    }

    #[test]
    fn copropiedad_scope_keeps_its_id() {
        let scope = PermissionScope::from_parts("copropiedad", Some("C1"));
        assert_eq!(
            scope
                .ok()
                .and_then(|value| value.copropiedad_id().map(|id| id.to_string())),
            Some("C1".to_owned())
        );
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(PermissionScope::from_parts("tenant", None).is_err());
    }

    #[test]
    fn permission_code_decodes_from_json_string() {
        let code = serde_json::from_str::<PermissionCode>("\"goals:update\"");
        assert_eq!(code.ok().map(|value| value.action().to_owned()).as_deref(), Some("update"));
    }
}
