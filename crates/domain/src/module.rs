use std::fmt::{Display, Formatter};

use openbook_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Stable module identifier such as `aportes` or `users`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleCode(String);

impl ModuleCode {
    /// Creates a validated module code.
    ///
    /// Codes are lowercase ASCII letters, digits, `-` and `_`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::Validation(
                "module code must not be empty".to_owned(),
            ));
        }

        let valid = value
            .chars()
            .all(|character| matches!(character, 'a'..='z' | '0'..='9' | '-' | '_'));
        if !valid {
            return Err(AppError::Validation(format!(
                "module code '{value}' may only contain lowercase letters, digits, '-' and '_'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ModuleCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModuleCode> for String {
    fn from(value: ModuleCode) -> Self {
        value.0
    }
}

impl Display for ModuleCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Action a module declares, e.g. `create` with label "Crear".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAction {
    code: NonEmptyString,
    label: NonEmptyString,
}

impl ModuleAction {
    /// Creates a validated module action.
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> AppResult<Self> {
        let code = NonEmptyString::new(code)?;
        if code.as_str().contains(':') || code.as_str().contains(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "action code '{}' must not contain ':' or whitespace",
                code.as_str()
            )));
        }

        Ok(Self {
            code,
            label: NonEmptyString::new(label)?,
        })
    }

    /// Returns the action code.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }
}

/// Named functional area of the application, independently grantable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    code: ModuleCode,
    label: NonEmptyString,
    navigation_path: NonEmptyString,
    entity_name: NonEmptyString,
    navigation_order: i32,
    actions: Vec<ModuleAction>,
}

impl Module {
    /// Creates a validated module definition.
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        navigation_path: impl Into<String>,
        entity_name: impl Into<String>,
        navigation_order: i32,
        actions: Vec<ModuleAction>,
    ) -> AppResult<Self> {
        let code = ModuleCode::new(code)?;

        if navigation_order < 0 {
            return Err(AppError::Validation(format!(
                "navigation_order for module '{code}' must be greater than or equal to zero"
            )));
        }

        let navigation_path = NonEmptyString::new(navigation_path)?;
        if !navigation_path.as_str().starts_with('/') {
            return Err(AppError::Validation(format!(
                "navigation path for module '{code}' must start with '/'"
            )));
        }

        for (index, action) in actions.iter().enumerate() {
            if actions[..index]
                .iter()
                .any(|previous| previous.code() == action.code())
            {
                return Err(AppError::Validation(format!(
                    "module '{code}' declares action '{}' more than once",
                    action.code()
                )));
            }
        }

        Ok(Self {
            code,
            label: NonEmptyString::new(label)?,
            navigation_path,
            entity_name: NonEmptyString::new(entity_name)?,
            navigation_order,
            actions,
        })
    }

    /// Returns the stable module code.
    #[must_use]
    pub fn code(&self) -> &ModuleCode {
        &self.code
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the navigation path of the module list page.
    #[must_use]
    pub fn navigation_path(&self) -> &str {
        self.navigation_path.as_str()
    }

    /// Returns the backend entity name the module manages.
    #[must_use]
    pub fn entity_name(&self) -> &str {
        self.entity_name.as_str()
    }

    /// Returns navigation ordering value.
    #[must_use]
    pub fn navigation_order(&self) -> i32 {
        self.navigation_order
    }

    /// Returns declared actions.
    #[must_use]
    pub fn actions(&self) -> &[ModuleAction] {
        &self.actions
    }
}
