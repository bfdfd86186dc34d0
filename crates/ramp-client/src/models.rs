//! Wire types for the Ramp users resource.

use crate::error::{RampError, RampResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest and largest `page_size` Ramp accepts.
pub const MIN_PAGE_SIZE: u32 = 2;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A user's role within the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    AdvisorConsoleAdmin,
    AdvisorConsoleUser,
    AuditorUser,
    BusinessAdmin,
    BusinessBookkeeper,
    BusinessOwner,
    BusinessUser,
    GuestUser,
    ItAdmin,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdvisorConsoleAdmin => "ADVISOR_CONSOLE_ADMIN",
            Self::AdvisorConsoleUser => "ADVISOR_CONSOLE_USER",
            Self::AuditorUser => "AUDITOR_USER",
            Self::BusinessAdmin => "BUSINESS_ADMIN",
            Self::BusinessBookkeeper => "BUSINESS_BOOKKEEPER",
            Self::BusinessOwner => "BUSINESS_OWNER",
            Self::BusinessUser => "BUSINESS_USER",
            Self::GuestUser => "GUEST_USER",
            Self::ItAdmin => "IT_ADMIN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = RampError;

    /// Case-insensitive; `-` is accepted in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "ADVISOR_CONSOLE_ADMIN" => Ok(Self::AdvisorConsoleAdmin),
            "ADVISOR_CONSOLE_USER" => Ok(Self::AdvisorConsoleUser),
            "AUDITOR_USER" => Ok(Self::AuditorUser),
            "BUSINESS_ADMIN" => Ok(Self::BusinessAdmin),
            "BUSINESS_BOOKKEEPER" => Ok(Self::BusinessBookkeeper),
            "BUSINESS_OWNER" => Ok(Self::BusinessOwner),
            "BUSINESS_USER" => Ok(Self::BusinessUser),
            "GUEST_USER" => Ok(Self::GuestUser),
            "IT_ADMIN" => Ok(Self::ItAdmin),
            _ => Err(RampError::Validation(format!("unknown user role '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    UserActive,
    UserInactive,
    UserOnboarding,
    UserSuspended,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UserActive => "USER_ACTIVE",
            Self::UserInactive => "USER_INACTIVE",
            Self::UserOnboarding => "USER_ONBOARDING",
            Self::UserSuspended => "USER_SUSPENDED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A user record as returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub business_id: String,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default, deserialize_with = "deserialize_custom_fields")]
    pub custom_fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Ramp encodes an empty `custom_fields` as `[]`; `null` is treated the same.
fn deserialize_custom_fields<'de, D>(
    deserializer: D,
) -> Result<serde_json::Map<String, serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(serde_json::Map::new()),
        serde_json::Value::Array(items) if items.is_empty() => Ok(serde_json::Map::new()),
        other => Err(D::Error::custom(format!(
            "custom_fields must be an object, found {other}"
        ))),
    }
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Cursor block of a paginated response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Absolute URL of the next page, `None` on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPage {
    pub data: Vec<User>,
    #[serde(default)]
    pub page: Page,
}

impl UserPage {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page.next.is_none()
    }
}

/// Query filters for `GET /users`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUsersParams {
    /// Cursor: id of the last user on the previous page.
    pub start: Option<String>,
    pub page_size: Option<u32>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub department_id: Option<String>,
    pub location_id: Option<String>,
    pub role: Option<UserRole>,
}

impl ListUsersParams {
    pub fn validate(&self) -> RampResult<()> {
        if let Some(size) = self.page_size {
            if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) {
                return Err(RampError::Validation(format!(
                    "page_size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}, got {size}"
                )));
            }
        }
        Ok(())
    }

    /// Query-string pairs for the populated filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(start) = &self.start {
            query.push(("start", start.clone()));
        }
        if let Some(size) = self.page_size {
            query.push(("page_size", size.to_string()));
        }
        if let Some(email) = &self.email {
            query.push(("email", email.clone()));
        }
        if let Some(employee_id) = &self.employee_id {
            query.push(("employee_id", employee_id.clone()));
        }
        if let Some(department_id) = &self.department_id {
            query.push(("department_id", department_id.clone()));
        }
        if let Some(location_id) = &self.location_id {
            query.push(("location_id", location_id.clone()));
        }
        if let Some(role) = self.role {
            query.push(("role", role.as_str().to_string()));
        }
        query
    }
}

/// Body of `POST /users/deferred`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateInviteRequest {
    /// Lets the API deduplicate retried submissions.
    pub idempotency_key: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_manager_id: Option<String>,
}

impl CreateInviteRequest {
    /// New invite with a fresh idempotency key.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            idempotency_key: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            department_id: None,
            location_id: None,
            direct_manager_id: None,
        }
    }

    #[must_use]
    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    #[must_use]
    pub fn with_manager(mut self, manager_id: impl Into<String>) -> Self {
        self.direct_manager_id = Some(manager_id.into());
        self
    }

    pub fn validate(&self) -> RampResult<()> {
        if self.idempotency_key.trim().is_empty() {
            return Err(RampError::Validation(
                "idempotency_key must not be empty".to_string(),
            ));
        }
        if !is_plausible_email(&self.email) {
            return Err(RampError::Validation(format!(
                "invalid email address '{}'",
                self.email
            )));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(RampError::Validation(
                "first_name and last_name must not be empty".to_string(),
            ));
        }
        if self.role == UserRole::Unknown {
            return Err(RampError::Validation("role must be set".to_string()));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}

/// Response to an accepted invite: the id of the deferred task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTask {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Started,
    InProgress,
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Whether polling can stop.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Started => "STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    #[serde(default)]
    pub acting_user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskData {
    /// Set once the invited user exists.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /users/deferred/status/{task_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTaskStatus {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub context: TaskContext,
    #[serde(default)]
    pub data: TaskData,
}
