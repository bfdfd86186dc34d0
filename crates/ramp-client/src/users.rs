//! The users resource: listing, invitations, and deferred-task status.

use crate::client::RampClient;
use crate::error::{RampError, RampResult};
use crate::models::{
    CreateInviteRequest, DeferredTask, DeferredTaskStatus, ListUsersParams, User, UserPage,
};
use crate::shape::{Shape, TypeTag};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

const USERS_PATH: &str = "users";
const DEFERRED_PATH: &str = "users/deferred";

/// Expected shape of each element of `data` in a `GET /users` response.
#[must_use]
pub fn user_list_item_shape() -> Shape {
    Shape::object([
        ("id", Shape::string()),
        ("email", Shape::string()),
        ("first_name", Shape::string()),
        ("last_name", Shape::string()),
        ("role", Shape::string()),
        ("status", Shape::string()),
        ("business_id", Shape::string()),
        ("is_manager", Shape::tag(TypeTag::Bool)),
        ("custom_fields", Shape::tag(TypeTag::Array)),
        ("department_id", Shape::nullable(TypeTag::String)),
        ("location_id", Shape::nullable(TypeTag::String)),
        ("entity_id", Shape::nullable(TypeTag::String)),
        ("manager_id", Shape::nullable(TypeTag::String)),
        ("employee_id", Shape::nullable(TypeTag::String)),
        ("phone", Shape::nullable(TypeTag::String)),
    ])
}

/// Expected envelope of a `GET /users` response (items checked separately).
#[must_use]
pub fn user_list_shape() -> Shape {
    Shape::object([
        ("page", Shape::object([("next", Shape::nullable(TypeTag::String))])),
        ("data", Shape::tag(TypeTag::Array)),
    ])
}

/// Expected shape of `GET /users/deferred/status/{task_id}`.
#[must_use]
pub fn deferred_task_status_shape() -> Shape {
    Shape::object([
        (
            "context",
            Shape::object([("acting_user_id", Shape::nullable(TypeTag::String))]),
        ),
        (
            "data",
            Shape::object([("user_id", Shape::nullable(TypeTag::String))]),
        ),
        ("id", Shape::string()),
        ("status", Shape::string()),
    ])
}

/// Handle for `/users` endpoints, borrowed from a [`RampClient`].
#[derive(Debug, Clone, Copy)]
pub struct Users<'a> {
    client: &'a RampClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a RampClient) -> Self {
        Self { client }
    }

    /// Fetch one page of users (`GET /users`).
    #[instrument(skip(self))]
    pub async fn list(&self, params: &ListUsersParams) -> RampResult<UserPage> {
        params.validate()?;
        self.client.get_json(USERS_PATH, &params.to_query()).await
    }

    /// Fetch the page behind a `page.next` link.
    pub async fn list_page(&self, next_url: &str) -> RampResult<UserPage> {
        self.client.get_json(next_url, &[]).await
    }

    /// Fetch every user matching `params`, following `page.next` to the end.
    #[instrument(skip(self))]
    pub async fn list_all(&self, params: &ListUsersParams) -> RampResult<Vec<User>> {
        let mut page = self.list(params).await?;
        let mut users = Vec::new();
        let mut pages = 1usize;

        loop {
            users.append(&mut page.data);
            let Some(next) = page.page.next.take() else {
                break;
            };
            debug!("Fetching users page {}: {}", pages + 1, next);
            page = self.list_page(&next).await?;
            pages += 1;
        }

        debug!(pages, users = users.len(), "Fetched all users");
        Ok(users)
    }

    /// Untyped `GET /users` body.
    pub async fn list_raw(&self, params: &ListUsersParams) -> RampResult<Value> {
        params.validate()?;
        self.client.get_json(USERS_PATH, &params.to_query()).await
    }

    /// Submit an invite (`POST /users/deferred`). The user is created
    /// asynchronously; the returned task id is what
    /// [`fetch_deferred_task_status`](Self::fetch_deferred_task_status) polls.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn create_invite(&self, request: &CreateInviteRequest) -> RampResult<DeferredTask> {
        request.validate()?;
        let task: DeferredTask = self.client.post_json(DEFERRED_PATH, request).await?;
        info!(task_id = %task.id, "User invite accepted");
        Ok(task)
    }

    /// Status of a deferred user task (`GET /users/deferred/status/{task_id}`).
    pub async fn fetch_deferred_task_status(
        &self,
        task_id: &str,
    ) -> RampResult<DeferredTaskStatus> {
        let path = deferred_status_path(task_id)?;
        self.client.get_json(&path, &[]).await
    }

    /// Untyped deferred task status body.
    pub async fn fetch_deferred_task_status_raw(&self, task_id: &str) -> RampResult<Value> {
        let path = deferred_status_path(task_id)?;
        self.client.get_json(&path, &[]).await
    }

    /// Poll a deferred task until it succeeds or fails.
    ///
    /// Returns `TaskPending` if the task is still running after `max_polls` checks.
    #[instrument(skip(self))]
    pub async fn wait_for_deferred_task(
        &self,
        task_id: &str,
        interval: Duration,
        max_polls: u32,
    ) -> RampResult<DeferredTaskStatus> {
        for poll in 1..=max_polls {
            let status = self.fetch_deferred_task_status(task_id).await?;
            debug!(poll, status = %status.status, "Deferred task status");
            if status.status.is_terminal() {
                return Ok(status);
            }
            if poll < max_polls {
                tokio::time::sleep(interval).await;
            }
        }
        Err(RampError::TaskPending {
            task_id: task_id.to_string(),
            polls: max_polls,
        })
    }

    /// Fetch a page of users and check the raw body against the documented
    /// contract. Returns the number of users checked.
    pub async fn check_list_contract(&self, params: &ListUsersParams) -> RampResult<usize> {
        let body = self.list_raw(params).await?;
        check_user_list(&body)
    }

    /// Fetch a deferred task's status and check the raw body against the
    /// documented contract.
    pub async fn check_deferred_task_contract(&self, task_id: &str) -> RampResult<()> {
        let body = self.fetch_deferred_task_status_raw(task_id).await?;
        deferred_task_status_shape().validate(&body)?;
        Ok(())
    }
}

/// Validate a raw `GET /users` body: envelope first, then each item.
pub fn check_user_list(body: &Value) -> RampResult<usize> {
    user_list_shape().validate(body)?;
    let items = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| RampError::ParseError("`data` is not a list".to_string()))?;

    let item_shape = user_list_item_shape();
    for (index, item) in items.iter().enumerate() {
        item_shape.validate(item).map_err(|mut mismatch| {
            mismatch.path = if mismatch.path.is_empty() {
                format!("data.{index}")
            } else {
                format!("data.{index}.{}", mismatch.path)
            };
            mismatch
        })?;
    }
    Ok(items.len())
}

fn deferred_status_path(task_id: &str) -> RampResult<String> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(RampError::Validation("task_id must not be empty".to_string()));
    }
    // The id becomes a single path segment: no separators, query, fragment,
    // escapes or dot segments.
    if task_id.chars().any(|c| !is_task_id_char(c)) || task_id.chars().all(|c| c == '.') {
        return Err(RampError::Validation(format!(
            "task_id contains characters not allowed in a path segment: {task_id:?}"
        )));
    }
    Ok(format!("{DEFERRED_PATH}/status/{task_id}"))
}

fn is_task_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | ':')
}
