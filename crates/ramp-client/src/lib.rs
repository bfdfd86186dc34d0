//! Async client for the Ramp developer API users resource.
//!
//! # Features
//!
//! - `OAuth2` client-credentials authentication with token caching, or a
//!   static bearer token
//! - User listing with cursor pagination
//! - User invitations through deferred tasks, with status polling
//! - Retries with exponential backoff for rate limits and 5xx responses
//! - Recursive response-shape checks for contract verification
//!
//! # Example
//!
//! ```no_run
//! use ramp_client::{CreateInviteRequest, ListUsersParams, RampClient, RampConfig, UserRole};
//!
//! # async fn example() -> Result<(), ramp_client::RampError> {
//! let client = RampClient::new(&RampConfig::from_env()?)?;
//!
//! let users = client.users().list_all(&ListUsersParams::default()).await?;
//! println!("{} users", users.len());
//!
//! let invite = CreateInviteRequest::new("new.hire@example.com", "New", "Hire", UserRole::BusinessUser);
//! let task = client.users().create_invite(&invite).await?;
//! let status = client.users().fetch_deferred_task_status(&task.id).await?;
//! println!("{}", status.status);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod shape;
pub mod users;

pub use auth::{RampAuth, RampCredentials};
pub use client::RampClient;
pub use config::{RampConfig, RampEnvironment};
pub use error::{RampError, RampResult};
pub use models::{
    CreateInviteRequest, DeferredTask, DeferredTaskStatus, ListUsersParams, Page, TaskStatus,
    User, UserPage, UserRole, UserStatus,
};
pub use retry::RetryPolicy;
pub use shape::{Shape, ShapeMismatch, TypeTag};
pub use users::Users;
