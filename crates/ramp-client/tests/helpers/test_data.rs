//! Test data generators for Ramp client integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use uuid::Uuid;

/// A user record with every documented field populated.
pub fn user_json(id: &str, email: &str) -> Value {
    json!({
        "id": id,
        "employee_id": format!("EMP-{id}"),
        "email": email,
        "first_name": "Test",
        "last_name": "User",
        "role": "BUSINESS_USER",
        "status": "USER_ACTIVE",
        "business_id": "biz-0001",
        "is_manager": false,
        "custom_fields": { "cost_center": "CC-100" },
        "department_id": "dep-0001",
        "location_id": "loc-0001",
        "entity_id": "ent-0001",
        "manager_id": null,
        "phone": "+15555550100"
    })
}

/// A user record with the optional fields set to null.
pub fn sparse_user_json(id: &str, email: &str) -> Value {
    let mut user = user_json(id, email);
    for key in [
        "employee_id",
        "department_id",
        "location_id",
        "entity_id",
        "manager_id",
        "phone",
    ] {
        user[key] = Value::Null;
    }
    user
}

/// Generate `count` users with unique ids.
pub fn generate_users(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| user_json(&Uuid::new_v4().to_string(), &format!("user{i}@ramp.com")))
        .collect()
}

/// Wrap users in the `GET /users` envelope.
pub fn user_page_json(users: Vec<Value>, next: Option<&str>) -> Value {
    json!({
        "data": users,
        "page": { "next": next }
    })
}

/// A deferred task status body.
pub fn task_status_json(task_id: &str, status: &str, user_id: Option<&str>) -> Value {
    json!({
        "id": task_id,
        "status": status,
        "context": { "acting_user_id": "usr-admin-0001" },
        "data": { "user_id": user_id }
    })
}

/// A unique `@ramp.com` address for invites.
pub fn unique_email() -> String {
    format!("test.{}@ramp.com", Uuid::new_v4().simple())
}
