//! Pure checks over untrusted user records. Nothing here touches storage or
//! the network.

use super::{
    policy::paths,
    types::{normalize_user, Role},
};
use serde_json::Value;

/// True iff `candidate` is an object with a non-empty string `id` and a `role`
/// from the closed role set.
#[must_use]
pub fn is_structurally_valid_user(candidate: &Value) -> bool {
    let Some(object) = candidate.as_object() else {
        return false;
    };

    let has_id = object
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.trim().is_empty());

    has_id && role_of(candidate).is_some()
}

/// Role-gate check over a raw record in either the flat or nested shape.
/// `ADMIN` is authorized for every role-gated view.
#[must_use]
pub fn has_role(candidate: &Value, allowed: &[Role]) -> bool {
    let flat = normalize_user(candidate.clone());
    if !is_structurally_valid_user(&flat) {
        return false;
    }
    role_of(&flat).is_some_and(|role| role == Role::Admin || allowed.contains(&role))
}

/// Landing page for a role. Unknown or missing roles land on the learner dashboard.
#[must_use]
pub fn default_landing_path(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Admin) => paths::ADMIN_DASHBOARD,
        Some(Role::Trainer) => paths::TRAINER_DASHBOARD,
        Some(Role::User) | None => paths::USER_DASHBOARD,
    }
}

fn role_of(candidate: &Value) -> Option<Role> {
    candidate
        .get("role")
        .cloned()
        .and_then(|role| serde_json::from_value::<Role>(role).ok())
}
