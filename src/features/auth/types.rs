//! Request and response types for auth-related API calls. Credentials and
//! tokens are wrapped in `SecretString` so `Debug` output never carries them.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::{fmt, str::FromStr};

/// Closed set of platform roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Trainer,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Trainer => "TRAINER",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse for operator input. Records coming from storage or
/// the network are matched exactly through serde.
impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "TRAINER" => Ok(Self::Trainer),
            "USER" => Ok(Self::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Canonical (flat) user record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub role: Role,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `name` is optional display data; a non-string value reads as absent.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(name)) => Ok(Some(name)),
        _ => Ok(None),
    }
}

impl UserRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            name: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Normalizes the nested `{user: {...}}` shape and keeps the record only
    /// when it is structurally valid. Anything else is treated as absent.
    #[must_use]
    pub fn from_value(candidate: Value) -> Option<Self> {
        let flat = normalize_user(candidate);
        if !super::validator::is_structurally_valid_user(&flat) {
            return None;
        }
        serde_json::from_value(flat).ok()
    }

    /// Parses a record serialized in storage.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(Self::from_value)
    }

    /// Shallow-merges `partial` into this record. Returns `None` when the merge
    /// would break the record's structural validity.
    #[must_use]
    pub fn merged(&self, partial: &Map<String, Value>) -> Option<Self> {
        let Ok(Value::Object(mut current)) = serde_json::to_value(self) else {
            return None;
        };
        for (key, value) in partial {
            current.insert(key.clone(), value.clone());
        }
        Self::from_value(Value::Object(current))
    }

    #[must_use]
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.role == Role::Admin || allowed.contains(&self.role)
    }
}

/// Unwraps the nested `{user: {...}}` form once; any other value passes through.
#[must_use]
pub fn normalize_user(candidate: Value) -> Value {
    match candidate {
        Value::Object(mut object) if object.get("user").is_some_and(Value::is_object) => {
            object.remove("user").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Login credentials: a phone number or email plus the password.
#[derive(Debug)]
pub struct Credentials {
    pub identifier: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.identifier.trim().is_empty() && !self.password.expose_secret().is_empty()
    }

    pub(crate) fn to_body(&self) -> Value {
        json!({
            "identifier": self.identifier.trim(),
            "password": self.password.expose_secret(),
        })
    }
}

/// Registration data for a new learner account.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub identifier: String,
    pub email: Option<String>,
    pub password: SecretString,
}

impl Registration {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        identifier: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            email: None,
            password: SecretString::from(password.into()),
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub(crate) fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.identifier.trim().is_empty()
            && !self.password.expose_secret().is_empty()
    }

    pub(crate) fn has_valid_email(&self) -> bool {
        self.email.as_deref().map_or(true, valid_email)
    }

    pub(crate) fn to_body(&self) -> Value {
        let mut body = json!({
            "name": self.name.trim(),
            "identifier": self.identifier.trim(),
            "password": self.password.expose_secret(),
        });
        if let (Some(email), Value::Object(object)) = (&self.email, &mut body) {
            object.insert("email".to_string(), Value::String(email.trim().to_string()));
        }
        body
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email.trim()))
}

/// Response envelope shared by every API endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Server-provided rejection text, if any.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// Successful login/register payload after normalization.
#[derive(Debug)]
pub struct AuthPayload {
    pub user: UserRecord,
    pub token: SecretString,
    pub refresh_token: Option<SecretString>,
}

impl AuthPayload {
    /// Extracts `{user, token, refreshToken?}` from an envelope's `data`.
    #[must_use]
    pub fn from_data(data: Value) -> Option<Self> {
        let Value::Object(mut object) = data else {
            return None;
        };
        let token = take_string(&mut object, &["token", "accessToken", "access_token"])?;
        let refresh_token = take_string(&mut object, &["refreshToken", "refresh_token"]);
        let user = UserRecord::from_value(object.remove("user")?)?;

        Some(Self {
            user,
            token: SecretString::from(token),
            refresh_token: refresh_token.map(SecretString::from),
        })
    }
}

fn take_string(object: &mut Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match object.remove(*name) {
        Some(Value::String(value)) if !value.is_empty() => Some(value),
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Trainer).unwrap(), "\"TRAINER\"");
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    }

    #[test]
    fn non_string_name_reads_as_absent() {
        let user = UserRecord::from_value(json!({"id": "u1", "role": "USER", "name": 42})).unwrap();
        assert_eq!(user, UserRecord::new("u1", Role::User));

        let user = UserRecord::from_json(r#"{"id":"u2","role":"ADMIN","name":null}"#).unwrap();
        assert_eq!(user.name, None);
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn user_record_serializes_flat_without_empty_fields() {
        let user = UserRecord::new("u1", Role::User);
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({"id": "u1", "role": "USER"})
        );
    }

    #[test]
    fn user_record_keeps_extra_profile_fields() {
        let user = UserRecord::from_value(json!({
            "id": "u1",
            "role": "USER",
            "name": "Aline",
            "level": "B1",
            "streak": 4
        }))
        .unwrap();
        assert_eq!(user.name.as_deref(), Some("Aline"));
        assert_eq!(user.extra.get("level"), Some(&json!("B1")));
        assert_eq!(user.extra.get("streak"), Some(&json!(4)));
    }

    #[test]
    fn normalize_user_unwraps_nested_shape_once() {
        let nested = json!({"user": {"id": "1", "role": "USER"}});
        assert_eq!(normalize_user(nested), json!({"id": "1", "role": "USER"}));

        let flat = json!({"id": "1", "role": "USER"});
        assert_eq!(normalize_user(flat.clone()), flat);

        let scalar_user = json!({"id": "1", "role": "USER", "user": "alias"});
        assert_eq!(normalize_user(scalar_user.clone()), scalar_user);
    }

    #[test]
    fn merged_rejects_breaking_updates() {
        let user = UserRecord::new("u1", Role::User);
        let mut partial = Map::new();
        partial.insert("name".to_string(), json!("Jean"));
        let merged = user.merged(&partial).unwrap();
        assert_eq!(merged.name.as_deref(), Some("Jean"));
        assert_eq!(merged.id, "u1");

        let mut bad = Map::new();
        bad.insert("role".to_string(), json!("OWNER"));
        assert!(user.merged(&bad).is_none());
    }

    #[test]
    fn auth_payload_accepts_refresh_token_aliases() {
        let payload = AuthPayload::from_data(json!({
            "user": {"id": "u1", "role": "USER"},
            "token": "t1",
            "refreshToken": "r1"
        }))
        .unwrap();
        assert_eq!(payload.user, UserRecord::new("u1", Role::User));
        assert_eq!(payload.token.expose_secret(), "t1");
        assert_eq!(
            payload.refresh_token.as_ref().map(|token| token.expose_secret()),
            Some("r1")
        );
    }

    #[test]
    fn auth_payload_requires_token_and_valid_user() {
        assert!(AuthPayload::from_data(json!({"user": {"id": "u1", "role": "USER"}})).is_none());
        assert!(AuthPayload::from_data(json!({"user": {"id": "u1"}, "token": "t1"})).is_none());
        assert!(AuthPayload::from_data(json!({"token": "t1"})).is_none());
        assert!(AuthPayload::from_data(json!("t1")).is_none());
    }

    #[test]
    fn envelope_prefers_error_over_message() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(json!({"success": false, "error": "bad creds", "message": "x"}))
                .unwrap();
        assert_eq!(envelope.rejection_message(), Some("bad creds"));

        let blank: ApiEnvelope<Value> =
            serde_json::from_value(json!({"success": false, "error": "  "})).unwrap();
        assert_eq!(blank.rejection_message(), None);
    }

    #[test]
    fn registration_validates_email_format() {
        let registration = Registration::new("Aline", "0780000000", "secret");
        assert!(registration.has_valid_email());
        assert!(registration
            .with_email("aline@example.rw")
            .has_valid_email());
        assert!(!Registration::new("Aline", "0780000000", "secret")
            .with_email("not-an-email")
            .has_valid_email());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = Credentials::new("0780000000", "hunter2");
        assert!(!format!("{credentials:?}").contains("hunter2"));
        assert!(credentials.is_complete());
        assert!(!Credentials::new("  ", "x").is_complete());
    }
}
