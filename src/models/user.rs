//! User model: the typed view of a worker record or the administrator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Record, ID_FIELD};

/// Role of a logged-in user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Worker => "worker",
        }
    }

    /// Exact match only; `"Admin"` is not the admin role.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "worker" => Some(Role::Worker),
            _ => None,
        }
    }
}

/// A user as held in the worker collection, or the fixed administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// Remaining payload fields, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Read a worker record as a user.
    ///
    /// Never fails: known fields are taken when they are strings, an unrecognised role
    /// reads as a worker, and everything else stays in `extra`.
    pub fn from_record(record: &Record) -> Self {
        let mut extra = record.fields().clone();
        let id = take_string(&mut extra, ID_FIELD).unwrap_or_default();
        let worker_id = take_string(&mut extra, "workerId");
        let email = take_string(&mut extra, "email");
        let name = take_string(&mut extra, "name");
        let role = extra
            .remove("role")
            .and_then(|value| value.as_str().and_then(Role::parse))
            .unwrap_or_default();

        Self {
            id,
            worker_id,
            email,
            name,
            role,
            extra,
        }
    }

    /// The value persisted as the session identifier for this user.
    pub fn session_identifier(&self) -> String {
        match self.role {
            Role::Admin => self.email.clone().unwrap_or_default(),
            Role::Worker => self
                .worker_id
                .clone()
                .filter(|worker_id| !worker_id.is_empty())
                .unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// Move a string field out of `fields`. Other value types are left in place.
fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(_)) => match fields.remove(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_keeps_payload() {
        let record = Record::from_value(json!({
            "id": "u1",
            "workerId": "W-42",
            "name": "Samir",
            "role": "worker",
            "trade": "electrician"
        }))
        .unwrap();

        let user = User::from_record(&record);
        assert_eq!(user.id, "u1");
        assert_eq!(user.worker_id.as_deref(), Some("W-42"));
        assert_eq!(user.role, Role::Worker);
        assert_eq!(user.extra["trade"], "electrician");
    }

    #[test]
    fn test_from_record_tolerates_foreign_payload() {
        let record = Record::from_value(json!({
            "id": "u1",
            "workerId": "W-42",
            "role": "supervisor",
            "name": 7,
            "email": ["a@b"]
        }))
        .unwrap();

        let user = User::from_record(&record);
        assert_eq!(user.id, "u1");
        assert_eq!(user.worker_id.as_deref(), Some("W-42"));
        assert_eq!(user.role, Role::Worker);
        assert_eq!(user.name, None);
        assert_eq!(user.extra["name"], 7);
        assert_eq!(user.extra["email"], json!(["a@b"]));
        assert!(!user.extra.contains_key("role"));

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["name"], 7);
        assert_eq!(value["role"], "worker");
    }

    #[test]
    fn test_role_defaults_to_worker() {
        let record = Record::from_value(json!({ "id": "u2" })).unwrap();
        assert_eq!(User::from_record(&record).role, Role::Worker);
    }

    #[test]
    fn test_session_identifier_prefers_worker_id() {
        let record = Record::from_value(json!({ "id": "u1", "workerId": "W-42" })).unwrap();
        assert_eq!(User::from_record(&record).session_identifier(), "W-42");

        let record = Record::from_value(json!({ "id": "u3", "workerId": "" })).unwrap();
        assert_eq!(User::from_record(&record).session_identifier(), "u3");
    }

    #[test]
    fn test_admin_identifier_is_email() {
        let admin: User = serde_json::from_value(json!({
            "id": "admin",
            "email": "boss@example.com",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(admin.session_identifier(), "boss@example.com");
    }

    #[test]
    fn test_role_parse_is_exact() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("Admin"), None);
    }
}
