use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    models::document::string_field,
    store::{Document, Fields},
};

pub const USERS: &str = "users";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    #[default]
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

/// Store-native timestamp: seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl StoreTimestamp {
    pub fn now() -> Self {
        Utc::now().into()
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanoseconds).single()
    }

    /// Accepts `{seconds, nanoseconds}` objects and RFC 3339 strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                let seconds = map.get("seconds")?.as_i64()?;
                let nanoseconds = map
                    .get("nanoseconds")
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
                    .min(999_999_999) as u32;
                Some(Self {
                    seconds,
                    nanoseconds,
                })
            }
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).into()),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        json!({ "seconds": self.seconds, "nanoseconds": self.nanoseconds })
    }
}

impl From<DateTime<Utc>> for StoreTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(rename = "createdAt")]
    pub created_at: Option<StoreTimestamp>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<StoreTimestamp>,
}

impl User {
    /// Older records carry `"active"` in the role slot; that reads as a
    /// regular user whose status is active.
    pub fn from_document(doc: &Document) -> Self {
        let data = &doc.data;
        let raw_role = string_field(data, "role");
        let role = match raw_role.as_str() {
            "admin" => Role::Admin,
            _ => Role::User,
        };
        let status = match data.get("status").and_then(Value::as_str) {
            Some("active") => UserStatus::Active,
            Some(_) => UserStatus::Inactive,
            None if raw_role == "active" => UserStatus::Active,
            None => UserStatus::Inactive,
        };

        Self {
            id: doc.id.clone(),
            name: string_field(data, "name"),
            email: string_field(data, "email"),
            role,
            status,
            created_at: data.get("createdAt").and_then(StoreTimestamp::from_value),
            updated_at: data.get("updatedAt").and_then(StoreTimestamp::from_value),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields written when a profile record is created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
}

impl NewUser {
    pub fn to_fields(&self, now: StoreTimestamp) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), json!(self.name));
        fields.insert("email".into(), json!(self.email));
        fields.insert("role".into(), json!(self.role.as_str()));
        fields.insert("status".into(), json!(self.status.as_str()));
        fields.insert("createdAt".into(), now.to_value());
        fields.insert("updatedAt".into(), now.to_value());
        fields
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserRequest {
    pub fn to_fields(&self, now: StoreTimestamp) -> Fields {
        let mut fields = Fields::new();
        if let Some(ref name) = self.name {
            fields.insert("name".into(), json!(name));
        }
        if let Some(ref email) = self.email {
            fields.insert("email".into(), json!(email));
        }
        if let Some(role) = self.role {
            fields.insert("role".into(), json!(role.as_str()));
        }
        if let Some(status) = self.status {
            fields.insert("status".into(), json!(status.as_str()));
        }
        fields.insert("updatedAt".into(), now.to_value());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_doc(value: Value) -> Document {
        Document::new("u1", value.as_object().cloned().unwrap())
    }

    #[test]
    fn legacy_active_role_reads_as_active_user() {
        let user = User::from_document(&user_doc(json!({"role": "active"})));
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn explicit_status_wins_over_role() {
        let user = User::from_document(&user_doc(json!({"role": "admin", "status": "active"})));
        assert!(user.is_admin());
        assert_eq!(user.status, UserStatus::Active);

        let user = User::from_document(&user_doc(json!({"role": "user"})));
        assert_eq!(user.status, UserStatus::Inactive);
    }

    #[test]
    fn timestamps_accept_both_encodings() {
        let user = User::from_document(&user_doc(json!({
            "createdAt": {"seconds": 1_700_000_000, "nanoseconds": 5},
            "updatedAt": "2024-03-01T10:00:00Z",
        })));
        assert_eq!(user.created_at.unwrap().seconds, 1_700_000_000);
        assert_eq!(
            user.updated_at.unwrap().to_datetime().unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
    }
}
