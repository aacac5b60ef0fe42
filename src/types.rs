/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace roles, as reported by the backend's `/role` endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Owner,
    Admin,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::User, Role::Admin, Role::Owner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    /// Default page a role lands on after login or after a role mismatch
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Owner => "/owner",
            Role::User => "/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl User {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Shallow merge, fields present in the patch win
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
    }
}

/// Partial user used by profile updates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub name: Option<String>,
}

/// Payload of the backend's "who am I" endpoint.
///
/// Every field is optional: a response without `role` is a failed validation,
/// not a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// An unknown role string is the same as no role at all.
fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn landing_paths_follow_role() {
        assert_eq!(Role::Admin.landing_path(), "/admin");
        assert_eq!(Role::Owner.landing_path(), "/owner");
        assert_eq!(Role::User.landing_path(), "/dashboard");
    }

    #[test]
    fn merge_keeps_unpatched_fields() {
        let mut user = User::new("a@b.com", Role::User);
        user.merge(UserPatch {
            name: Some("Asha".into()),
            ..Default::default()
        });
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.name.as_deref(), Some("Asha"));
    }

    #[test]
    fn identity_without_role_parses() {
        let identity: Identity = serde_json::from_value(json!({ "email": "a@b.com" })).unwrap();
        assert_eq!(identity.role, None);

        let identity: Identity = serde_json::from_value(json!({ "role": "pilot" })).unwrap();
        assert_eq!(identity.role, None);

        let identity: Identity = serde_json::from_value(json!({ "role": "owner", "name": "Ravi" })).unwrap();
        assert_eq!(identity.role, Some(Role::Owner));
        assert_eq!(identity.name.as_deref(), Some("Ravi"));
    }
}
