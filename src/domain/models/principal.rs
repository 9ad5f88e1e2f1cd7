use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use super::UnknownVariant;

/// The single authorization axis of a principal. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tenant,
    Landlord,
    PropertyManager,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tenant => "tenant",
            Role::Landlord => "landlord",
            Role::PropertyManager => "property_manager",
            Role::Agent => "agent",
            Role::Admin => "admin",
        }
    }

    /// Roles allowed to own a property and manage what sits beneath it.
    pub fn manages_properties(&self) -> bool {
        matches!(self, Role::Landlord | Role::PropertyManager | Role::Admin)
    }

    /// Admin accounts are only ever seeded from configuration.
    pub fn is_self_registrable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenant" => Ok(Role::Tenant),
            "landlord" => Ok(Role::Landlord),
            "property_manager" => Ok(Role::PropertyManager),
            "agent" => Ok(Role::Agent),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewPrincipalParams {
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: Role,
}

impl Principal {
    pub fn new(params: NewPrincipalParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: params.email,
            username: params.username,
            phone_number: params.phone_number,
            first_name: params.first_name,
            last_name: params.last_name,
            password_hash: params.password_hash,
            role: params.role,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Names the first unique field this principal would collide on.
    pub fn collides_with(&self, existing: &PrincipalKeys) -> Option<&'static str> {
        if existing.email == self.email {
            return Some("email");
        }
        if existing.username == self.username {
            return Some("username");
        }
        match (&existing.phone_number, &self.phone_number) {
            (Some(a), Some(b)) if a == b => Some("phone_number"),
            _ => None,
        }
    }
}

/// The unique columns of a stored principal.
#[derive(Debug, FromRow)]
pub struct PrincipalKeys {
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
}
