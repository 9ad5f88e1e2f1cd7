use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Visitor {
    pub id: String,
    pub tenant_id: String,
    pub unit_id: Option<String>,
    pub visitor_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Visitor {
    pub fn new(tenant_id: String, unit_id: Option<String>, visitor_name: String, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            unit_id,
            visitor_name,
            email,
            created_at: Utc::now(),
        }
    }
}

/// A visitor with the principal of the hosting tenant and the owner of that tenant's unit.
#[derive(Debug, FromRow, Clone)]
pub struct VisitorDetails {
    #[sqlx(flatten)]
    pub visitor: Visitor,
    pub tenant_principal_id: String,
    pub owner_id: Option<String>,
}
