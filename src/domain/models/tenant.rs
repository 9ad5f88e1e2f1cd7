use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Tenancy record binding a tenant principal to at most one unit.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Tenant {
    pub id: String,
    pub principal_id: String,
    pub unit_id: Option<String>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(principal_id: String, unit_id: Option<String>, lease: LeaseTerms) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            principal_id,
            unit_id,
            lease_start_date: lease.start,
            lease_end_date: lease.end,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn lease(&self) -> LeaseTerms {
        LeaseTerms { start: self.lease_start_date, end: self.lease_end_date }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaseTerms {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Edit applied to a tenancy in one transaction. `unit: Some(None)` releases the current unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenancyChange {
    pub unit: Option<Option<String>>,
    pub lease: Option<LeaseTerms>,
}

impl TenancyChange {
    pub fn move_to(unit_id: Option<String>) -> Self {
        Self { unit: Some(unit_id), lease: None }
    }
}

/// A tenancy joined with its principal's contact fields and its unit's property.
#[derive(Debug, FromRow, Clone)]
pub struct TenantDetails {
    #[sqlx(flatten)]
    pub tenant: Tenant,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub unit_number: Option<String>,
    pub property_id: Option<String>,
    pub property_name: Option<String>,
    pub owner_id: Option<String>,
}
