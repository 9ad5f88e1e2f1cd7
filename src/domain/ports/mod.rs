use crate::domain::models::{
    auth::RefreshTokenRecord,
    notification::{Notification, NotificationRecipient, RecipientSelector},
    payment::Payment,
    principal::{Principal, PrincipalKeys},
    property::{Property, Unit, UnitDetails},
    tenant::{TenancyChange, Tenant, TenantDetails},
    visitor::{Visitor, VisitorDetails},
};
use crate::domain::services::access::ListScope;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn create(&self, principal: &Principal) -> Result<Principal, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, AppError>;
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Principal>, AppError>;
    /// Unique keys of stored principals sharing an email, username or phone number with `principal`.
    async fn find_conflicts(&self, principal: &Principal) -> Result<Vec<PrincipalKeys>, AppError>;

    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    /// Consumes `spent_hash` and stores `next` in one transaction.
    /// A token that was already consumed yields `Unauthorized` and stores nothing.
    async fn rotate_refresh_token(&self, spent_hash: &str, next: &RefreshTokenRecord) -> Result<(), AppError>;
    /// Drops every token issued from the same login as `token_hash`.
    async fn revoke_refresh_family(&self, token_hash: &str) -> Result<(), AppError>;
    /// Drops the principal's tokens that expired before `now`, returning how many went.
    async fn purge_expired_refresh_tokens(&self, principal_id: &str, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create(&self, property: &Property) -> Result<Property, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError>;
    async fn list(&self, scope: &ListScope) -> Result<Vec<Property>, AppError>;
    async fn update(&self, property: &Property) -> Result<Property, AppError>;
    /// Fails with `Conflict` while any unit of the property is occupied.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait UnitRepository: Send + Sync {
    async fn create(&self, unit: &Unit) -> Result<Unit, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UnitDetails>, AppError>;
    async fn find_owner_id(&self, id: &str) -> Result<Option<String>, AppError>;
    async fn list(&self, scope: &ListScope) -> Result<Vec<UnitDetails>, AppError>;
    /// Writes the descriptive fields and rent. Occupancy is never written here.
    async fn update(&self, unit: &Unit) -> Result<Unit, AppError>;
    /// Fails with `Conflict` while the unit is occupied.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Owns the occupancy invariant: a unit is occupied exactly when one tenancy points at it.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Inserts the principal and its tenancy, occupying the tenancy's unit if it has one.
    async fn create_with_principal(&self, principal: &Principal, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<TenantDetails>, AppError>;
    async fn find_by_principal(&self, principal_id: &str) -> Result<Option<TenantDetails>, AppError>;
    async fn list(&self, scope: &ListScope) -> Result<Vec<TenantDetails>, AppError>;
    /// Applies the move and the lease terms of `change` in one transaction.
    async fn apply_change(&self, tenant_id: &str, change: &TenancyChange) -> Result<Tenant, AppError>;
    /// Deletes the tenancy and frees its unit.
    async fn delete(&self, tenant_id: &str) -> Result<(), AppError>;
}

/// Inserts and updates re-check `amount_due` against the stored rent inside the write transaction.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError>;
    async fn list(&self, scope: &ListScope) -> Result<Vec<Payment>, AppError>;
    async fn update(&self, payment: &Payment) -> Result<Payment, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait VisitorRepository: Send + Sync {
    async fn create(&self, visitor: &Visitor) -> Result<Visitor, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<VisitorDetails>, AppError>;
    async fn list(&self, scope: &ListScope) -> Result<Vec<VisitorDetails>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Stores the notification and one unread receipt per selected tenant principal.
    async fn create(&self, notification: &Notification, recipients: &RecipientSelector) -> Result<Vec<NotificationRecipient>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Notification>, AppError>;
    /// `OwnedBy` selects notifications sent by or addressed to the principal.
    async fn list(&self, scope: &ListScope) -> Result<Vec<Notification>, AppError>;
    async fn recipients(&self, notification_id: &str) -> Result<Vec<NotificationRecipient>, AppError>;
    /// Returns false when the principal is not a recipient.
    async fn mark_read(&self, notification_id: &str, principal_id: &str) -> Result<bool, AppError>;
}
