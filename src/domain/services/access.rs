//! Object-level authorization.
//!
//! Decisions are pure functions of the caller's identity and a [`Resource`] that already carries
//! the relationship chain it hangs from. [`AccessResolver`] builds those resources from the store.
//! Nothing here is cached between requests.

use std::sync::Arc;
use crate::domain::models::{
    auth::Identity,
    payment::Payment,
    principal::Role,
    tenant::TenantDetails,
};
use crate::domain::ports::{TenantRepository, UnitRepository};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Property,
    Unit,
    Tenant,
    Payment,
    Visitor,
    Notification,
    Dashboard,
}

/// A concrete object together with the ids its access depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Property { owner_id: String },
    Unit { owner_id: String },
    /// `owner_id` is `None` while the tenancy has no unit.
    Tenant { principal_id: String, owner_id: Option<String> },
    Payment { tenant_principal_id: String, owner_id: String },
    Visitor { tenant_principal_id: String, owner_id: Option<String> },
    Notification { sender_id: String, recipient_ids: Vec<String> },
}

impl Resource {
    pub fn tenant(details: &TenantDetails) -> Self {
        Resource::Tenant {
            principal_id: details.tenant.principal_id.clone(),
            owner_id: details.owner_id.clone(),
        }
    }
}

/// Coarse gate evaluated before anything is fetched.
pub fn can_list(role: Role, kind: ResourceKind, action: Action) -> bool {
    match role {
        Role::Admin => true,
        Role::Landlord | Role::PropertyManager => true,
        Role::Agent => false,
        Role::Tenant => match kind {
            ResourceKind::Payment => matches!(action, Action::View | Action::Create | Action::Update),
            ResourceKind::Visitor => true,
            ResourceKind::Notification => matches!(action, Action::View | Action::Update),
            ResourceKind::Property
            | ResourceKind::Unit
            | ResourceKind::Tenant
            | ResourceKind::Dashboard => false,
        },
    }
}

pub fn can_access(identity: &Identity, action: Action, resource: &Resource) -> bool {
    let me = identity.id.as_str();

    match identity.role {
        Role::Admin => true,
        Role::Agent => false,
        Role::Landlord | Role::PropertyManager => match resource {
            Resource::Property { owner_id } | Resource::Unit { owner_id } => owner_id == me,
            Resource::Tenant { owner_id, .. } => owner_id.as_deref() == Some(me),
            Resource::Payment { owner_id, .. } => owner_id == me,
            Resource::Visitor { owner_id, .. } => owner_id.as_deref() == Some(me),
            Resource::Notification { sender_id, .. } => action == Action::View && sender_id == me,
        },
        Role::Tenant => match resource {
            Resource::Property { .. } | Resource::Unit { .. } => false,
            Resource::Tenant { principal_id, .. } => action == Action::View && principal_id == me,
            Resource::Payment { tenant_principal_id, .. } => {
                action != Action::Delete && tenant_principal_id == me
            }
            Resource::Visitor { tenant_principal_id, .. } => tenant_principal_id == me,
            Resource::Notification { recipient_ids, .. } => {
                matches!(action, Action::View | Action::Update) && recipient_ids.iter().any(|id| id == me)
            }
        },
    }
}

pub fn ensure(identity: &Identity, action: Action, resource: &Resource) -> Result<(), AppError> {
    if can_access(identity, action, resource) {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

pub fn ensure_listable(identity: &Identity, kind: ResourceKind, action: Action) -> Result<(), AppError> {
    if can_list(identity.role, kind, action) {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

/// Row filter applied by list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    All,
    /// Rows hanging from properties owned by this principal.
    OwnedBy(String),
    /// Rows belonging to this tenant principal.
    TenantPrincipal(String),
    Nothing,
}

impl ListScope {
    pub fn for_identity(identity: &Identity) -> Self {
        match identity.role {
            Role::Admin => ListScope::All,
            Role::Landlord | Role::PropertyManager => ListScope::OwnedBy(identity.id.clone()),
            Role::Tenant => ListScope::TenantPrincipal(identity.id.clone()),
            Role::Agent => ListScope::Nothing,
        }
    }
}

/// Walks the ownership chain in the store to build [`Resource`] values.
#[derive(Clone)]
pub struct AccessResolver {
    units: Arc<dyn UnitRepository>,
    tenants: Arc<dyn TenantRepository>,
}

impl AccessResolver {
    pub fn new(units: Arc<dyn UnitRepository>, tenants: Arc<dyn TenantRepository>) -> Self {
        Self { units, tenants }
    }

    pub async fn unit_owner(&self, unit_id: &str) -> Result<Option<String>, AppError> {
        self.units.find_owner_id(unit_id).await
    }

    pub async fn tenant(&self, tenant_id: &str) -> Result<Option<TenantDetails>, AppError> {
        self.tenants.find_by_id(tenant_id).await
    }

    /// Resource for a payment on `unit_id` by `tenant_id`, or `None` if either is gone.
    pub async fn payment(&self, tenant_id: &str, unit_id: &str) -> Result<Option<Resource>, AppError> {
        let Some(tenant) = self.tenants.find_by_id(tenant_id).await? else {
            return Ok(None);
        };
        let Some(owner_id) = self.units.find_owner_id(unit_id).await? else {
            return Ok(None);
        };
        Ok(Some(Resource::Payment {
            tenant_principal_id: tenant.tenant.principal_id,
            owner_id,
        }))
    }

    pub async fn existing_payment(&self, payment: &Payment) -> Result<Resource, AppError> {
        self.payment(&payment.tenant_id, &payment.unit_id).await?
            .ok_or_else(|| AppError::InternalWithMsg(format!("payment {} has a dangling reference", payment.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn who(id: &str, role: Role) -> Identity {
        Identity { id: id.into(), username: id.into(), role }
    }

    #[test]
    fn admin_passes_everything() {
        let admin = who("a", Role::Admin);
        assert!(can_access(&admin, Action::Delete, &Resource::Property { owner_id: "x".into() }));
        assert!(can_access(&admin, Action::Update, &Resource::Tenant { principal_id: "t".into(), owner_id: None }));
        assert!(can_list(Role::Admin, ResourceKind::Dashboard, Action::View));
    }

    #[test]
    fn managers_follow_the_owner_chain() {
        let owner = who("m1", Role::PropertyManager);
        let foreign = who("m2", Role::PropertyManager);
        let unit = Resource::Unit { owner_id: "m1".into() };
        let tenant = Resource::Tenant { principal_id: "t".into(), owner_id: Some("m1".into()) };

        assert!(can_access(&owner, Action::Update, &unit));
        assert!(can_access(&owner, Action::Delete, &tenant));
        assert!(!can_access(&foreign, Action::View, &unit));
        assert!(!can_access(&foreign, Action::View, &tenant));
    }

    #[test]
    fn unassigned_tenant_is_admin_only() {
        let landlord = who("l1", Role::Landlord);
        let tenant = Resource::Tenant { principal_id: "t".into(), owner_id: None };
        assert!(!can_access(&landlord, Action::View, &tenant));
    }

    #[test]
    fn tenants_see_their_own_records_only() {
        let me = who("t1", Role::Tenant);
        let own_payment = Resource::Payment { tenant_principal_id: "t1".into(), owner_id: "m1".into() };
        let other_payment = Resource::Payment { tenant_principal_id: "t2".into(), owner_id: "m1".into() };

        assert!(can_access(&me, Action::View, &own_payment));
        assert!(can_access(&me, Action::Update, &own_payment));
        assert!(!can_access(&me, Action::Delete, &own_payment));
        assert!(!can_access(&me, Action::View, &other_payment));
        assert!(!can_access(&me, Action::View, &Resource::Unit { owner_id: "m1".into() }));
        assert!(can_access(&me, Action::View, &Resource::Tenant { principal_id: "t1".into(), owner_id: None }));
        assert!(!can_access(&me, Action::Update, &Resource::Tenant { principal_id: "t1".into(), owner_id: None }));
    }

    #[test]
    fn notifications_are_visible_to_recipients_and_sender() {
        let note = Resource::Notification { sender_id: "m1".into(), recipient_ids: vec!["t1".into()] };

        assert!(can_access(&who("t1", Role::Tenant), Action::Update, &note));
        assert!(!can_access(&who("t2", Role::Tenant), Action::View, &note));
        assert!(can_access(&who("m1", Role::Landlord), Action::View, &note));
        assert!(!can_access(&who("m1", Role::Landlord), Action::Update, &note));
    }

    #[test]
    fn agents_are_denied() {
        let agent = who("g", Role::Agent);
        assert!(!can_access(&agent, Action::View, &Resource::Property { owner_id: "g".into() }));
        assert!(!can_list(Role::Agent, ResourceKind::Payment, Action::View));
        assert_eq!(ListScope::for_identity(&agent), ListScope::Nothing);
    }

    #[test]
    fn list_gate_keeps_tenants_out_of_management() {
        assert!(!can_list(Role::Tenant, ResourceKind::Unit, Action::View));
        assert!(!can_list(Role::Tenant, ResourceKind::Dashboard, Action::View));
        assert!(!can_list(Role::Tenant, ResourceKind::Notification, Action::Create));
        assert!(can_list(Role::Tenant, ResourceKind::Payment, Action::Create));
        assert!(can_list(Role::Landlord, ResourceKind::Tenant, Action::Create));
    }
}
