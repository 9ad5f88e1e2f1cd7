use std::sync::Arc;
use crate::domain::ports::{
    NotificationRepository, PaymentRepository, PrincipalRepository,
    PropertyRepository, TenantRepository, UnitRepository, VisitorRepository,
};
use crate::domain::services::{access::AccessResolver, auth_service::AuthService, ledger::LedgerService};
use crate::config::Config;

/// One backend's worth of repositories.
pub struct Repositories {
    pub principals: Arc<dyn PrincipalRepository>,
    pub properties: Arc<dyn PropertyRepository>,
    pub units: Arc<dyn UnitRepository>,
    pub tenants: Arc<dyn TenantRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub visitors: Arc<dyn VisitorRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub principal_repo: Arc<dyn PrincipalRepository>,
    pub property_repo: Arc<dyn PropertyRepository>,
    pub unit_repo: Arc<dyn UnitRepository>,
    pub tenant_repo: Arc<dyn TenantRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub visitor_repo: Arc<dyn VisitorRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub auth_service: Arc<AuthService>,
    pub ledger: Arc<LedgerService>,
    pub resolver: AccessResolver,
}

impl AppState {
    pub fn new(config: Config, repos: Repositories) -> Self {
        let auth_service = Arc::new(AuthService::new(repos.principals.clone(), config.clone()));
        let resolver = AccessResolver::new(repos.units.clone(), repos.tenants.clone());
        let ledger = Arc::new(LedgerService::new(repos.units.clone(), repos.payments.clone(), resolver.clone()));

        Self {
            config,
            principal_repo: repos.principals,
            property_repo: repos.properties,
            unit_repo: repos.units,
            tenant_repo: repos.tenants,
            payment_repo: repos.payments,
            visitor_repo: repos.visitors,
            notification_repo: repos.notifications,
            auth_service,
            ledger,
            resolver,
        }
    }
}
