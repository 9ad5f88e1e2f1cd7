pub mod sqlite_principal_repo;
pub mod sqlite_property_repo;
pub mod sqlite_unit_repo;
pub mod sqlite_tenant_repo;
pub mod sqlite_payment_repo;
pub mod sqlite_visitor_repo;
pub mod sqlite_notification_repo;

pub mod postgres_principal_repo;
pub mod postgres_property_repo;
pub mod postgres_unit_repo;
pub mod postgres_tenant_repo;
pub mod postgres_payment_repo;
pub mod postgres_visitor_repo;
pub mod postgres_notification_repo;
