pub mod access;
pub mod auth_service;
pub mod credentials;
pub mod dashboard;
pub mod ledger;
pub mod tenancy;
