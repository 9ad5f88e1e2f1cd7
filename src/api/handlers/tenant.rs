use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{CreateTenantRequest, PageParams, UpdateTenantRequest};
use crate::api::dtos::responses::{Paginated, TenantResponse};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{
    auth::Identity,
    principal::Role,
    tenant::{LeaseTerms, TenancyChange, Tenant, TenantDetails},
};
use crate::domain::services::access::{self, Action, ListScope, Resource, ResourceKind};
use crate::domain::services::credentials::{self, AccountInput};
use crate::domain::services::tenancy::validate_lease_window;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

async fn load_tenant(state: &AppState, identity: &Identity, id: &str, action: Action) -> Result<TenantDetails, AppError> {
    access::ensure_listable(identity, ResourceKind::Tenant, action)?;
    let details = state.tenant_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;
    access::ensure(identity, action, &Resource::tenant(&details))?;
    Ok(details)
}

async fn fetch_details(state: &AppState, id: &str) -> Result<TenantDetails, AppError> {
    state.tenant_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))
}

/// Owner of the unit a tenancy is moving into. Unknown units surface as `NotFound`.
async fn target_owner(state: &AppState, unit_id: &str) -> Result<String, AppError> {
    state.resolver.unit_owner(unit_id).await?
        .ok_or_else(|| AppError::NotFound("Unit not found".into()))
}

pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Tenant, Action::View)?;
    let tenants = state.tenant_repo.list(&ListScope::for_identity(&identity)).await?;
    Ok(Json(Paginated::paginate(tenants, &params)?.map(TenantResponse::from)))
}

pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Tenant, Action::Create)?;

    let lease = LeaseTerms { start: payload.lease_start_date, end: payload.lease_end_date };
    validate_lease_window(&lease)?;

    let principal = credentials::prepare_principal(
        AccountInput {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone_number: payload.phone_number,
        },
        Role::Tenant,
    )?;

    let owner_id = match &payload.unit_id {
        Some(unit_id) => Some(target_owner(&state, unit_id).await?),
        None => None,
    };
    access::ensure(&identity, Action::Create, &Resource::Tenant {
        principal_id: principal.id.clone(),
        owner_id,
    })?;

    let conflicts = state.principal_repo.find_conflicts(&principal).await?;
    credentials::ensure_unique(&principal, &conflicts)?;

    let tenant = Tenant::new(principal.id.clone(), payload.unit_id, lease);
    let created = state.tenant_repo.create_with_principal(&principal, &tenant).await?;

    info!(tenant_id = %created.id, unit_id = ?created.unit_id, "Tenant created");
    let details = fetch_details(&state, &created.id).await?;
    Ok((StatusCode::CREATED, Json(TenantResponse::from(details))))
}

pub async fn get_tenant(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_tenant(&state, &identity, &id, Action::View).await?;
    Ok(Json(TenantResponse::from(details)))
}

/// The caller's own tenancy record.
pub async fn my_tenancy(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    if identity.role != Role::Tenant {
        return Err(AppError::forbidden());
    }
    let details = state.tenant_repo.find_by_principal(&identity.id).await?
        .ok_or_else(|| AppError::NotFound("Tenant profile not found".into()))?;
    access::ensure(&identity, Action::View, &Resource::tenant(&details))?;
    Ok(Json(TenantResponse::from(details)))
}

pub async fn update_tenant(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_tenant(&state, &identity, &id, Action::Update).await?;
    let current = details.tenant.lease();

    let lease = LeaseTerms {
        start: payload.lease_start_date.unwrap_or(current.start),
        end: payload.lease_end_date.unwrap_or(current.end),
    };
    validate_lease_window(&lease)?;

    if let Some(Some(unit_id)) = &payload.unit_id
        && details.tenant.unit_id.as_deref() != Some(unit_id.as_str())
    {
        let owner_id = target_owner(&state, unit_id).await?;
        access::ensure(&identity, Action::Update, &Resource::Tenant {
            principal_id: details.tenant.principal_id.clone(),
            owner_id: Some(owner_id),
        })?;
    }

    let change = TenancyChange {
        unit: payload.unit_id,
        lease: (lease != current).then_some(lease),
    };
    if change != TenancyChange::default() {
        let saved = state.tenant_repo.apply_change(&details.tenant.id, &change).await?;
        info!(tenant_id = %saved.id, unit_id = ?saved.unit_id, "Tenancy updated");
    }

    let updated = fetch_details(&state, &details.tenant.id).await?;
    Ok(Json(TenantResponse::from(updated)))
}

pub async fn delete_tenant(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_tenant(&state, &identity, &id, Action::Delete).await?;
    state.tenant_repo.delete(&details.tenant.id).await?;
    info!(tenant_id = %id, unit_id = ?details.tenant.unit_id, "Tenant deleted");
    Ok(StatusCode::NO_CONTENT)
}
