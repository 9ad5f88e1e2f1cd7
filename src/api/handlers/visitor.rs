use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{CreateVisitorRequest, PageParams};
use crate::api::dtos::responses::Paginated;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::required;
use crate::domain::models::{
    auth::Identity,
    principal::Role,
    visitor::{Visitor, VisitorDetails},
};
use crate::domain::services::access::{self, Action, ListScope, Resource, ResourceKind};
use crate::domain::services::credentials;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

fn resource(details: &VisitorDetails) -> Resource {
    Resource::Visitor {
        tenant_principal_id: details.tenant_principal_id.clone(),
        owner_id: details.owner_id.clone(),
    }
}

async fn load_visitor(state: &AppState, identity: &Identity, id: &str, action: Action) -> Result<VisitorDetails, AppError> {
    access::ensure_listable(identity, ResourceKind::Visitor, action)?;
    let details = state.visitor_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Visitor not found".into()))?;
    access::ensure(identity, action, &resource(&details))?;
    Ok(details)
}

pub async fn list_visitors(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Visitor, Action::View)?;
    let visitors = state.visitor_repo.list(&ListScope::for_identity(&identity)).await?;
    Ok(Json(Paginated::paginate(visitors, &params)?.map(|details| details.visitor)))
}

pub async fn create_visitor(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateVisitorRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Visitor, Action::Create)?;

    let tenant = match payload.tenant_id {
        Some(tenant_id) => state.resolver.tenant(&tenant_id).await?
            .ok_or_else(|| AppError::invalid("tenant_id", "Invalid tenant ID"))?,
        None if identity.role == Role::Tenant => state.tenant_repo.find_by_principal(&identity.id).await?
            .ok_or_else(|| AppError::invalid("tenant_id", "This field is required."))?,
        None => return Err(AppError::invalid("tenant_id", "This field is required.")),
    };
    access::ensure(&identity, Action::Create, &Resource::Visitor {
        tenant_principal_id: tenant.tenant.principal_id.clone(),
        owner_id: tenant.owner_id.clone(),
    })?;

    let unit_id = match payload.unit_id {
        Some(unit_id) if tenant.tenant.unit_id.as_deref() != Some(unit_id.as_str()) => {
            return Err(AppError::invalid("unit_id", "Visitor unit must be the tenant's current unit."));
        }
        Some(unit_id) => Some(unit_id),
        None => tenant.tenant.unit_id.clone(),
    };

    let email = match payload.email.map(|e| credentials::normalize_email(&e)).filter(|e| !e.is_empty()) {
        Some(email) => {
            credentials::validate_email(&email)?;
            Some(email)
        }
        None => None,
    };

    let visitor = Visitor::new(
        tenant.tenant.id.clone(),
        unit_id,
        required("visitor_name", &payload.visitor_name)?,
        email,
    );
    let created = state.visitor_repo.create(&visitor).await?;

    info!(visitor_id = %created.id, tenant_id = %created.tenant_id, "Visitor registered");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_visitor(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_visitor(&state, &identity, &id, Action::View).await?;
    Ok(Json(details.visitor))
}

pub async fn delete_visitor(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_visitor(&state, &identity, &id, Action::Delete).await?;
    state.visitor_repo.delete(&details.visitor.id).await?;
    info!(visitor_id = %id, "Visitor removed");
    Ok(StatusCode::NO_CONTENT)
}
