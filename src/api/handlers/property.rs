use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{CreatePropertyRequest, PageParams, UpdatePropertyRequest};
use crate::api::dtos::responses::Paginated;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::required;
use crate::domain::models::{auth::Identity, principal::Role, property::Property};
use crate::domain::services::access::{self, Action, ListScope, Resource, ResourceKind};
use crate::error::AppError;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

async fn load_property(state: &AppState, identity: &Identity, id: &str, action: Action) -> Result<Property, AppError> {
    access::ensure_listable(identity, ResourceKind::Property, action)?;
    let property = state.property_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Property not found".into()))?;
    access::ensure(identity, action, &Resource::Property { owner_id: property.owner_id.clone() })?;
    Ok(property)
}

pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Property, Action::View)?;
    let properties = state.property_repo.list(&ListScope::for_identity(&identity)).await?;
    Ok(Json(Paginated::paginate(properties, &params)?))
}

pub async fn create_property(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Property, Action::Create)?;

    let owner_id = match payload.owner_id {
        Some(owner_id) if identity.role == Role::Admin && owner_id != identity.id => {
            let owner = state.principal_repo.find_by_id(&owner_id).await?
                .ok_or_else(|| AppError::invalid("owner_id", "Invalid owner ID"))?;
            if !owner.role.manages_properties() {
                return Err(AppError::invalid("owner_id", "Property owner must hold a management role."));
            }
            owner.id
        }
        _ => identity.id.clone(),
    };
    access::ensure(&identity, Action::Create, &Resource::Property { owner_id: owner_id.clone() })?;

    let property = Property::new(
        owner_id,
        required("name", &payload.name)?,
        required("address", &payload.address)?,
        payload.description,
    );
    let created = state.property_repo.create(&property).await?;

    info!(property_id = %created.id, owner_id = %created.owner_id, "Property created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_property(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = load_property(&state, &identity, &id, Action::View).await?;
    Ok(Json(property))
}

pub async fn update_property(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePropertyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut property = load_property(&state, &identity, &id, Action::Update).await?;

    if let Some(name) = payload.name { property.name = required("name", &name)?; }
    if let Some(address) = payload.address { property.address = required("address", &address)?; }
    if let Some(description) = payload.description { property.description = description; }
    if let Some(is_active) = payload.is_active { property.is_active = is_active; }
    property.updated_at = Utc::now();

    let updated = state.property_repo.update(&property).await?;
    info!(property_id = %updated.id, "Property updated");
    Ok(Json(updated))
}

pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = load_property(&state, &identity, &id, Action::Delete).await?;
    state.property_repo.delete(&property.id).await?;
    info!(property_id = %id, "Property deleted");
    Ok(StatusCode::NO_CONTENT)
}
