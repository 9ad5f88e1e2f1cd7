use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{CreateUnitRequest, PageParams, UpdateUnitRequest};
use crate::api::dtos::responses::{Paginated, UnitResponse};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::required;
use crate::domain::models::{
    auth::Identity,
    money::Money,
    property::{NewUnitParams, Property, Unit, UnitDetails, UnitType},
};
use crate::domain::services::access::{self, Action, ListScope, Resource, ResourceKind};
use crate::error::AppError;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

fn parse_unit_type(raw: &str) -> Result<UnitType, AppError> {
    raw.parse().map_err(|_| AppError::invalid("unit_type", format!("\"{raw}\" is not a valid choice.")))
}

fn validate_rent(rent: Money) -> Result<Money, AppError> {
    if rent.is_negative() {
        return Err(AppError::invalid("monthly_rent", "Monthly rent cannot be negative"));
    }
    Ok(rent)
}

/// The property a unit is being placed under, checked against the caller's ownership.
async fn target_property(state: &AppState, identity: &Identity, property_id: &str, action: Action) -> Result<Property, AppError> {
    let property = state.property_repo.find_by_id(property_id).await?
        .ok_or_else(|| AppError::invalid("property_id", "Invalid property ID"))?;
    access::ensure(identity, action, &Resource::Unit { owner_id: property.owner_id.clone() })?;
    Ok(property)
}

async fn load_unit(state: &AppState, identity: &Identity, id: &str, action: Action) -> Result<UnitDetails, AppError> {
    access::ensure_listable(identity, ResourceKind::Unit, action)?;
    let details = state.unit_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Unit not found".into()))?;
    access::ensure(identity, action, &Resource::Unit { owner_id: details.owner_id.clone() })?;
    Ok(details)
}

pub async fn list_units(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Unit, Action::View)?;
    let units = state.unit_repo.list(&ListScope::for_identity(&identity)).await?;
    Ok(Json(Paginated::paginate(units, &params)?.map(UnitResponse::from)))
}

pub async fn create_unit(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateUnitRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Unit, Action::Create)?;
    let property = target_property(&state, &identity, &payload.property_id, Action::Create).await?;

    let unit = Unit::new(NewUnitParams {
        property_id: property.id.clone(),
        unit_number: required("unit_number", &payload.unit_number)?,
        unit_type: parse_unit_type(&payload.unit_type)?,
        monthly_rent: validate_rent(payload.monthly_rent)?,
        description: payload.description,
    });
    let created = state.unit_repo.create(&unit).await?;

    info!(unit_id = %created.id, property_id = %property.id, "Unit created");
    Ok((StatusCode::CREATED, Json(UnitResponse::from(UnitDetails {
        unit: created,
        property_name: property.name,
        owner_id: property.owner_id,
    }))))
}

pub async fn get_unit(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_unit(&state, &identity, &id, Action::View).await?;
    Ok(Json(UnitResponse::from(details)))
}

pub async fn update_unit(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUnitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut unit = load_unit(&state, &identity, &id, Action::Update).await?.unit;

    if let Some(property_id) = payload.property_id
        && property_id != unit.property_id
    {
        unit.property_id = target_property(&state, &identity, &property_id, Action::Update).await?.id;
    }
    if let Some(unit_number) = payload.unit_number { unit.unit_number = required("unit_number", &unit_number)?; }
    if let Some(unit_type) = payload.unit_type { unit.unit_type = parse_unit_type(&unit_type)?; }
    if let Some(rent) = payload.monthly_rent { unit.monthly_rent = validate_rent(rent)?; }
    if let Some(description) = payload.description { unit.description = description; }
    unit.updated_at = Utc::now();

    let updated = state.unit_repo.update(&unit).await?;
    let details = state.unit_repo.find_by_id(&updated.id).await?
        .ok_or_else(|| AppError::NotFound("Unit not found".into()))?;

    info!(unit_id = %updated.id, rent = %updated.monthly_rent, "Unit updated");
    Ok(Json(UnitResponse::from(details)))
}

pub async fn delete_unit(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let details = load_unit(&state, &identity, &id, Action::Delete).await?;
    state.unit_repo.delete(&details.unit.id).await?;
    info!(unit_id = %id, "Unit deleted");
    Ok(StatusCode::NO_CONTENT)
}
