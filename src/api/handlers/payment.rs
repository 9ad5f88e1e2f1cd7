use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{CreatePaymentRequest, PageParams, UpdatePaymentRequest};
use crate::api::dtos::responses::Paginated;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{
    auth::Identity,
    money::Money,
    payment::{PaymentDraft, PaymentMethod, PaymentStatus},
    principal::Role,
};
use crate::domain::services::access::{self, Action, ListScope, ResourceKind};
use crate::domain::services::ledger::PaymentChanges;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

fn parse_method(raw: &str) -> Result<PaymentMethod, AppError> {
    raw.parse().map_err(|_| AppError::invalid("method", format!("\"{raw}\" is not a valid choice.")))
}

fn parse_status(raw: &str) -> Result<PaymentStatus, AppError> {
    raw.parse().map_err(|_| AppError::invalid("status", format!("\"{raw}\" is not a valid choice.")))
}

/// Tenant id for a new payment. Tenant callers default to their own tenancy.
async fn resolve_tenant_id(state: &AppState, identity: &Identity, requested: Option<String>) -> Result<String, AppError> {
    if let Some(tenant_id) = requested {
        return Ok(tenant_id);
    }
    if identity.role == Role::Tenant
        && let Some(own) = state.tenant_repo.find_by_principal(&identity.id).await?
    {
        return Ok(own.tenant.id);
    }
    Err(AppError::invalid("tenant_id", "This field is required."))
}

pub async fn list_payments(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Payment, Action::View)?;
    let payments = state.payment_repo.list(&ListScope::for_identity(&identity)).await?;
    Ok(Json(Paginated::paginate(payments, &params)?))
}

pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Payment, Action::Create)?;

    let tenant_id = resolve_tenant_id(&state, &identity, payload.tenant_id).await?;
    let unit_id = match payload.unit_id {
        Some(unit_id) => unit_id,
        None => state.resolver.tenant(&tenant_id).await?
            .and_then(|details| details.tenant.unit_id)
            .ok_or_else(|| AppError::invalid("unit_id", "This field is required."))?,
    };
    let method = payload.method.as_deref()
        .ok_or_else(|| AppError::invalid("method", "This field is required."))
        .and_then(parse_method)?;
    let status = payload.status.as_deref().map(parse_status).transpose()?
        .unwrap_or(PaymentStatus::Pending);

    let draft = PaymentDraft {
        tenant_id,
        unit_id,
        amount_due: payload.amount_due,
        amount_paid: payload.amount_paid.unwrap_or(Money::ZERO),
        method,
        status,
        transaction_id: payload.transaction_id.filter(|t| !t.trim().is_empty()),
        billing_period: payload.billing_period.trim().to_string(),
    };

    let payment = state.ledger.record_payment(&identity, draft).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Payment, Action::View)?;
    let payment = state.ledger.get_payment(&identity, &id, Action::View).await?;
    Ok(Json(payment))
}

pub async fn update_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let changes = PaymentChanges {
        tenant_id: payload.tenant_id,
        unit_id: payload.unit_id,
        amount_due: payload.amount_due,
        amount_paid: payload.amount_paid,
        method: payload.method.as_deref().map(parse_method).transpose()?,
        status: payload.status.as_deref().map(parse_status).transpose()?,
        transaction_id: payload.transaction_id,
        billing_period: payload.billing_period.map(|b| b.trim().to_string()),
    };

    let payment = state.ledger.update_payment(&identity, &id, changes).await?;
    Ok(Json(payment))
}

pub async fn delete_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.ledger.delete_payment(&identity, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
