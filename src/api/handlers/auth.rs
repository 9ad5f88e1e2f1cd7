use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{LoginRequest, RefreshRequest, RegisterRequest};
use crate::api::dtos::responses::TokenResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{
    auth::AuthResponse,
    principal::{Principal, Role},
    tenant::{LeaseTerms, Tenant},
};
use crate::domain::services::credentials::{self, AccountInput, Identifier};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = match payload.role.as_deref() {
        None => Role::Tenant,
        Some(raw) => raw.parse::<Role>()
            .map_err(|_| AppError::invalid("role", format!("\"{raw}\" is not a valid choice.")))?,
    };
    if !role.is_self_registrable() {
        warn!(username = %payload.username, "Rejected self-registration as admin");
        return Err(AppError::invalid("role", "This role cannot be chosen at registration."));
    }

    credentials::validate_password(&payload.password, &payload.password2)?;
    let principal = credentials::prepare_principal(
        AccountInput {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone_number: payload.phone_number,
        },
        role,
    )?;

    let conflicts = state.principal_repo.find_conflicts(&principal).await?;
    credentials::ensure_unique(&principal, &conflicts)?;

    let created = if role == Role::Tenant {
        let tenancy = Tenant::new(principal.id.clone(), None, LeaseTerms::default());
        state.tenant_repo.create_with_principal(&principal, &tenancy).await?;
        principal
    } else {
        state.principal_repo.create(&principal).await?
    };

    let tokens = state.auth_service.login(&created).await?;
    info!(principal_id = %created.id, role = created.role.as_str(), "Principal registered");

    Ok((StatusCode::CREATED, Json(AuthResponse {
        access: tokens.access_token,
        refresh: tokens.refresh_token,
        user: created,
    })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = find_by_identifier(&state, payload.identifier.trim()).await?
        .ok_or(AppError::Unauthorized)?;

    if !principal.is_active || !credentials::verify_password(&payload.password, &principal.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let tokens = state.auth_service.login(&principal).await?;
    info!("User logged in: {}", principal.id);

    Ok(Json(AuthResponse {
        access: tokens.access_token,
        refresh: tokens.refresh_token,
        user: principal,
    }))
}

async fn find_by_identifier(state: &AppState, identifier: &str) -> Result<Option<Principal>, AppError> {
    match Identifier::classify(identifier) {
        Identifier::Email(email) => state.principal_repo.find_by_email(&credentials::normalize_email(email)).await,
        Identifier::Phone(phone) => state.principal_repo.find_by_phone(phone).await,
        Identifier::Username(username) => state.principal_repo.find_by_username(username).await,
    }
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.auth_service.find_live_refresh(&payload.refresh).await?;

    let principal = state.principal_repo.find_by_id(&record.principal_id).await?
        .filter(|p| p.is_active)
        .ok_or(AppError::Unauthorized)?;

    let tokens = state.auth_service.refresh(&record, &principal).await?;
    info!("Token refreshed for user: {}", principal.id);

    Ok(Json(TokenResponse {
        access: tokens.access_token,
        refresh: tokens.refresh_token,
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.logout(&payload.refresh).await?;
    info!("User logged out");
    Ok(StatusCode::OK)
}

pub async fn current_user(AuthUser(identity): AuthUser) -> impl IntoResponse {
    Json(identity)
}
