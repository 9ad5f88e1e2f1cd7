use axum::{extract::State, response::IntoResponse, Json};
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::access::{self, Action, ListScope, ResourceKind};
use crate::domain::services::dashboard::compute_stats;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::debug;

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Dashboard, Action::View)?;

    let scope = ListScope::for_identity(&identity);
    let properties = state.property_repo.list(&scope).await?;
    let units = state.unit_repo.list(&scope).await?;
    let payments = state.payment_repo.list(&scope).await?;

    let stats = compute_stats(&properties, units.iter().map(|details| &details.unit), &payments);
    debug!(principal_id = %identity.id, units = stats.total_units, "Computed dashboard stats");
    Ok(Json(stats))
}
