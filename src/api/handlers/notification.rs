use axum::{extract::{Path, Query, State}, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{CreateNotificationRequest, PageParams, RecipientsField};
use crate::api::dtos::responses::Paginated;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::required;
use crate::domain::models::notification::{Notification, NotificationView, RecipientSelector};
use crate::domain::services::access::{self, Action, ListScope, Resource, ResourceKind};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

fn selector(field: RecipientsField) -> Result<RecipientSelector, AppError> {
    match field {
        RecipientsField::Keyword(keyword) if keyword == "all_tenants" => Ok(RecipientSelector::AllTenants),
        RecipientsField::Keyword(other) => {
            Err(AppError::invalid("recipients", format!("\"{other}\" is not a valid recipient selector.")))
        }
        RecipientsField::Principals(ids) if ids.is_empty() => {
            Err(AppError::invalid("recipients", "At least one recipient is required."))
        }
        RecipientsField::Principals(ids) => Ok(RecipientSelector::Principals(ids)),
    }
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Notification, Action::View)?;
    let notifications = state.notification_repo.list(&ListScope::for_identity(&identity)).await?;
    let page = Paginated::paginate(notifications, &params)?;

    let mut views = Vec::with_capacity(page.results.len());
    for notification in &page.results {
        let recipients = state.notification_repo.recipients(&notification.id).await?;
        views.push(NotificationView::for_viewer(notification.clone(), &recipients, &identity.id));
    }

    Ok(Json(page.with_results(views)))
}

pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Notification, Action::Create)?;

    let message = required("message", &payload.message)?;
    let selector = selector(payload.recipients)?;

    let notification = Notification::new(identity.id.clone(), message);
    let recipients = state.notification_repo.create(&notification, &selector).await?;

    info!(notification_id = %notification.id, recipients = recipients.len(), "Notification sent");
    Ok((StatusCode::CREATED, Json(NotificationView::for_viewer(notification, &recipients, &identity.id))))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    access::ensure_listable(&identity, ResourceKind::Notification, Action::Update)?;

    let notification = state.notification_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Notification not found".into()))?;
    let recipients = state.notification_repo.recipients(&id).await?;
    access::ensure(&identity, Action::Update, &Resource::Notification {
        sender_id: notification.sender_id.clone(),
        recipient_ids: recipients.iter().map(|r| r.principal_id.clone()).collect(),
    })?;

    if !state.notification_repo.mark_read(&id, &identity.id).await? {
        return Err(AppError::forbidden());
    }

    let recipients = state.notification_repo.recipients(&id).await?;
    Ok(Json(NotificationView::for_viewer(notification, &recipients, &identity.id)))
}
