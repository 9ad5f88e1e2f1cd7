use crate::domain::{
    models::notification::{Notification, NotificationRecipient, RecipientSelector},
    ports::NotificationRepository,
    services::access::ListScope,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepo {
    async fn create(&self, notification: &Notification, recipients: &RecipientSelector) -> Result<Vec<NotificationRecipient>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("INSERT INTO notifications (id, message, sender_id, sent_at) VALUES ($1, $2, $3, $4)")
            .bind(&notification.id).bind(&notification.message)
            .bind(&notification.sender_id).bind(notification.sent_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        match recipients {
            RecipientSelector::AllTenants => {
                sqlx::query(
                    "INSERT INTO notification_recipients (notification_id, principal_id)
                     SELECT $1, id FROM principals WHERE role = 'tenant'"
                )
                    .bind(&notification.id)
                    .execute(&mut *tx).await.map_err(AppError::Database)?;
            }
            RecipientSelector::Principals(ids) => {
                for principal_id in ids {
                    sqlx::query(
                        "INSERT INTO notification_recipients (notification_id, principal_id)
                         SELECT $1, id FROM principals WHERE id = $2 AND role = 'tenant'
                         ON CONFLICT DO NOTHING"
                    )
                        .bind(&notification.id).bind(principal_id)
                        .execute(&mut *tx).await.map_err(AppError::Database)?;
                }
            }
        }

        let stored = sqlx::query_as::<_, NotificationRecipient>(
            "SELECT * FROM notification_recipients WHERE notification_id = $1 ORDER BY principal_id"
        )
            .bind(&notification.id)
            .fetch_all(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(stored)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<Notification>, AppError> {
        match scope {
            ListScope::All => {
                sqlx::query_as::<_, Notification>("SELECT * FROM notifications ORDER BY sent_at DESC")
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::OwnedBy(principal_id) => {
                sqlx::query_as::<_, Notification>(
                    "SELECT * FROM notifications
                     WHERE sender_id = $1
                        OR id IN (SELECT notification_id FROM notification_recipients WHERE principal_id = $2)
                     ORDER BY sent_at DESC"
                )
                    .bind(principal_id).bind(principal_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::TenantPrincipal(principal_id) => {
                sqlx::query_as::<_, Notification>(
                    "SELECT * FROM notifications
                     WHERE id IN (SELECT notification_id FROM notification_recipients WHERE principal_id = $1)
                     ORDER BY sent_at DESC"
                )
                    .bind(principal_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::Nothing => Ok(vec![]),
        }
    }

    async fn recipients(&self, notification_id: &str) -> Result<Vec<NotificationRecipient>, AppError> {
        sqlx::query_as::<_, NotificationRecipient>(
            "SELECT * FROM notification_recipients WHERE notification_id = $1 ORDER BY principal_id"
        )
            .bind(notification_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_read(&self, notification_id: &str, principal_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE notification_recipients SET read_at = COALESCE(read_at, $1)
             WHERE notification_id = $2 AND principal_id = $3"
        )
            .bind(Utc::now()).bind(notification_id).bind(principal_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
