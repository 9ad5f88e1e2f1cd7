use crate::domain::{
    models::{auth::RefreshTokenRecord, principal::{Principal, PrincipalKeys}},
    ports::PrincipalRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

pub struct SqlitePrincipalRepo {
    pool: SqlitePool,
}

impl SqlitePrincipalRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_refresh_token<'c, E>(executor: E, record: &RefreshTokenRecord) -> Result<(), AppError>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    sqlx::query("INSERT INTO refresh_tokens (token_hash, principal_id, family_id, generation_id, expires_at, created_at) VALUES (?, ?, ?, ?, ?, ?)")
        .bind(&record.token_hash)
        .bind(&record.principal_id)
        .bind(record.family_id)
        .bind(record.generation_id)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(executor).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl PrincipalRepository for SqlitePrincipalRepo {
    async fn create(&self, principal: &Principal) -> Result<Principal, AppError> {
        sqlx::query_as::<_, Principal>(
            "INSERT INTO principals (id, email, username, phone_number, first_name, last_name, password_hash, role, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
            .bind(&principal.id)
            .bind(&principal.email)
            .bind(&principal.username)
            .bind(&principal.phone_number)
            .bind(&principal.first_name)
            .bind(&principal.last_name)
            .bind(&principal.password_hash)
            .bind(principal.role.as_str())
            .bind(principal.is_active)
            .bind(principal.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, AppError> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AppError> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Principal>, AppError> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Principal>, AppError> {
        sqlx::query_as::<_, Principal>("SELECT * FROM principals WHERE phone_number = ?")
            .bind(phone_number)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_conflicts(&self, principal: &Principal) -> Result<Vec<PrincipalKeys>, AppError> {
        sqlx::query_as::<_, PrincipalKeys>(
            "SELECT email, username, phone_number FROM principals
             WHERE email = ? OR username = ? OR (phone_number IS NOT NULL AND phone_number = ?)",
        )
            .bind(&principal.email)
            .bind(&principal.username)
            .bind(&principal.phone_number)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        insert_refresh_token(&self.pool, record).await
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        sqlx::query_as::<_, RefreshTokenRecord>("SELECT * FROM refresh_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn rotate_refresh_token(&self, spent_hash: &str, next: &RefreshTokenRecord) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let spent = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(spent_hash)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if spent.rows_affected() == 0 {
            warn!(principal_id = %next.principal_id, family_id = %next.family_id, "Refresh token already consumed");
            return Err(AppError::Unauthorized);
        }

        insert_refresh_token(&mut *tx, next).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn revoke_refresh_family(&self, token_hash: &str) -> Result<(), AppError> {
        let revoked = sqlx::query(
            "DELETE FROM refresh_tokens
             WHERE family_id = (SELECT family_id FROM refresh_tokens WHERE token_hash = ?)"
        )
            .bind(token_hash)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        debug!(tokens = revoked.rows_affected(), "Revoked refresh family");
        Ok(())
    }

    async fn purge_expired_refresh_tokens(&self, principal_id: &str, now: DateTime<Utc>) -> Result<u64, AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE principal_id = ? AND expires_at < ?")
            .bind(principal_id)
            .bind(now)
            .execute(&self.pool).await
            .map(|done| done.rows_affected())
            .map_err(AppError::Database)
    }
}
