use crate::domain::{models::visitor::{Visitor, VisitorDetails}, ports::VisitorRepository, services::access::ListScope};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

const DETAILS_SELECT: &str =
    "SELECT v.*, t.principal_id AS tenant_principal_id, p.owner_id AS owner_id
     FROM visitors v
     JOIN tenants t ON t.id = v.tenant_id
     LEFT JOIN units u ON u.id = t.unit_id
     LEFT JOIN properties p ON p.id = u.property_id";

pub struct SqliteVisitorRepo {
    pool: SqlitePool,
}

impl SqliteVisitorRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorRepository for SqliteVisitorRepo {
    async fn create(&self, visitor: &Visitor) -> Result<Visitor, AppError> {
        sqlx::query_as::<_, Visitor>(
            "INSERT INTO visitors (id, tenant_id, unit_id, visitor_name, email, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&visitor.id).bind(&visitor.tenant_id).bind(&visitor.unit_id)
            .bind(&visitor.visitor_name).bind(&visitor.email).bind(visitor.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<VisitorDetails>, AppError> {
        sqlx::query_as::<_, VisitorDetails>(&format!("{DETAILS_SELECT} WHERE v.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<VisitorDetails>, AppError> {
        match scope {
            ListScope::All => {
                sqlx::query_as::<_, VisitorDetails>(&format!("{DETAILS_SELECT} ORDER BY v.created_at DESC"))
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, VisitorDetails>(&format!("{DETAILS_SELECT} WHERE p.owner_id = ? ORDER BY v.created_at DESC"))
                    .bind(owner_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::TenantPrincipal(principal_id) => {
                sqlx::query_as::<_, VisitorDetails>(&format!("{DETAILS_SELECT} WHERE t.principal_id = ? ORDER BY v.created_at DESC"))
                    .bind(principal_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::Nothing => Ok(vec![]),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM visitors WHERE id = ?")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Visitor not found".into())); }
        Ok(())
    }
}
