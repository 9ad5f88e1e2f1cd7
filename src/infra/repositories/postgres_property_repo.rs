use crate::domain::{models::property::Property, ports::PropertyRepository, services::access::ListScope};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresPropertyRepo {
    pool: PgPool,
}

impl PostgresPropertyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PostgresPropertyRepo {
    async fn create(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            "INSERT INTO properties (id, name, address, description, owner_id, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *"
        )
            .bind(&property.id).bind(&property.name).bind(&property.address).bind(&property.description)
            .bind(&property.owner_id).bind(property.is_active).bind(property.created_at).bind(property.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<Property>, AppError> {
        match scope {
            ListScope::All => {
                sqlx::query_as::<_, Property>("SELECT * FROM properties ORDER BY created_at DESC")
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE owner_id = $1 ORDER BY created_at DESC")
                    .bind(owner_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::TenantPrincipal(_) | ListScope::Nothing => Ok(vec![]),
        }
    }

    async fn update(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            "UPDATE properties SET name = $1, address = $2, description = $3, owner_id = $4, is_active = $5, updated_at = $6
             WHERE id = $7
             RETURNING *"
        )
            .bind(&property.name).bind(&property.address).bind(&property.description)
            .bind(&property.owner_id).bind(property.is_active).bind(property.updated_at)
            .bind(&property.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Property not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM properties WHERE id = $1
             AND NOT EXISTS (SELECT 1 FROM units WHERE property_id = $2 AND is_occupied = TRUE)"
        )
            .bind(id).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM properties WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
            return Err(match exists {
                Some(_) => AppError::Conflict("property has occupied units".into()),
                None => AppError::NotFound("Property not found".into()),
            });
        }
        Ok(())
    }
}
