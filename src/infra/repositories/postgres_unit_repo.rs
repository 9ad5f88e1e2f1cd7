use crate::domain::{models::property::{Unit, UnitDetails}, ports::UnitRepository, services::access::ListScope};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

const DETAILS_SELECT: &str =
    "SELECT u.*, p.name AS property_name, p.owner_id AS owner_id
     FROM units u JOIN properties p ON p.id = u.property_id";

pub struct PostgresUnitRepo {
    pool: PgPool,
}

impl PostgresUnitRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitRepository for PostgresUnitRepo {
    async fn create(&self, unit: &Unit) -> Result<Unit, AppError> {
        sqlx::query_as::<_, Unit>(
            "INSERT INTO units (id, property_id, unit_number, unit_type, monthly_rent, description, is_occupied, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $8)
             RETURNING *"
        )
            .bind(&unit.id).bind(&unit.property_id).bind(&unit.unit_number).bind(unit.unit_type.code())
            .bind(unit.monthly_rent.to_string()).bind(&unit.description).bind(unit.created_at).bind(unit.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UnitDetails>, AppError> {
        sqlx::query_as::<_, UnitDetails>(&format!("{DETAILS_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_owner_id(&self, id: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            "SELECT p.owner_id FROM units u JOIN properties p ON p.id = u.property_id WHERE u.id = $1"
        )
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<UnitDetails>, AppError> {
        match scope {
            ListScope::All => {
                sqlx::query_as::<_, UnitDetails>(&format!("{DETAILS_SELECT} ORDER BY u.created_at DESC"))
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, UnitDetails>(&format!("{DETAILS_SELECT} WHERE p.owner_id = $1 ORDER BY u.created_at DESC"))
                    .bind(owner_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::TenantPrincipal(_) | ListScope::Nothing => Ok(vec![]),
        }
    }

    async fn update(&self, unit: &Unit) -> Result<Unit, AppError> {
        sqlx::query_as::<_, Unit>(
            "UPDATE units SET property_id = $1, unit_number = $2, unit_type = $3, monthly_rent = $4, description = $5, updated_at = $6
             WHERE id = $7
             RETURNING *"
        )
            .bind(&unit.property_id).bind(&unit.unit_number).bind(unit.unit_type.code())
            .bind(unit.monthly_rent.to_string()).bind(&unit.description).bind(unit.updated_at)
            .bind(&unit.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Unit not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM units WHERE id = $1 AND is_occupied = FALSE")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM units WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
            return Err(match exists {
                Some(_) => AppError::Conflict("unit is occupied".into()),
                None => AppError::NotFound("Unit not found".into()),
            });
        }
        Ok(())
    }
}
