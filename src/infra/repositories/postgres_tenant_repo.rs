use crate::domain::{
    models::{principal::Principal, tenant::{TenancyChange, Tenant, TenantDetails}},
    ports::TenantRepository,
    services::{access::ListScope, tenancy::{plan_assignment, AssignmentPlan}},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, warn};

const DETAILS_SELECT: &str =
    "SELECT t.*, pr.username, pr.email, pr.first_name, pr.last_name, pr.phone_number,
            u.unit_number AS unit_number, u.property_id AS property_id,
            p.name AS property_name, p.owner_id AS owner_id
     FROM tenants t
     JOIN principals pr ON pr.id = t.principal_id
     LEFT JOIN units u ON u.id = t.unit_id
     LEFT JOIN properties p ON p.id = u.property_id";

pub struct PostgresTenantRepo {
    pool: PgPool,
}

impl PostgresTenantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flips a free unit to occupied. Distinguishes a missing unit from a taken one.
async fn occupy_unit(conn: &mut PgConnection, unit_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE units SET is_occupied = TRUE, updated_at = $1 WHERE id = $2 AND is_occupied = FALSE")
        .bind(Utc::now())
        .bind(unit_id)
        .execute(&mut *conn).await.map_err(AppError::Database)?;

    if result.rows_affected() == 0 {
        let exists = sqlx::query("SELECT 1 FROM units WHERE id = $1")
            .bind(unit_id)
            .fetch_optional(&mut *conn).await.map_err(AppError::Database)?;
        return Err(match exists {
            Some(_) => {
                warn!(unit_id = %unit_id, "Rejected assignment to occupied unit");
                AppError::Conflict("unit already occupied".into())
            }
            None => AppError::NotFound("Unit not found".into()),
        });
    }
    Ok(())
}

async fn release_unit(conn: &mut PgConnection, unit_id: &str) -> Result<(), AppError> {
    sqlx::query("UPDATE units SET is_occupied = FALSE, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(unit_id)
        .execute(&mut *conn).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl TenantRepository for PostgresTenantRepo {
    async fn create_with_principal(&self, principal: &Principal, tenant: &Tenant) -> Result<Tenant, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            "INSERT INTO principals (id, email, username, phone_number, first_name, last_name, password_hash, role, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        )
            .bind(&principal.id).bind(&principal.email).bind(&principal.username).bind(&principal.phone_number)
            .bind(&principal.first_name).bind(&principal.last_name).bind(&principal.password_hash)
            .bind(principal.role.as_str()).bind(principal.is_active).bind(principal.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if let Some(unit_id) = &tenant.unit_id {
            occupy_unit(&mut tx, unit_id).await?;
        }

        let created = sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, principal_id, unit_id, lease_start_date, lease_end_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&tenant.id).bind(&principal.id).bind(&tenant.unit_id)
            .bind(tenant.lease_start_date).bind(tenant.lease_end_date)
            .bind(tenant.created_at).bind(tenant.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TenantDetails>, AppError> {
        sqlx::query_as::<_, TenantDetails>(&format!("{DETAILS_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_principal(&self, principal_id: &str) -> Result<Option<TenantDetails>, AppError> {
        sqlx::query_as::<_, TenantDetails>(&format!("{DETAILS_SELECT} WHERE t.principal_id = $1"))
            .bind(principal_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<TenantDetails>, AppError> {
        match scope {
            ListScope::All => {
                sqlx::query_as::<_, TenantDetails>(&format!("{DETAILS_SELECT} ORDER BY t.created_at DESC"))
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, TenantDetails>(&format!("{DETAILS_SELECT} WHERE p.owner_id = $1 ORDER BY t.created_at DESC"))
                    .bind(owner_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::TenantPrincipal(principal_id) => {
                sqlx::query_as::<_, TenantDetails>(&format!("{DETAILS_SELECT} WHERE t.principal_id = $1"))
                    .bind(principal_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::Nothing => Ok(vec![]),
        }
    }

    async fn apply_change(&self, tenant_id: &str, change: &TenancyChange) -> Result<Tenant, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let now = Utc::now();

        // Writing first locks the tenant row before anything is read.
        let current = sqlx::query_as::<_, Tenant>("UPDATE tenants SET updated_at = $1 WHERE id = $2 RETURNING *")
            .bind(now)
            .bind(tenant_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;

        let mut unit_id = current.unit_id.clone();
        if let Some(requested) = &change.unit
            && let AssignmentPlan::Move { release, occupy } = plan_assignment(current.unit_id.as_deref(), requested.as_deref())
        {
            if let Some(new_unit) = &occupy {
                occupy_unit(&mut tx, new_unit).await?;
            }
            if let Some(old_unit) = &release {
                release_unit(&mut tx, old_unit).await?;
            }
            debug!(tenant_id = %tenant_id, from = ?release, to = ?occupy, "Moved tenancy");
            unit_id = occupy;
        }
        let lease = change.lease.unwrap_or_else(|| current.lease());

        let updated = sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET unit_id = $1, lease_start_date = $2, lease_end_date = $3, updated_at = $4
             WHERE id = $5
             RETURNING *"
        )
            .bind(&unit_id).bind(lease.start).bind(lease.end).bind(now)
            .bind(tenant_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, tenant_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let unit_id = sqlx::query_scalar::<_, Option<String>>("DELETE FROM tenants WHERE id = $1 RETURNING unit_id")
            .bind(tenant_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;

        if let Some(unit_id) = unit_id {
            release_unit(&mut tx, &unit_id).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
