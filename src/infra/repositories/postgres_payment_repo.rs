use crate::domain::{
    models::{money::Money, payment::Payment},
    ports::PaymentRepository,
    services::{access::ListScope, ledger::ensure_matches_rent},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

pub struct PostgresPaymentRepo {
    pool: PgPool,
}

impl PostgresPaymentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Compares against the rent as stored at this point of the transaction.
async fn check_rent(conn: &mut PgConnection, payment: &Payment) -> Result<(), AppError> {
    let rent = sqlx::query_scalar::<_, String>("SELECT monthly_rent FROM units WHERE id = $1")
        .bind(&payment.unit_id)
        .fetch_optional(&mut *conn).await.map_err(AppError::Database)?
        .ok_or_else(|| AppError::invalid("unit_id", "Invalid unit ID"))?;
    let rent: Money = rent.parse()
        .map_err(|e| AppError::InternalWithMsg(format!("stored rent for unit {} is unreadable: {e}", payment.unit_id)))?;
    ensure_matches_rent(payment.amount_due, rent)
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepo {
    async fn create(&self, payment: &Payment) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, tenant_id, unit_id, amount_due, amount_paid, method, status, transaction_id, billing_period, payment_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *"
        )
            .bind(&payment.id).bind(&payment.tenant_id).bind(&payment.unit_id)
            .bind(payment.amount_due.to_string()).bind(payment.amount_paid.to_string())
            .bind(payment.method.as_str()).bind(payment.status.as_str()).bind(&payment.transaction_id)
            .bind(&payment.billing_period).bind(payment.payment_date)
            .bind(payment.created_at).bind(payment.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        check_rent(&mut tx, &created).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, scope: &ListScope) -> Result<Vec<Payment>, AppError> {
        match scope {
            ListScope::All => {
                sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY created_at DESC")
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, Payment>(
                    "SELECT pay.* FROM payments pay
                     JOIN units u ON u.id = pay.unit_id
                     JOIN properties p ON p.id = u.property_id
                     WHERE p.owner_id = $1
                     ORDER BY pay.created_at DESC"
                )
                    .bind(owner_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::TenantPrincipal(principal_id) => {
                sqlx::query_as::<_, Payment>(
                    "SELECT pay.* FROM payments pay
                     JOIN tenants t ON t.id = pay.tenant_id
                     WHERE t.principal_id = $1
                     ORDER BY pay.created_at DESC"
                )
                    .bind(principal_id)
                    .fetch_all(&self.pool).await.map_err(AppError::Database)
            }
            ListScope::Nothing => Ok(vec![]),
        }
    }

    async fn update(&self, payment: &Payment) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET tenant_id = $1, unit_id = $2, amount_due = $3, amount_paid = $4, method = $5, status = $6,
                 transaction_id = $7, billing_period = $8, payment_date = $9, updated_at = $10
             WHERE id = $11
             RETURNING *"
        )
            .bind(&payment.tenant_id).bind(&payment.unit_id)
            .bind(payment.amount_due.to_string()).bind(payment.amount_paid.to_string())
            .bind(payment.method.as_str()).bind(payment.status.as_str()).bind(&payment.transaction_id)
            .bind(&payment.billing_period).bind(payment.payment_date).bind(payment.updated_at)
            .bind(&payment.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Payment not found".into()))?;

        check_rent(&mut tx, &updated).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Payment not found".into())); }
        Ok(())
    }
}
