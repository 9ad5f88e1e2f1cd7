use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::models::principal::{NewPrincipalParams, Principal, Role};
use crate::domain::services::credentials;
use crate::error::AppError;
use crate::state::{AppState, Repositories};
use crate::infra::repositories::{
    postgres_principal_repo::PostgresPrincipalRepo,
    postgres_property_repo::PostgresPropertyRepo, postgres_unit_repo::PostgresUnitRepo,
    postgres_tenant_repo::PostgresTenantRepo, postgres_payment_repo::PostgresPaymentRepo,
    postgres_visitor_repo::PostgresVisitorRepo, postgres_notification_repo::PostgresNotificationRepo,
    sqlite_principal_repo::SqlitePrincipalRepo,
    sqlite_property_repo::SqlitePropertyRepo, sqlite_unit_repo::SqliteUnitRepo,
    sqlite_tenant_repo::SqliteTenantRepo, sqlite_payment_repo::SqlitePaymentRepo,
    sqlite_visitor_repo::SqliteVisitorRepo, sqlite_notification_repo::SqliteNotificationRepo,
};

pub fn postgres_repositories(pool: &PgPool) -> Repositories {
    Repositories {
        principals: Arc::new(PostgresPrincipalRepo::new(pool.clone())),
        properties: Arc::new(PostgresPropertyRepo::new(pool.clone())),
        units: Arc::new(PostgresUnitRepo::new(pool.clone())),
        tenants: Arc::new(PostgresTenantRepo::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepo::new(pool.clone())),
        visitors: Arc::new(PostgresVisitorRepo::new(pool.clone())),
        notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
    }
}

pub fn sqlite_repositories(pool: &SqlitePool) -> Repositories {
    Repositories {
        principals: Arc::new(SqlitePrincipalRepo::new(pool.clone())),
        properties: Arc::new(SqlitePropertyRepo::new(pool.clone())),
        units: Arc::new(SqliteUnitRepo::new(pool.clone())),
        tenants: Arc::new(SqliteTenantRepo::new(pool.clone())),
        payments: Arc::new(SqlitePaymentRepo::new(pool.clone())),
        visitors: Arc::new(SqliteVisitorRepo::new(pool.clone())),
        notifications: Arc::new(SqliteNotificationRepo::new(pool.clone())),
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        AppState::new(config.clone(), postgres_repositories(&pool))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        AppState::new(config.clone(), sqlite_repositories(&pool))
    };

    seed_admin(&state).await.expect("Failed to seed admin principal");
    state
}

/// Creates the configured admin unless a principal already holds its email or username.
pub async fn seed_admin(state: &AppState) -> Result<(), AppError> {
    let Some(seed) = &state.config.admin_seed else {
        return Ok(());
    };

    let email = credentials::normalize_email(&seed.email);
    if state.principal_repo.find_by_email(&email).await?.is_some()
        || state.principal_repo.find_by_username(&seed.username).await?.is_some()
    {
        warn!("Admin seed skipped: {} already exists", seed.username);
        return Ok(());
    }

    let admin = Principal::new(NewPrincipalParams {
        email,
        username: seed.username.clone(),
        phone_number: None,
        first_name: String::new(),
        last_name: String::new(),
        password_hash: credentials::hash_password(&seed.password)?,
        role: Role::Admin,
    });
    state.principal_repo.create(&admin).await?;

    info!("Seeded admin principal: {}", admin.username);
    Ok(())
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
