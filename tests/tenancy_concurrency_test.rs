mod common;

use common::TestApp;
use rental_backend::{
    domain::models::{
        principal::{NewPrincipalParams, Principal, Role},
        property::{NewUnitParams, Property, Unit, UnitType},
        tenant::{LeaseTerms, TenancyChange, Tenant},
    },
    error::AppError,
    infra::factory::{postgres_repositories, sqlite_repositories},
    state::Repositories,
};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use tokio::task::JoinSet;
use uuid::Uuid;

fn principal(role: Role) -> Principal {
    let tag = Uuid::new_v4().simple().to_string();
    Principal::new(NewPrincipalParams {
        email: format!("{}@example.com", tag),
        username: tag,
        phone_number: None,
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "unused".to_string(),
        role,
    })
}

/// One free unit and `contenders` unassigned tenancies.
async fn seed(repos: &Repositories, contenders: usize) -> (String, Vec<String>) {
    let owner = repos.principals.create(&principal(Role::Landlord)).await.unwrap();
    let property = repos.properties
        .create(&Property::new(owner.id, "Race Court".into(), "1 Track Rd".into(), String::new()))
        .await.unwrap();
    let unit = repos.units.create(&Unit::new(NewUnitParams {
        property_id: property.id,
        unit_number: "1".into(),
        unit_type: UnitType::Studio,
        monthly_rent: "5000".parse().unwrap(),
        description: String::new(),
    })).await.unwrap();

    let mut tenant_ids = Vec::new();
    for _ in 0..contenders {
        let p = principal(Role::Tenant);
        let tenant = repos.tenants
            .create_with_principal(&p, &Tenant::new(p.id.clone(), None, LeaseTerms::default()))
            .await.unwrap();
        tenant_ids.push(tenant.id);
    }
    (unit.id, tenant_ids)
}

/// Races every tenancy for the same unit and checks exactly one wins.
async fn race_for_unit(repos: Repositories, contenders: usize) {
    let (unit_id, tenant_ids) = seed(&repos, contenders).await;

    let mut set = JoinSet::new();
    for tenant_id in tenant_ids {
        let tenants = repos.tenants.clone();
        let unit_id = unit_id.clone();
        set.spawn(async move { tenants.apply_change(&tenant_id, &TenancyChange::move_to(Some(unit_id))).await });
    }

    let mut winners = Vec::new();
    let mut conflicts = 0;
    while let Some(joined) = set.join_next().await {
        match joined.expect("assignment task panicked") {
            Ok(tenant) => winners.push(tenant.id),
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected assignment error: {:?}", other),
        }
    }

    assert_eq!(winners.len(), 1, "exactly one assignment must win");
    assert_eq!(conflicts, contenders - 1);

    let unit = repos.units.find_by_id(&unit_id).await.unwrap().unwrap();
    assert!(unit.unit.is_occupied);

    let holder = repos.tenants.find_by_id(&winners[0]).await.unwrap().unwrap();
    assert_eq!(holder.tenant.unit_id.as_deref(), Some(unit_id.as_str()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_assignment_sqlite() {
    let app = TestApp::new().await;
    race_for_unit(sqlite_repositories(&app.pool), 2).await;

    let app = TestApp::new().await;
    race_for_unit(sqlite_repositories(&app.pool), 8).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_assignment_postgres() {
    let db_url = std::env::var("DATABASE_URL").unwrap_or_default();
    if !db_url.starts_with("postgres") {
        println!("Skipping concurrency test (not targeting Postgres)");
        return;
    }

    let opts = PgConnectOptions::from_str(&db_url)
        .unwrap()
        .log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations/postgres")
        .run(&pool)
        .await
        .expect("Failed to migrate Postgres");

    race_for_unit(postgres_repositories(&pool), 10).await;
}
