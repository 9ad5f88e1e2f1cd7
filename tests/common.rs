#![allow(dead_code)]

use rental_backend::{
    api::router::create_router,
    config::{AdminSeed, Config},
    infra::factory::{seed_admin, sqlite_repositories},
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::{json, Value};

pub const PASSWORD: &str = "password123";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminpass123";

pub struct Session {
    pub access: String,
    pub refresh: String,
    pub user_id: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            log_dir: "./logs".to_string(),
            admin_seed: Some(AdminSeed {
                email: "admin@example.com".to_string(),
                username: ADMIN_USERNAME.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            }),
        };

        let state = Arc::new(AppState::new(config, sqlite_repositories(&pool)));
        seed_admin(&state).await.expect("Failed to seed admin");

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Sends a JSON request and returns the status with the parsed body (`Null` when empty).
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        if bytes.is_empty() {
            return (status, Value::Null);
        }
        match serde_json::from_slice(&bytes) {
            Ok(v) => (status, v),
            Err(e) => panic!("Failed to parse JSON: {:?}. Status: {}. Body: {:?}", e, status, String::from_utf8_lossy(&bytes)),
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Session {
        let (status, body) = self.send(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({ "identifier": identifier, "password": password })),
        ).await;

        if !status.is_success() {
            panic!("Login failed in test helper: status {}, body {:?}", status, body);
        }
        session_from(&body)
    }

    pub async fn admin(&self) -> Session {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn register(&self, username: &str, role: &str) -> Session {
        let (status, body) = self.send(
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
                "password2": PASSWORD,
                "first_name": username,
                "role": role,
            })),
        ).await;

        if status != StatusCode::CREATED {
            panic!("Registration failed in test helper: status {}, body {:?}", status, body);
        }
        session_from(&body)
    }

    pub async fn create_property(&self, token: &str, name: &str) -> String {
        let (status, body) = self.post(
            "/api/v1/properties",
            token,
            json!({ "name": name, "address": "1 Riverside Drive" }),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "create property: {:?}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_unit(&self, token: &str, property_id: &str, unit_number: &str, rent: &str) -> String {
        let (status, body) = self.post(
            "/api/v1/units",
            token,
            json!({
                "property_id": property_id,
                "unit_number": unit_number,
                "unit_type": "1B",
                "monthly_rent": rent,
            }),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "create unit: {:?}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a tenant principal plus tenancy and returns the tenancy JSON.
    pub async fn create_tenant(&self, token: &str, username: &str, unit_id: Option<&str>) -> Value {
        let (status, body) = self.post(
            "/api/v1/tenants",
            token,
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
                "first_name": username,
                "unit_id": unit_id,
            }),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "create tenant: {:?}", body);
        body
    }

    pub async fn unit_is_occupied(&self, token: &str, unit_id: &str) -> bool {
        let (status, body) = self.get(&format!("/api/v1/units/{}", unit_id), token).await;
        assert_eq!(status, StatusCode::OK, "get unit: {:?}", body);
        body["is_occupied"].as_bool().unwrap()
    }
}

fn session_from(body: &Value) -> Session {
    Session {
        access: body["access"].as_str().expect("No access token in body").to_string(),
        refresh: body["refresh"].as_str().expect("No refresh token in body").to_string(),
        user_id: body["user"]["id"].as_str().expect("No user id in body").to_string(),
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
