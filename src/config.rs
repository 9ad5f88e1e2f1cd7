use std::env;

#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret_key: String, // Private key (PEM)
    pub jwt_public_key: String, // Public key (PEM)
    pub auth_issuer: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub log_dir: String,
    pub admin_seed: Option<AdminSeed>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_seed = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(username), Ok(password)) => Some(AdminSeed { email, username, password }),
            _ => None,
        };

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret_key: env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set (Ed25519 Private Key)"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.rental-system.local".to_string()),
            access_token_ttl_minutes: env::var("ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("ACCESS_TOKEN_TTL_MINUTES must be a number"),
            refresh_token_ttl_days: env::var("REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .expect("REFRESH_TOKEN_TTL_DAYS must be a number"),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
            admin_seed,
        }
    }
}
