use std::sync::Arc;
use crate::domain::{
    models::{auth::{Claims, RefreshTokenRecord, TokenPair}, principal::Principal},
    ports::PrincipalRepository,
};
use crate::error::AppError;
use crate::config::Config;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use chrono::{Utc, Duration};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Sha256, Digest};
use tracing::debug;

pub const TOKEN_AUDIENCE: &str = "rental-frontend";

pub struct AuthService {
    principals: Arc<dyn PrincipalRepository>,
    config: Config,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(principals: Arc<dyn PrincipalRepository>, config: Config) -> Self {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())
            .expect("Invalid JWT Private Key PEM");
        let decoding_key = DecodingKey::from_ed_pem(config.jwt_public_key.as_bytes())
            .expect("Invalid JWT Public Key PEM");

        Self { principals, config, encoding_key, decoding_key }
    }

    /// Opens a new token family. Expired tokens of the principal are dropped on the way.
    pub async fn login(&self, principal: &Principal) -> Result<TokenPair, AppError> {
        let purged = self.principals.purge_expired_refresh_tokens(&principal.id, Utc::now()).await?;
        if purged > 0 {
            debug!(principal_id = %principal.id, purged, "Dropped expired refresh tokens");
        }

        let (pair, record) = self.issue_token_pair(principal, Uuid::new_v4(), 1)?;
        self.principals.store_refresh_token(&record).await?;
        Ok(pair)
    }

    /// Looks up a refresh token that has not expired yet.
    pub async fn find_live_refresh(&self, raw_refresh_token: &str) -> Result<RefreshTokenRecord, AppError> {
        let token_hash = self.hash_token(raw_refresh_token);

        let record = self.principals.find_refresh_token(&token_hash).await?
            .ok_or(AppError::Unauthorized)?;

        if record.expires_at < Utc::now() {
            self.principals.purge_expired_refresh_tokens(&record.principal_id, Utc::now()).await?;
            return Err(AppError::Unauthorized);
        }

        Ok(record)
    }

    /// Swaps `record` for the next generation of its family.
    pub async fn refresh(&self, record: &RefreshTokenRecord, principal: &Principal) -> Result<TokenPair, AppError> {
        let (pair, next) = self.issue_token_pair(principal, record.family_id, record.generation_id + 1)?;
        self.principals.rotate_refresh_token(&record.token_hash, &next).await?;
        Ok(pair)
    }

    /// Revokes every token descended from the same login. Unknown tokens are ignored.
    pub async fn logout(&self, raw_refresh_token: &str) -> Result<(), AppError> {
        self.principals.revoke_refresh_family(&self.hash_token(raw_refresh_token)).await
    }

    pub fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_issuer(&[self.config.auth_issuer.as_str()]);

        decode::<Claims>(access_token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }

    fn issue_token_pair(&self, principal: &Principal, family_id: Uuid, generation_id: i32) -> Result<(TokenPair, RefreshTokenRecord), AppError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.config.access_token_ttl_minutes)).timestamp() as usize;

        let claims = Claims {
            iss: self.config.auth_issuer.clone(),
            sub: principal.id.clone(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            username: principal.username.clone(),
            role: principal.role,
        };

        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        let refresh_token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        let refresh_token_hash = self.hash_token(&refresh_token);

        let refresh_record = RefreshTokenRecord {
            token_hash: refresh_token_hash,
            principal_id: principal.id.clone(),
            family_id,
            generation_id,
            expires_at: now + Duration::days(self.config.refresh_token_ttl_days),
            created_at: now,
        };

        Ok((TokenPair { access_token, refresh_token }, refresh_record))
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
