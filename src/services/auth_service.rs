use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;

use crate::{
    config::JwtConfig,
    dto::auth::Claims,
    error::{AppError, AppResult},
    models::{Account, Role},
    repository::{NewAccount, RepositoryError},
    state::AppState,
};

/// Signs and validates bearer tokens with one server-held HMAC secret.
///
/// Tokens are stateless: there is no revocation list, so a token stays
/// valid until `exp` even after logout.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: Duration::hours(config.ttl_hours),
        }
    }

    pub fn issue(&self, account: &Account) -> AppResult<String> {
        self.issue_at(account, Utc::now())
    }

    /// Issue a token as if it had been minted at `issued_at`.
    pub fn issue_at(&self, account: &Account, issued_at: DateTime<Utc>) -> AppResult<String> {
        let expiration = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    /// Validates signature, expiry, issuer and audience. Every failure
    /// collapses to `Unauthorized`.
    pub fn authenticate(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "token rejected");
                AppError::Unauthorized
            })
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on a plain mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(stored_hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(e.to_string()))),
    }
}

// Argon2 runs on the blocking pool, never on an async worker.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

pub async fn register_user(state: &AppState, email: &str, password: &str) -> AppResult<Account> {
    let email = normalize_email(email);
    if email.is_empty() || password.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password are required".into(),
        ));
    }

    let password = password.to_owned();
    let password_hash = run_blocking(move || hash_password(&password)).await?;

    let account = state
        .accounts
        .insert(NewAccount {
            email,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(|err| match err {
            RepositoryError::Conflict(_) => AppError::DuplicateEmail,
            other => AppError::Persistence(other),
        })?;

    tracing::info!(user_id = %account.id, "account registered");
    Ok(account)
}

pub struct Session {
    pub access_token: String,
    pub account: Account,
}

pub async fn login_user(state: &AppState, email: &str, password: &str) -> AppResult<Session> {
    let email = normalize_email(email);
    let account = match state.accounts.find_by_email(&email).await? {
        Some(a) => a,
        None => {
            tracing::info!("login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    let stored_hash = account.password_hash.clone();
    let password = password.to_owned();
    let verified = run_blocking(move || verify_password(&stored_hash, &password)).await?;
    if !verified {
        tracing::info!("login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.tokens.issue(&account)?;
    tracing::info!(user_id = %account.id, "logged in");

    Ok(Session {
        access_token,
        account,
    })
}
