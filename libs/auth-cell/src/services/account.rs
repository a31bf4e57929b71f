use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AuthError, LoginRequest, SignupRequest, UserRecord};
use crate::services::password;

pub struct AccountService {
    supabase: Arc<SupabaseClient>,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Create a user. Duplicate checks run before any row is written, so a
    /// rejected signup never leaves a partial user behind.
    pub async fn signup(&self, request: SignupRequest) -> Result<UserRecord, AuthError> {
        let (username, password, first_name, last_name, email) = match (
            request.username,
            request.password,
            request.first_name,
            request.last_name,
            request.email,
        ) {
            (Some(u), Some(p), Some(f), Some(l), Some(e))
                if !u.is_empty() && !p.is_empty() && !f.is_empty() && !l.is_empty() && !e.is_empty() =>
            {
                (u, p, f, l, e)
            }
            _ => return Err(AuthError::MissingFields),
        };

        if self.username_exists(&username).await? {
            return Err(AuthError::DuplicateUsername);
        }
        if self.email_exists(&email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash =
            password::hash_password(&password).map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        let user_data = json!({
            "id": Uuid::new_v4(),
            "username": username,
            "email": email,
            "password_hash": password_hash,
            "first_name": first_name,
            "last_name": last_name,
        });

        let created: Vec<UserRecord> = self
            .supabase
            .insert_returning("/rest/v1/users", user_data)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        let user = created
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Database("Failed to create user".to_string()))?;

        info!("User {} signed up", user.username);
        Ok(user)
    }

    /// Unknown user and wrong password both collapse to InvalidCredentials.
    pub async fn login(&self, request: LoginRequest) -> Result<UserRecord, AuthError> {
        let (username, password) = match (request.username, request.password) {
            (Some(u), Some(p)) => (u, p),
            _ => return Err(AuthError::InvalidCredentials),
        };

        let user = match self.find_by_username(&username).await? {
            Some(user) => user,
            None => return Err(AuthError::InvalidCredentials),
        };

        let matches = password::verify_password(&password, &user.password_hash)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        if !matches {
            debug!("Password mismatch for user {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserRecord, AuthError> {
        let path = format!("/rest/v1/users?id=eq.{}", urlencoding::encode(user_id));
        let result: Vec<UserRecord> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        result.into_iter().next().ok_or(AuthError::UserNotFound)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        let path = format!("/rest/v1/users?username=eq.{}", urlencoding::encode(username));
        let result: Vec<UserRecord> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(result.into_iter().next())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let path = format!("/rest/v1/users?email=eq.{}", urlencoding::encode(email));
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(!result.is_empty())
    }
}
