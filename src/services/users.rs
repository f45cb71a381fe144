/**
 * Credential handling
 * Registration, login, profile lookup and the startup admin seed.
 */
use serde::{Deserialize, Serialize};

use super::validation::{Validator, MAX_NAME_LEN, MIN_PASSWORD_LEN};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{Identity, Role};
use crate::config::{AdminPassword, AdminSeed};
use crate::db::models::{NewUser, User};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `login` may hold either the username or the email.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[serde(alias = "username", alias = "email")]
    pub login: Option<String>,
    pub password: Option<String>,
}

/// User plus a freshly issued token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

pub async fn register(state: &AppState, input: RegisterInput) -> Result<AuthPayload, AppError> {
    let mut v = Validator::new();
    let username = v.required("username", input.username.as_deref(), MAX_NAME_LEN);
    // Login treats anything with an `@` as an email.
    if username.contains('@') {
        v.fail("username", "Username cannot contain '@'");
    }
    let email = v
        .required("email", input.email.as_deref(), MAX_NAME_LEN * 2)
        .to_lowercase();
    v.email("email", &email);
    let password = input.password.unwrap_or_default();
    if password.is_empty() {
        v.fail("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        v.fail(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
        );
    }
    v.finish()?;

    if let Some(existing) = state
        .store
        .find_user_by_username_or_email(&username, &email)
        .await?
    {
        let what = if existing.username == username {
            "Username already taken"
        } else {
            "Email already registered"
        };
        return Err(AppError::Conflict(what.to_string()));
    }

    let password_hash = hash_password(password, state.config.bcrypt_cost).await?;

    // The insert re-checks uniqueness, so a concurrent registration still
    // surfaces as a conflict.
    let user = state
        .store
        .insert_user(NewUser {
            username,
            email,
            password_hash,
            role: Role::Standard,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    let token = state.tokens.issue(&user)?;
    Ok(AuthPayload { user, token })
}

pub async fn login(state: &AppState, input: LoginInput) -> Result<AuthPayload, AppError> {
    let mut v = Validator::new();
    let login = v.required("login", input.login.as_deref(), MAX_NAME_LEN * 2);
    let password = input.password.unwrap_or_default();
    if password.is_empty() {
        v.fail("password", "Password is required");
    }
    v.finish()?;

    let found = if login.contains('@') {
        state.store.find_user_by_email(&login).await?
    } else {
        state.store.find_user_by_username(&login).await?
    };
    let Some(user) = found else {
        tracing::warn!("Login attempt for unknown user: {}", login);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, user.password_hash.clone()).await {
        tracing::warn!("Failed login attempt for: {}", user.username);
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("Successful login for user: {}", user.username);

    let token = state.tokens.issue(&user)?;
    Ok(AuthPayload { user, token })
}

pub async fn profile(state: &AppState, identity: &Identity) -> Result<User, AppError> {
    state
        .store
        .find_user(identity.user_id)
        .await?
        .ok_or(AppError::NotFound("User"))
}

/// Make sure the configured admin account exists. An existing account with
/// the same username or email is left untouched.
pub async fn ensure_admin(state: &AppState, seed: &AdminSeed) -> Result<User, AppError> {
    let username = seed.username.trim().to_string();
    let email = seed.email.trim().to_lowercase();
    if let Some(existing) = state
        .store
        .find_user_by_username_or_email(&username, &email)
        .await?
    {
        if !existing.is_admin() {
            tracing::warn!(
                username = %existing.username,
                "admin seed collides with a standard account; not promoting"
            );
        }
        return Ok(existing);
    }

    let password_hash = match &seed.password {
        AdminPassword::Hash(hash) => hash.clone(),
        AdminPassword::Plain(plain) => {
            hash_password(plain.clone(), state.config.bcrypt_cost).await?
        }
    };

    let user = state
        .store
        .insert_user(NewUser {
            username,
            email,
            password_hash,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "admin account seeded");
    Ok(user)
}
