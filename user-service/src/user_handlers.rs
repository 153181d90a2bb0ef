use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use common_auth::{AuthContext, Role, UserId};
use common_http_errors::{ApiError, ApiResult};
use common_security::{ensure_capability, Capability};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::credentials::{validate_credentials, CredentialError};
use crate::models::{NewUser, User, UserPage, UserRecord, UserUpdate};
use crate::password;
use crate::repository::RepoError;
use crate::tokens::TokenSubject;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("invalid_credentials", "Invalid email or password")
}

fn email_in_use() -> ApiError {
    ApiError::conflict("email_in_use", "Email is already in use")
}

fn user_not_found() -> ApiError {
    ApiError::not_found("user_not_found", "User not found")
}

fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    UserId::parse(raw).map_err(|_| ApiError::bad_request("invalid_user_id", "Invalid user ID format"))
}

pub async fn login_user(
    State(state): State<AppState>,
    Json(login): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let LoginRequest { email, password } = login;

    let user = match validate_credentials(state.repo.as_ref(), &email, &password).await {
        Ok(user) => user,
        Err(CredentialError::InvalidCredentials) => {
            // One error value for both unknown email and wrong password;
            // anything more specific is an enumeration oracle.
            state.record_login_metric("invalid");
            return Err(invalid_credentials());
        }
        Err(err) => {
            error!(error = ?err, "Credential check failed");
            state.record_login_metric("error");
            return Err(ApiError::internal("Unable to process login"));
        }
    };

    let issued = state
        .signer
        .issue(TokenSubject::from(&user))
        .map_err(|err| {
            error!(user_id = %user.id, error = ?err, "Failed to issue token");
            ApiError::internal("Unable to issue authentication token")
        })?;

    state.record_login_metric("success");
    Ok(Json(LoginResponse {
        access_token: issued.access_token,
        token_type: issued.token_type,
        expires_in: issued.expires_in,
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(new_user): Json<NewUser>,
) -> ApiResult<Json<User>> {
    ensure_capability(&auth.claims, Capability::UserCreate)?;

    let NewUser {
        first_name,
        last_name,
        email,
        password,
        role,
    } = new_user;

    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(ApiError::bad_request(
            "missing_fields",
            "Email and password are required",
        ));
    }

    // Advisory pre-check; the store's unique constraint is what actually
    // guarantees one record per email when two creates race.
    let existing = state.repo.find_by_email(&email).await.map_err(|err| {
        error!(error = ?err, "User lookup failed");
        ApiError::internal("Failed to create user")
    })?;
    if existing.is_some() {
        return Err(email_in_use());
    }

    let password_hash = password::hash(password).await.map_err(|err| {
        error!(error = ?err, "Password hashing failed");
        ApiError::internal("Failed to create user")
    })?;

    let record = UserRecord::new(first_name, last_name, email, password_hash, role);
    let created = match state.repo.create(record).await {
        Ok(record) => record,
        Err(RepoError::DuplicateEmail) => return Err(email_in_use()),
        Err(err) => {
            error!(error = ?err, "User insert failed");
            return Err(ApiError::internal("Failed to create user"));
        }
    };

    Ok(Json(User::from(created)))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    ensure_capability(&auth.claims, Capability::UserUpdate)?;

    // Shape check first: a malformed id never reaches the repository.
    let id = parse_user_id(&id)?;

    let mut record = state
        .repo
        .find_by_id(&id)
        .await
        .map_err(|err| {
            error!(error = ?err, "User lookup failed");
            ApiError::internal("Failed to update user")
        })?
        .ok_or_else(user_not_found)?;

    if let Some(email) = &update.email {
        if *email != record.email {
            let existing = state.repo.find_by_email(email).await.map_err(|err| {
                error!(error = ?err, "User lookup failed");
                ApiError::internal("Failed to update user")
            })?;
            if existing.is_some_and(|other| other.id != record.id) {
                return Err(email_in_use());
            }
        }
    }

    let UserUpdate {
        first_name,
        last_name,
        email,
        password,
        role,
    } = update;

    if let Some(first_name) = first_name {
        record.first_name = first_name;
    }
    if let Some(last_name) = last_name {
        record.last_name = last_name;
    }
    if let Some(email) = email {
        record.email = email;
    }
    if let Some(role) = role {
        record.role = role;
    }
    if let Some(password) = password {
        record.password_hash = password::hash(password).await.map_err(|err| {
            error!(error = ?err, "Password hashing failed");
            ApiError::internal("Failed to update user")
        })?;
    }
    record.updated_at = Utc::now();

    let updated = match state.repo.update(record).await {
        Ok(record) => record,
        Err(RepoError::DuplicateEmail) => return Err(email_in_use()),
        Err(RepoError::NotFound) => return Err(user_not_found()),
        Err(err) => {
            error!(error = ?err, "User update failed");
            return Err(ApiError::internal("Failed to update user"));
        }
    };

    Ok(Json(User::from(updated)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    ensure_capability(&auth.claims, Capability::UserDelete)?;

    let id = parse_user_id(&id)?;

    let deleted = match state.repo.delete(&id).await {
        Ok(record) => record,
        Err(RepoError::NotFound) => return Err(user_not_found()),
        Err(err) => {
            error!(error = ?err, "User delete failed");
            return Err(ApiError::internal("Failed to delete user"));
        }
    };

    Ok(Json(User::from(deleted)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<UserPage>> {
    ensure_capability(&auth.claims, Capability::UserList)?;

    if params.page < 1 || params.page_size < 1 {
        return Err(ApiError::bad_request(
            "invalid_pagination",
            "page and pageSize must be at least 1",
        ));
    }

    let (records, total) = state
        .repo
        .list(params.page, params.page_size)
        .await
        .map_err(|err| {
            error!(error = ?err, "User list failed");
            ApiError::internal("Failed to list users")
        })?;

    Ok(Json(UserPage {
        data: records.into_iter().map(User::from).collect(),
        total,
        current_page: params.page,
        page_size: params.page_size,
    }))
}

pub async fn list_roles() -> Json<Vec<&'static str>> {
    Json(Role::ALL.iter().map(Role::as_str).collect())
}
