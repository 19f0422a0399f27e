use crate::AppState;
use crate::api::error::AppError;
use crate::models::{AuthenticationResponse, IdentityError, UserCredentials, UserDto};
use crate::utils::pagination::{PaginationQuery, total_records_header};
use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};

#[utoipa::path(
    post,
    path = "/api/accounts/create",
    request_body = UserCredentials,
    responses(
        (status = 200, description = "User registered", body = AuthenticationResponse),
        (status = 400, description = "Identity errors", body = [IdentityError])
    ),
    tag = "accounts"
)]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<UserCredentials>,
) -> Result<Json<AuthenticationResponse>, AppError> {
    let user = state
        .identity
        .create_user(&payload.email, &payload.password)
        .await?;
    Ok(Json(state.identity.issue_token(&user)?))
}

#[utoipa::path(
    post,
    path = "/api/accounts/login",
    request_body = UserCredentials,
    responses(
        (status = 200, description = "Login successful", body = AuthenticationResponse),
        (status = 400, description = "Login failed")
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<UserCredentials>,
) -> Result<Json<AuthenticationResponse>, AppError> {
    let user = state
        .identity
        .check_password(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| AppError::BadRequest("Login failed".to_string()))?;

    Ok(Json(state.identity.issue_token(&user)?))
}

#[utoipa::path(
    post,
    path = "/api/accounts/makeAdmin",
    request_body(content = String, description = "User ID"),
    responses(
        (status = 200, description = "`true` when the role was granted, `false` if already admin", body = bool),
        (status = 404, description = "User not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "accounts"
)]
pub async fn make_admin(
    State(state): State<AppState>,
    Json(user_id): Json<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(state.identity.set_admin(&user_id, true).await?))
}

#[utoipa::path(
    post,
    path = "/api/accounts/removeAdmin",
    request_body(content = String, description = "User ID"),
    responses(
        (status = 200, description = "`true` when the role was revoked, `false` if not admin", body = bool),
        (status = 404, description = "User not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "accounts"
)]
pub async fn remove_admin(
    State(state): State<AppState>,
    Json(user_id): Json<String>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(state.identity.set_admin(&user_id, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/accounts/listUsers",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of users ordered by email", body = [UserDto])
    ),
    security(
        ("jwt" = [])
    ),
    tag = "accounts"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<(HeaderMap, Json<Vec<UserDto>>), AppError> {
    let window = pagination.window(state.config.max_records_per_page);
    let (total, users) = state.identity.list_users(window).await?;
    Ok((total_records_header(total), Json(users)))
}
