use crate::AppState;
use crate::api::error::AppError;
use crate::models::RatingDto;
use crate::utils::auth::Claims;
use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body = RatingDto,
    responses(
        (status = 204, description = "Rating stored"),
        (status = 400, description = "Rating out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Movie not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "ratings"
)]
pub async fn rate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RatingDto>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    let user = state
        .identity
        .find_by_email(&claims.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

    state
        .movies
        .rate(payload.movie_id, &user.id, payload.rating)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
