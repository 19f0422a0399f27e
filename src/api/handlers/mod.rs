pub mod accounts;
pub mod actors;
pub mod genres;
pub mod health;
pub mod movie_theaters;
pub mod movies;
pub mod ratings;

use crate::AppState;
use crate::api::error::AppError;
use crate::utils::auth::Claims;

/// Id of the user behind the token, if any.
pub(crate) async fn caller_id(
    state: &AppState,
    claims: Option<&Claims>,
) -> Result<Option<String>, AppError> {
    let Some(claims) = claims else {
        return Ok(None);
    };

    Ok(state
        .identity
        .find_by_email(&claims.email)
        .await?
        .map(|user| user.id))
}
