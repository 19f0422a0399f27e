pub mod mapping;

use crate::services::storage::UploadedFile;
use crate::utils::validation::first_letter_uppercase;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenreDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct GenreCreationDto {
    #[validate(
        length(
            min = 1,
            max = 50,
            message = "The field Name is required and must have at most 50 characters"
        ),
        custom(function = "first_letter_uppercase")
    )]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActorDto {
    pub id: i32,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub biography: Option<String>,
    pub picture: Option<String>,
}

/// Actor write model. The picture travels next to it, never through the
/// entity mapping.
#[derive(Debug, Clone, Default, Validate)]
pub struct ActorCreationDto {
    #[validate(length(
        min = 1,
        max = 120,
        message = "The field Name is required and must have at most 120 characters"
    ))]
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub biography: Option<String>,
    pub picture: Option<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MovieTheaterDto {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct MovieTheaterCreationDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "The field Name is required and must have at most 100 characters"
    ))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActorsMoviesDto {
    pub id: i32,
    pub name: String,
    pub character: Option<String>,
    pub picture: Option<String>,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MoviesActorsCreationDto {
    pub id: i32,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    pub id: i32,
    pub title: String,
    pub summary: Option<String>,
    pub trailer: Option<String>,
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    pub poster: Option<String>,
    pub genres: Vec<GenreDto>,
    pub movie_theaters: Vec<MovieTheaterDto>,
    pub actors: Vec<ActorsMoviesDto>,
    pub average_vote: f64,
    pub user_vote: i32,
}

/// Movie write model, bound from a multipart form.
#[derive(Debug, Clone, Validate)]
pub struct MovieCreationDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "The field Title is required and must have at most 100 characters"
    ))]
    pub title: String,
    pub summary: Option<String>,
    pub in_theaters: bool,
    pub trailer: Option<String>,
    pub release_date: NaiveDate,
    pub poster: Option<UploadedFile>,
    pub genres_ids: Vec<i32>,
    pub movie_theaters_ids: Vec<i32>,
    pub actors: Vec<MoviesActorsCreationDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeDto {
    pub in_theaters: Vec<MovieDto>,
    pub upcoming_releases: Vec<MovieDto>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FilterMoviesDto {
    /// Substring of the title
    pub title: Option<String>,
    #[serde(default)]
    pub in_theaters: bool,
    #[serde(default)]
    pub upcoming_releases: bool,
    /// Only movies linked to this genre; zero or absent disables the filter
    pub genre_id: Option<i32>,
    pub page: Option<u64>,
    pub records_per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoviePostGetDto {
    pub genres: Vec<GenreDto>,
    pub movie_theaters: Vec<MovieTheaterDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoviePutGetDto {
    pub movie: MovieDto,
    pub selected_genres: Vec<GenreDto>,
    pub non_selected_genres: Vec<GenreDto>,
    pub selected_movie_theaters: Vec<MovieTheaterDto>,
    pub non_selected_movie_theaters: Vec<MovieTheaterDto>,
    pub actors: Vec<ActorsMoviesDto>,
}

/// Account credentials. Checked by the identity store, which reports its
/// own errors, so there are no field validators here.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticationResponse {
    pub token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RatingDto {
    pub movie_id: i32,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}

/// A registration failure reported by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    pub fn new(code: &str, description: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            description: description.into(),
        }
    }
}
