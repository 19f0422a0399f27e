//! Conversions between persisted entities and wire DTOs.
//!
//! Every pair has an explicit function here; nothing is bound by field name
//! at runtime. Write mappings never touch poster or picture paths, those are
//! set by the handlers after the storage call.

use super::{
    ActorCreationDto, ActorDto, ActorsMoviesDto, GenreCreationDto, GenreDto, MovieCreationDto,
    MovieDto, MovieTheaterCreationDto, MovieTheaterDto, UserDto,
};
use crate::entities::{
    actors, genres, movie_theaters, movies, movies_actors, movies_genres, movies_movie_theaters,
    users,
};
use sea_orm::Set;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MappingError {
    #[error("{join} row for movie {movie_id} references missing {related} {related_id}")]
    MissingRelation {
        join: &'static str,
        related: &'static str,
        movie_id: i32,
        related_id: i32,
    },
}

/// Planar point where X is longitude and Y is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    /// Arguments are in (longitude, latitude) order.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            x: longitude,
            y: latitude,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.x
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }
}

impl From<&movie_theaters::Model> for GeoPoint {
    fn from(model: &movie_theaters::Model) -> Self {
        GeoPoint::new(model.longitude, model.latitude)
    }
}

/// A movie with its three join collections, each row paired with the entity
/// it points at. This is the only shape handed to the movie mapping.
#[derive(Debug, Clone)]
pub struct MovieAggregate {
    pub movie: movies::Model,
    pub genres: Vec<(movies_genres::Model, Option<genres::Model>)>,
    pub movie_theaters: Vec<(movies_movie_theaters::Model, Option<movie_theaters::Model>)>,
    pub actors: Vec<(movies_actors::Model, Option<actors::Model>)>,
}

// Genres

impl From<genres::Model> for GenreDto {
    fn from(model: genres::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl GenreCreationDto {
    pub fn apply_to(self, active: &mut genres::ActiveModel) {
        active.name = Set(self.name);
    }

    pub fn into_active_model(self) -> genres::ActiveModel {
        let mut active = genres::ActiveModel::default();
        self.apply_to(&mut active);
        active
    }
}

// Actors

impl From<actors::Model> for ActorDto {
    fn from(model: actors::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            date_of_birth: model.date_of_birth,
            biography: model.biography,
            picture: model.picture,
        }
    }
}

impl ActorCreationDto {
    /// Copies scalar fields; `picture` is left alone.
    pub fn apply_to(&self, active: &mut actors::ActiveModel) {
        active.name = Set(self.name.clone());
        active.date_of_birth = Set(self.date_of_birth);
        active.biography = Set(self.biography.clone());
    }

    pub fn to_active_model(&self) -> actors::ActiveModel {
        let mut active = actors::ActiveModel {
            picture: Set(None),
            ..Default::default()
        };
        self.apply_to(&mut active);
        active
    }
}

// Movie theaters

impl From<movie_theaters::Model> for MovieTheaterDto {
    fn from(model: movie_theaters::Model) -> Self {
        let point = GeoPoint::from(&model);
        Self {
            id: model.id,
            name: model.name,
            latitude: point.latitude(),
            longitude: point.longitude(),
        }
    }
}

impl MovieTheaterCreationDto {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }

    pub fn apply_to(self, active: &mut movie_theaters::ActiveModel) {
        let point = self.point();
        active.name = Set(self.name);
        active.longitude = Set(point.x);
        active.latitude = Set(point.y);
    }

    pub fn into_active_model(self) -> movie_theaters::ActiveModel {
        let mut active = movie_theaters::ActiveModel::default();
        self.apply_to(&mut active);
        active
    }
}

// Movies

impl MovieCreationDto {
    /// Overlays scalar fields; `poster` is left alone.
    pub fn apply_scalars(&self, active: &mut movies::ActiveModel) {
        active.title = Set(self.title.clone());
        active.summary = Set(self.summary.clone());
        active.in_theaters = Set(self.in_theaters);
        active.trailer = Set(self.trailer.clone());
        active.release_date = Set(self.release_date);
    }

    pub fn to_active_model(&self) -> movies::ActiveModel {
        let mut active = movies::ActiveModel {
            poster: Set(None),
            ..Default::default()
        };
        self.apply_scalars(&mut active);
        active
    }

    pub fn genre_links(&self, movie_id: i32) -> Vec<movies_genres::ActiveModel> {
        distinct(&self.genres_ids)
            .map(|genre_id| movies_genres::ActiveModel {
                movie_id: Set(movie_id),
                genre_id: Set(genre_id),
            })
            .collect()
    }

    pub fn movie_theater_links(&self, movie_id: i32) -> Vec<movies_movie_theaters::ActiveModel> {
        distinct(&self.movie_theaters_ids)
            .map(|movie_theater_id| movies_movie_theaters::ActiveModel {
                movie_id: Set(movie_id),
                movie_theater_id: Set(movie_theater_id),
            })
            .collect()
    }

    /// One link per submitted actor, `order` taken from list position.
    pub fn actor_links(&self, movie_id: i32) -> Vec<movies_actors::ActiveModel> {
        let mut seen = HashSet::new();

        self.actors
            .iter()
            .filter(|actor| seen.insert(actor.id))
            .enumerate()
            .map(|(order, actor)| movies_actors::ActiveModel {
                movie_id: Set(movie_id),
                actor_id: Set(actor.id),
                character: Set(actor.character.clone()),
                order: Set(order as i32),
            })
            .collect()
    }
}

/// Keeps the first occurrence of each id; the join tables are keyed on
/// (movie, related) so repeats cannot be stored.
fn distinct(ids: &[i32]) -> impl Iterator<Item = i32> + '_ {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(move |id| seen.insert(*id))
}

impl From<movies::Model> for MovieDto {
    fn from(model: movies::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            summary: model.summary,
            trailer: model.trailer,
            in_theaters: model.in_theaters,
            release_date: model.release_date,
            poster: model.poster,
            genres: Vec::new(),
            movie_theaters: Vec::new(),
            actors: Vec::new(),
            average_vote: 0.0,
            user_vote: 0,
        }
    }
}

impl MovieAggregate {
    /// Flattens join rows into DTO lists. Votes are left at zero for the
    /// caller to fill in.
    pub fn to_dto(&self) -> Result<MovieDto, MappingError> {
        let movie_id = self.movie.id;

        let genres = self
            .genres
            .iter()
            .map(|(link, genre)| {
                genre
                    .as_ref()
                    .map(|g| GenreDto {
                        id: link.genre_id,
                        name: g.name.clone(),
                    })
                    .ok_or(MappingError::MissingRelation {
                        join: "movies_genres",
                        related: "genre",
                        movie_id,
                        related_id: link.genre_id,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let movie_theaters = self
            .movie_theaters
            .iter()
            .map(|(link, theater)| {
                theater
                    .as_ref()
                    .map(|t| {
                        let point = GeoPoint::from(t);
                        MovieTheaterDto {
                            id: link.movie_theater_id,
                            name: t.name.clone(),
                            latitude: point.latitude(),
                            longitude: point.longitude(),
                        }
                    })
                    .ok_or(MappingError::MissingRelation {
                        join: "movies_movie_theaters",
                        related: "movie theater",
                        movie_id,
                        related_id: link.movie_theater_id,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let actors = self
            .actors
            .iter()
            .map(|(link, actor)| {
                actor
                    .as_ref()
                    .map(|a| ActorsMoviesDto {
                        id: link.actor_id,
                        name: a.name.clone(),
                        character: link.character.clone(),
                        picture: a.picture.clone(),
                        order: link.order,
                    })
                    .ok_or(MappingError::MissingRelation {
                        join: "movies_actors",
                        related: "actor",
                        movie_id,
                        related_id: link.actor_id,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MovieDto {
            genres,
            movie_theaters,
            actors,
            ..MovieDto::from(self.movie.clone())
        })
    }
}

// Users

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
        }
    }
}
