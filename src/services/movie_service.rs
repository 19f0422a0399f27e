use crate::api::error::AppError;
use crate::entities::prelude::*;
use crate::entities::{
    actors, genres, movie_theaters, movies, movies_actors, movies_genres, movies_movie_theaters,
    ratings,
};
use crate::models::mapping::MovieAggregate;
use crate::models::{
    FilterMoviesDto, GenreDto, HomeDto, MovieCreationDto, MovieDto, MoviePostGetDto,
    MoviePutGetDto, MovieTheaterDto,
};
use crate::services::storage::FileStorageService;
use crate::utils::pagination::PageWindow;
use crate::utils::search::contains_pattern;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use validator::{ValidationError, ValidationErrors};

/// Storage container for posters.
pub const MOVIES_CONTAINER: &str = "movies";

const HOME_LISTING_SIZE: u64 = 6;

pub struct MovieService {
    db: DatabaseConnection,
    storage: Arc<dyn FileStorageService>,
}

/// Mean of the given rates, 0.0 when there are none.
pub fn average_rate(rates: &[i32]) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().map(|r| f64::from(*r)).sum::<f64>() / rates.len() as f64
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl MovieService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn FileStorageService>) -> Self {
        Self { db, storage }
    }

    /// Loads a movie with its three join collections, each row paired with
    /// its related entity. Actors come back in stored order.
    pub async fn load_aggregate<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<MovieAggregate>, DbErr> {
        let Some(movie) = Movies::find_by_id(id).one(conn).await? else {
            return Ok(None);
        };

        let genres = MoviesGenres::find()
            .filter(movies_genres::Column::MovieId.eq(id))
            .find_also_related(Genres)
            .all(conn)
            .await?;

        let movie_theaters = MoviesMovieTheaters::find()
            .filter(movies_movie_theaters::Column::MovieId.eq(id))
            .find_also_related(MovieTheaters)
            .all(conn)
            .await?;

        let actors = MoviesActors::find()
            .filter(movies_actors::Column::MovieId.eq(id))
            .order_by_asc(movies_actors::Column::Order)
            .find_also_related(Actors)
            .all(conn)
            .await?;

        Ok(Some(MovieAggregate {
            movie,
            genres,
            movie_theaters,
            actors,
        }))
    }

    pub async fn home(&self) -> Result<HomeDto, AppError> {
        let today = today();

        let in_theaters = Movies::find()
            .filter(movies::Column::InTheaters.eq(true))
            .order_by_asc(movies::Column::ReleaseDate)
            .limit(HOME_LISTING_SIZE)
            .all(&self.db);

        let upcoming_releases = Movies::find()
            .filter(movies::Column::ReleaseDate.gt(today))
            .order_by_asc(movies::Column::ReleaseDate)
            .limit(HOME_LISTING_SIZE)
            .all(&self.db);

        let (in_theaters, upcoming_releases) = tokio::try_join!(in_theaters, upcoming_releases)?;

        Ok(HomeDto {
            in_theaters: in_theaters.into_iter().map(MovieDto::from).collect(),
            upcoming_releases: upcoming_releases.into_iter().map(MovieDto::from).collect(),
        })
    }

    /// Full movie with ratings. `user_id` selects whose vote is reported.
    pub async fn get(&self, id: i32, user_id: Option<&str>) -> Result<MovieDto, AppError> {
        let aggregate = Self::load_aggregate(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut dto = aggregate.to_dto()?;

        let rates: Vec<i32> = Ratings::find()
            .filter(ratings::Column::MovieId.eq(id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| r.rate)
            .collect();
        dto.average_vote = average_rate(&rates);

        if let Some(user_id) = user_id {
            dto.user_vote = Ratings::find()
                .filter(ratings::Column::MovieId.eq(id))
                .filter(ratings::Column::UserId.eq(user_id))
                .one(&self.db)
                .await?
                .map(|r| r.rate)
                .unwrap_or(0);
        }

        Ok(dto)
    }

    /// Page of movies matching every given criterion, ordered by title,
    /// plus the unpaginated count.
    pub async fn filter(
        &self,
        filter: &FilterMoviesDto,
        window: PageWindow,
    ) -> Result<(u64, Vec<MovieDto>), AppError> {
        let mut query = Movies::find();

        if let Some(title) = filter
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            query = query.filter(movies::Column::Title.like(contains_pattern(title)));
        }

        if filter.in_theaters {
            query = query.filter(movies::Column::InTheaters.eq(true));
        }

        if filter.upcoming_releases {
            query = query.filter(movies::Column::ReleaseDate.gt(today()));
        }

        if let Some(genre_id) = filter.genre_id.filter(|id| *id != 0) {
            query = query.filter(
                movies::Column::Id.in_subquery(
                    Query::select()
                        .column(movies_genres::Column::MovieId)
                        .from(movies_genres::Entity)
                        .and_where(movies_genres::Column::GenreId.eq(genre_id))
                        .to_owned(),
                ),
            );
        }

        let paginator = query
            .order_by_asc(movies::Column::Title)
            .paginate(&self.db, window.records_per_page);

        let total = paginator.num_items().await?;
        let movies = paginator
            .fetch_page(window.page_index)
            .await?
            .into_iter()
            .map(MovieDto::from)
            .collect();

        Ok((total, movies))
    }

    pub async fn post_get(&self) -> Result<MoviePostGetDto, AppError> {
        let (genres, movie_theaters) = self.catalog().await?;
        Ok(MoviePostGetDto {
            genres,
            movie_theaters,
        })
    }

    /// The movie plus, for genres and theaters, the complement of its
    /// selection within the whole catalog.
    pub async fn put_get(&self, id: i32, user_id: Option<&str>) -> Result<MoviePutGetDto, AppError> {
        let movie = self.get(id, user_id).await?;
        let (genres, movie_theaters) = self.catalog().await?;

        let selected_genre_ids: HashSet<i32> = movie.genres.iter().map(|g| g.id).collect();
        let selected_theater_ids: HashSet<i32> =
            movie.movie_theaters.iter().map(|t| t.id).collect();

        let non_selected_genres = genres
            .into_iter()
            .filter(|g| !selected_genre_ids.contains(&g.id))
            .collect();
        let non_selected_movie_theaters = movie_theaters
            .into_iter()
            .filter(|t| !selected_theater_ids.contains(&t.id))
            .collect();

        Ok(MoviePutGetDto {
            selected_genres: movie.genres.clone(),
            non_selected_genres,
            selected_movie_theaters: movie.movie_theaters.clone(),
            non_selected_movie_theaters,
            actors: movie.actors.clone(),
            movie,
        })
    }

    async fn catalog(&self) -> Result<(Vec<GenreDto>, Vec<MovieTheaterDto>), AppError> {
        let genres = Genres::find()
            .order_by_asc(genres::Column::Name)
            .all(&self.db);
        let movie_theaters = MovieTheaters::find()
            .order_by_asc(movie_theaters::Column::Name)
            .all(&self.db);

        let (genres, movie_theaters) = tokio::try_join!(genres, movie_theaters)?;

        Ok((
            genres.into_iter().map(GenreDto::from).collect(),
            movie_theaters.into_iter().map(MovieTheaterDto::from).collect(),
        ))
    }

    /// Stores the poster, then the movie and its links in one transaction.
    /// A poster saved for a failed insert is removed again.
    pub async fn create(&self, dto: MovieCreationDto) -> Result<i32, AppError> {
        self.check_links(&dto).await?;
        let mut active = dto.to_active_model();

        let poster = self.save_poster(&dto).await?;
        active.poster = Set(poster.clone());

        let result = async {
            let txn = self.db.begin().await?;
            let movie = active.insert(&txn).await?;
            insert_links(&txn, &dto, movie.id).await?;
            txn.commit().await?;
            Ok::<_, DbErr>(movie.id)
        }
        .await;

        match result {
            Ok(id) => {
                tracing::info!("🎬 Created movie {} ({})", id, dto.title);
                Ok(id)
            }
            Err(e) => {
                self.discard_poster(poster.as_deref()).await;
                Err(e.into())
            }
        }
    }

    /// Overlays scalars, replaces every join collection and, when a new
    /// poster is sent, the poster file. The old poster is removed only once
    /// the new row is committed; a failed commit removes the new one.
    pub async fn update(&self, id: i32, dto: MovieCreationDto) -> Result<(), AppError> {
        let aggregate = Self::load_aggregate(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.check_links(&dto).await?;

        let mut active = aggregate.movie.clone().into_active_model();
        dto.apply_scalars(&mut active);

        let new_poster = self.save_poster(&dto).await?;
        if let Some(route) = &new_poster {
            active.poster = Set(Some(route.clone()));
        }

        let result = async {
            let txn = self.db.begin().await?;
            active.update(&txn).await?;
            delete_links(&txn, id).await?;
            insert_links(&txn, &dto, id).await?;
            txn.commit().await?;
            Ok::<_, DbErr>(())
        }
        .await;

        match result {
            Ok(()) => {
                if new_poster.is_some() {
                    self.discard_poster(aggregate.movie.poster.as_deref()).await;
                }
                tracing::info!("✏️  Updated movie {}", id);
                Ok(())
            }
            Err(e) => {
                self.discard_poster(new_poster.as_deref()).await;
                Err(e.into())
            }
        }
    }

    async fn save_poster(&self, dto: &MovieCreationDto) -> Result<Option<String>, AppError> {
        match &dto.poster {
            Some(file) => self
                .storage
                .save_file(MOVIES_CONTAINER, file)
                .await
                .map(Some)
                .map_err(AppError::Storage),
            None => Ok(None),
        }
    }

    /// Removes a poster no row points at; failures are only logged.
    async fn discard_poster(&self, route: Option<&str>) {
        if let Err(e) = self.storage.delete_file(route, MOVIES_CONTAINER).await {
            tracing::warn!("Failed to remove poster {:?}: {:?}", route, e);
        }
    }

    /// Rejects links to genres, theaters or actors that do not exist.
    async fn check_links(&self, dto: &MovieCreationDto) -> Result<(), AppError> {
        let actor_ids: Vec<i32> = dto.actors.iter().map(|a| a.id).collect();

        let genres = Genres::find()
            .select_only()
            .column(genres::Column::Id)
            .filter(genres::Column::Id.is_in(dto.genres_ids.clone()))
            .into_tuple::<i32>()
            .all(&self.db);
        let movie_theaters = MovieTheaters::find()
            .select_only()
            .column(movie_theaters::Column::Id)
            .filter(movie_theaters::Column::Id.is_in(dto.movie_theaters_ids.clone()))
            .into_tuple::<i32>()
            .all(&self.db);
        let actors = Actors::find()
            .select_only()
            .column(actors::Column::Id)
            .filter(actors::Column::Id.is_in(actor_ids.clone()))
            .into_tuple::<i32>()
            .all(&self.db);

        let (genres, movie_theaters, actors) = tokio::try_join!(genres, movie_theaters, actors)?;

        let mut errors = ValidationErrors::new();
        report_unknown(&mut errors, "genresIds", "genre", &dto.genres_ids, &genres);
        report_unknown(
            &mut errors,
            "movieTheatersIds",
            "movie theater",
            &dto.movie_theaters_ids,
            &movie_theaters,
        );
        report_unknown(&mut errors, "actors", "actor", &actor_ids, &actors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }

    /// Removes the movie with its links and ratings, then its poster.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let movie = Movies::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let txn = self.db.begin().await?;
        delete_links(&txn, id).await?;
        Ratings::delete_many()
            .filter(ratings::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        Movies::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        self.discard_poster(movie.poster.as_deref()).await;

        tracing::info!("🗑️  Deleted movie {}", id);
        Ok(())
    }

    /// Records `user_id`'s rating for a movie, replacing an earlier one.
    /// Concurrent votes by the same user resolve to the last write.
    pub async fn rate(&self, movie_id: i32, user_id: &str, rate: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        if Movies::find_by_id(movie_id).one(&txn).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let existing = Ratings::find()
            .filter(ratings::Column::MovieId.eq(movie_id))
            .filter(ratings::Column::UserId.eq(user_id))
            .one(&txn)
            .await?;

        match existing {
            Some(rating) => {
                let mut active = rating.into_active_model();
                active.rate = Set(rate);
                active.update(&txn).await?;
            }
            None => {
                ratings::ActiveModel {
                    rate: Set(rate),
                    movie_id: Set(movie_id),
                    user_id: Set(user_id.to_owned()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

/// Adds a `field` error listing the requested ids missing from `found`.
fn report_unknown(
    errors: &mut ValidationErrors,
    field: &'static str,
    kind: &str,
    requested: &[i32],
    found: &[i32],
) {
    let mut unknown: Vec<i32> = requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();
    unknown.sort_unstable();
    unknown.dedup();

    if unknown.is_empty() {
        return;
    }

    let ids = unknown
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    errors.add(
        field,
        ValidationError::new("unknown_id")
            .with_message(Cow::Owned(format!("Unknown {} id: {}", kind, ids))),
    );
}

async fn insert_links<C: ConnectionTrait>(
    conn: &C,
    dto: &MovieCreationDto,
    movie_id: i32,
) -> Result<(), DbErr> {
    let genres = dto.genre_links(movie_id);
    if !genres.is_empty() {
        MoviesGenres::insert_many(genres)
            .exec_without_returning(conn)
            .await?;
    }

    let movie_theaters = dto.movie_theater_links(movie_id);
    if !movie_theaters.is_empty() {
        MoviesMovieTheaters::insert_many(movie_theaters)
            .exec_without_returning(conn)
            .await?;
    }

    let actors = dto.actor_links(movie_id);
    if !actors.is_empty() {
        MoviesActors::insert_many(actors)
            .exec_without_returning(conn)
            .await?;
    }

    Ok(())
}

async fn delete_links<C: ConnectionTrait>(conn: &C, movie_id: i32) -> Result<(), DbErr> {
    MoviesGenres::delete_many()
        .filter(movies_genres::Column::MovieId.eq(movie_id))
        .exec(conn)
        .await?;
    MoviesMovieTheaters::delete_many()
        .filter(movies_movie_theaters::Column::MovieId.eq(movie_id))
        .exec(conn)
        .await?;
    MoviesActors::delete_many()
        .filter(movies_actors::Column::MovieId.eq(movie_id))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rate() {
        assert_eq!(average_rate(&[]), 0.0);
        assert_eq!(average_rate(&[4]), 4.0);
        assert_eq!(average_rate(&[5, 4, 2]), 11.0 / 3.0);
    }

    #[test]
    fn test_report_unknown_lists_missing_ids_once() {
        let mut errors = ValidationErrors::new();
        report_unknown(&mut errors, "genresIds", "genre", &[3, 9, 1, 9], &[1, 3]);
        report_unknown(&mut errors, "actors", "actor", &[2], &[2]);

        let fields = errors.field_errors();
        assert_eq!(fields.len(), 1);
        let message = fields["genresIds"][0].message.as_ref().unwrap();
        assert_eq!(message.to_string(), "Unknown genre id: 9");
    }
}
