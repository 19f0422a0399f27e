pub use super::actors::Entity as Actors;
pub use super::genres::Entity as Genres;
pub use super::movie_theaters::Entity as MovieTheaters;
pub use super::movies::Entity as Movies;
pub use super::movies_actors::Entity as MoviesActors;
pub use super::movies_genres::Entity as MoviesGenres;
pub use super::movies_movie_theaters::Entity as MoviesMovieTheaters;
pub use super::ratings::Entity as Ratings;
pub use super::users::Entity as Users;
