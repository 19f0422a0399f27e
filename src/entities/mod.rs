pub mod prelude;

pub mod actors;
pub mod genres;
pub mod movie_theaters;
pub mod movies;
pub mod movies_actors;
pub mod movies_genres;
pub mod movies_movie_theaters;
pub mod ratings;
pub mod users;
