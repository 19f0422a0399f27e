pub mod identity;
pub mod movie_service;
pub mod storage;
