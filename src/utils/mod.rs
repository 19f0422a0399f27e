pub mod auth;
pub mod pagination;
pub mod search;
pub mod validation;
