pub mod auth;
pub mod review;
pub mod style;
