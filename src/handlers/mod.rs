pub mod admin;
pub mod auth;
pub mod owner;
pub mod ratings;
pub mod stores;
