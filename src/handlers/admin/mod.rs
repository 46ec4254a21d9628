pub mod dashboard;
pub mod stores;
pub mod users;
